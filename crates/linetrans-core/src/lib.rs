pub mod markers;
pub mod payload;
pub mod record;
pub mod status;

pub use markers::remove_start_tag;
pub use record::{Field, Record, TransformedRecord};
pub use status::{LineEvent, LineStatus};
