//! Translates a JSONL dataset through a chat completion endpoint.
//!
//! Takes no arguments; every setting comes from `LINETRANS_*` environment
//! variables (see `TranslateConfig`).

use linetrans_service::{init_logging, run, TranslateConfig};
use std::process;

fn main() {
    init_logging();

    let config = match TranslateConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    match run(&config) {
        Ok(summary) => {
            println!(
                "Translation completed. Output saved to {}",
                summary.output_path.display()
            );
            println!(
                "records={} abandoned_fields={} malformed_lines={}",
                summary.records_written, summary.abandoned_fields, summary.malformed_lines
            );
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}
