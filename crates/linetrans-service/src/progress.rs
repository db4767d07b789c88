use indicatif::{ProgressBar, ProgressStyle};

const PROGRESS_TEMPLATE: &str = "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} ({eta}) {msg}";

/// Line-level progress: `current / total` where total comes from the pre-scan.
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    pub fn new(total: u64, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }
        let bar = ProgressBar::new(total);
        match ProgressStyle::with_template(PROGRESS_TEMPLATE) {
            Ok(style) => bar.set_style(style),
            Err(err) => log::debug!("progress template rejected: {err}"),
        }
        Self { bar }
    }

    pub fn advance(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self, message: String) {
        self.bar.finish_with_message(message);
    }
}
