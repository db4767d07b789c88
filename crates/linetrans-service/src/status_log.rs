use linetrans_core::{LineEvent, LineStatus};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Sink for per-line status events. Recording never fails from the caller's
/// point of view.
pub trait StatusLog: Send + Sync {
    fn record(&self, event: &LineEvent);
}

/// Appends `Line {n}: {status}` lines to a text file.
pub struct FileStatusLog {
    path: PathBuf,
    field_tags: bool,
    file: Mutex<Option<File>>,
}

impl FileStatusLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            field_tags: false,
            file: Mutex::new(None),
        }
    }

    /// Prefix each field event with `[field]`; needed once field calls interleave.
    pub fn with_field_tags(mut self, enabled: bool) -> Self {
        self.field_tags = enabled;
        self
    }

    fn append_line(&self, line: &str) {
        let Ok(mut guard) = self.file.lock() else {
            return;
        };
        if guard.is_none() {
            match OpenOptions::new().create(true).append(true).open(&self.path) {
                Ok(file) => *guard = Some(file),
                Err(err) => {
                    log::warn!(
                        "status log open failed: path={}, err={}",
                        self.path.display(),
                        err
                    );
                    return;
                }
            }
        }
        let Some(file) = guard.as_mut() else {
            return;
        };
        // 中文注释：整行一次写入且持有锁，并发字段的日志不会互相截断。
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        if let Err(err) = file.write_all(buf.as_bytes()) {
            log::warn!(
                "status log write failed: path={}, err={}",
                self.path.display(),
                err
            );
            // reopen on the next event
            *guard = None;
        }
    }
}

impl StatusLog for FileStatusLog {
    fn record(&self, event: &LineEvent) {
        mirror_to_log(event);
        let line = if self.field_tags {
            event.tagged()
        } else {
            event.to_string()
        };
        self.append_line(&line);
    }
}

// 中文注释：逐次重试的失败只进日志文件；stderr 只在放弃时告警，避免打断进度条。
fn mirror_level(status: &LineStatus) -> log::Level {
    if status.is_abandonment() {
        log::Level::Warn
    } else {
        log::Level::Debug
    }
}

fn mirror_to_log(event: &LineEvent) {
    let field = event.field.map(|f| f.as_str()).unwrap_or("-");
    log::log!(
        mirror_level(&event.status),
        "line={} field={} status={}",
        event.line_number,
        field,
        event.status
    );
}

/// Keeps events in memory; used by tests to assert on exact sequences.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryStatusLog {
    events: Mutex<Vec<LineEvent>>,
}

#[cfg(test)]
impl MemoryStatusLog {
    pub(crate) fn events(&self) -> Vec<LineEvent> {
        self.events.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl StatusLog for MemoryStatusLog {
    fn record(&self, event: &LineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
