use std::fmt;

use crate::record::Field;

/// Outcome of one attempt (or one input line) as it appears in the status log.
#[derive(Debug, Clone, PartialEq)]
pub enum LineStatus {
    Translated,
    Timeout,
    Error(String),
    MaxRetries,
    MalformedInput(String),
}

impl LineStatus {
    /// True when the event means data is dropped: a field gave up, or a whole
    /// input line was replaced by an empty record. Retryable failures are not.
    pub fn is_abandonment(&self) -> bool {
        matches!(self, LineStatus::MaxRetries | LineStatus::MalformedInput(_))
    }
}

impl fmt::Display for LineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineStatus::Translated => f.write_str("Successfully translated."),
            LineStatus::Timeout => f.write_str("Timeout. Retrying..."),
            LineStatus::Error(detail) => write!(f, "Error - {}. Retrying...", single_line(detail)),
            LineStatus::MaxRetries => f.write_str("Max retries reached. Skipping."),
            LineStatus::MalformedInput(detail) => {
                write!(f, "Malformed input - {}. Writing empty record.", single_line(detail))
            }
        }
    }
}

/// One status log entry. `field` is unset for line-level events.
#[derive(Debug, Clone, PartialEq)]
pub struct LineEvent {
    pub line_number: u64,
    pub field: Option<Field>,
    pub status: LineStatus,
}

impl LineEvent {
    pub fn for_field(line_number: u64, field: Field, status: LineStatus) -> Self {
        Self {
            line_number,
            field: Some(field),
            status,
        }
    }

    pub fn for_line(line_number: u64, status: LineStatus) -> Self {
        Self {
            line_number,
            field: None,
            status,
        }
    }

    /// `Line {n}: [{field}] {status}`; the tag is dropped for line-level events.
    pub fn tagged(&self) -> String {
        match self.field {
            Some(field) => format!("Line {}: [{}] {}", self.line_number, field, self.status),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for LineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line_number, self.status)
    }
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
