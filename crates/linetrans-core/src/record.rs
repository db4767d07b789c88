use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The three translatable fields of a dataset line, in output order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Instruction,
    Input,
    Output,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Instruction, Field::Input, Field::Output];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Instruction => "instruction",
            Field::Input => "input",
            Field::Output => "output",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed input line. Missing or `null` fields read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "lenient_text")]
    pub instruction: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub input: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub output: String,
}

impl Record {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Instruction => &self.instruction,
            Field::Input => &self.input,
            Field::Output => &self.output,
        }
    }
}

/// The translated counterpart of a [`Record`]. `None` marks an abandoned field and
/// is written as JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformedRecord {
    pub instruction: Option<String>,
    pub input: Option<String>,
    pub output: Option<String>,
}

impl TransformedRecord {
    /// Record with every field absent; written for lines that could not be parsed.
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Instruction => self.instruction.as_deref(),
            Field::Input => self.input.as_deref(),
            Field::Output => self.output.as_deref(),
        }
    }

    pub fn set(&mut self, field: Field, value: Option<String>) {
        match field {
            Field::Instruction => self.instruction = value,
            Field::Input => self.input = value,
            Field::Output => self.output = value,
        }
    }

    pub fn absent_fields(&self) -> usize {
        Field::ALL
            .iter()
            .filter(|field| self.get(**field).is_none())
            .count()
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}

/// Parses one input line. Anything other than a JSON object is an error.
pub fn parse_record_line(line: &str) -> Result<Record, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(line)?;
    // derived struct impls also accept arrays positionally; only objects are records.
    if !value.is_object() {
        return Err(serde::de::Error::custom("expected a JSON object"));
    }
    serde_json::from_value(value)
}

/// Encodes a record as one output line (no trailing newline). Non-ASCII text is
/// kept as UTF-8.
pub fn encode_record_line(record: &TransformedRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string(record)
}
