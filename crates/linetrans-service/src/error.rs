use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a run. Per-field request failures never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot open input file {}: {source}", path.display())]
    OpenInput { path: PathBuf, source: io::Error },
    #[error("cannot read input file {}: {source}", path.display())]
    ReadInput { path: PathBuf, source: io::Error },
    #[error("cannot open output file {} for append: {source}", path.display())]
    OpenOutput { path: PathBuf, source: io::Error },
    #[error("cannot write output file {}: {source}", path.display())]
    WriteOutput { path: PathBuf, source: io::Error },
    #[error("cannot encode record for line {line}: {source}")]
    EncodeRecord {
        line: u64,
        source: serde_json::Error,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("cannot build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
