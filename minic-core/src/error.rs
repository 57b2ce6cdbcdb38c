use std::path::PathBuf;

use thiserror::Error;

/// Failures that are not about the compiled program itself.
///
/// Malformed source never produces a `CoreError`; lexing and parsing are
/// lenient and semantic problems are reported as diagnostics.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read source: {0}")]
    SourceIo(#[from] std::io::Error),
    #[error("source path was not found at {0}")]
    MissingSource(PathBuf),
    #[error("unsupported emit format: {0}")]
    UnsupportedFormat(String),
}
