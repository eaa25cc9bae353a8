//! Error taxonomy for the ingestion and storage pipeline.
//!
//! Extraction and processing failures are typed so callers can distinguish
//! a missing file from an unsupported format from a decode problem. A
//! dimension mismatch during search is deliberately not represented here:
//! it degrades the affected record's score to `0.0` instead of failing the
//! whole query.

use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All failure modes surfaced by this crate.
#[derive(Debug)]
pub enum Error {
    /// Source file or folder path does not exist.
    NotFound(PathBuf),
    /// File extension outside the supported set.
    UnsupportedType(String),
    /// A PDF/Word decode produced no text (or only whitespace).
    EmptyContent(String),
    /// The underlying decoder rejected the input.
    DecodeFailure { file: String, reason: String },
    /// A table's backing file exists but is not a JSON array of objects.
    StorageCorruption { table: String, reason: String },
    /// Configuration file could not be read or parsed.
    Config(String),
    /// Filesystem I/O failure.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound(path) => write!(f, "path not found: {}", path.display()),
            Error::UnsupportedType(ext) => write!(f, "unsupported file type: .{}", ext),
            Error::EmptyContent(file) => {
                write!(f, "no text content extracted from {}", file)
            }
            Error::DecodeFailure { file, reason } => {
                write!(f, "failed to decode {}: {}", file, reason)
            }
            Error::StorageCorruption { table, reason } => {
                write!(f, "table '{}' backing file is corrupt: {}", table, reason)
            }
            Error::Config(msg) => write!(f, "config error: {}", msg),
            Error::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
