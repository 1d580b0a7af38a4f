//! Typed errors for the `file-extract` crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Extension missing or outside the allowed set; raised before any read.
    #[error("unsupported file type: {0:?}")]
    UnsupportedFileType(String),

    /// Reading the upload or a spool file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive structure could not be read.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Delimited text could not be parsed (e.g. unbalanced quoting).
    #[error("tabular parse error: {0}")]
    Tabular(#[from] csv::Error),
}
