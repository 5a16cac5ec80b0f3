// Error types for scene persistence and configuration.
// Validation rejections (bad placements, out-of-range edits) are not errors;
// they are logged no-ops. Only I/O and file-format problems surface here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scene file was written for a different grid dimension.
    #[error("grid size mismatch: file has {found}, editor expects {expected}")]
    GridSizeMismatch { expected: i32, found: i32 },

    /// The scene file does not follow the record layout.
    #[error("malformed scene file at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// The TOML config could not be parsed.
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

impl EditorError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed { line, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
