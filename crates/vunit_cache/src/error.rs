//! Error types for hash store operations.

use std::path::PathBuf;

/// Errors that can occur while reading or writing hash files.
///
/// A missing or unreadable-as-hash file is not an error: it reads as a
/// file that was never compiled.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing a hash file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The cache location exists but is not a directory.
    #[error("cache location {path} is not a directory")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
