//! Error types for the fallible parts of the crate.
//!
//! Scanning and decoding never fail, so nothing in here describes a malformed
//! archive. Only collecting into an [`Archive`](crate::Archive) and touching
//! the filesystem can go wrong.

use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

/// A Result type alias over [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by archive construction and extraction.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// The file list of an archive could not be allocated.
    #[error("unable to allocate archive file list: {0}")]
    Allocation(#[from] TryReserveError),

    /// A file name resolves outside the destination directory (or onto it).
    #[error("path traversal in archive entry '{name}' (resolves to {})", .path.display())]
    PathTraversal {
        /// The name as written in the archive header.
        name: String,
        /// The lexically resolved destination path that was rejected.
        path: PathBuf,
    },

    /// An operating system error, passed through unchanged.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a rejected path traversal attempt.
    pub fn is_path_traversal(&self) -> bool {
        matches!(self, Error::PathTraversal { .. })
    }
}
