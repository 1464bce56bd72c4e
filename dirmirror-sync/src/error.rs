//! Error types for dirmirror-sync.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from a mirror pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A root handed to the differ is missing or not a directory.
    /// Raised before anything is mutated.
    #[error("invalid argument {path}: {reason}")]
    InvalidArgument { path: PathBuf, reason: String },

    /// An exclude pattern failed to compile.
    #[error("invalid exclude pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Copying bytes or metadata onto the destination failed.
    #[error("failed to copy {src} to {dst}: {source}")]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Removing a destination entry failed.
    #[error("failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

pub(crate) fn copy_err(
    src: impl Into<PathBuf>,
    dst: impl Into<PathBuf>,
    source: std::io::Error,
) -> SyncError {
    SyncError::Copy {
        src: src.into(),
        dst: dst.into(),
        source,
    }
}

pub(crate) fn delete_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Delete {
        path: path.into(),
        source,
    }
}
