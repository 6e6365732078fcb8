//! Error types for sentinel-file channels.
//!
//! Every variant is recoverable. Registry errors are returned to the caller of
//! `create`; I/O errors raised while a channel runs are collected into the
//! tick report and the channel is retried on the next tick.

use crate::channel::Direction;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the channel protocol.
#[derive(Debug, Error)]
pub enum StreamError {
    // Registry errors
    #[error("Stream already exists: {name} ({direction})")]
    DuplicateStream { name: String, direction: Direction },

    #[error("Stream name too long: {name:?} must be shorter than {max} bytes")]
    NameTooLong { name: String, max: usize },

    #[error("Invalid stream name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Stream context is not initialized")]
    NotInitialized,

    #[error("Stream context is already initialized")]
    AlreadyInitialized,

    #[error("Unknown channel: {id}")]
    UnknownChannel { id: String },

    // Sentinel backend errors
    #[error("Failed to open data file {path:?}")]
    IoOpenFailed {
        path: PathBuf,
        /// The file vanished between the sentinel check and the open.
        raced: bool,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create marker {path:?}")]
    IoCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write data file {path:?}")]
    IoWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read data file {path:?}")]
    IoReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },
}

/// Result type alias for channel operations.
pub type Result<T> = std::result::Result<T, StreamError>;

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl StreamError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        StreamError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Check if the same operation may succeed on a later tick.
    ///
    /// Registry errors are permanent for the given arguments; filesystem
    /// errors usually clear once the partner process moves on.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StreamError::IoOpenFailed { .. }
                | StreamError::IoCreateFailed { .. }
                | StreamError::IoWriteFailed { .. }
                | StreamError::IoReadFailed { .. }
                | StreamError::Io { .. }
        )
    }
}
