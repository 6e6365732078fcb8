//! Error types for the demo processes.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Stream(#[from] filecomm_core::StreamError),

    #[error("Timed out after {waited:?} waiting for lock {path:?}")]
    LockTimeout {
        path: PathBuf,
        waited: std::time::Duration,
    },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {path:?}: {message}")]
    Settings {
        message: String,
        path: PathBuf,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Failed to install shutdown handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

pub type Result<T> = std::result::Result<T, NodeError>;
