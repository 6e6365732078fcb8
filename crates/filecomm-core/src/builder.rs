//! Builder for configuring StreamContext initialization.

use std::fs;
use std::path::PathBuf;

use crate::backend::{FsBackend, PublishMode};
use crate::config::ContextDefaults;
use crate::error::{Result, StreamError};
use crate::StreamContext;

/// Builder for a filesystem-backed [`StreamContext`].
///
/// # Example
///
/// ```rust,ignore
/// use filecomm_core::{PublishMode, StreamContext};
///
/// let ctx = StreamContext::builder("/run/robot")
///     .auto_create_dir(true)
///     .publish_mode(PublishMode::Direct)
///     .framework_logging(false)
///     .build()?;
/// ```
pub struct StreamContextBuilder {
    root: PathBuf,
    publish_mode: PublishMode,
    framework_logging: bool,
    auto_create_dir: bool,
}

impl StreamContextBuilder {
    /// Create a new builder for the shared stream directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            publish_mode: PublishMode::default(),
            framework_logging: ContextDefaults::FRAMEWORK_LOGGING,
            auto_create_dir: ContextDefaults::AUTO_CREATE_DIR,
        }
    }

    /// How records and markers become visible to partner processes.
    ///
    /// Default: [`PublishMode::Atomic`]
    pub fn publish_mode(mut self, mode: PublishMode) -> Self {
        self.publish_mode = mode;
        self
    }

    /// Emit per-channel protocol events at debug level.
    ///
    /// Failures are logged regardless.
    ///
    /// Default: `true`
    pub fn framework_logging(mut self, enable: bool) -> Self {
        self.framework_logging = enable;
        self
    }

    /// Create the stream directory if it doesn't exist.
    ///
    /// Default: `false` (directory must exist)
    pub fn auto_create_dir(mut self, enable: bool) -> Self {
        self.auto_create_dir = enable;
        self
    }

    /// Build the context.
    pub fn build(self) -> Result<StreamContext<FsBackend>> {
        if self.auto_create_dir && !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|e| StreamError::Io {
                message: format!("Failed to create stream directory: {}", self.root.display()),
                path: Some(self.root.clone()),
                source: Some(e),
            })?;
        }

        if !self.root.is_dir() {
            return Err(StreamError::Io {
                message: format!("Stream directory not found: {}", self.root.display()),
                path: Some(self.root),
                source: None,
            });
        }

        let mut ctx = StreamContext::with_backend(self.root, FsBackend::new(self.publish_mode));
        ctx.set_framework_logging(self.framework_logging);
        Ok(ctx)
    }
}
