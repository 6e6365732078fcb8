//! Filecomm Core - record exchange between processes through a shared directory.
//!
//! Two processes that can only share a directory exchange text records over
//! named, unidirectional channels. Each channel is three files:
//!
//! - `<name>.txt` - the record, one slot
//! - `<name>.flag` - present while an unread record is available
//! - `<name>.ack` - present once the reader has consumed the last record
//!
//! A host registers channels with callbacks and calls
//! [`StreamContext::tick`] on its own timer. Each tick runs every channel whose
//! markers allow it exactly once.
//!
//! # Example
//!
//! ```rust,ignore
//! use filecomm_core::{Direction, StreamContext};
//!
//! let mut ctx = StreamContext::new("/run/robot")?;
//! ctx.create_stream("motor_commands", Direction::Write, |h| {
//!     h.send_line(format_args!("speed_left: {:.2}", 0.5));
//! })?;
//!
//! loop {
//!     ctx.tick();
//!     std::thread::sleep(std::time::Duration::from_secs(1));
//! }
//! ```

pub mod backend;
pub mod channel;
pub mod config;
pub mod error;
pub mod registry;

mod builder;
mod dispatch;

// Re-export commonly used types
pub use backend::{DataFile, FsBackend, PublishMode, SentinelBackend};
pub use builder::StreamContextBuilder;
pub use channel::{Channel, ChannelPaths, ChannelState, Direction, StreamCallback, StreamHandle};
pub use config::ProtocolConfig;
pub use dispatch::TickReport;
pub use error::{Result, StreamError};
pub use registry::{ChannelId, StreamRegistry};

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Owns the channels of one process together with the backend they run on.
///
/// Contexts are independent values: several may coexist, for example one per
/// test, and nothing is kept in process-wide state.
///
/// A context starts initialized. [`teardown`](Self::teardown) releases every
/// channel and returns it to the uninitialized state, in which
/// [`create_stream`](Self::create_stream) fails until [`init`](Self::init) is
/// called again and [`tick`](Self::tick) does nothing.
pub struct StreamContext<B: SentinelBackend = FsBackend> {
    backend: B,
    registry: StreamRegistry,
    initialized: bool,
    framework_logging: bool,
}

impl StreamContext<FsBackend> {
    /// Create a context over an existing directory with default options.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        StreamContextBuilder::new(root).build()
    }

    /// Create a builder for a filesystem-backed context.
    pub fn builder(root: impl Into<PathBuf>) -> StreamContextBuilder {
        StreamContextBuilder::new(root)
    }
}

impl<B: SentinelBackend> StreamContext<B> {
    /// Create a context over any backend. The directory is not checked.
    pub fn with_backend(root: impl Into<PathBuf>, backend: B) -> Self {
        Self {
            backend,
            registry: StreamRegistry::new(root),
            initialized: true,
            framework_logging: config::ContextDefaults::FRAMEWORK_LOGGING,
        }
    }

    /// Re-enable a context after [`teardown`](Self::teardown).
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            warn!(
                "Stream context for {} already initialized",
                self.root().display()
            );
            return Err(StreamError::AlreadyInitialized);
        }
        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Release every channel. Safe to call multiple times.
    pub fn teardown(&mut self) {
        self.registry.teardown();
        if self.initialized && self.framework_logging {
            info!("Closed streams in {}", self.root().display());
        }
        self.initialized = false;
    }

    /// Register a channel whose callback runs whenever its markers allow.
    ///
    /// # Errors
    ///
    /// `NotInitialized` after teardown, otherwise the registry's
    /// `NameTooLong`, `InvalidName` and `DuplicateStream`.
    pub fn create_stream<F>(
        &mut self,
        name: &str,
        direction: Direction,
        callback: F,
    ) -> Result<ChannelId>
    where
        F: FnMut(&mut StreamHandle<'_>) + 'static,
    {
        if !self.initialized {
            return Err(StreamError::NotInitialized);
        }

        let id = self.registry.create(name, direction, Box::new(callback))?;
        if self.framework_logging {
            info!("Created {} stream {}", direction, name);
        }
        Ok(id)
    }

    /// Run every runnable channel once.
    pub fn tick(&mut self) -> TickReport {
        if !self.initialized {
            return TickReport::default();
        }
        dispatch::run_tick(&mut self.registry, &self.backend, self.framework_logging)
    }

    /// Sentinel-derived state of a channel right now.
    pub fn state(&self, id: ChannelId) -> Result<ChannelState> {
        self.registry
            .get(id)
            .map(|channel| channel.state(&self.backend))
            .ok_or_else(|| StreamError::UnknownChannel { id: id.to_string() })
    }

    /// Remove both markers of a channel left over from a previous run.
    ///
    /// Only meaningful before the first tick while no partner is running: it
    /// deletes a marker this side does not own in steady state.
    pub fn reset_markers(&mut self, id: ChannelId) -> Result<()> {
        let channel = self
            .registry
            .get(id)
            .ok_or_else(|| StreamError::UnknownChannel { id: id.to_string() })?;

        self.backend.remove(channel.paths().ready())?;
        self.backend.remove(channel.paths().ack())?;
        debug!("Reset markers of {}", channel.name());
        Ok(())
    }

    /// Include or exclude a channel from dispatch.
    pub fn set_active(&mut self, id: ChannelId, active: bool) -> Result<()> {
        self.registry.set_active(id, active)
    }

    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Directory holding the channel files.
    pub fn root(&self) -> &Path {
        self.registry.root()
    }

    /// Toggle per-channel protocol logging.
    pub fn set_framework_logging(&mut self, enable: bool) {
        self.framework_logging = enable;
    }

    pub fn framework_logging(&self) -> bool {
        self.framework_logging
    }
}

impl<B: SentinelBackend> std::fmt::Debug for StreamContext<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamContext")
            .field("registry", &self.registry)
            .field("initialized", &self.initialized)
            .field("framework_logging", &self.framework_logging)
            .finish_non_exhaustive()
    }
}
