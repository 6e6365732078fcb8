//! Shutdown token shared between the Ctrl-C handler and the poll loop.

use crate::error::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// A flag the poll loop checks between ticks.
///
/// Clones share state: when `request()` is called on any clone, all clones
/// observe it.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    requested: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token that is set when the process receives Ctrl-C.
    ///
    /// The handler is process-wide; call this once per process.
    pub fn on_ctrl_c() -> Result<Self> {
        let token = Self::new();
        let handler_token = token.clone();
        ctrlc::set_handler(move || {
            info!("Shutdown signal received, finishing current tick");
            handler_token.request();
        })?;
        Ok(token)
    }

    /// Ask the loop to stop after the current tick.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
