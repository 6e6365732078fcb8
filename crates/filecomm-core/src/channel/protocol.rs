//! Per-channel handshake over the ready and ack markers.
//!
//! Ownership of the markers is split so that no path is ever deleted or
//! created by both processes:
//! - the writer removes `ack` and creates `ready`
//! - the reader removes `ready` and creates `ack`
//!
//! The resulting sequence is Write(1) → Ready → Read(1) → Ack → Write(2) → …
//! so the data file holds at most one unconsumed record.

use super::handle::{StreamCallback, StreamHandle};
use super::types::{ChannelPaths, ChannelState, Direction};
use crate::backend::{DataFile, SentinelBackend};
use crate::error::{Result, StreamError};
use std::io::ErrorKind;
use tracing::{debug, warn};

/// Marker transition owed after a handled record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    /// Writer: remove ack, then create ready.
    Publish,
    /// Reader: remove ready, then create ack.
    Acknowledge,
}

/// One named, unidirectional record-exchange path.
pub struct Channel {
    name: String,
    direction: Direction,
    paths: ChannelPaths,
    active: bool,
    awaiting_first_transmission: bool,
    pending: Option<Transition>,
    callback: StreamCallback,
}

impl Channel {
    pub(crate) fn new(
        name: String,
        direction: Direction,
        paths: ChannelPaths,
        callback: StreamCallback,
    ) -> Self {
        Self {
            name,
            direction,
            paths,
            active: true,
            awaiting_first_transmission: direction == Direction::Write,
            pending: None,
            callback,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn paths(&self) -> &ChannelPaths {
        &self.paths
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// True until a write channel has published its first record.
    pub fn is_awaiting_first_transmission(&self) -> bool {
        self.awaiting_first_transmission
    }

    /// Evaluate the markers for this tick.
    pub fn state<B: SentinelBackend>(&self, backend: &B) -> ChannelState {
        if self.pending.is_some() {
            return ChannelState::Settling;
        }
        match self.direction {
            Direction::Write if self.awaiting_first_transmission => ChannelState::First,
            Direction::Write if backend.exists(self.paths.ack()) => ChannelState::Unblocked,
            Direction::Write => ChannelState::Blocked,
            Direction::Read if backend.exists(self.paths.ready()) => ChannelState::Ready,
            Direction::Read => ChannelState::Waiting,
        }
    }

    /// Run the channel once if its markers allow it.
    ///
    /// A transition left unfinished by an earlier failure is completed first,
    /// without running the callback again.
    ///
    /// Returns `Ok(false)` when the channel was not runnable this tick.
    pub(crate) fn step<B: SentinelBackend>(&mut self, backend: &B, verbose: bool) -> Result<bool> {
        match self.state(backend) {
            ChannelState::Settling => {}
            state if !state.is_runnable() => return Ok(false),
            _ => match self.direction {
                Direction::Write => self.run_write(backend)?,
                Direction::Read => self.run_read(backend)?,
            },
        }

        self.settle(backend)?;
        if verbose {
            match self.direction {
                Direction::Write => debug!("Published record on {}", self.name),
                Direction::Read => debug!("Consumed record on {}", self.name),
            }
        }
        Ok(true)
    }

    /// open → callback → close, then owe remove ack → create ready.
    fn run_write<B: SentinelBackend>(&mut self, backend: &B) -> Result<()> {
        let file = backend.open_write(self.paths.data())?;
        self.invoke(backend, file)?;

        self.awaiting_first_transmission = false;
        self.pending = Some(Transition::Publish);
        Ok(())
    }

    /// open → callback → close, then owe remove ready → create ack.
    fn run_read<B: SentinelBackend>(&mut self, backend: &B) -> Result<()> {
        let file = backend
            .open_read(self.paths.data())
            .map_err(|err| match err {
                StreamError::IoOpenFailed { path, source, .. }
                    if source.kind() == ErrorKind::NotFound =>
                {
                    warn!(
                        "Ready marker for {} observed but {} is missing",
                        self.name,
                        path.display()
                    );
                    StreamError::IoOpenFailed {
                        path,
                        raced: true,
                        source,
                    }
                }
                other => other,
            })?;
        self.invoke(backend, file)?;

        self.pending = Some(Transition::Acknowledge);
        Ok(())
    }

    /// Apply the owed marker transition. Both operations are idempotent, so a
    /// retry after a partial failure repeats the whole pair.
    fn settle<B: SentinelBackend>(&mut self, backend: &B) -> Result<()> {
        let (remove, touch) = match self.pending {
            Some(Transition::Publish) => (self.paths.ack(), self.paths.ready()),
            Some(Transition::Acknowledge) => (self.paths.ready(), self.paths.ack()),
            None => return Ok(()),
        };

        // Removal must complete before the created marker can be observed
        backend.remove(remove)?;
        backend.touch(touch)?;
        self.pending = None;
        Ok(())
    }

    /// Hand the open file to the callback, then close it, or discard it if the
    /// callback hit an I/O error.
    fn invoke<B: SentinelBackend>(&mut self, backend: &B, file: DataFile) -> Result<()> {
        let mut handle = StreamHandle::new(&self.name, self.direction, file);
        (self.callback)(&mut handle);

        match handle.into_parts() {
            (file, None) => backend.close(file),
            (file, Some(err)) => {
                backend.discard(file);
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("direction", &self.direction)
            .field("paths", &self.paths)
            .field("active", &self.active)
            .field(
                "awaiting_first_transmission",
                &self.awaiting_first_transmission,
            )
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
