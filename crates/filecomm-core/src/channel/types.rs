//! Channel identity types.

use crate::config::ProtocolConfig;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which half of an exchange a channel drives.
///
/// A channel is unidirectional; a request/response pair is two channels
/// sharing a name with opposite directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Write,
    Read,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Write => "write",
            Direction::Read => "read",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three files backing a channel, derived once from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPaths {
    data: PathBuf,
    ready: PathBuf,
    ack: PathBuf,
}

impl ChannelPaths {
    /// Derive `<root>/<name>.txt`, `<root>/<name>.flag` and `<root>/<name>.ack`.
    pub fn derive(root: &Path, name: &str) -> Self {
        let with_ext = |ext: &str| root.join(format!("{}.{}", name, ext));
        Self {
            data: with_ext(ProtocolConfig::DATA_FILE_EXTENSION),
            ready: with_ext(ProtocolConfig::READY_FILE_EXTENSION),
            ack: with_ext(ProtocolConfig::ACK_FILE_EXTENSION),
        }
    }

    /// The record body.
    pub fn data(&self) -> &Path {
        &self.data
    }

    /// Present while an unread record is available.
    pub fn ready(&self) -> &Path {
        &self.ready
    }

    /// Present once the previous record has been consumed.
    pub fn ack(&self) -> &Path {
        &self.ack
    }
}

/// Sentinel-derived state of a channel for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Write channel that has never transmitted; runnable without an ack.
    First,
    /// Write channel waiting for the reader's ack.
    Blocked,
    /// Write channel whose previous record was acknowledged.
    Unblocked,
    /// Read channel with no record available.
    Waiting,
    /// Read channel with a record available.
    Ready,
    /// Record handled but its marker transition did not complete; the next
    /// step finishes the markers without running the callback.
    Settling,
}

impl ChannelState {
    pub fn is_runnable(&self) -> bool {
        matches!(
            self,
            ChannelState::First
                | ChannelState::Unblocked
                | ChannelState::Ready
                | ChannelState::Settling
        )
    }
}
