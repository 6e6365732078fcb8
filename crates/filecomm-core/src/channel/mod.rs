//! Sentinel-file channels.
//!
//! - `types` - direction, derived file paths and per-tick state
//! - `handle` - what a callback sees while its channel runs
//! - `protocol` - the ready/ack handshake

mod handle;
mod protocol;
mod types;

pub use handle::{StreamCallback, StreamHandle};
pub use protocol::Channel;
pub use types::{ChannelPaths, ChannelState, Direction};
