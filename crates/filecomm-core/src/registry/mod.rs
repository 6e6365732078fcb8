//! Registry of channels keyed by (name, direction).
//!
//! The registry exclusively owns its channels and hands out [`ChannelId`]
//! values instead of references, so callers never hold a borrow across a
//! later `create`.

mod stream_registry;

pub use stream_registry::{ChannelId, StreamRegistry};
