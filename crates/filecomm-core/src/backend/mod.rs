//! Storage primitives for the channel protocol.
//!
//! - `traits` - the [`SentinelBackend`] seam and the [`DataFile`] handle
//! - `fs` - local filesystem implementation with optional atomic publish

mod fs;
mod traits;

pub use fs::{FsBackend, PublishMode};
pub use traits::{DataFile, SentinelBackend};
