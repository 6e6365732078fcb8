//! Arena of channels addressed by stable ids.

use crate::channel::{Channel, ChannelPaths, Direction, StreamCallback};
use crate::config::{ContextDefaults, ProtocolConfig};
use crate::error::{Result, StreamError};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Opaque reference to a registered channel.
///
/// Ids index into the registry's slot vector and carry the generation they
/// were issued in. Growing the registry never changes an existing index, and
/// an id from before a [`StreamRegistry::teardown`] no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId {
    index: usize,
    generation: u32,
}

impl ChannelId {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

/// Owns every channel of one stream directory.
///
/// Channels are appended by [`create`](Self::create) and released all at
/// once by [`teardown`](Self::teardown). There is no per-channel removal.
pub struct StreamRegistry {
    root: PathBuf,
    slots: Vec<Channel>,
    generation: u32,
}

impl StreamRegistry {
    /// Create an empty registry for channels living under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            slots: Vec::with_capacity(ContextDefaults::REGISTRY_CAPACITY),
            generation: 0,
        }
    }

    /// Directory the channel files are derived under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Register a channel and make it eligible for dispatch.
    ///
    /// # Errors
    ///
    /// - `NameTooLong` if `name` is not shorter than the protocol bound
    /// - `InvalidName` if `name` is empty or would escape the stream directory
    /// - `DuplicateStream` if an active channel has the same name and direction
    pub fn create(
        &mut self,
        name: &str,
        direction: Direction,
        callback: StreamCallback,
    ) -> Result<ChannelId> {
        validate_name(name)?;

        if self.find(name, direction).is_some() {
            return Err(StreamError::DuplicateStream {
                name: name.to_string(),
                direction,
            });
        }

        let paths = ChannelPaths::derive(&self.root, name);
        let id = ChannelId {
            index: self.slots.len(),
            generation: self.generation,
        };
        self.slots
            .push(Channel::new(name.to_string(), direction, paths, callback));

        debug!("Registered {} channel {} as {}", direction, name, id);
        Ok(id)
    }

    /// Release every channel. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if !self.slots.is_empty() {
            debug!("Releasing {} channels", self.slots.len());
        }
        self.slots.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Look up a channel by id.
    pub fn get(&self, id: ChannelId) -> Option<&Channel> {
        if id.generation != self.generation {
            return None;
        }
        self.slots.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: ChannelId) -> Result<&mut Channel> {
        if id.generation != self.generation {
            return Err(StreamError::UnknownChannel { id: id.to_string() });
        }
        self.slots
            .get_mut(id.index())
            .ok_or_else(|| StreamError::UnknownChannel { id: id.to_string() })
    }

    /// Find the active channel with this name and direction.
    pub fn find(&self, name: &str, direction: Direction) -> Option<ChannelId> {
        self.iter()
            .find(|(_, c)| c.direction() == direction && c.name() == name)
            .map(|(id, _)| id)
    }

    /// Include or exclude a channel from dispatch without releasing it.
    pub fn set_active(&mut self, id: ChannelId, active: bool) -> Result<()> {
        if active {
            let (name, direction) = {
                let channel = self.get_mut(id)?;
                (channel.name().to_string(), channel.direction())
            };
            if let Some(other) = self.find(&name, direction) {
                if other != id {
                    return Err(StreamError::DuplicateStream { name, direction });
                }
            }
        }
        self.get_mut(id)?.set_active(active);
        Ok(())
    }

    /// Active channels in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ChannelId, &Channel)> + '_ {
        let generation = self.generation;
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_active())
            .map(move |(index, c)| (ChannelId { index, generation }, c))
    }

    /// Every channel in registration order, active or not.
    pub(crate) fn slots_mut(&mut self) -> impl Iterator<Item = (ChannelId, &mut Channel)> + '_ {
        let generation = self.generation;
        self.slots
            .iter_mut()
            .enumerate()
            .map(move |(index, c)| (ChannelId { index, generation }, c))
    }

    /// Number of registered channels, active or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for StreamRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamRegistry")
            .field("root", &self.root)
            .field("channels", &self.slots)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Check a name against the protocol bound and the stream directory.
fn validate_name(name: &str) -> Result<()> {
    if name.len() >= ProtocolConfig::MAX_NAME_LENGTH {
        return Err(StreamError::NameTooLong {
            name: name.to_string(),
            max: ProtocolConfig::MAX_NAME_LENGTH,
        });
    }
    if name.is_empty() {
        return Err(StreamError::InvalidName {
            name: name.to_string(),
            reason: "name is empty",
        });
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(StreamError::InvalidName {
            name: name.to_string(),
            reason: "name must not contain path components",
        });
    }
    Ok(())
}
