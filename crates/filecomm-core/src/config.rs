//! Protocol constants.
//!
//! File extensions and the name bound are part of the wire format: both
//! sides of a channel must agree on them, so they are fixed here rather than
//! configurable per context.

/// Wire-format configuration shared by every channel.
pub struct ProtocolConfig;

impl ProtocolConfig {
    /// Names must be strictly shorter than this many bytes.
    pub const MAX_NAME_LENGTH: usize = 80;

    pub const DATA_FILE_EXTENSION: &'static str = "txt";
    pub const READY_FILE_EXTENSION: &'static str = "flag";
    pub const ACK_FILE_EXTENSION: &'static str = "ack";

    /// Suffix of in-flight files written by atomic publish.
    pub const TEMP_FILE_SUFFIX: &'static str = "tmp";
}

/// Defaults applied by the context builder.
pub struct ContextDefaults;

impl ContextDefaults {
    pub const FRAMEWORK_LOGGING: bool = true;
    pub const AUTO_CREATE_DIR: bool = false;
    /// Initial slot capacity of a fresh registry.
    pub const REGISTRY_CAPACITY: usize = 10;
}
