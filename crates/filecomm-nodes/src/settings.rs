//! Node settings: JSON file values overridden by command-line flags.

use crate::config::NodeConfig;
use crate::error::{NodeError, Result};
use filecomm_core::{PublishMode, StreamContext};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How channel files are published, as spelled in the settings file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishSetting {
    Direct,
    #[default]
    Atomic,
}

impl From<PublishSetting> for PublishMode {
    fn from(value: PublishSetting) -> Self {
        match value {
            PublishSetting::Direct => PublishMode::Direct,
            PublishSetting::Atomic => PublishMode::Atomic,
        }
    }
}

/// Effective settings of one demo process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    /// Shared stream directory.
    pub stream_dir: PathBuf,
    pub poll_interval_ms: u64,
    /// Per-channel protocol logging in the core.
    pub framework_logging: bool,
    pub publish_mode: PublishSetting,
    /// Create `stream_dir` if missing.
    pub create_dir: bool,
    /// Stop after this many ticks; run until Ctrl-C if unset.
    pub max_ticks: Option<u64>,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            stream_dir: PathBuf::from("."),
            poll_interval_ms: NodeConfig::POLL_INTERVAL.as_millis() as u64,
            framework_logging: true,
            publish_mode: PublishSetting::default(),
            create_dir: false,
            max_ticks: None,
        }
    }
}

impl NodeSettings {
    /// Read settings from a JSON file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| NodeError::Io {
            message: "Failed to read settings file".to_string(),
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings: Self = serde_json::from_str(&contents).map_err(|e| NodeError::Settings {
            message: e.to_string(),
            path: path.to_path_buf(),
            source: Some(e),
        })?;

        if settings.poll_interval_ms == 0 {
            return Err(NodeError::Settings {
                message: "poll_interval_ms must be greater than zero".to_string(),
                path: path.to_path_buf(),
                source: None,
            });
        }
        Ok(settings)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Build a stream context from these settings.
    pub fn build_context(&self) -> Result<StreamContext> {
        let ctx = StreamContext::builder(&self.stream_dir)
            .publish_mode(self.publish_mode.into())
            .framework_logging(self.framework_logging)
            .auto_create_dir(self.create_dir)
            .build()?;
        Ok(ctx)
    }
}
