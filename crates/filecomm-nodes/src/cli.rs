//! Command-line flags shared by every demo binary.

use crate::error::Result;
use crate::settings::{NodeSettings, PublishSetting};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Shared stream directory [default: .]
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Delay between polling passes in milliseconds [default: 1000]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: Option<u64>,

    /// JSON settings file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Disable per-channel protocol logging
    #[arg(long)]
    pub quiet_framework: bool,

    /// Remove stale markers of this process's write channels before starting
    #[arg(long)]
    pub clean_start: bool,

    /// Write records in place instead of through a renamed temp file
    #[arg(long)]
    pub direct: bool,

    /// Create the stream directory if it does not exist
    #[arg(long)]
    pub create_dir: bool,

    /// Stop after this many polling passes
    #[arg(long)]
    pub ticks: Option<u64>,
}

impl CommonArgs {
    /// Merge the settings file (if any) with the flags given.
    pub fn resolve(&self) -> Result<NodeSettings> {
        let mut settings = match &self.config {
            Some(path) => NodeSettings::load(path)?,
            None => NodeSettings::default(),
        };

        if let Some(dir) = &self.dir {
            settings.stream_dir = dir.clone();
        }
        if let Some(interval) = self.interval_ms {
            settings.poll_interval_ms = interval;
        }
        if self.quiet_framework {
            settings.framework_logging = false;
        }
        if self.direct {
            settings.publish_mode = PublishSetting::Direct;
        }
        if self.create_dir {
            settings.create_dir = true;
        }
        if self.ticks.is_some() {
            settings.max_ticks = self.ticks;
        }
        Ok(settings)
    }
}
