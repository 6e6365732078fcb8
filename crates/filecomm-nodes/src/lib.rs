//! Filecomm Nodes - demo robot processes built on filecomm-core.
//!
//! Three processes share a stream directory:
//!
//! - `lidar-sensor` writes mock scans to `lidar_data`
//! - `nav-planner` prints the scans and writes `motor_commands`
//! - `motor-ctrl` prints the motor commands
//!
//! This library holds the parts the binaries share.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pacer;
pub mod payload;
pub mod settings;
pub mod shutdown;
pub mod system_log;

pub use cli::CommonArgs;
pub use config::{LogFileConfig, NodeConfig};
pub use error::{NodeError, Result};
pub use pacer::RunSummary;
pub use payload::{LidarScan, MotorCommand, Record};
pub use settings::NodeSettings;
pub use shutdown::ShutdownToken;
pub use system_log::SystemLog;

/// Print a received record the way every reader process shows it.
pub fn print_record(source: &std::path::Path, record: &Record) {
    println!("\n\nReading data from {}...", source.display());
    println!("--- [DATA START] ---");
    for line in &record.lines {
        println!("  {}", line);
    }
    println!("--- [DATA END] ---");
}
