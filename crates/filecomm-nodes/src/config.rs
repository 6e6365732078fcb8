//! Constants shared by the demo processes.

use std::time::Duration;

/// Stream names and pacing of the demo processes.
pub struct NodeConfig;

impl NodeConfig {
    pub const LIDAR_STREAM: &'static str = "lidar_data";
    pub const MOTOR_STREAM: &'static str = "motor_commands";

    /// Default delay between ticks (1 Hz).
    pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);
    /// Granularity at which a sleeping loop notices shutdown.
    pub const SHUTDOWN_CHECK_INTERVAL: Duration = Duration::from_millis(50);
}

/// Lock-file guarded system log.
pub struct LogFileConfig;

impl LogFileConfig {
    pub const LOCK_FILE_NAME: &'static str = "log.lock";
    pub const LOG_FILE_NAME: &'static str = "system_log.txt";
    pub const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(100);
    /// Give up on a lock that is never released, e.g. by a crashed process.
    pub const LOCK_WAIT_TIMEOUT: Duration = Duration::from_secs(5);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intervals_are_reasonable() {
        let check = NodeConfig::SHUTDOWN_CHECK_INTERVAL;
        assert!(check < NodeConfig::POLL_INTERVAL);

        let retry = LogFileConfig::LOCK_RETRY_INTERVAL;
        assert!(retry < LogFileConfig::LOCK_WAIT_TIMEOUT);
    }
}
