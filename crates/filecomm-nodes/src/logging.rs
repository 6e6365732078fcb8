//! Subscriber setup for the demo binaries.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install a compact stderr subscriber. Debug level when `debug` is set.
pub fn init(debug: bool) {
    let log_level = if debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
