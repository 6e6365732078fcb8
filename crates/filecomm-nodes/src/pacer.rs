//! Fixed-interval polling loop around [`StreamContext::tick`].

use crate::config::NodeConfig;
use crate::shutdown::ShutdownToken;
use filecomm_core::{SentinelBackend, StreamContext};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Totals over a whole run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub callbacks: u64,
    pub failures: u64,
}

/// Tick `ctx` every `interval` until shutdown is requested or `max_ticks`
/// passes have run.
///
/// Shutdown is checked between ticks, so a running callback always finishes.
pub fn run<B: SentinelBackend>(
    ctx: &mut StreamContext<B>,
    interval: Duration,
    max_ticks: Option<u64>,
    shutdown: &ShutdownToken,
) -> RunSummary {
    let mut summary = RunSummary::default();

    while !shutdown.is_requested() {
        let report = ctx.tick();
        summary.ticks += 1;
        summary.callbacks += report.ran as u64;
        summary.failures += report.failures.len() as u64;

        if max_ticks.is_some_and(|max| summary.ticks >= max) {
            debug!("Reached tick limit of {}", summary.ticks);
            break;
        }
        sleep_unless_stopped(interval, shutdown);
    }

    info!(
        "Polling stopped after {} ticks ({} callbacks, {} failures)",
        summary.ticks, summary.callbacks, summary.failures
    );
    summary
}

fn sleep_unless_stopped(interval: Duration, shutdown: &ShutdownToken) {
    let deadline = Instant::now() + interval;
    loop {
        let now = Instant::now();
        if now >= deadline || shutdown.is_requested() {
            return;
        }
        let remaining = deadline - now;
        thread::sleep(remaining.min(NodeConfig::SHUTDOWN_CHECK_INTERVAL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filecomm_core::{Direction, StreamHandle};
    use tempfile::TempDir;

    #[test]
    fn test_stops_at_tick_limit() {
        let temp_dir = TempDir::new().unwrap();
        let mut ctx = StreamContext::new(temp_dir.path()).unwrap();
        ctx.create_stream("x", Direction::Write, |h: &mut StreamHandle<'_>| {
            h.send_line(format_args!("value: 1"));
        })
        .unwrap();

        let shutdown = ShutdownToken::new();
        let summary = run(&mut ctx, Duration::from_millis(1), Some(3), &shutdown);

        // No reader: only the first write goes through.
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.callbacks, 1);
        assert_eq!(summary.failures, 0);
    }

    #[test]
    fn test_requested_shutdown_skips_ticks() {
        let temp_dir = TempDir::new().unwrap();
        let mut ctx = StreamContext::new(temp_dir.path()).unwrap();
        let shutdown = ShutdownToken::new();
        shutdown.request();

        let summary = run(&mut ctx, Duration::from_secs(60), None, &shutdown);
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn test_shutdown_interrupts_sleep() {
        let temp_dir = TempDir::new().unwrap();
        let mut ctx = StreamContext::new(temp_dir.path()).unwrap();
        let shutdown = ShutdownToken::new();

        let remote = shutdown.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            remote.request();
        });

        let started = Instant::now();
        let summary = run(&mut ctx, Duration::from_secs(60), None, &shutdown);
        stopper.join().unwrap();

        assert_eq!(summary.ticks, 1);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
