//! One polling pass over a registry.
//!
//! The loop never sleeps. Pacing between ticks belongs to the caller.

use crate::backend::SentinelBackend;
use crate::error::StreamError;
use crate::registry::{ChannelId, StreamRegistry};
use tracing::{debug, warn};

/// What happened during one [`tick`](crate::StreamContext::tick).
#[derive(Debug, Default)]
pub struct TickReport {
    /// Channels whose callback ran and whose markers advanced.
    pub ran: usize,
    /// Active channels that were not runnable.
    pub idle: usize,
    /// Inactive channels passed over.
    pub skipped: usize,
    /// Channels that failed this tick; each is retried on the next one.
    pub failures: Vec<(ChannelId, StreamError)>,
}

impl TickReport {
    /// True if nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of channels that attempted a run, successful or not.
    pub fn attempted(&self) -> usize {
        self.ran + self.failures.len()
    }
}

/// Step every channel of `registry` once, in registration order.
pub(crate) fn run_tick<B: SentinelBackend>(
    registry: &mut StreamRegistry,
    backend: &B,
    verbose: bool,
) -> TickReport {
    let mut report = TickReport::default();

    for (id, channel) in registry.slots_mut() {
        if !channel.is_active() {
            report.skipped += 1;
            continue;
        }

        match channel.step(backend, verbose) {
            Ok(true) => report.ran += 1,
            Ok(false) => report.idle += 1,
            Err(err) => {
                warn!(
                    "{} channel {} skipped this tick: {}",
                    channel.direction(),
                    channel.name(),
                    err
                );
                report.failures.push((id, err));
            }
        }
    }

    if verbose && report.attempted() > 0 {
        debug!(
            "Tick: {} ran, {} idle, {} failed",
            report.ran,
            report.idle,
            report.failures.len()
        );
    }
    report
}
