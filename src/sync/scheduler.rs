//! Periodic trigger for synchronization cycles.

use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use super::service::JobService;
use crate::cache::CacheStorage;

/// Run `synchronize` now and then every `period` until `shutdown` resolves.
///
/// Cycles run one after another on this task, never overlapping. A cycle in
/// progress is finished before shutdown is observed. Failed cycles are logged
/// and retried on the next tick. Returns the number of cycles started.
pub async fn run_periodic<S, F>(service: &JobService<S>, period: Duration, shutdown: F) -> usize
where
  S: CacheStorage,
  F: Future<Output = ()>,
{
  let mut ticker = interval(period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
  tokio::pin!(shutdown);

  info!(period_secs = period.as_secs(), "Starting periodic sync");

  let mut cycles = 0usize;
  loop {
    tokio::select! {
      biased;
      _ = &mut shutdown => {
        info!(cycles, "Stopping periodic sync");
        break;
      }
      _ = ticker.tick() => {
        cycles += 1;
        if let Err(e) = service.synchronize().await {
          error!(cycle = cycles, error = %e, "Sync cycle failed");
        }
      }
    }
  }

  cycles
}
