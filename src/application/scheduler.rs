use super::sweeper::RetrySweeper;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info};

/// Spawns the periodic retry sweep.
///
/// The first sweep runs one `period` after start. Ticks that fall due while a
/// sweep is still running are skipped rather than queued. Flipping `shutdown` to
/// `true` stops the loop; a sweep already in flight runs to completion first.
pub fn spawn_sweeps(
    sweeper: Arc<RetrySweeper>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(?period, "retry sweeper scheduled");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = sweeper.tick().await {
                        error!(error = %e, "retry sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("retry sweeper stopped");
                        break;
                    }
                }
            }
        }
    })
}
