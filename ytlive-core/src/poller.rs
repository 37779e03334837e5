use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::BroadcastApi;
use crate::error::PollError;
use crate::sync::SyncEngine;

pub struct PollerHandle {
    cancel_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl PollerHandle {
    pub async fn stop(self) -> Result<(), PollError> {
        let _ = self.cancel_tx.send(());
        self.join.await.map_err(PollError::from)
    }
}

/// Refresh broadcast status and stream health every `interval` until stopped.
///
/// A failed refresh is logged and retried on the next tick; the previous
/// cache content stays in place meanwhile.
pub fn spawn_feedback_poller<A>(engine: SyncEngine<A>, interval: Duration) -> PollerHandle
where
    A: BroadcastApi + 'static,
{
    let (cancel_tx, mut cancel_rx) = broadcast::channel(1);
    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel_rx.recv() => {
                    info!("feedback poller shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    match engine.refresh().await {
                        Ok(()) => debug!("feedbacks refreshed"),
                        Err(err) => warn!(error = %err, "failed to refresh feedbacks"),
                    }
                }
            }
        }
    });

    PollerHandle { cancel_tx, join }
}
