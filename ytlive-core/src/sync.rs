use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::action::{handle_action, list_actions, ActionDefinition, ActionEvent, ActionHandler};
use crate::api::{BroadcastApi, StatusReport};
use crate::cache::{BroadcastCache, BroadcastLifecycle, StateMemory, Stream};
use crate::error::ActionError;

/// Keeps the broadcast cache in line with the remote source and carries out
/// lifecycle transitions on its behalf.
///
/// This is the only writer of the cache.
pub struct SyncEngine<A> {
    api: Arc<A>,
    cache: BroadcastCache,
    reload_after_transition: bool,
}

impl<A> Clone for SyncEngine<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            cache: self.cache.clone(),
            reload_after_transition: self.reload_after_transition,
        }
    }
}

impl<A: BroadcastApi> SyncEngine<A> {
    pub fn new(api: Arc<A>, cache: BroadcastCache) -> Self {
        Self {
            api,
            cache,
            reload_after_transition: false,
        }
    }

    pub fn with_reload_after_transition(mut self, reload: bool) -> Self {
        self.reload_after_transition = reload;
        self
    }

    /// Read-only handle on the cache, for feedback consumers.
    pub fn cache(&self) -> &BroadcastCache {
        &self.cache
    }

    /// Dispatch a host action against the current cache snapshot.
    pub async fn handle(&self, event: &ActionEvent) -> Result<(), ActionError> {
        let memory = self.cache.snapshot().await;
        handle_action(event, &memory, self).await
    }

    pub async fn actions(&self) -> Vec<ActionDefinition> {
        let memory = self.cache.snapshot().await;
        list_actions(&memory)
    }

    /// Fetch broadcasts and streams and replace the whole cache.
    ///
    /// On failure the previous content stays in place.
    pub async fn reload(&self) -> Result<(), ActionError> {
        let (broadcasts, streams) =
            tokio::try_join!(self.api.list_broadcasts(), self.api.list_streams())
                .map_err(ActionError::RefreshFailure)?;
        info!(
            broadcasts = broadcasts.len(),
            streams = streams.len(),
            "broadcast list reloaded"
        );
        self.cache.replace(broadcasts, streams).await;
        Ok(())
    }

    /// Update lifecycle status and stream health of cached entries only.
    pub async fn refresh(&self) -> Result<(), ActionError> {
        let memory = self.cache.snapshot().await;
        let broadcast_ids: Vec<String> = memory
            .broadcasts
            .values()
            .filter(|b| b.status != BroadcastLifecycle::Complete)
            .map(|b| b.id.clone())
            .collect();
        let stream_ids: Vec<String> = memory
            .streams
            .keys()
            .cloned()
            .chain(
                memory
                    .broadcasts
                    .values()
                    .filter_map(|b| b.bound_stream_id.clone()),
            )
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if broadcast_ids.is_empty() && stream_ids.is_empty() {
            debug!("nothing cached, skipping feedback refresh");
            return Ok(());
        }

        let report = self
            .api
            .fetch_status(&broadcast_ids, &stream_ids)
            .await
            .map_err(ActionError::RefreshFailure)?;
        self.cache.apply(|current| merge_report(current, &report)).await;
        Ok(())
    }

    async fn transition(&self, id: &str, target: BroadcastLifecycle) -> Result<(), ActionError> {
        self.api
            .transition(id, target)
            .await
            .map_err(ActionError::RemoteTransitionFailure)?;
        info!(broadcast = %id, target = ?target, "broadcast transitioned");

        let refreshed = if self.reload_after_transition {
            self.reload().await
        } else {
            self.refresh().await
        };
        if let Err(err) = refreshed {
            warn!(broadcast = %id, error = %err, "refresh after transition failed");
        }
        Ok(())
    }
}

/// Fold a status report into a copy of `current`.
///
/// Statuses never move backwards and broadcasts or streams the report does
/// not mention are kept untouched.
fn merge_report(current: &StateMemory, report: &StatusReport) -> StateMemory {
    let mut next = current.clone();
    for (id, update) in &report.broadcasts {
        let Some(broadcast) = next.broadcasts.get_mut(id) else {
            continue;
        };
        if update.status >= broadcast.status {
            broadcast.status = update.status;
        } else {
            debug!(broadcast = %id, cached = ?broadcast.status, reported = ?update.status, "ignoring backwards status");
        }
        if update.actual_start_time.is_some() {
            broadcast.actual_start_time = update.actual_start_time;
        }
    }
    for (id, health) in &report.streams {
        next.streams.insert(
            id.clone(),
            Stream {
                id: id.clone(),
                health: *health,
            },
        );
    }
    next
}

#[async_trait]
impl<A: BroadcastApi> ActionHandler for SyncEngine<A> {
    async fn start_broadcast_test(&self, id: &str) -> Result<(), ActionError> {
        self.transition(id, BroadcastLifecycle::Testing).await
    }

    async fn make_broadcast_live(&self, id: &str) -> Result<(), ActionError> {
        self.transition(id, BroadcastLifecycle::Live).await
    }

    async fn finish_broadcast(&self, id: &str) -> Result<(), ActionError> {
        self.transition(id, BroadcastLifecycle::Complete).await
    }

    async fn toggle_broadcast(
        &self,
        id: &str,
        from: BroadcastLifecycle,
    ) -> Result<(), ActionError> {
        let target = from
            .next()
            .ok_or_else(|| ActionError::BroadcastComplete(id.to_owned()))?;
        self.transition(id, target).await
    }

    async fn reload_everything(&self) -> Result<(), ActionError> {
        self.reload().await
    }

    async fn refresh_feedbacks(&self) -> Result<(), ActionError> {
        self.refresh().await
    }
}
