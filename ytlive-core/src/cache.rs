use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub type BroadcastId = String;
pub type StreamId = String;

/// Lifecycle of a broadcast as reported by YouTube. Only moves forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BroadcastLifecycle {
    Ready,
    Testing,
    Live,
    Complete,
}

impl BroadcastLifecycle {
    /// The state one forward step away, `None` once complete.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Ready => Some(Self::Testing),
            Self::Testing => Some(Self::Live),
            Self::Live => Some(Self::Complete),
            Self::Complete => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StreamHealth {
    Good,
    Ok,
    Bad,
    NoData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Broadcast {
    pub id: BroadcastId,
    pub name: String,
    pub status: BroadcastLifecycle,
    pub scheduled_start_time: Option<DateTime<Utc>>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub bound_stream_id: Option<StreamId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stream {
    pub id: StreamId,
    pub health: StreamHealth,
}

pub type BroadcastMap = HashMap<BroadcastId, Broadcast>;
pub type StreamMap = HashMap<StreamId, Stream>;

/// Everything known about the channel's broadcasts and their streams at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMemory {
    pub broadcasts: BroadcastMap,
    pub streams: StreamMap,
}

impl StateMemory {
    pub fn new(
        broadcasts: impl IntoIterator<Item = Broadcast>,
        streams: impl IntoIterator<Item = Stream>,
    ) -> Self {
        Self {
            broadcasts: broadcasts.into_iter().map(|b| (b.id.clone(), b)).collect(),
            streams: streams.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    pub fn broadcast(&self, id: &str) -> Option<&Broadcast> {
        self.broadcasts.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.broadcasts.contains_key(id)
    }

    /// Health of the stream bound to `id`, if the binding resolves.
    pub fn bound_stream(&self, id: &str) -> Option<&Stream> {
        self.broadcasts
            .get(id)
            .and_then(|b| b.bound_stream_id.as_deref())
            .and_then(|stream_id| self.streams.get(stream_id))
    }

    fn dangling_bindings(&self) -> impl Iterator<Item = (&BroadcastId, &StreamId)> {
        self.broadcasts.values().filter_map(|b| match &b.bound_stream_id {
            Some(stream_id) if !self.streams.contains_key(stream_id) => Some((&b.id, stream_id)),
            _ => None,
        })
    }
}

/// Process-wide broadcast cache.
///
/// Readers take an `Arc` snapshot; writers build a complete `StateMemory` and
/// swap it in under the write lock, so a reader never sees a half-updated map.
#[derive(Debug, Clone, Default)]
pub struct BroadcastCache {
    inner: Arc<RwLock<Arc<StateMemory>>>,
}

impl BroadcastCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Arc<StateMemory> {
        self.inner.read().await.clone()
    }

    pub async fn broadcast(&self, id: &str) -> Option<Broadcast> {
        self.inner.read().await.broadcast(id).cloned()
    }

    /// All broadcasts, sorted by name then id.
    pub async fn list_broadcasts(&self) -> Vec<Broadcast> {
        let snapshot = self.snapshot().await;
        let mut all: Vec<Broadcast> = snapshot.broadcasts.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        all
    }

    pub async fn list_streams(&self) -> Vec<Stream> {
        let snapshot = self.snapshot().await;
        let mut all: Vec<Stream> = snapshot.streams.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Replace the whole cache content with freshly listed data.
    pub(crate) async fn replace(&self, broadcasts: Vec<Broadcast>, streams: Vec<Stream>) {
        let fresh = StateMemory::new(broadcasts, streams);
        self.install(fresh).await;
    }

    /// Swap in a fully built memory. Start times already observed are kept
    /// when the new data omits them.
    pub(crate) async fn install(&self, fresh: StateMemory) {
        let mut guard = self.inner.write().await;
        let fresh = carry_over(guard.as_ref(), fresh);
        *guard = Arc::new(fresh);
    }

    /// Derive a new memory from the current one and swap it in, holding the
    /// write lock so no concurrent replace is lost in between.
    pub(crate) async fn apply<F>(&self, derive: F)
    where
        F: FnOnce(&StateMemory) -> StateMemory,
    {
        let mut guard = self.inner.write().await;
        let current: &StateMemory = guard.as_ref();
        let fresh = carry_over(current, derive(current));
        *guard = Arc::new(fresh);
    }
}

fn carry_over(previous: &StateMemory, mut fresh: StateMemory) -> StateMemory {
    for broadcast in fresh.broadcasts.values_mut() {
        if broadcast.actual_start_time.is_none() {
            broadcast.actual_start_time = previous
                .broadcast(&broadcast.id)
                .and_then(|old| old.actual_start_time);
        }
    }
    for (broadcast, stream) in fresh.dangling_bindings() {
        warn!(%broadcast, %stream, "broadcast bound to unknown stream");
    }
    debug!(
        broadcasts = fresh.broadcasts.len(),
        streams = fresh.streams.len(),
        "installing new broadcast cache"
    );
    fresh
}
