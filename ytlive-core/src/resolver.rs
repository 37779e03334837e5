//! Picks the broadcast an action applies to when the operator asked for the
//! "current" one instead of naming it.

use chrono::{DateTime, Utc};

use crate::action::ActionKind;
use crate::cache::{Broadcast, BroadcastId, BroadcastLifecycle, StateMemory};

/// Timestamp used to order candidates; the earliest wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    ScheduledStartTime,
    ActualStartTime,
}

impl TieBreak {
    fn key(self, broadcast: &Broadcast) -> Option<DateTime<Utc>> {
        match self {
            Self::ScheduledStartTime => broadcast.scheduled_start_time,
            Self::ActualStartTime => broadcast.actual_start_time,
        }
    }

    /// Natural ordering key for broadcasts waiting in `status`.
    pub fn for_status(status: BroadcastLifecycle) -> Self {
        match status {
            BroadcastLifecycle::Ready => Self::ScheduledStartTime,
            _ => Self::ActualStartTime,
        }
    }
}

/// Oldest broadcast in `status`, ordered by `tie_break`.
///
/// Broadcasts missing the timestamp sort after every broadcast that has one;
/// equal timestamps fall back to the id so the choice is stable.
pub fn filter_broadcasts(
    memory: &StateMemory,
    status: BroadcastLifecycle,
    tie_break: TieBreak,
) -> Option<BroadcastId> {
    memory
        .broadcasts
        .values()
        .filter(|b| b.status == status)
        .min_by(|a, b| {
            let (ka, kb) = (tie_break.key(a), tie_break.key(b));
            ka.is_none()
                .cmp(&kb.is_none())
                .then_with(|| ka.cmp(&kb))
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|b| b.id.clone())
}

/// Statuses searched, in order, for an action's implicit target.
pub fn resolution_order(action: ActionKind) -> &'static [BroadcastLifecycle] {
    use BroadcastLifecycle::*;
    match action {
        ActionKind::InitBroadcast => &[Ready],
        ActionKind::StartBroadcast => &[Testing, Ready],
        ActionKind::StopBroadcast => &[Live],
        ActionKind::ToggleBroadcast => &[Live, Testing, Ready],
        ActionKind::RefreshStatus | ActionKind::RefreshFeedbacks => &[],
    }
}

/// Resolve the implicit target of `action` against the cache.
pub fn resolve_current(action: ActionKind, memory: &StateMemory) -> Option<BroadcastId> {
    resolution_order(action)
        .iter()
        .find_map(|&status| filter_broadcasts(memory, status, TieBreak::for_status(status)))
}
