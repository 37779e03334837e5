use serde::{Deserialize, Serialize};

use crate::action::{ActionKind, BroadcastTarget};
use crate::cache::{BroadcastLifecycle, StateMemory, StreamHealth};
use crate::config::FeedbackColors;
use crate::resolver::resolve_current;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    BroadcastStatus,
    StreamHealth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackStyle {
    pub bgcolor: [u8; 3],
    pub color: [u8; 3],
    pub text: String,
}

fn status_text(status: BroadcastLifecycle) -> &'static str {
    match status {
        BroadcastLifecycle::Ready => "READY",
        BroadcastLifecycle::Testing => "TEST",
        BroadcastLifecycle::Live => "LIVE",
        BroadcastLifecycle::Complete => "DONE",
    }
}

fn health_text(health: StreamHealth) -> &'static str {
    match health {
        StreamHealth::Good => "GOOD",
        StreamHealth::Ok => "OK",
        StreamHealth::Bad => "BAD",
        StreamHealth::NoData => "NO DATA",
    }
}

/// Button style for `kind` on the broadcast named by `broadcast_id`.
///
/// Sentinels resolve like `toggle_broadcast`. Returns `None` when the
/// broadcast is unknown or, for stream health, has no resolvable stream.
pub fn evaluate(
    kind: FeedbackKind,
    broadcast_id: Option<&str>,
    memory: &StateMemory,
    colors: &FeedbackColors,
) -> Option<FeedbackStyle> {
    let id = match BroadcastTarget::parse(broadcast_id) {
        BroadcastTarget::Explicit(id) => id,
        BroadcastTarget::Current => resolve_current(ActionKind::ToggleBroadcast, memory)?,
        BroadcastTarget::Unset => return None,
    };
    match kind {
        FeedbackKind::BroadcastStatus => {
            let status = memory.broadcast(&id)?.status;
            Some(FeedbackStyle {
                bgcolor: colors.for_status(status),
                color: colors.text,
                text: status_text(status).to_owned(),
            })
        }
        FeedbackKind::StreamHealth => {
            let health = memory.bound_stream(&id)?.health;
            Some(FeedbackStyle {
                bgcolor: colors.for_health(health),
                color: colors.text,
                text: health_text(health).to_owned(),
            })
        }
    }
}
