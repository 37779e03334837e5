use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{BroadcastId, BroadcastLifecycle, StateMemory};
use crate::error::ActionError;
use crate::resolver::resolve_current;

/// Option values that ask for the implicit target instead of a literal id.
pub const CURRENT_SENTINEL: &str = "current";
pub const LIVE_SENTINEL: &str = "live";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    InitBroadcast,
    StartBroadcast,
    StopBroadcast,
    ToggleBroadcast,
    RefreshStatus,
    RefreshFeedbacks,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        Self::InitBroadcast,
        Self::StartBroadcast,
        Self::StopBroadcast,
        Self::ToggleBroadcast,
        Self::RefreshFeedbacks,
        Self::RefreshStatus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitBroadcast => "init_broadcast",
            Self::StartBroadcast => "start_broadcast",
            Self::StopBroadcast => "stop_broadcast",
            Self::ToggleBroadcast => "toggle_broadcast",
            Self::RefreshStatus => "refresh_status",
            Self::RefreshFeedbacks => "refresh_feedbacks",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::InitBroadcast => "Start broadcast test",
            Self::StartBroadcast => "Go live",
            Self::StopBroadcast => "Finish broadcast",
            Self::ToggleBroadcast => "Advance broadcast to next phase",
            Self::RefreshStatus => "Reload everything from YouTube",
            Self::RefreshFeedbacks => "Refresh broadcast/stream feedbacks",
        }
    }

    pub fn requires_target(self) -> bool {
        !matches!(self, Self::RefreshStatus | Self::RefreshFeedbacks)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ActionError::UnknownAction(s.to_owned()))
    }
}

/// The `broadcast_id` option as the operator set it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastTarget {
    Explicit(BroadcastId),
    Current,
    Unset,
}

impl BroadcastTarget {
    /// Literal ids are kept byte for byte; blank values count as unset.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Self::Unset,
            Some(id) if id.trim().is_empty() => Self::Unset,
            Some(CURRENT_SENTINEL) | Some(LIVE_SENTINEL) => Self::Current,
            Some(id) => Self::Explicit(id.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOptions {
    #[serde(default)]
    pub broadcast_id: Option<String>,
}

/// Action event as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub action: String,
    #[serde(default)]
    pub options: ActionOptions,
}

impl ActionEvent {
    pub fn new(action: impl Into<String>, broadcast_id: Option<&str>) -> Self {
        Self {
            action: action.into(),
            options: ActionOptions {
                broadcast_id: broadcast_id.map(ToOwned::to_owned),
            },
        }
    }
}

/// Lifecycle operations an action can end up in.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Ready -> Testing.
    async fn start_broadcast_test(&self, id: &str) -> Result<(), ActionError>;

    /// Testing or Ready -> Live.
    async fn make_broadcast_live(&self, id: &str) -> Result<(), ActionError>;

    /// Live -> Complete.
    async fn finish_broadcast(&self, id: &str) -> Result<(), ActionError>;

    /// One step forward from `from`, the status the action was resolved against.
    async fn toggle_broadcast(
        &self,
        id: &str,
        from: BroadcastLifecycle,
    ) -> Result<(), ActionError>;

    async fn reload_everything(&self) -> Result<(), ActionError>;

    /// Refresh broadcast status and stream health only.
    async fn refresh_feedbacks(&self) -> Result<(), ActionError>;
}

/// Validate `event` against `memory` and forward it to `handler`.
///
/// All local checks happen before the handler is called, so a rejected
/// event never reaches the network.
pub async fn handle_action<H>(
    event: &ActionEvent,
    memory: &StateMemory,
    handler: &H,
) -> Result<(), ActionError>
where
    H: ActionHandler + ?Sized,
{
    let target = BroadcastTarget::parse(event.options.broadcast_id.as_deref());
    if let BroadcastTarget::Explicit(id) = &target {
        if !memory.contains(id) {
            return Err(ActionError::UnknownBroadcastId(id.clone()));
        }
    }

    let kind: ActionKind = event.action.parse()?;
    match kind {
        ActionKind::InitBroadcast => {
            handler.start_broadcast_test(&target_id(kind, target, memory)?).await
        }
        ActionKind::StartBroadcast => {
            handler.make_broadcast_live(&target_id(kind, target, memory)?).await
        }
        ActionKind::StopBroadcast => {
            handler.finish_broadcast(&target_id(kind, target, memory)?).await
        }
        ActionKind::ToggleBroadcast => {
            let id = target_id(kind, target, memory)?;
            let from = memory
                .broadcast(&id)
                .map(|b| b.status)
                .ok_or_else(|| ActionError::UnknownBroadcastId(id.clone()))?;
            handler.toggle_broadcast(&id, from).await
        }
        ActionKind::RefreshStatus => handler.reload_everything().await,
        ActionKind::RefreshFeedbacks => handler.refresh_feedbacks().await,
    }
}

fn target_id(
    kind: ActionKind,
    target: BroadcastTarget,
    memory: &StateMemory,
) -> Result<BroadcastId, ActionError> {
    match target {
        BroadcastTarget::Explicit(id) => Ok(id),
        BroadcastTarget::Current => {
            let resolved = resolve_current(kind, memory)
                .ok_or_else(|| ActionError::UnknownBroadcastId(CURRENT_SENTINEL.to_owned()))?;
            debug!(action = %kind, broadcast = %resolved, "resolved current broadcast");
            Ok(resolved)
        }
        BroadcastTarget::Unset => Err(ActionError::UndefinedBroadcastId),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownChoice {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOption {
    pub id: String,
    pub label: String,
    pub choices: Vec<DropdownChoice>,
    pub default: String,
}

/// Host-facing description of one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub id: ActionKind,
    pub label: String,
    pub options: Vec<ActionOption>,
}

/// Describe every action, offering the cached broadcasts as targets.
pub fn list_actions(memory: &StateMemory) -> Vec<ActionDefinition> {
    let mut broadcasts: Vec<_> = memory.broadcasts.values().collect();
    broadcasts.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    let entries: Vec<DropdownChoice> = broadcasts
        .into_iter()
        .map(|b| DropdownChoice {
            id: b.id.clone(),
            label: b.name.clone(),
        })
        .collect();
    let default = entries
        .first()
        .map(|c| c.id.clone())
        .unwrap_or_else(|| CURRENT_SENTINEL.to_owned());

    ActionKind::ALL
        .into_iter()
        .map(|kind| {
            let options = if kind.requires_target() {
                let mut choices = vec![DropdownChoice {
                    id: CURRENT_SENTINEL.to_owned(),
                    label: "Current (oldest matching)".to_owned(),
                }];
                if kind == ActionKind::StopBroadcast {
                    choices.push(DropdownChoice {
                        id: LIVE_SENTINEL.to_owned(),
                        label: "Current Live (Oldest if multiple live)".to_owned(),
                    });
                }
                choices.extend(entries.iter().cloned());
                vec![ActionOption {
                    id: "broadcast_id".to_owned(),
                    label: "Broadcast:".to_owned(),
                    choices,
                    default: default.clone(),
                }]
            } else {
                Vec::new()
            };
            ActionDefinition {
                id: kind,
                label: kind.label().to_owned(),
                options,
            }
        })
        .collect()
}
