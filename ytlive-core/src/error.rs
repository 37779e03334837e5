use thiserror::Error;

use crate::cache::BroadcastId;

/// Failures talking to the broadcast/stream collaborator.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response decoding error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("credentials unavailable: {0}")]
    Credentials(String),
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Action has unknown broadcast ID: {0}")]
    UnknownBroadcastId(BroadcastId),
    #[error("Action has undefined broadcast ID")]
    UndefinedBroadcastId,
    #[error("unknown action called: {0}")]
    UnknownAction(String),
    #[error("broadcast {0} is already complete")]
    BroadcastComplete(BroadcastId),
    #[error("lifecycle transition rejected: {0}")]
    RemoteTransitionFailure(#[source] ApiError),
    #[error("broadcast refresh failed: {0}")]
    RefreshFailure(#[source] ApiError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("poller task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
