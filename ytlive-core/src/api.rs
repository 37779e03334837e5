use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cache::{Broadcast, BroadcastId, BroadcastLifecycle, Stream, StreamHealth, StreamId};
use crate::error::ApiError;

/// Current lifecycle of one broadcast, as returned by a status-only query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastStatus {
    pub status: BroadcastLifecycle,
    pub actual_start_time: Option<DateTime<Utc>>,
}

/// Result of the lighter-weight status/health query used for feedbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub broadcasts: HashMap<BroadcastId, BroadcastStatus>,
    pub streams: HashMap<StreamId, StreamHealth>,
}

/// Authoritative source of broadcasts and streams.
#[async_trait]
pub trait BroadcastApi: Send + Sync {
    /// Every broadcast of the channel, all statuses.
    async fn list_broadcasts(&self) -> Result<Vec<Broadcast>, ApiError>;

    async fn list_streams(&self) -> Result<Vec<Stream>, ApiError>;

    /// Ask the platform to move `id` into `target`.
    async fn transition(&self, id: &str, target: BroadcastLifecycle) -> Result<(), ApiError>;

    /// Status and health of the given broadcasts and streams only.
    async fn fetch_status(
        &self,
        broadcast_ids: &[BroadcastId],
        stream_ids: &[StreamId],
    ) -> Result<StatusReport, ApiError>;
}

/// Yields the bearer token for an authenticated client.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, ApiError>;
}

/// A token obtained elsewhere and handed over as-is.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl CredentialsProvider for StaticToken {
    async fn access_token(&self) -> Result<String, ApiError> {
        Ok(self.0.clone())
    }
}

/// Reads the token from an environment variable on every request, so an
/// external refresher can rotate it.
#[derive(Debug, Clone)]
pub struct EnvToken {
    pub var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl CredentialsProvider for EnvToken {
    async fn access_token(&self) -> Result<String, ApiError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_owned()),
            _ => Err(ApiError::Credentials(format!("{} is not set", self.var))),
        }
    }
}
