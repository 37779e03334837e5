//! `BroadcastApi` backed by the YouTube Data API v3.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::api::{BroadcastApi, BroadcastStatus, CredentialsProvider, StatusReport};
use crate::cache::{Broadcast, BroadcastId, BroadcastLifecycle, Stream, StreamHealth, StreamId};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// The API rejects `id` filters and pages larger than this.
const MAX_PAGE: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveBroadcast {
    id: String,
    #[serde(default)]
    snippet: BroadcastSnippet,
    #[serde(default)]
    status: BroadcastStatusPart,
    #[serde(default)]
    content_details: BroadcastContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastSnippet {
    #[serde(default)]
    title: String,
    scheduled_start_time: Option<DateTime<Utc>>,
    actual_start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastStatusPart {
    #[serde(default)]
    life_cycle_status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastContentDetails {
    bound_stream_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveStream {
    id: String,
    #[serde(default)]
    status: StreamStatusPart,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamStatusPart {
    #[serde(default)]
    health_status: HealthStatusPart,
}

#[derive(Debug, Default, Deserialize)]
struct HealthStatusPart {
    #[serde(default)]
    status: String,
}

/// Map a remote `lifeCycleStatus` onto the four states tracked locally.
pub fn parse_lifecycle(raw: &str) -> Option<BroadcastLifecycle> {
    match raw {
        "created" | "ready" => Some(BroadcastLifecycle::Ready),
        "testStarting" | "testing" => Some(BroadcastLifecycle::Testing),
        "liveStarting" | "live" => Some(BroadcastLifecycle::Live),
        "complete" | "revoked" => Some(BroadcastLifecycle::Complete),
        _ => None,
    }
}

pub fn parse_health(raw: &str) -> StreamHealth {
    match raw {
        "good" => StreamHealth::Good,
        "ok" => StreamHealth::Ok,
        "bad" => StreamHealth::Bad,
        _ => StreamHealth::NoData,
    }
}

fn transition_target(status: BroadcastLifecycle) -> &'static str {
    match status {
        BroadcastLifecycle::Ready => "ready",
        BroadcastLifecycle::Testing => "testing",
        BroadcastLifecycle::Live => "live",
        BroadcastLifecycle::Complete => "complete",
    }
}

impl LiveBroadcast {
    fn into_broadcast(self) -> Option<Broadcast> {
        let Some(status) = parse_lifecycle(&self.status.life_cycle_status) else {
            debug!(broadcast = %self.id, status = %self.status.life_cycle_status, "skipping broadcast with unknown lifecycle");
            return None;
        };
        Some(Broadcast {
            id: self.id,
            name: self.snippet.title,
            status,
            scheduled_start_time: self.snippet.scheduled_start_time,
            actual_start_time: self.snippet.actual_start_time,
            bound_stream_id: self.content_details.bound_stream_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct YouTubeApi<C> {
    client: Client,
    base_url: String,
    credentials: C,
}

impl<C: CredentialsProvider> YouTubeApi<C> {
    pub fn new(client: Client, base_url: impl Into<String>, credentials: C) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            credentials,
        }
    }

    pub fn from_config(config: &ApiConfig, credentials: C) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(concat!("ytlive/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(client, config.base_url.clone(), credentials))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let token = self.credentials.access_token().await?;
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Follow `nextPageToken` until the listing is exhausted.
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut q = query.to_vec();
            q.push(("maxResults", MAX_PAGE.to_string()));
            if let Some(token) = page_token.take() {
                q.push(("pageToken", token));
            }
            let page: Page<T> = self.get_json(path, &q).await?;
            items.extend(page.items);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl<C: CredentialsProvider> BroadcastApi for YouTubeApi<C> {
    async fn list_broadcasts(&self) -> Result<Vec<Broadcast>, ApiError> {
        let items: Vec<LiveBroadcast> = self
            .list_all(
                "liveBroadcasts",
                &[
                    ("part", "snippet,contentDetails,status".to_owned()),
                    ("broadcastType", "all".to_owned()),
                    ("mine", "true".to_owned()),
                ],
            )
            .await?;
        Ok(items.into_iter().filter_map(LiveBroadcast::into_broadcast).collect())
    }

    async fn list_streams(&self) -> Result<Vec<Stream>, ApiError> {
        let items: Vec<LiveStream> = self
            .list_all(
                "liveStreams",
                &[("part", "status".to_owned()), ("mine", "true".to_owned())],
            )
            .await?;
        Ok(items
            .into_iter()
            .map(|s| Stream {
                health: parse_health(&s.status.health_status.status),
                id: s.id,
            })
            .collect())
    }

    async fn transition(&self, id: &str, target: BroadcastLifecycle) -> Result<(), ApiError> {
        let token = self.credentials.access_token().await?;
        let response = self
            .client
            .post(format!("{}/liveBroadcasts/transition", self.base_url))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_LENGTH, "0")
            .query(&[
                ("broadcastStatus", transition_target(target)),
                ("id", id),
                ("part", "status"),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        info!(broadcast = %id, target = ?target, "broadcast transition accepted");
        Ok(())
    }

    async fn fetch_status(
        &self,
        broadcast_ids: &[BroadcastId],
        stream_ids: &[StreamId],
    ) -> Result<StatusReport, ApiError> {
        let mut report = StatusReport::default();
        for chunk in broadcast_ids.chunks(MAX_PAGE) {
            let page: Page<LiveBroadcast> = self
                .get_json(
                    "liveBroadcasts",
                    &[("part", "snippet,status".to_owned()), ("id", chunk.join(","))],
                )
                .await?;
            for item in page.items {
                if let Some(status) = parse_lifecycle(&item.status.life_cycle_status) {
                    report.broadcasts.insert(
                        item.id,
                        BroadcastStatus {
                            status,
                            actual_start_time: item.snippet.actual_start_time,
                        },
                    );
                }
            }
        }
        for chunk in stream_ids.chunks(MAX_PAGE) {
            let page: Page<LiveStream> = self
                .get_json(
                    "liveStreams",
                    &[("part", "status".to_owned()), ("id", chunk.join(","))],
                )
                .await?;
            for item in page.items {
                report
                    .streams
                    .insert(item.id, parse_health(&item.status.health_status.status));
            }
        }
        Ok(report)
    }
}
