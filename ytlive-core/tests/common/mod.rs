#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ytlive_core::{
    ActionError, ActionHandler, ApiError, Broadcast, BroadcastApi, BroadcastId,
    BroadcastLifecycle, StatusReport, Stream,
};

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 21, hour, minute, 0).unwrap()
}

pub fn broadcast(id: &str, status: BroadcastLifecycle) -> Broadcast {
    Broadcast {
        id: id.into(),
        name: format!("Broadcast {id}"),
        status,
        scheduled_start_time: None,
        actual_start_time: None,
        bound_stream_id: None,
    }
}

pub fn scheduled(id: &str, hour: u32, minute: u32) -> Broadcast {
    Broadcast {
        scheduled_start_time: Some(at(hour, minute)),
        ..broadcast(id, BroadcastLifecycle::Ready)
    }
}

pub fn started(id: &str, status: BroadcastLifecycle, hour: u32, minute: u32) -> Broadcast {
    Broadcast {
        actual_start_time: Some(at(hour, minute)),
        ..broadcast(id, status)
    }
}

/// In-memory stand-in for the YouTube API.
#[derive(Default)]
pub struct ScriptedApi {
    pub broadcasts: Mutex<Vec<Broadcast>>,
    pub streams: Mutex<Vec<Stream>>,
    pub report: Mutex<StatusReport>,
    pub transitions: Mutex<Vec<(BroadcastId, BroadcastLifecycle)>>,
    pub fail_listing: AtomicBool,
    pub reject_transitions: AtomicBool,
    pub list_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn with(broadcasts: Vec<Broadcast>, streams: Vec<Stream>) -> Self {
        let api = Self::default();
        *api.broadcasts.lock().unwrap() = broadcasts;
        *api.streams.lock().unwrap() = streams;
        api
    }

    pub fn transitions(&self) -> Vec<(BroadcastId, BroadcastLifecycle)> {
        self.transitions.lock().unwrap().clone()
    }
}

fn rejected() -> ApiError {
    ApiError::Status {
        status: 403,
        body: "invalidTransition".into(),
    }
}

#[async_trait]
impl BroadcastApi for ScriptedApi {
    async fn list_broadcasts(&self) -> Result<Vec<Broadcast>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                body: "backendError".into(),
            });
        }
        Ok(self.broadcasts.lock().unwrap().clone())
    }

    async fn list_streams(&self) -> Result<Vec<Stream>, ApiError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                body: "backendError".into(),
            });
        }
        Ok(self.streams.lock().unwrap().clone())
    }

    async fn transition(&self, id: &str, target: BroadcastLifecycle) -> Result<(), ApiError> {
        if self.reject_transitions.load(Ordering::SeqCst) {
            return Err(rejected());
        }
        self.transitions.lock().unwrap().push((id.to_owned(), target));
        Ok(())
    }

    async fn fetch_status(
        &self,
        _broadcast_ids: &[BroadcastId],
        _stream_ids: &[String],
    ) -> Result<StatusReport, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                body: "backendError".into(),
            });
        }
        Ok(self.report.lock().unwrap().clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    StartTest(String),
    GoLive(String),
    Finish(String),
    Toggle(String, BroadcastLifecycle),
    Reload,
    Refresh,
}

/// Handler that only records what it was asked to do.
#[derive(Default)]
pub struct RecordingHandler {
    pub calls: Mutex<Vec<Call>>,
}

impl RecordingHandler {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), ActionError> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl ActionHandler for RecordingHandler {
    async fn start_broadcast_test(&self, id: &str) -> Result<(), ActionError> {
        self.record(Call::StartTest(id.into()))
    }

    async fn make_broadcast_live(&self, id: &str) -> Result<(), ActionError> {
        self.record(Call::GoLive(id.into()))
    }

    async fn finish_broadcast(&self, id: &str) -> Result<(), ActionError> {
        self.record(Call::Finish(id.into()))
    }

    async fn toggle_broadcast(
        &self,
        id: &str,
        from: BroadcastLifecycle,
    ) -> Result<(), ActionError> {
        self.record(Call::Toggle(id.into(), from))
    }

    async fn reload_everything(&self) -> Result<(), ActionError> {
        self.record(Call::Reload)
    }

    async fn refresh_feedbacks(&self) -> Result<(), ActionError> {
        self.record(Call::Refresh)
    }
}
