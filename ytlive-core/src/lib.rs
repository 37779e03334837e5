pub mod action;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod feedback;
pub mod poller;
pub mod resolver;
pub mod sync;
pub mod youtube;

pub use action::{
    handle_action, list_actions, ActionDefinition, ActionEvent, ActionHandler, ActionKind,
    BroadcastTarget,
};
pub use api::{
    BroadcastApi, BroadcastStatus, CredentialsProvider, EnvToken, StaticToken, StatusReport,
};
pub use cache::{
    Broadcast, BroadcastCache, BroadcastId, BroadcastLifecycle, StateMemory, Stream, StreamHealth,
};
pub use config::CompanionConfig;
pub use error::{ActionError, ApiError, ConfigError, PollError};
pub use feedback::{evaluate, FeedbackKind, FeedbackStyle};
pub use poller::{spawn_feedback_poller, PollerHandle};
pub use resolver::{filter_broadcasts, resolve_current, TieBreak};
pub use sync::SyncEngine;
pub use youtube::YouTubeApi;
