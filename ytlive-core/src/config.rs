use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::{BroadcastLifecycle, StreamHealth};
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanionConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub feedback: FeedbackColors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_seconds: u64,
    /// Environment variable holding the OAuth bearer token.
    pub access_token_env: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub feedback_interval_seconds: u64,
    /// Reload the full broadcast list after a transition instead of only
    /// refreshing status and health.
    pub reload_after_transition: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackColors {
    pub ready: [u8; 3],
    pub testing: [u8; 3],
    pub live: [u8; 3],
    pub complete: [u8; 3],
    pub health_good: [u8; 3],
    pub health_ok: [u8; 3],
    pub health_bad: [u8; 3],
    pub health_no_data: [u8; 3],
    pub text: [u8; 3],
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/youtube/v3".to_owned(),
            request_timeout_seconds: 10,
            access_token_env: "YTLIVE_ACCESS_TOKEN".to_owned(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            feedback_interval_seconds: 30,
            reload_after_transition: false,
        }
    }
}

impl RefreshConfig {
    pub fn feedback_interval(&self) -> Duration {
        Duration::from_secs(self.feedback_interval_seconds.max(1))
    }
}

impl Default for FeedbackColors {
    fn default() -> Self {
        Self {
            ready: [209, 209, 0],
            testing: [0, 172, 0],
            live: [222, 0, 0],
            complete: [0, 0, 168],
            health_good: [0, 172, 0],
            health_ok: [209, 209, 0],
            health_bad: [222, 0, 0],
            health_no_data: [96, 96, 96],
            text: [255, 255, 255],
        }
    }
}

impl FeedbackColors {
    pub fn for_status(&self, status: BroadcastLifecycle) -> [u8; 3] {
        match status {
            BroadcastLifecycle::Ready => self.ready,
            BroadcastLifecycle::Testing => self.testing,
            BroadcastLifecycle::Live => self.live,
            BroadcastLifecycle::Complete => self.complete,
        }
    }

    pub fn for_health(&self, health: StreamHealth) -> [u8; 3] {
        match health {
            StreamHealth::Good => self.health_good,
            StreamHealth::Ok => self.health_ok,
            StreamHealth::Bad => self.health_bad,
            StreamHealth::NoData => self.health_no_data,
        }
    }
}

impl CompanionConfig {
    /// `<config dir>/ytlive/config.json`
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("ytlive").join("config.json"))
    }

    /// Load the configuration, falling back to (and writing out) defaults.
    pub fn load() -> Self {
        match Self::config_file_path() {
            Ok(path) => Self::load_or_default(&path),
            Err(e) => {
                warn!(error = %e, "cannot locate configuration, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "cannot load configuration, using defaults");
                let default_config = Self::default();
                if let Err(save_err) = default_config.save_to(path) {
                    warn!(error = %save_err, "cannot save default configuration");
                }
                default_config
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
