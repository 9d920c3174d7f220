//! Pushover configuration.

use std::time::Duration;

use serde::Deserialize;

/// Default messages endpoint.
pub const DEFAULT_API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Credentials and delivery defaults for the Pushover API.
#[derive(Debug, Clone, Deserialize)]
pub struct PushoverConfig {
    /// User (or group) key the messages are sent to.
    pub user_key: String,
    /// Application API token.
    pub api_token: String,
    /// Device name to target; all of the user's devices when `None`.
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl PushoverConfig {
    #[must_use]
    pub fn new(user_key: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            user_key: user_key.into(),
            api_token: api_token.into(),
            device: None,
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
