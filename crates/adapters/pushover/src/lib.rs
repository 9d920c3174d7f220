//! # venthub-adapter-pushover
//!
//! Push notifications through the [Pushover](https://pushover.net) messages API.
//!
//! ## Responsibilities
//! - Implement `NotificationSink` from `venthub-app::ports`
//! - Map notification priorities onto Pushover priorities
//!
//! ## Dependency rule
//! Depends on `venthub-app` (for port traits) and `venthub-domain` (for domain types).

mod config;
mod error;

pub use config::{DEFAULT_API_URL, PushoverConfig};
pub use error::PushoverError;

use reqwest::Client;
use serde::Deserialize;
use venthub_app::ports::NotificationSink;
use venthub_domain::error::VentHubError;
use venthub_domain::notification::{Notification, Priority};

/// How often (seconds) Pushover repeats an emergency message until acknowledged.
const EMERGENCY_RETRY_SECS: u32 = 60;
/// How long (seconds) Pushover keeps repeating an emergency message.
const EMERGENCY_EXPIRE_SECS: u32 = 3600;

/// Pushover priority for a notification priority.
#[must_use]
pub fn pushover_priority(priority: Priority) -> i8 {
    match priority {
        Priority::Low => -1,
        Priority::Moderate => 0,
        Priority::High => 1,
        Priority::Emergency => 2,
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: i32,
    #[serde(default)]
    errors: Vec<String>,
}

/// Sends notifications as Pushover messages.
#[derive(Debug, Clone)]
pub struct PushoverSink {
    client: Client,
    config: PushoverConfig,
}

impl PushoverSink {
    /// Build the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`PushoverError::Http`] if the client cannot be built.
    pub fn new(config: PushoverConfig) -> Result<Self, PushoverError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config })
    }

    /// Post one message.
    ///
    /// # Errors
    ///
    /// Returns [`PushoverError::Http`] on transport failure and
    /// [`PushoverError::Rejected`] when the API refuses the message.
    pub async fn send(&self, notification: &Notification) -> Result<(), PushoverError> {
        let priority = pushover_priority(notification.priority);
        let mut form = vec![
            ("token", self.config.api_token.clone()),
            ("user", self.config.user_key.clone()),
            ("message", notification.message.clone()),
            ("title", notification.title.clone()),
            ("priority", priority.to_string()),
        ];
        if let Some(device) = &self.config.device {
            form.push(("device", device.clone()));
        }
        if notification.priority == Priority::Emergency {
            form.push(("retry", EMERGENCY_RETRY_SECS.to_string()));
            form.push(("expire", EMERGENCY_EXPIRE_SECS.to_string()));
        }

        let response = self
            .client
            .post(&self.config.api_url)
            .form(&form)
            .send()
            .await?;
        let status = response.status();
        let body: ApiResponse = response.json().await?;

        if !status.is_success() || body.status != 1 {
            return Err(PushoverError::Rejected {
                status: status.as_u16(),
                errors: body.errors,
            });
        }
        tracing::debug!(title = %notification.title, priority, "push notification sent");
        Ok(())
    }
}

impl NotificationSink for PushoverSink {
    async fn notify(&self, notification: Notification) -> Result<(), VentHubError> {
        self.send(&notification).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_priorities() {
        assert_eq!(pushover_priority(Priority::Low), -1);
        assert_eq!(pushover_priority(Priority::Moderate), 0);
        assert_eq!(pushover_priority(Priority::High), 1);
        assert_eq!(pushover_priority(Priority::Emergency), 2);
    }
}
