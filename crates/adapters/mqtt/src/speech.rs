//! Text-to-speech sink publishing announcements to the speaker bridge.

use chrono::Timelike;
use venthub_app::ports::{Announcer, NotificationSink};
use venthub_domain::error::VentHubError;
use venthub_domain::notification::Notification;
use venthub_domain::speech::{SpeechRequest, SpeechSettings, prepare};

use crate::error::MqttError;
use crate::publisher::Publish;

/// Speaks notifications through the speaker bridge's MQTT topics.
pub struct MqttSpeechSink<P> {
    publisher: P,
    settings: SpeechSettings,
}

impl<P: Publish + Send + Sync> MqttSpeechSink<P> {
    pub fn new(publisher: P, settings: SpeechSettings) -> Self {
        Self {
            publisher,
            settings,
        }
    }

    /// Announce `request`, unless quiet hours at `local_hour` suppress it.
    /// Returns whether anything was published.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Client`] if the message could not be queued.
    pub async fn speak(&self, request: &SpeechRequest, local_hour: u32) -> Result<bool, MqttError> {
        let Some(announcement) = prepare(request, &self.settings, local_hour) else {
            tracing::debug!(priority = %request.priority, local_hour, "quiet hours, not speaking");
            return Ok(false);
        };
        let payload = announcement.payload.to_string().into_bytes();
        self.publisher
            .publish(announcement.topic.clone(), payload)
            .await?;
        tracing::debug!(topic = %announcement.topic, "announcement published");
        Ok(true)
    }
}

impl<P: Publish + Send + Sync> NotificationSink for MqttSpeechSink<P> {
    async fn notify(&self, notification: Notification) -> Result<(), VentHubError> {
        let request = SpeechRequest::new(notification.message, notification.priority);
        self.announce(request).await
    }
}

impl<P: Publish + Send + Sync> Announcer for MqttSpeechSink<P> {
    async fn announce(&self, request: SpeechRequest) -> Result<(), VentHubError> {
        let hour = chrono::Local::now().hour();
        self.speak(&request, hour).await?;
        Ok(())
    }
}
