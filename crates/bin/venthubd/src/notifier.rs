//! Notification fan-out over the configured channels.

use venthub_app::ports::NotificationSink;
use venthub_domain::error::VentHubError;
use venthub_domain::notification::Notification;

/// Sends each notification to the push and speech channels that are
/// configured. Every notification is also logged, so a setup without any
/// channel still leaves a trace.
pub struct Notifier<P, S> {
    push: Option<P>,
    speech: Option<S>,
}

impl<P, S> Notifier<P, S> {
    pub fn new(push: Option<P>, speech: Option<S>) -> Self {
        Self { push, speech }
    }
}

impl<P, S> NotificationSink for Notifier<P, S>
where
    P: NotificationSink + Send + Sync,
    S: NotificationSink + Send + Sync,
{
    /// Fails only when every configured channel failed.
    async fn notify(&self, notification: Notification) -> Result<(), VentHubError> {
        tracing::info!(
            title = %notification.title,
            priority = %notification.priority,
            message = %notification.message,
            "notification"
        );

        let mut delivered = false;
        let mut last_error = None;
        if let Some(push) = &self.push {
            match push.notify(notification.clone()).await {
                Ok(()) => delivered = true,
                Err(error) => {
                    tracing::warn!(%error, "push notification failed");
                    last_error = Some(error);
                }
            }
        }
        if let Some(speech) = &self.speech {
            match speech.notify(notification).await {
                Ok(()) => delivered = true,
                Err(error) => {
                    tracing::warn!(%error, "spoken notification failed");
                    last_error = Some(error);
                }
            }
        }

        match last_error {
            Some(error) if !delivered => Err(error),
            _ => Ok(()),
        }
    }
}
