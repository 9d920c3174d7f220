//! Notification port.

use std::future::Future;

use venthub_domain::error::VentHubError;
use venthub_domain::notification::Notification;

/// Delivers notifications to a human.
pub trait NotificationSink {
    /// Send a notification. Delivery is best effort.
    fn notify(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), VentHubError>> + Send;
}

impl<T: NotificationSink + Send + Sync> NotificationSink for std::sync::Arc<T> {
    fn notify(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), VentHubError>> + Send {
        (**self).notify(notification)
    }
}
