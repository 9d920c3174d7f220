//! Cooldown store port — durable `blocked_until` deadline per device.

use std::future::Future;

use venthub_domain::error::VentHubError;
use venthub_domain::id::DeviceId;
use venthub_domain::time::Timestamp;

/// Durable single-key store for cooldown deadlines.
pub trait CooldownStore {
    /// Stored deadline for `device`, or `None` if never initialised.
    fn get(
        &self,
        device: &DeviceId,
    ) -> impl Future<Output = Result<Option<Timestamp>, VentHubError>> + Send;

    /// Overwrite the deadline for `device`.
    fn set(
        &self,
        device: &DeviceId,
        blocked_until: Timestamp,
    ) -> impl Future<Output = Result<(), VentHubError>> + Send;
}

impl<T: CooldownStore + Send + Sync> CooldownStore for std::sync::Arc<T> {
    fn get(
        &self,
        device: &DeviceId,
    ) -> impl Future<Output = Result<Option<Timestamp>, VentHubError>> + Send {
        (**self).get(device)
    }

    fn set(
        &self,
        device: &DeviceId,
        blocked_until: Timestamp,
    ) -> impl Future<Output = Result<(), VentHubError>> + Send {
        (**self).set(device, blocked_until)
    }
}
