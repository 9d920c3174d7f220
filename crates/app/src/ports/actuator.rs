//! Actuator port — commands to the controlled device.

use std::future::Future;

use venthub_domain::error::VentHubError;
use venthub_domain::id::DeviceId;

/// Switches a device on and off. Commands are fire-and-forget: success means
/// the command was handed over, not that the device confirmed it.
pub trait ActuatorCommand {
    /// Turn the device on.
    fn force_on(&self, device: &DeviceId) -> impl Future<Output = Result<(), VentHubError>> + Send;

    /// Turn the device off.
    fn force_off(
        &self,
        device: &DeviceId,
    ) -> impl Future<Output = Result<(), VentHubError>> + Send;

    /// Whether this actuator switched the device on and it has not gone off
    /// since. A run someone started at the device itself does not count.
    fn is_on(&self, device: &DeviceId) -> impl Future<Output = Result<bool, VentHubError>> + Send;
}

impl<T: ActuatorCommand + Send + Sync> ActuatorCommand for std::sync::Arc<T> {
    fn force_on(&self, device: &DeviceId) -> impl Future<Output = Result<(), VentHubError>> + Send {
        (**self).force_on(device)
    }

    fn force_off(
        &self,
        device: &DeviceId,
    ) -> impl Future<Output = Result<(), VentHubError>> + Send {
        (**self).force_off(device)
    }

    fn is_on(&self, device: &DeviceId) -> impl Future<Output = Result<bool, VentHubError>> + Send {
        (**self).is_on(device)
    }
}

/// Out-of-band event reported by an actuator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActuatorSignal {
    /// The device switched itself off while it was commanded on, typically
    /// because its own safety timer elapsed.
    ForcedOff { device: DeviceId },
}
