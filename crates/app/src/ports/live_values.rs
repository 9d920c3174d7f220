//! Live sensor values port.

use std::future::Future;

use venthub_domain::error::VentHubError;
use venthub_domain::id::SensorId;

/// Latest known value per sensor, as fed by the message bus.
pub trait LiveSensorValues {
    /// Most recent value of `sensor`, or `None` if nothing was received yet.
    fn latest(
        &self,
        sensor: &SensorId,
    ) -> impl Future<Output = Result<Option<f64>, VentHubError>> + Send;
}

impl<T: LiveSensorValues + Send + Sync> LiveSensorValues for std::sync::Arc<T> {
    fn latest(
        &self,
        sensor: &SensorId,
    ) -> impl Future<Output = Result<Option<f64>, VentHubError>> + Send {
        (**self).latest(sensor)
    }
}
