//! Sensor reading source port — current values and historical averages.

use std::future::Future;

use venthub_domain::error::VentHubError;
use venthub_domain::id::{GroupId, SensorId};
use venthub_domain::sensor::SensorReading;
use venthub_domain::time::Timestamp;

/// Provides sensor values for the controllers.
pub trait SensorReadingSource {
    /// Current readings for every sensor in `group`, in the group's configured
    /// order. The returned readings carry no history yet.
    fn get_readings(
        &self,
        group: &GroupId,
    ) -> impl Future<Output = Result<Vec<SensorReading>, VentHubError>> + Send;

    /// Mean value of `sensor` over `[start, end]`, or `None` without data.
    fn historical_average(
        &self,
        sensor: &SensorId,
        start: Timestamp,
        end: Timestamp,
    ) -> impl Future<Output = Result<Option<f64>, VentHubError>> + Send;

    /// Latest value of a single sensor, or `None` when unavailable.
    fn current_value(
        &self,
        sensor: &SensorId,
    ) -> impl Future<Output = Result<Option<f64>, VentHubError>> + Send;
}

impl<T: SensorReadingSource + Send + Sync> SensorReadingSource for std::sync::Arc<T> {
    fn get_readings(
        &self,
        group: &GroupId,
    ) -> impl Future<Output = Result<Vec<SensorReading>, VentHubError>> + Send {
        (**self).get_readings(group)
    }

    fn historical_average(
        &self,
        sensor: &SensorId,
        start: Timestamp,
        end: Timestamp,
    ) -> impl Future<Output = Result<Option<f64>, VentHubError>> + Send {
        (**self).historical_average(sensor, start, end)
    }

    fn current_value(
        &self,
        sensor: &SensorId,
    ) -> impl Future<Output = Result<Option<f64>, VentHubError>> + Send {
        (**self).current_value(sensor)
    }
}
