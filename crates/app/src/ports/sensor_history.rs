//! Sensor history port — append-only samples with windowed averages.

use std::future::Future;

use venthub_domain::error::VentHubError;
use venthub_domain::id::SensorId;
use venthub_domain::sensor::SensorSample;
use venthub_domain::time::Timestamp;

/// Persistence for recorded sensor samples.
pub trait SensorHistoryRepository {
    /// Append a sample.
    fn record(&self, sample: SensorSample) -> impl Future<Output = Result<(), VentHubError>> + Send;

    /// Mean of the samples of `sensor` recorded in `[from, to]`, or `None`
    /// when there are none.
    fn average(
        &self,
        sensor: &SensorId,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Option<f64>, VentHubError>> + Send;

    /// Delete every sample recorded before `before` and return how many went.
    fn purge_before(
        &self,
        before: Timestamp,
    ) -> impl Future<Output = Result<usize, VentHubError>> + Send;
}

impl<T: SensorHistoryRepository + Send + Sync> SensorHistoryRepository for std::sync::Arc<T> {
    fn record(
        &self,
        sample: SensorSample,
    ) -> impl Future<Output = Result<(), VentHubError>> + Send {
        (**self).record(sample)
    }

    fn average(
        &self,
        sensor: &SensorId,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Option<f64>, VentHubError>> + Send {
        (**self).average(sensor, from, to)
    }

    fn purge_before(
        &self,
        before: Timestamp,
    ) -> impl Future<Output = Result<usize, VentHubError>> + Send {
        (**self).purge_before(before)
    }
}
