//! Hub sensor source — sensor groups backed by the live cache and the
//! recorded history.

use std::collections::HashMap;

use venthub_domain::error::{NotFoundError, VentHubError};
use venthub_domain::id::{GroupId, SensorId};
use venthub_domain::sensor::SensorReading;
use venthub_domain::time::Timestamp;

use crate::ports::{LiveSensorValues, SensorHistoryRepository, SensorReadingSource};

/// Implements [`SensorReadingSource`] from configured groups, live values
/// and the history repository.
pub struct HubSensorSource<L, H> {
    live: L,
    history: H,
    groups: HashMap<GroupId, Vec<SensorId>>,
}

impl<L, H> HubSensorSource<L, H>
where
    L: LiveSensorValues + Send + Sync,
    H: SensorHistoryRepository + Send + Sync,
{
    /// Create a source; each group lists its members in aggregation order.
    pub fn new(live: L, history: H, groups: HashMap<GroupId, Vec<SensorId>>) -> Self {
        Self {
            live,
            history,
            groups,
        }
    }
}

impl<L, H> SensorReadingSource for HubSensorSource<L, H>
where
    L: LiveSensorValues + Send + Sync,
    H: SensorHistoryRepository + Send + Sync,
{
    async fn get_readings(&self, group: &GroupId) -> Result<Vec<SensorReading>, VentHubError> {
        let members = self.groups.get(group).ok_or_else(|| NotFoundError {
            entity: "Group",
            id: group.to_string(),
        })?;
        let mut readings = Vec::with_capacity(members.len());
        for sensor in members {
            let current = self.live.latest(sensor).await?;
            readings.push(SensorReading::current(sensor.clone(), current));
        }
        Ok(readings)
    }

    async fn historical_average(
        &self,
        sensor: &SensorId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Option<f64>, VentHubError> {
        self.history.average(sensor, start, end).await
    }

    async fn current_value(&self, sensor: &SensorId) -> Result<Option<f64>, VentHubError> {
        self.live.latest(sensor).await
    }
}
