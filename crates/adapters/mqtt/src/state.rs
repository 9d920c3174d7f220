//! Shared view of what the broker told us: recent sensor values and which
//! actuators we switched on ourselves.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use venthub_app::ports::LiveSensorValues;
use venthub_domain::error::VentHubError;
use venthub_domain::id::{DeviceId, SensorId};

/// What a state report means for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// Nothing worth acting on.
    None,
    /// The device went off while commanded on.
    ForcedOff,
}

/// Cheaply cloneable handle on the bridge state.
///
/// Device reports never make a device count as ours: a fan someone switched
/// on by hand stays off in [`BridgeState::commanded_on`].
#[derive(Clone, Default)]
pub struct BridgeState {
    values: Arc<RwLock<HashMap<SensorId, (f64, Instant)>>>,
    commanded: Arc<RwLock<HashMap<DeviceId, bool>>>,
    /// Values older than this read as unavailable; `None` keeps them forever.
    max_age: Option<Duration>,
}

impl BridgeState {
    /// State whose sensor values expire after `max_age` without an update.
    #[must_use]
    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            max_age: Some(max_age),
            ..Self::default()
        }
    }

    pub async fn set_value(&self, sensor: SensorId, value: f64) {
        self.values
            .write()
            .await
            .insert(sensor, (value, Instant::now()));
    }

    /// Latest value of `sensor`, unless it is older than the maximum age.
    pub async fn value(&self, sensor: &SensorId) -> Option<f64> {
        let (value, received) = self.values.read().await.get(sensor).copied()?;
        match self.max_age {
            Some(max_age) if received.elapsed() > max_age => {
                tracing::debug!(sensor = %sensor, "sensor value expired");
                None
            }
            _ => Some(value),
        }
    }

    /// Remember a command we sent.
    pub async fn commanded(&self, device: &DeviceId, on: bool) {
        self.commanded.write().await.insert(device.clone(), on);
    }

    /// Apply a state report from the device.
    pub async fn reported(&self, device: &DeviceId, on: bool) -> StateChange {
        let mut commanded = self.commanded.write().await;
        match commanded.get_mut(device) {
            Some(commanded_on) if !on && *commanded_on => {
                *commanded_on = false;
                StateChange::ForcedOff
            }
            _ => StateChange::None,
        }
    }

    /// Whether we switched the device on and it has not gone off since.
    pub async fn commanded_on(&self, device: &DeviceId) -> bool {
        self.commanded
            .read()
            .await
            .get(device)
            .copied()
            .unwrap_or(false)
    }
}

impl LiveSensorValues for BridgeState {
    fn latest(
        &self,
        sensor: &SensorId,
    ) -> impl Future<Output = Result<Option<f64>, VentHubError>> + Send {
        async move { Ok(self.value(sensor).await) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fan() -> DeviceId {
        DeviceId::new("switch.bathroom_fan_demand").unwrap()
    }

    fn shower() -> SensorId {
        SensorId::new("sensor.shower").unwrap()
    }

    #[tokio::test]
    async fn should_report_forced_off_when_device_stops_while_commanded_on() {
        let state = BridgeState::default();
        state.commanded(&fan(), true).await;
        assert!(state.commanded_on(&fan()).await);

        assert_eq!(state.reported(&fan(), true).await, StateChange::None);
        assert_eq!(state.reported(&fan(), false).await, StateChange::ForcedOff);
        assert!(!state.commanded_on(&fan()).await);
    }

    #[tokio::test]
    async fn should_not_signal_when_we_switched_it_off() {
        let state = BridgeState::default();
        state.commanded(&fan(), true).await;
        state.commanded(&fan(), false).await;
        assert_eq!(state.reported(&fan(), false).await, StateChange::None);
    }

    #[tokio::test]
    async fn should_signal_forced_off_only_once() {
        let state = BridgeState::default();
        state.commanded(&fan(), true).await;
        assert_eq!(state.reported(&fan(), false).await, StateChange::ForcedOff);
        assert_eq!(state.reported(&fan(), false).await, StateChange::None);
    }

    #[tokio::test]
    async fn should_not_claim_device_switched_on_by_hand() {
        let state = BridgeState::default();
        assert_eq!(state.reported(&fan(), true).await, StateChange::None);
        assert!(!state.commanded_on(&fan()).await);

        state.commanded(&fan(), false).await;
        state.reported(&fan(), true).await;
        assert!(!state.commanded_on(&fan()).await);
    }

    #[tokio::test]
    async fn should_serve_latest_sensor_value() {
        let state = BridgeState::default();
        assert_eq!(state.latest(&shower()).await.unwrap(), None);
        state.set_value(shower(), 61.0).await;
        state.set_value(shower(), 63.0).await;
        assert_eq!(state.latest(&shower()).await.unwrap(), Some(63.0));
    }

    #[tokio::test(start_paused = true)]
    async fn should_expire_values_older_than_max_age() {
        let state = BridgeState::with_max_age(Duration::from_secs(600));
        state.set_value(shower(), 61.0).await;

        tokio::time::advance(Duration::from_secs(600)).await;
        assert_eq!(state.latest(&shower()).await.unwrap(), Some(61.0));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(state.latest(&shower()).await.unwrap(), None);

        state.set_value(shower(), 58.0).await;
        assert_eq!(state.latest(&shower()).await.unwrap(), Some(58.0));
    }
}
