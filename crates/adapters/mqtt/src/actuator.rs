//! MQTT implementation of [`ActuatorCommand`].

use venthub_app::ports::ActuatorCommand;
use venthub_domain::error::VentHubError;
use venthub_domain::id::DeviceId;

use crate::bridge::command_topic;
use crate::publisher::Publish;
use crate::state::BridgeState;

/// Publishes `ON`/`OFF` to `<base>/<device>/set`. `is_on` answers whether
/// this actuator switched the device on, never what the device reports.
pub struct MqttActuator<P> {
    publisher: P,
    state: BridgeState,
    base_topic: String,
}

impl<P: Publish + Send + Sync> MqttActuator<P> {
    pub fn new(publisher: P, state: BridgeState, base_topic: impl Into<String>) -> Self {
        Self {
            publisher,
            state,
            base_topic: base_topic.into(),
        }
    }

    async fn switch(&self, device: &DeviceId, on: bool) -> Result<(), VentHubError> {
        let payload = if on { "ON" } else { "OFF" };
        let topic = command_topic(&self.base_topic, device);
        self.publisher
            .publish(topic.clone(), payload.as_bytes().to_vec())
            .await?;
        self.state.commanded(device, on).await;
        tracing::debug!(device = %device, topic = %topic, payload, "switch command published");
        Ok(())
    }
}

impl<P: Publish + Send + Sync> ActuatorCommand for MqttActuator<P> {
    async fn force_on(&self, device: &DeviceId) -> Result<(), VentHubError> {
        self.switch(device, true).await
    }

    async fn force_off(&self, device: &DeviceId) -> Result<(), VentHubError> {
        self.switch(device, false).await
    }

    async fn is_on(&self, device: &DeviceId) -> Result<bool, VentHubError> {
        Ok(self.state.commanded_on(device).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::tests::RecordingPublisher;
    use crate::state::StateChange;
    use std::sync::Arc;

    fn fan() -> DeviceId {
        DeviceId::new("bathroom_fan").unwrap()
    }

    fn actuator() -> (MqttActuator<Arc<RecordingPublisher>>, Arc<RecordingPublisher>) {
        let publisher = Arc::new(RecordingPublisher::default());
        let actuator = MqttActuator::new(publisher.clone(), BridgeState::default(), "venthub");
        (actuator, publisher)
    }

    #[tokio::test]
    async fn should_publish_on_and_off_commands() {
        let (actuator, publisher) = actuator();

        actuator.force_on(&fan()).await.unwrap();
        actuator.force_off(&fan()).await.unwrap();

        assert_eq!(
            publisher.sent(),
            vec![
                ("venthub/bathroom_fan/set".to_string(), "ON".to_string()),
                ("venthub/bathroom_fan/set".to_string(), "OFF".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn should_track_commanded_state() {
        let (actuator, _) = actuator();
        assert!(!actuator.is_on(&fan()).await.unwrap());
        actuator.force_on(&fan()).await.unwrap();
        assert!(actuator.is_on(&fan()).await.unwrap());
    }

    #[tokio::test]
    async fn should_arm_forced_off_detection_after_force_on() {
        let (actuator, _) = actuator();
        actuator.force_on(&fan()).await.unwrap();
        let change = actuator.state.reported(&fan(), false).await;
        assert_eq!(change, StateChange::ForcedOff);
        assert!(!actuator.is_on(&fan()).await.unwrap());
    }

    #[tokio::test]
    async fn should_not_count_device_started_by_hand_as_on() {
        let (actuator, publisher) = actuator();
        actuator.state.reported(&fan(), true).await;

        assert!(!actuator.is_on(&fan()).await.unwrap());
        assert!(publisher.sent().is_empty());
    }
}
