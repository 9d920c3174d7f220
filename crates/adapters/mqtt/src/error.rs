//! MQTT adapter error types.

use venthub_domain::error::VentHubError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client returned an error.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// Failed to parse an incoming MQTT payload as JSON.
    #[error("failed to parse MQTT payload")]
    PayloadParse(#[source] serde_json::Error),

    /// The payload parsed but held no usable value.
    #[error("no numeric value at {key:?} in MQTT payload")]
    MissingValue { key: Option<String> },
}

/// Every MQTT failure surfaces as an unreachable backend.
impl From<MqttError> for VentHubError {
    fn from(err: MqttError) -> Self {
        Self::Unreachable(Box::new(err))
    }
}
