//! MQTT connection configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the MQTT bridge.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Topic prefix for actuator commands and state (`<base>/<device>/set`).
    pub base_topic: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Pause between reconnection attempts, in seconds.
    pub reconnect_delay_secs: u16,
    /// A sensor that has not reported for this many seconds reads as
    /// unavailable; 0 keeps the last value forever.
    pub value_max_age_secs: u64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "venthub".to_string(),
            base_topic: "venthub".to_string(),
            keep_alive_secs: 30,
            reconnect_delay_secs: 5,
            value_max_age_secs: 60 * 60,
            username: None,
            password: None,
        }
    }
}

impl MqttConfig {
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(u64::from(self.keep_alive_secs))
    }

    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(u64::from(self.reconnect_delay_secs))
    }

    /// How long a sensor value stays usable, if it expires at all.
    #[must_use]
    pub fn value_max_age(&self) -> Option<Duration> {
        (self.value_max_age_secs > 0).then_some(Duration::from_secs(self.value_max_age_secs))
    }

    /// Credentials, if both a user name and a password are set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}
