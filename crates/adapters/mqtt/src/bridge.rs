//! MQTT bridge — connects to the broker and routes incoming messages.
//!
//! Sensor topics update the live value cache and feed the history recorder.
//! Actuator state topics are compared with the last command; a device that
//! reports OFF while commanded ON has been switched off by its own timer and
//! raises [`ActuatorSignal::ForcedOff`]. Buttons report on the same kind of
//! state topic; every `ON` is forwarded as a press.

use std::collections::HashMap;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS, SubscribeFilter};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use venthub_app::ports::ActuatorSignal;
use venthub_domain::id::{DeviceId, SensorId};
use venthub_domain::sensor::SensorSample;
use venthub_domain::time::now;

use crate::config::MqttConfig;
use crate::payload::{parse_switch_state, parse_value};
use crate::state::{BridgeState, StateChange};

/// Capacity of the rumqttc request channel.
const REQUEST_CAPACITY: usize = 64;

/// Where a sensor's values come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorBinding {
    pub sensor: SensorId,
    pub topic: String,
    /// Dotted path into a JSON payload; `None` for bare numbers.
    pub value_key: Option<String>,
}

/// Topic a device listens on for `ON`/`OFF` commands.
#[must_use]
pub fn command_topic(base_topic: &str, device: &DeviceId) -> String {
    format!("{base_topic}/{device}/set")
}

/// Topic a device reports its state on.
#[must_use]
pub fn state_topic(base_topic: &str, device: &DeviceId) -> String {
    format!("{base_topic}/{device}/state")
}

/// Routes broker messages into the shared [`BridgeState`].
pub struct MqttBridge {
    config: MqttConfig,
    sensors: HashMap<String, Vec<SensorBinding>>,
    devices: HashMap<String, DeviceId>,
    buttons: HashMap<String, DeviceId>,
    state: BridgeState,
    samples: mpsc::Sender<SensorSample>,
    signals: mpsc::Sender<ActuatorSignal>,
    presses: Option<mpsc::Sender<DeviceId>>,
}

impl MqttBridge {
    /// Create a bridge for the given sensors and actuators. Parsed samples go
    /// to `samples`; forced-off detections go to `signals`.
    pub fn new(
        config: MqttConfig,
        bindings: Vec<SensorBinding>,
        devices: impl IntoIterator<Item = DeviceId>,
        samples: mpsc::Sender<SensorSample>,
        signals: mpsc::Sender<ActuatorSignal>,
    ) -> Self {
        let mut sensors: HashMap<String, Vec<SensorBinding>> = HashMap::new();
        for binding in bindings {
            sensors.entry(binding.topic.clone()).or_default().push(binding);
        }
        let devices = devices
            .into_iter()
            .map(|device| (state_topic(&config.base_topic, &device), device))
            .collect();
        let state = config
            .value_max_age()
            .map_or_else(BridgeState::default, BridgeState::with_max_age);
        Self {
            config,
            sensors,
            devices,
            buttons: HashMap::new(),
            state,
            samples,
            signals,
            presses: None,
        }
    }

    /// Also listen to `buttons`, sending each press to `presses`.
    #[must_use]
    pub fn with_buttons(
        mut self,
        buttons: impl IntoIterator<Item = DeviceId>,
        presses: mpsc::Sender<DeviceId>,
    ) -> Self {
        self.buttons = buttons
            .into_iter()
            .map(|button| (state_topic(&self.config.base_topic, &button), button))
            .collect();
        self.presses = Some(presses);
        self
    }

    /// Handle on the shared state, for the actuator and the sensor source.
    #[must_use]
    pub fn state(&self) -> BridgeState {
        self.state.clone()
    }

    /// Every topic the bridge subscribes to.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.sensors
            .keys()
            .chain(self.devices.keys())
            .chain(self.buttons.keys())
            .map(String::as_str)
    }

    /// Process one incoming message.
    pub async fn handle_message(&self, topic: &str, payload: &[u8]) {
        let Ok(payload) = std::str::from_utf8(payload) else {
            tracing::debug!(topic, "ignoring non UTF-8 payload");
            return;
        };

        if let Some(bindings) = self.sensors.get(topic) {
            for binding in bindings {
                match parse_value(payload, binding.value_key.as_deref()) {
                    Ok(value) => {
                        self.state.set_value(binding.sensor.clone(), value).await;
                        self.record(binding.sensor.clone(), value);
                    }
                    Err(error) => {
                        tracing::warn!(
                            topic,
                            sensor = %binding.sensor,
                            %error,
                            "unusable sensor payload"
                        );
                    }
                }
            }
        }

        if let Some(button) = self.buttons.get(topic) {
            self.press(button, payload).await;
        }

        if let Some(device) = self.devices.get(topic) {
            let Some(on) = parse_switch_state(payload) else {
                tracing::debug!(topic, payload, "unrecognised switch state");
                return;
            };
            if self.state.reported(device, on).await == StateChange::ForcedOff {
                tracing::info!(device = %device, "device switched itself off");
                let signal = ActuatorSignal::ForcedOff {
                    device: device.clone(),
                };
                if self.signals.send(signal).await.is_err() {
                    tracing::warn!(device = %device, "no controller listening for signals");
                }
            }
        }
    }

    async fn press(&self, button: &DeviceId, payload: &str) {
        if parse_switch_state(payload) != Some(true) {
            return;
        }
        let Some(presses) = &self.presses else {
            return;
        };
        tracing::debug!(button = %button, "button pressed");
        if presses.send(button.clone()).await.is_err() {
            tracing::warn!(button = %button, "no service listening for button presses");
        }
    }

    fn record(&self, sensor_id: SensorId, value: f64) {
        let sample = SensorSample {
            sensor_id,
            value,
            recorded_at: now(),
        };
        match self.samples.try_send(sample) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(sample)) => {
                let sensor = &sample.sensor_id;
                tracing::warn!(sensor = %sensor, "history recorder lagging, sample dropped");
            }
        }
    }

    /// Connect to the broker and spawn the event loop. The returned client is
    /// used for publishing; abort the handle to disconnect.
    #[must_use]
    pub fn connect(self) -> (AsyncClient, JoinHandle<()>) {
        let mut options = MqttOptions::new(
            self.config.client_id.clone(),
            self.config.broker_host.clone(),
            self.config.broker_port,
        );
        options.set_keep_alive(self.config.keep_alive());
        options.set_clean_session(true);
        if let Some((username, password)) = self.config.credentials() {
            options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);
        tracing::info!(
            host = %self.config.broker_host,
            port = self.config.broker_port,
            "connecting to MQTT broker"
        );
        let handle = tokio::spawn(handle_events(event_loop, client.clone(), self));
        (client, handle)
    }
}

async fn handle_events(mut event_loop: EventLoop, client: AsyncClient, bridge: MqttBridge) {
    use rumqttc::{Event, Packet};

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::info!(?connack, "MQTT broker connected");
                let filters: Vec<_> = bridge
                    .topics()
                    .map(|topic| SubscribeFilter::new(topic.to_string(), QoS::AtLeastOnce))
                    .collect();
                if filters.is_empty() {
                    continue;
                }
                // The event loop is what drains requests, so never block here.
                if let Err(error) = client.try_subscribe_many(filters) {
                    tracing::error!(%error, "MQTT subscribe failed");
                }
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                tracing::trace!(topic = %publish.topic, "MQTT message received");
                bridge.handle_message(&publish.topic, &publish.payload).await;
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("MQTT broker disconnected");
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(%error, "MQTT connection error, retrying");
                tokio::time::sleep(bridge.config.reconnect_delay()).await;
            }
        }
    }
}
