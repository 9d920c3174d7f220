//! # venthub-adapter-mqtt
//!
//! MQTT adapter — connects venthub to the home's message bus.
//!
//! ## Responsibilities
//! - Connect to an MQTT broker and keep the connection alive
//! - Subscribe to sensor topics and cache the latest value per sensor, until
//!   it grows too old
//! - Publish switch commands and watch device state topics for forced-off
//!   transitions
//! - Forward button presses
//! - Publish text-to-speech announcements to the speaker bridge
//!
//! ## Dependency rule
//! Same as other adapters: depends on `venthub-app` and `venthub-domain`.

mod actuator;
mod bridge;
mod config;
mod error;
mod payload;
mod publisher;
mod speech;
mod state;

pub use actuator::MqttActuator;
pub use bridge::{MqttBridge, SensorBinding, command_topic, state_topic};
pub use config::MqttConfig;
pub use error::MqttError;
pub use payload::{parse_switch_state, parse_value};
pub use publisher::Publish;
pub use speech::MqttSpeechSink;
pub use state::{BridgeState, StateChange};
