//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod button_vent;
pub mod hub_sensor_source;
pub mod summer_ventilation;
