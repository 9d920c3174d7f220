//! # venthub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SensorReadingSource` — current values and historical averages
//!   - `ActuatorCommand` — switch a device on/off, query its state
//!   - `CooldownStore` — durable blocking deadline per device
//!   - `NotificationSink` — deliver messages to a human
//!   - `SensorHistoryRepository` — record and average samples
//!   - `LiveSensorValues` — latest value per sensor
//!   - `Announcer` — play sounds and speech on the speakers
//! - Provide the use-cases that drive them:
//!   - `ActuationController` — one humidity poll, forced-timeout handling
//!   - `scheduler::run` — poll cadence and signal handling
//!   - `HubSensorSource`, `SummerVentilation`, `ButtonVent` — services built
//!     on the ports
//!
//! ## Dependency rule
//! Depends on `venthub-domain` only (plus `tokio` for locks, timers and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod controller;
pub mod ports;
pub mod scheduler;
pub mod services;
