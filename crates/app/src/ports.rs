//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod actuator;
pub mod announcer;
pub mod cooldown_store;
pub mod live_values;
pub mod notification;
pub mod sensor_history;
pub mod sensor_source;

pub use actuator::{ActuatorCommand, ActuatorSignal};
pub use announcer::Announcer;
pub use cooldown_store::CooldownStore;
pub use live_values::LiveSensorValues;
pub use notification::NotificationSink;
pub use sensor_history::SensorHistoryRepository;
pub use sensor_source::SensorReadingSource;
