//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `venthub.toml` in the working directory, or the file named by
//! `VENTHUB_CONFIG`. Everything except the humidity control section has a
//! default. Environment variables take precedence over file values.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::Deserialize;
use venthub_adapter_mqtt::{MqttConfig, SensorBinding};
use venthub_adapter_pushover::PushoverConfig;
use venthub_app::controller::ControllerConfig;
use venthub_app::scheduler::Schedule;
use venthub_app::services::button_vent::ButtonVentConfig;
use venthub_app::services::summer_ventilation::SummerVentilationConfig;
use venthub_domain::error::ValidationError;
use venthub_domain::hysteresis::Thresholds;
use venthub_domain::id::{DeviceId, GroupId, SensorId};
use venthub_domain::speech::SpeechSettings;
use venthub_domain::summer::SummerPolicy;

const DEFAULT_PATH: &str = "venthub.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub mqtt: MqttConfig,
    /// Sensor id → where its values are published.
    pub sensors: BTreeMap<String, SensorConfig>,
    /// Group id → member sensor ids, in aggregation order.
    pub groups: BTreeMap<String, Vec<String>>,
    pub humidity_control: Option<HumidityControlConfig>,
    pub summer_ventilation: Option<SummerVentilationSection>,
    pub button_vent: Option<ButtonVentSection>,
    pub notifications: NotificationsConfig,
    pub history: HistoryConfig,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SensorConfig {
    pub topic: String,
    /// Dotted path to the value inside a JSON payload.
    #[serde(default)]
    pub value_key: Option<String>,
}

/// The humidity-driven fan. The three thresholds are mandatory; they are
/// optional here only so that a missing one is reported by name.
#[derive(Debug, Clone, Deserialize)]
pub struct HumidityControlConfig {
    pub device: String,
    pub sensor_group: String,
    pub acceptable_threshold: Option<f64>,
    pub hysteresis_margin: Option<f64>,
    pub never_actuate_below: Option<f64>,
    #[serde(default = "default_block_minutes")]
    pub block_minutes_after_timeout: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
    #[serde(default = "default_history_window_hours")]
    pub history_window_hours: u64,
    #[serde(default = "default_call_timeout_secs")]
    pub source_timeout_secs: u64,
    #[serde(default = "default_call_timeout_secs")]
    pub sink_timeout_secs: u64,
    #[serde(default)]
    pub notification_title: Option<String>,
}

/// The optional summer cooling rule.
#[derive(Debug, Clone, Deserialize)]
pub struct SummerVentilationSection {
    pub device: String,
    pub pm2_5_sensor: String,
    pub indoor_sensor: String,
    pub outdoor_sensor: String,
    #[serde(default)]
    pub policy: SummerPolicy,
    #[serde(default = "default_summer_initial_delay_secs")]
    pub initial_delay_secs: u64,
    #[serde(default = "default_summer_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_summer_title")]
    pub notification_title: String,
}

/// A button that runs an extra vent and plays a clip when pressed.
#[derive(Debug, Clone, Deserialize)]
pub struct ButtonVentSection {
    pub button: String,
    pub device: String,
    #[serde(default = "default_button_clip")]
    pub clip: String,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub volume: Option<u8>,
}

/// Optional notification channels; none configured means log-only.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub pushover: Option<PushoverConfig>,
    pub speech: Option<SpeechSettings>,
}

/// Sensor history retention.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub retention_days: u32,
    pub purge_interval_hours: u32,
}

fn default_block_minutes() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_initial_delay_secs() -> u64 {
    10
}

fn default_history_window_hours() -> u64 {
    48
}

fn default_call_timeout_secs() -> u64 {
    10
}

fn default_summer_initial_delay_secs() -> u64 {
    60
}

fn default_summer_interval_secs() -> u64 {
    60 * 60
}

fn default_summer_title() -> String {
    "VENTILATION".to_string()
}

fn default_button_clip() -> String {
    "joke_sting.mp3".to_string()
}

impl Config {
    /// Load configuration from `VENTHUB_CONFIG` or `venthub.toml` (if
    /// present), apply environment-variable overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result does not describe a runnable setup.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("VENTHUB_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("VENTHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("VENTHUB_MQTT_HOST") {
            self.mqtt.broker_host = val;
        }
        if let Ok(val) = std::env::var("VENTHUB_MQTT_PORT")
            && let Ok(port) = val.parse()
        {
            self.mqtt.broker_port = port;
        }
        if let Ok(val) = std::env::var("VENTHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.broker_port == 0 {
            return Err(ConfigError::Validation("mqtt port must be non-zero".to_string()));
        }
        self.sensor_bindings()?;
        let groups = self.groups()?;
        let controller = self.controller_config()?;
        if !groups.contains_key(&controller.sensor_group) {
            return Err(ConfigError::Validation(format!(
                "humidity_control: unknown sensor group `{}`",
                controller.sensor_group
            )));
        }
        self.schedule()?;
        self.summer_config()?;
        self.button_vent_config()?;
        if self.history.retention_days == 0 || self.history.purge_interval_hours == 0 {
            return Err(ConfigError::Validation(
                "history: retention and purge interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Topic bindings for every configured sensor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a blank sensor id.
    pub fn sensor_bindings(&self) -> Result<Vec<SensorBinding>, ConfigError> {
        self.sensors
            .iter()
            .map(|(id, sensor)| {
                Ok(SensorBinding {
                    sensor: sensor_id("sensors", id)?,
                    topic: sensor.topic.clone(),
                    value_key: sensor.value_key.clone(),
                })
            })
            .collect()
    }

    /// Sensor groups with their members in aggregation order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a blank id or a member that is
    /// not a configured sensor.
    pub fn groups(&self) -> Result<HashMap<GroupId, Vec<SensorId>>, ConfigError> {
        let mut groups = HashMap::with_capacity(self.groups.len());
        for (group, members) in &self.groups {
            let group = GroupId::new(group.as_str()).map_err(|err| invalid("groups", &err))?;
            let mut ids = Vec::with_capacity(members.len());
            for member in members {
                if !self.sensors.contains_key(member) {
                    return Err(ConfigError::Validation(format!(
                        "groups: `{group}` lists unknown sensor `{member}`"
                    )));
                }
                ids.push(sensor_id("groups", member)?);
            }
            groups.insert(group, ids);
        }
        Ok(groups)
    }

    fn humidity_control(&self) -> Result<&HumidityControlConfig, ConfigError> {
        self.humidity_control.as_ref().ok_or_else(|| {
            ConfigError::Validation("missing [humidity_control] section".to_string())
        })
    }

    /// Settings for the humidity controller.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the section or one of its
    /// thresholds is missing, or if a value is out of range.
    pub fn controller_config(&self) -> Result<ControllerConfig, ConfigError> {
        let section = self.humidity_control()?;
        let thresholds = Thresholds {
            acceptable_threshold: required(section.acceptable_threshold, "acceptable_threshold")?,
            hysteresis_margin: required(section.hysteresis_margin, "hysteresis_margin")?,
            never_actuate_below: required(section.never_actuate_below, "never_actuate_below")?,
        };
        let device =
            DeviceId::new(section.device.as_str()).map_err(|e| invalid("humidity_control", &e))?;
        let group = GroupId::new(section.sensor_group.as_str())
            .map_err(|e| invalid("humidity_control", &e))?;

        let mut config = ControllerConfig::new(device, group, thresholds);
        config.block_duration =
            scaled_secs(section.block_minutes_after_timeout, 60, "block_duration")?;
        config.history_window =
            scaled_secs(section.history_window_hours, 60 * 60, "history_window")?;
        config.source_timeout = Duration::from_secs(section.source_timeout_secs);
        config.sink_timeout = Duration::from_secs(section.sink_timeout_secs);
        if let Some(title) = &section.notification_title {
            config.notification_title.clone_from(title);
        }
        config.validate().map_err(|e| invalid("humidity_control", &e))?;
        Ok(config)
    }

    /// Poll cadence of the humidity controller.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a zero poll interval.
    pub fn schedule(&self) -> Result<Schedule, ConfigError> {
        let section = self.humidity_control()?;
        let schedule = Schedule {
            initial_delay: Duration::from_secs(section.initial_delay_secs),
            poll_interval: Duration::from_secs(section.poll_interval_secs),
        };
        schedule.validate().map_err(|e| invalid("humidity_control", &e))?;
        Ok(schedule)
    }

    /// Settings for the summer rule, if it is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a blank id, an invalid policy
    /// or a zero interval.
    pub fn summer_config(&self) -> Result<Option<SummerVentilationConfig>, ConfigError> {
        let Some(section) = &self.summer_ventilation else {
            return Ok(None);
        };
        let scope = "summer_ventilation";
        section.policy.validate().map_err(|e| invalid(scope, &e))?;
        if section.interval_secs == 0 {
            return Err(invalid(scope, &ValidationError::ZeroDuration { field: "interval" }));
        }
        Ok(Some(SummerVentilationConfig {
            device: DeviceId::new(section.device.as_str()).map_err(|e| invalid(scope, &e))?,
            pm2_5_sensor: sensor_id(scope, &section.pm2_5_sensor)?,
            indoor_sensor: sensor_id(scope, &section.indoor_sensor)?,
            outdoor_sensor: sensor_id(scope, &section.outdoor_sensor)?,
            policy: section.policy,
            initial_delay: Duration::from_secs(section.initial_delay_secs),
            interval: Duration::from_secs(section.interval_secs),
            notification_title: section.notification_title.clone(),
        }))
    }

    /// Settings for the vent button, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a blank id or clip name.
    pub fn button_vent_config(&self) -> Result<Option<ButtonVentConfig>, ConfigError> {
        let Some(section) = &self.button_vent else {
            return Ok(None);
        };
        let scope = "button_vent";
        if section.clip.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{scope}: clip must not be empty")));
        }
        Ok(Some(ButtonVentConfig {
            button: DeviceId::new(section.button.as_str()).map_err(|e| invalid(scope, &e))?,
            device: DeviceId::new(section.device.as_str()).map_err(|e| invalid(scope, &e))?,
            clip: section.clip.clone(),
            room: section.room.clone(),
            volume: section.volume,
        }))
    }

    /// How long recorded samples are kept.
    #[must_use]
    pub fn retention(&self) -> Duration {
        Duration::from_secs(u64::from(self.history.retention_days) * 24 * 60 * 60)
    }

    #[must_use]
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.history.purge_interval_hours) * 60 * 60)
    }
}

fn required(value: Option<f64>, field: &str) -> Result<f64, ConfigError> {
    value.ok_or_else(|| ConfigError::Validation(format!("humidity_control: missing `{field}`")))
}

/// `value` units of `unit_secs` seconds each, rejecting an overflow.
fn scaled_secs(value: u64, unit_secs: u64, field: &'static str) -> Result<Duration, ConfigError> {
    value
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(|| invalid("humidity_control", &ValidationError::DurationTooLong { field }))
}

fn sensor_id(scope: &str, id: &str) -> Result<SensorId, ConfigError> {
    SensorId::new(id).map_err(|err| invalid(scope, &err))
}

fn invalid(scope: &str, err: &ValidationError) -> ConfigError {
    ConfigError::Validation(format!("{scope}: {err}"))
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:venthub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "venthubd=info,venthub=info".to_string(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            retention_days: 7,
            purge_interval_hours: 24,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATHROOM: &str = "
        [sensors.'sensor.shower']
        topic = 'zigbee2mqtt/shower'
        value_key = 'humidity'

        [sensors.'sensor.sink']
        topic = 'zigbee2mqtt/sink'
        value_key = 'humidity'

        [groups]
        'group.bathroom' = ['sensor.shower', 'sensor.sink']

        [humidity_control]
        device = 'switch.bathroom_fan_demand'
        sensor_group = 'group.bathroom'
        acceptable_threshold = 40.0
        hysteresis_margin = 5.0
        never_actuate_below = 50.0
    ";

    fn bathroom() -> Config {
        toml::from_str(BATHROOM).unwrap()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.database_url(), "sqlite:venthub.db?mode=rwc");
        assert_eq!(config.logging.filter, "venthubd=info,venthub=info");
        assert_eq!(config.mqtt.broker_port, 1883);
        assert_eq!(config.retention(), Duration::from_secs(7 * 24 * 60 * 60));
        assert!(config.humidity_control.is_none());
        assert!(config.notifications.pushover.is_none());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.database_url(), "sqlite:venthub.db?mode=rwc");
    }

    #[test]
    fn should_reject_missing_humidity_section() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("humidity_control")));
    }

    #[test]
    fn should_accept_bathroom_setup() {
        let config = bathroom();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_apply_controller_defaults() {
        let controller = bathroom().controller_config().unwrap();
        assert_eq!(controller.device.as_str(), "switch.bathroom_fan_demand");
        assert_eq!(controller.thresholds.acceptable_threshold, 40.0);
        assert_eq!(controller.block_duration, Duration::from_secs(30 * 60));
        assert_eq!(controller.history_window, Duration::from_secs(48 * 60 * 60));
        assert_eq!(controller.notification_title, "BATHROOM VENTILATION");

        let schedule = bathroom().schedule().unwrap();
        assert_eq!(schedule, Schedule::default());
    }

    #[test]
    fn should_name_missing_threshold() {
        let toml = BATHROOM.replace("hysteresis_margin = 5.0", "");
        let config: Config = toml::from_str(&toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("hysteresis_margin")));
    }

    #[test]
    fn should_reject_group_with_unknown_sensor() {
        let toml = BATHROOM.replace(
            "'sensor.shower', 'sensor.sink'",
            "'sensor.shower', 'sensor.bath'",
        );
        let config: Config = toml::from_str(&toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("sensor.bath")));
    }

    #[test]
    fn should_reject_unknown_controller_group() {
        let toml = BATHROOM.replace("sensor_group = 'group.bathroom'", "sensor_group = 'group.x'");
        let config: Config = toml::from_str(&toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_keep_group_member_order() {
        let groups = bathroom().groups().unwrap();
        let members = &groups[&GroupId::new("group.bathroom").unwrap()];
        let names: Vec<_> = members.iter().map(SensorId::as_str).collect();
        assert_eq!(names, vec!["sensor.shower", "sensor.sink"]);
    }

    #[test]
    fn should_build_sensor_bindings() {
        let bindings = bathroom().sensor_bindings().unwrap();
        assert_eq!(bindings.len(), 2);
        let shower = bindings
            .iter()
            .find(|b| b.sensor.as_str() == "sensor.shower")
            .unwrap();
        assert_eq!(shower.topic, "zigbee2mqtt/shower");
        assert_eq!(shower.value_key.as_deref(), Some("humidity"));
    }

    #[test]
    fn should_parse_optional_sections() {
        let toml = format!(
            "{BATHROOM}
            [summer_ventilation]
            device = 'switch.summer_vent'
            pm2_5_sensor = 'sensor.pm2_5'
            indoor_sensor = 'sensor.indoor'
            outdoor_sensor = 'sensor.outdoor'

            [summer_ventilation.policy]
            max_pm2_5 = 8.0

            [notifications.pushover]
            user_key = 'u123'
            api_token = 'a456'

            [notifications.speech]
            default_room = 'Badrummet'

            [history]
            retention_days = 14
            "
        );
        let config: Config = toml::from_str(&toml).unwrap();
        assert!(config.validate().is_ok());

        let summer = config.summer_config().unwrap().unwrap();
        assert_eq!(summer.device.as_str(), "switch.summer_vent");
        assert_eq!(summer.policy.max_pm2_5, 8.0);
        assert_eq!(summer.policy.first_month, 5);
        assert_eq!(summer.interval, Duration::from_secs(3600));

        let speech = config.notifications.speech.unwrap();
        assert_eq!(speech.default_room, "Badrummet");
        assert_eq!(speech.topic_prefix, "sonos/set");
        assert_eq!(config.notifications.pushover.unwrap().user_key, "u123");
        assert_eq!(config.history.retention_days, 14);
    }

    #[test]
    fn should_parse_button_vent_with_default_clip() {
        let toml = format!(
            "{BATHROOM}
            [button_vent]
            button = 'flatulence_button'
            device = 'flatulence_extra_vent'
            room = 'Badrummet'
            volume = 50
            "
        );
        let config: Config = toml::from_str(&toml).unwrap();
        assert!(config.validate().is_ok());

        let vent = config.button_vent_config().unwrap().unwrap();
        assert_eq!(vent.button.as_str(), "flatulence_button");
        assert_eq!(vent.device.as_str(), "flatulence_extra_vent");
        assert_eq!(vent.clip, "joke_sting.mp3");
        assert_eq!(vent.room.as_deref(), Some("Badrummet"));
        assert_eq!(vent.volume, Some(50));
        assert!(bathroom().button_vent_config().unwrap().is_none());
    }

    #[test]
    fn should_reject_button_vent_without_button_id() {
        let toml = format!("{BATHROOM}\n[button_vent]\nbutton = ' '\ndevice = 'vent'\n");
        let config: Config = toml::from_str(&toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_poll_interval() {
        let toml = format!("{BATHROOM}\npoll_interval_secs = 0\n");
        let config: Config = toml::from_str(&toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_block_duration_longer_than_a_year() {
        let toml = format!("{BATHROOM}\nblock_minutes_after_timeout = 1000000000000\n");
        let config: Config = toml::from_str(&toml).unwrap();
        let err = config.controller_config().unwrap_err();
        assert!(err.to_string().contains("block_duration must not exceed one year"));
    }

    #[test]
    fn should_reject_history_window_that_overflows() {
        let toml = format!("{BATHROOM}\nhistory_window_hours = {}\n", i64::MAX);
        let config: Config = toml::from_str(&toml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(msg))
            if msg.contains("history_window")));
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
