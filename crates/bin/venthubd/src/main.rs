//! # venthubd — venthub daemon
//!
//! Composition root that wires all adapters together and runs the controllers.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Connect the MQTT bridge that feeds sensors and drives the actuators
//! - Construct the humidity controller, the optional summer rule and the
//!   optional vent button, injecting adapters via port traits
//! - Record sensor history and purge it past the retention period
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod notifier;
mod tasks;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;
use venthub_adapter_mqtt::{MqttActuator, MqttBridge, MqttSpeechSink};
use venthub_adapter_pushover::PushoverSink;
use venthub_adapter_storage_sqlite_sqlx::{
    Config as StorageConfig, SqliteCooldownStore, SqliteSensorHistoryRepository,
};
use venthub_app::controller::ActuationController;
use venthub_app::scheduler;
use venthub_app::services::button_vent::ButtonVent;
use venthub_app::services::hub_sensor_source::HubSensorSource;
use venthub_app::services::summer_ventilation::SummerVentilation;

use crate::config::Config;
use crate::notifier::Notifier;

/// Samples buffered between the MQTT bridge and the history recorder.
const SAMPLE_BUFFER: usize = 256;
const SIGNAL_BUFFER: usize = 16;
const PRESS_BUFFER: usize = 16;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();
    let history = Arc::new(SqliteSensorHistoryRepository::new(pool.clone()));
    let cooldown = SqliteCooldownStore::new(pool);

    // MQTT
    let controller_config = config.controller_config()?;
    let summer_config = config.summer_config()?;
    let button_config = config.button_vent_config()?;
    let mut devices = vec![controller_config.device.clone()];
    devices.extend(summer_config.iter().map(|summer| summer.device.clone()));

    let (samples_tx, samples_rx) = mpsc::channel(SAMPLE_BUFFER);
    let (signals_tx, signals_rx) = mpsc::channel(SIGNAL_BUFFER);
    let (presses_tx, presses_rx) = mpsc::channel(PRESS_BUFFER);
    let mut bridge = MqttBridge::new(
        config.mqtt.clone(),
        config.sensor_bindings()?,
        devices,
        samples_tx,
        signals_tx,
    );
    if let Some(button_config) = &button_config {
        bridge = bridge.with_buttons([button_config.button.clone()], presses_tx);
    }
    let bridge_state = bridge.state();
    let (client, mqtt_task) = bridge.connect();

    // Ports
    let source = Arc::new(HubSensorSource::new(
        bridge_state.clone(),
        history.clone(),
        config.groups()?,
    ));
    let actuator = Arc::new(MqttActuator::new(
        client.clone(),
        bridge_state,
        config.mqtt.base_topic.clone(),
    ));
    let push = config
        .notifications
        .pushover
        .clone()
        .map(PushoverSink::new)
        .transpose()?;
    let speech = config
        .notifications
        .speech
        .clone()
        .map(|settings| MqttSpeechSink::new(client.clone(), settings));
    let notifier = Arc::new(Notifier::new(push, speech));

    // Background tasks
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let recorder_task = tokio::spawn(tasks::record_history(history.clone(), samples_rx));
    let purge_task = tokio::spawn(tasks::purge_history(
        history,
        config.retention(),
        config.purge_interval(),
        shutdown_rx.clone(),
    ));

    let controller = ActuationController::new(
        controller_config,
        source.clone(),
        actuator.clone(),
        cooldown,
        notifier.clone(),
    );
    let schedule = config.schedule()?;
    let controller_shutdown = shutdown_rx.clone();
    let controller_task = tokio::spawn(async move {
        scheduler::run(&controller, schedule, signals_rx, controller_shutdown).await;
    });

    let button_task = button_config.map(|button_config| {
        let announcer = config
            .notifications
            .speech
            .clone()
            .map(|settings| MqttSpeechSink::new(client.clone(), settings));
        let vent = ButtonVent::new(button_config, actuator.clone(), announcer);
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { vent.run(presses_rx, shutdown).await })
    });

    let summer_task = summer_config.map(|summer_config| {
        let summer = SummerVentilation::new(summer_config, source, actuator, notifier);
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { summer.run(shutdown).await })
    });

    tracing::info!("venthubd running");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    shutdown_tx.send_replace(true);
    controller_task.await?;
    for task in [summer_task, button_task].into_iter().flatten() {
        task.await?;
    }
    purge_task.await?;

    // Dropping the bridge closes the sample channel, which ends the recorder.
    mqtt_task.abort();
    recorder_task.await?;

    Ok(())
}
