//! Background upkeep of the sensor history.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use venthub_app::ports::SensorHistoryRepository;
use venthub_domain::sensor::SensorSample;
use venthub_domain::time::{now, to_chrono};

/// Store every sample the MQTT bridge parses. Ends when the bridge is gone.
pub async fn record_history<H: SensorHistoryRepository>(
    history: H,
    mut samples: mpsc::Receiver<SensorSample>,
) {
    while let Some(sample) = samples.recv().await {
        let sensor = sample.sensor_id.clone();
        if let Err(error) = history.record(sample).await {
            tracing::warn!(sensor = %sensor, %error, "failed to record sample");
        }
    }
    tracing::debug!("history recorder stopped");
}

/// Drop samples older than `retention`, right away and then every
/// `interval`, until shutdown.
pub async fn purge_history<H: SensorHistoryRepository>(
    history: H,
    retention: Duration,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let retention = to_chrono(retention);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let cutoff = now()
                    .checked_sub_signed(retention)
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                match history.purge_before(cutoff).await {
                    Ok(0) => {}
                    Ok(removed) => tracing::info!(removed, "purged old sensor samples"),
                    Err(error) => tracing::warn!(%error, "history purge failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}
