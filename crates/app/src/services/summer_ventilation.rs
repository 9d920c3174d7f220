//! Summer ventilation service — cools the house with outdoor air on warm
//! summer days.

use std::time::Duration;

use chrono::Datelike;
use tokio::sync::{Mutex, watch};
use venthub_domain::error::VentHubError;
use venthub_domain::id::{DeviceId, SensorId};
use venthub_domain::notification::{Notification, Priority};
use venthub_domain::summer::{SummerConditions, SummerPolicy, should_ventilate};
use venthub_domain::time::{Timestamp, now};

use crate::ports::{ActuatorCommand, NotificationSink, SensorReadingSource};

/// Wiring and cadence of the summer ventilation rule.
#[derive(Debug, Clone, PartialEq)]
pub struct SummerVentilationConfig {
    pub device: DeviceId,
    pub pm2_5_sensor: SensorId,
    pub indoor_sensor: SensorId,
    pub outdoor_sensor: SensorId,
    pub policy: SummerPolicy,
    pub initial_delay: Duration,
    pub interval: Duration,
    pub notification_title: String,
}

/// What one evaluation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummerOutcome {
    Started,
    Stopped,
    Unchanged,
    /// A temperature sensor had no value; nothing was changed.
    MissingData,
}

pub struct SummerVentilation<S, A, N> {
    config: SummerVentilationConfig,
    source: S,
    actuator: A,
    notifier: N,
    lock: Mutex<()>,
}

impl<S, A, N> SummerVentilation<S, A, N>
where
    S: SensorReadingSource,
    A: ActuatorCommand,
    N: NotificationSink,
{
    pub fn new(config: SummerVentilationConfig, source: S, actuator: A, notifier: N) -> Self {
        Self {
            config,
            source,
            actuator,
            notifier,
            lock: Mutex::new(()),
        }
    }

    /// Evaluate the policy at `now` and switch the vent on a transition.
    /// Outside the season the vent is left as it is.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if a sensor read or actuator command fails.
    pub async fn evaluate(&self, now: Timestamp) -> Result<SummerOutcome, VentHubError> {
        let _guard = self.lock.lock().await;
        let device = &self.config.device;

        let month = now.with_timezone(&chrono::Local).month();
        if !self.config.policy.in_season(month) {
            tracing::trace!(device = %device, month, "out of season");
            return Ok(SummerOutcome::Unchanged);
        }
        let Some(conditions) = self.conditions().await? else {
            tracing::warn!(device = %device, "summer ventilation inputs unavailable");
            return Ok(SummerOutcome::MissingData);
        };
        let wanted = should_ventilate(month, &conditions, &self.config.policy);
        let running = self.actuator.is_on(device).await?;

        match (wanted, running) {
            (true, false) => {
                self.actuator.force_on(device).await?;
                tracing::info!(
                    device = %device,
                    indoor = conditions.indoor,
                    outdoor = conditions.outdoor,
                    pm2_5 = conditions.pm2_5,
                    "summer ventilation started"
                );
                let message = format!(
                    "Summer ventilation started: indoor {}°C, outdoor {}°C",
                    conditions.indoor.round(),
                    conditions.outdoor.round()
                );
                let title = self.config.notification_title.clone();
                let notification = Notification::new(message, title, Priority::Low);
                if let Err(error) = self.notifier.notify(notification).await {
                    tracing::warn!(%error, "failed to send notification");
                }
                Ok(SummerOutcome::Started)
            }
            (false, true) => {
                self.actuator.force_off(device).await?;
                tracing::info!(device = %device, "summer ventilation stopped");
                Ok(SummerOutcome::Stopped)
            }
            _ => Ok(SummerOutcome::Unchanged),
        }
    }

    /// Current inputs. A missing PM2.5 reading counts as clean air.
    async fn conditions(&self) -> Result<Option<SummerConditions>, VentHubError> {
        let pm2_5 = self.source.current_value(&self.config.pm2_5_sensor).await?;
        let indoor = self.source.current_value(&self.config.indoor_sensor).await?;
        let outdoor = self.source.current_value(&self.config.outdoor_sensor).await?;
        Ok(match (indoor, outdoor) {
            (Some(indoor), Some(outdoor)) => Some(SummerConditions {
                pm2_5: pm2_5.unwrap_or(0.0),
                indoor,
                outdoor,
            }),
            _ => None,
        })
    }

    /// Evaluate after `initial_delay`, then every `interval`, until shutdown.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let start = tokio::time::Instant::now() + self.config.initial_delay;
        let mut ticker = tokio::time::interval_at(start, self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(error) = self.evaluate(now()).await {
                        let device = &self.config.device;
                        tracing::error!(device = %device, %error, "summer evaluation failed");
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
}
