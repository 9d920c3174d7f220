//! Actuation controller — one poll of the humidity-driven fan.
//!
//! Each [`tick`](ActuationController::tick) reads the cooldown gate, then the
//! sensor group, and turns the result into at most one actuator command:
//!
//! 1. An uninitialised gate is seeded and persisted; the tick stops there.
//! 2. Below the acceptable threshold the fan is stopped if this controller
//!    started it, without looking at history.
//! 3. Otherwise each sensor's average over the history window is attached,
//!    the readings are aggregated and the hysteresis decider picks between
//!    starting, stopping or holding.
//!
//! Ticks and forced-timeout handling share one lock, so a timeout recorded
//! between two ticks is always observed by the second one.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use venthub_domain::cooldown::{CooldownGate, CooldownState, GateStatus};
use venthub_domain::error::{ValidationError, VentHubError};
use venthub_domain::hysteresis::{Decision, Thresholds, decide};
use venthub_domain::id::{DeviceId, GroupId, SensorId};
use venthub_domain::notification::{Notification, Priority};
use venthub_domain::sensor::{self, AggregateState, SensorReading};
use venthub_domain::time::{MAX_SETTING_DURATION, Timestamp, to_chrono};

use crate::ports::{ActuatorCommand, CooldownStore, NotificationSink, SensorReadingSource};

/// Title used for controller notifications unless configured otherwise.
pub const DEFAULT_NOTIFICATION_TITLE: &str = "BATHROOM VENTILATION";

/// Immutable settings for one controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    pub device: DeviceId,
    pub sensor_group: GroupId,
    pub thresholds: Thresholds,
    /// How long actuation stays blocked after a forced timeout.
    pub block_duration: Duration,
    /// Length of the window the historical averages are taken over.
    pub history_window: Duration,
    /// Upper bound for each call to the sensor source.
    pub source_timeout: Duration,
    /// Upper bound for each call to the actuator, store or notifier.
    pub sink_timeout: Duration,
    pub notification_title: String,
}

impl ControllerConfig {
    /// Settings with the default block (30 min), window (48 h) and timeouts
    /// (10 s).
    #[must_use]
    pub fn new(device: DeviceId, sensor_group: GroupId, thresholds: Thresholds) -> Self {
        Self {
            device,
            sensor_group,
            thresholds,
            block_duration: Duration::from_secs(30 * 60),
            history_window: Duration::from_secs(48 * 60 * 60),
            source_timeout: Duration::from_secs(10),
            sink_timeout: Duration::from_secs(10),
            notification_title: DEFAULT_NOTIFICATION_TITLE.to_string(),
        }
    }

    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a bad threshold, or for a duration
    /// that is zero or longer than [`MAX_SETTING_DURATION`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.thresholds.validate()?;
        for (field, duration) in [
            ("block_duration", self.block_duration),
            ("history_window", self.history_window),
            ("source_timeout", self.source_timeout),
            ("sink_timeout", self.sink_timeout),
        ] {
            if duration.is_zero() {
                return Err(ValidationError::ZeroDuration { field });
            }
            if duration > MAX_SETTING_DURATION {
                return Err(ValidationError::DurationTooLong { field });
            }
        }
        Ok(())
    }
}

/// What a completed tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The cooldown was uninitialised; it was seeded and nothing else ran.
    Bootstrapped { until: Timestamp },
    /// Demand found and the device was switched on.
    TurnedOn { aggregate: AggregateState },
    /// Demand found but the device was already on.
    AlreadyOn,
    /// Target reached and the device was switched off.
    TurnedOff,
    /// Target reached and the device was already off.
    Idle,
    /// Demand found but the cooldown forbids starting.
    Held { until: Timestamp },
}

/// Why a tick was aborted. No command was issued and no state was written.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    #[error("sensor source unreachable")]
    SourceUnreachable(#[source] VentHubError),

    #[error("no sensor history could be read")]
    HistoryUnavailable,

    #[error("cooldown store unavailable")]
    Store(#[source] VentHubError),

    #[error("actuator unavailable")]
    Actuator(#[source] VentHubError),

    #[error("{operation} timed out after {limit:?}")]
    TimedOut {
        operation: &'static str,
        limit: Duration,
    },
}

/// Humidity-driven actuation controller for one device.
pub struct ActuationController<S, A, C, N> {
    config: ControllerConfig,
    source: S,
    actuator: A,
    cooldown: C,
    notifier: N,
    lock: Mutex<()>,
}

impl<S, A, C, N> ActuationController<S, A, C, N>
where
    S: SensorReadingSource,
    A: ActuatorCommand,
    C: CooldownStore,
    N: NotificationSink,
{
    /// Create a controller; `config` is expected to be validated already.
    pub fn new(config: ControllerConfig, source: S, actuator: A, cooldown: C, notifier: N) -> Self {
        Self {
            config,
            source,
            actuator,
            cooldown,
            notifier,
            lock: Mutex::new(()),
        }
    }

    /// The settings this controller runs with.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Run one poll at `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`TickError`] when a collaborator fails or times out; the
    /// tick is then skipped entirely and retried on the next cadence.
    pub async fn tick(&self, now: Timestamp) -> Result<TickOutcome, TickError> {
        let _guard = self.lock.lock().await;
        let device = &self.config.device;

        let status = self.observe_gate(now).await?;
        if let GateStatus::Bootstrapped { until } = status {
            self.persist_deadline(until).await?;
            tracing::info!(
                device = %device,
                blocked_until = %until,
                "cooldown initialised, skipping this poll"
            );
            return Ok(TickOutcome::Bootstrapped { until });
        }

        let readings = bounded(
            "get_readings",
            self.config.source_timeout,
            self.source.get_readings(&self.config.sensor_group),
            TickError::SourceUnreachable,
        )
        .await?;

        let current_max = sensor::current_max(&readings);
        if current_max < self.config.thresholds.acceptable_threshold {
            tracing::debug!(device = %device, current_max, "below acceptable threshold");
            return self.target_reached(current_max, None).await;
        }

        let (readings, failed) = self.attach_history(readings, now).await?;
        let aggregation = sensor::aggregate(&readings);
        for id in aggregation.missing_history.iter().filter(|id| !failed.contains(id)) {
            tracing::info!(sensor = %id, "no history in window, sensor adds nothing to baseline");
        }

        let state = aggregation.state;
        let target = self.config.thresholds.target(state.baseline_average);
        match decide(&state, &self.config.thresholds, status.is_blocked()) {
            Decision::Deactuate => self.target_reached(state.current_max, Some(target)).await,
            Decision::Actuate => self.start(state, target).await,
            Decision::NoChange => {
                let until = status.blocked_until().unwrap_or(now);
                tracing::debug!(
                    device = %device,
                    current_max = state.current_max,
                    target,
                    blocked_until = %until,
                    "demand exists but cooldown forbids actuation"
                );
                Ok(TickOutcome::Held { until })
            }
        }
    }

    /// Record that the device switched itself off: block actuation for a
    /// full window starting at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Store`] or [`TickError::TimedOut`] if the new
    /// deadline could not be persisted.
    pub async fn on_forced_timeout(&self, now: Timestamp) -> Result<Timestamp, TickError> {
        let _guard = self.lock.lock().await;
        let mut gate = CooldownGate::new(CooldownState::default(), self.block_duration());
        let until = gate.on_forced_timeout(now);
        self.persist_deadline(until).await?;
        tracing::info!(
            device = %self.config.device,
            blocked_until = %until,
            "forced timeout, actuation blocked"
        );
        Ok(until)
    }

    fn block_duration(&self) -> chrono::Duration {
        to_chrono(self.config.block_duration)
    }

    async fn observe_gate(&self, now: Timestamp) -> Result<GateStatus, TickError> {
        let blocked_until = bounded(
            "cooldown_get",
            self.config.sink_timeout,
            self.cooldown.get(&self.config.device),
            TickError::Store,
        )
        .await?;
        let mut gate = CooldownGate::new(CooldownState { blocked_until }, self.block_duration());
        Ok(gate.observe(now))
    }

    async fn persist_deadline(&self, until: Timestamp) -> Result<(), TickError> {
        bounded(
            "cooldown_set",
            self.config.sink_timeout,
            self.cooldown.set(&self.config.device, until),
            TickError::Store,
        )
        .await
    }

    /// Attach each sensor's historical average. Returns the readings and the
    /// sensors whose lookup failed.
    async fn attach_history(
        &self,
        readings: Vec<SensorReading>,
        now: Timestamp,
    ) -> Result<(Vec<SensorReading>, Vec<SensorId>), TickError> {
        let start = now
            .checked_sub_signed(to_chrono(self.config.history_window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut failed = Vec::new();
        let mut enriched = Vec::with_capacity(readings.len());

        for reading in readings {
            let lookup = bounded(
                "historical_average",
                self.config.source_timeout,
                self.source.historical_average(&reading.id, start, now),
                TickError::SourceUnreachable,
            )
            .await;
            let average = match lookup {
                Ok(average) => average,
                Err(error) => {
                    tracing::warn!(sensor = %reading.id, %error, "history lookup failed");
                    failed.push(reading.id.clone());
                    None
                }
            };
            enriched.push(reading.with_history(average));
        }

        if !enriched.is_empty() && failed.len() == enriched.len() {
            return Err(TickError::HistoryUnavailable);
        }
        Ok((enriched, failed))
    }

    async fn start(&self, state: AggregateState, target: f64) -> Result<TickOutcome, TickError> {
        let device = &self.config.device;
        if self.device_is_on().await? {
            tracing::debug!(device = %device, "demand exists, device already on");
            return Ok(TickOutcome::AlreadyOn);
        }

        bounded(
            "force_on",
            self.config.sink_timeout,
            self.actuator.force_on(device),
            TickError::Actuator,
        )
        .await?;
        tracing::info!(
            device = %device,
            current_max = state.current_max,
            baseline = state.baseline_average,
            target,
            "humidity above target, device turned on"
        );
        self.send(format!(
            "Humidity {}% above target {}% (baseline {}%), fan started",
            state.current_max, target, state.baseline_average
        ))
        .await;
        Ok(TickOutcome::TurnedOn { aggregate: state })
    }

    /// Stop the device if we started it. `target` is `None` when the tick stopped
    /// at the acceptable threshold.
    async fn target_reached(
        &self,
        current_max: f64,
        target: Option<f64>,
    ) -> Result<TickOutcome, TickError> {
        let device = &self.config.device;
        if !self.device_is_on().await? {
            return Ok(TickOutcome::Idle);
        }

        bounded(
            "force_off",
            self.config.sink_timeout,
            self.actuator.force_off(device),
            TickError::Actuator,
        )
        .await?;
        tracing::info!(device = %device, current_max, ?target, "target reached, device turned off");
        let message = match target {
            Some(target) => {
                format!("Humidity {current_max}% back under target {target}%, fan stopped")
            }
            None => format!(
                "Humidity {current_max}% below acceptable {}%, fan stopped",
                self.config.thresholds.acceptable_threshold
            ),
        };
        self.send(message).await;
        Ok(TickOutcome::TurnedOff)
    }

    async fn device_is_on(&self) -> Result<bool, TickError> {
        bounded(
            "is_on",
            self.config.sink_timeout,
            self.actuator.is_on(&self.config.device),
            TickError::Actuator,
        )
        .await
    }

    async fn send(&self, message: String) {
        let notification =
            Notification::new(message, self.config.notification_title.clone(), Priority::Low);
        let limit = self.config.sink_timeout;
        match tokio::time::timeout(limit, self.notifier.notify(notification)).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => tracing::warn!(%error, "failed to send notification"),
            Err(_) => tracing::warn!("notification timed out"),
        }
    }
}

/// Await `future` for at most `limit`, mapping its error with `wrap`.
async fn bounded<T>(
    operation: &'static str,
    limit: Duration,
    future: impl Future<Output = Result<T, VentHubError>>,
    wrap: fn(VentHubError) -> TickError,
) -> Result<T, TickError> {
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result.map_err(wrap),
        Err(_) => Err(TickError::TimedOut { operation, limit }),
    }
}
