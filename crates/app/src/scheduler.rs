//! Poll scheduler — drives a controller on a fixed cadence.
//!
//! The first tick runs after `initial_delay`, then every `poll_interval`.
//! Actuator signals are handled on the same task as the ticks, so a forced
//! timeout is always recorded before the next poll starts.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use venthub_domain::error::ValidationError;
use venthub_domain::time::now;

use crate::controller::{ActuationController, TickOutcome};
use crate::ports::{
    ActuatorCommand, ActuatorSignal, CooldownStore, NotificationSink, SensorReadingSource,
};

/// When a controller polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub initial_delay: Duration,
    pub poll_interval: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(10),
            poll_interval: Duration::from_secs(5 * 60),
        }
    }
}

impl Schedule {
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroDuration`] if the poll interval is zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.poll_interval.is_zero() {
            return Err(ValidationError::ZeroDuration {
                field: "poll_interval",
            });
        }
        Ok(())
    }
}

/// Run `controller` until `shutdown` flips to `true` or its sender is dropped.
///
/// Tick failures are logged and never stop the loop.
pub async fn run<S, A, C, N>(
    controller: &ActuationController<S, A, C, N>,
    schedule: Schedule,
    mut signals: mpsc::Receiver<ActuatorSignal>,
    mut shutdown: watch::Receiver<bool>,
) where
    S: SensorReadingSource,
    A: ActuatorCommand,
    C: CooldownStore,
    N: NotificationSink,
{
    let device = controller.config().device.clone();
    let start = tokio::time::Instant::now() + schedule.initial_delay;
    let mut ticker = tokio::time::interval_at(start, schedule.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        device = %device,
        initial_delay = ?schedule.initial_delay,
        poll_interval = ?schedule.poll_interval,
        "controller scheduled"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => poll(controller).await,
            Some(signal) = signals.recv() => handle_signal(controller, signal).await,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!(device = %device, "controller stopped");
}

async fn poll<S, A, C, N>(controller: &ActuationController<S, A, C, N>)
where
    S: SensorReadingSource,
    A: ActuatorCommand,
    C: CooldownStore,
    N: NotificationSink,
{
    let device = &controller.config().device;
    match controller.tick(now()).await {
        Ok(TickOutcome::TurnedOn { .. } | TickOutcome::TurnedOff) => {}
        Ok(outcome) => tracing::debug!(device = %device, ?outcome, "tick complete"),
        Err(error) => tracing::error!(device = %device, %error, "tick skipped"),
    }
}

async fn handle_signal<S, A, C, N>(
    controller: &ActuationController<S, A, C, N>,
    signal: ActuatorSignal,
) where
    S: SensorReadingSource,
    A: ActuatorCommand,
    C: CooldownStore,
    N: NotificationSink,
{
    match signal {
        ActuatorSignal::ForcedOff { device } if device == controller.config().device => {
            if let Err(error) = controller.on_forced_timeout(now()).await {
                tracing::error!(device = %device, %error, "failed to record forced timeout");
            }
        }
        ActuatorSignal::ForcedOff { device } => {
            tracing::debug!(device = %device, "ignoring signal for another device");
        }
    }
}
