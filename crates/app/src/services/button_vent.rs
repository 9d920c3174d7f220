//! Button vent — a wall button that runs an extra vent for a while.
//!
//! Every press switches the vent on, which restarts the vent's own run timer
//! even when it is already running, and plays a short clip in the room.

use tokio::sync::{mpsc, watch};
use venthub_domain::error::VentHubError;
use venthub_domain::id::DeviceId;
use venthub_domain::notification::Priority;
use venthub_domain::speech::SpeechRequest;

use crate::ports::{ActuatorCommand, Announcer};

/// Which button drives which vent, and what the speakers play on a press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonVentConfig {
    pub button: DeviceId,
    pub device: DeviceId,
    /// Clip file name, e.g. `joke_sting.mp3`.
    pub clip: String,
    /// Room to play the clip in; `None` uses the speakers' default room.
    pub room: Option<String>,
    pub volume: Option<u8>,
}

pub struct ButtonVent<A, S> {
    config: ButtonVentConfig,
    actuator: A,
    announcer: Option<S>,
}

impl<A, S> ButtonVent<A, S>
where
    A: ActuatorCommand,
    S: Announcer,
{
    /// `announcer` is `None` when no speakers are configured.
    pub fn new(config: ButtonVentConfig, actuator: A, announcer: Option<S>) -> Self {
        Self {
            config,
            actuator,
            announcer,
        }
    }

    /// Handle one press: start the vent, then play the clip.
    ///
    /// # Errors
    ///
    /// Returns the actuator's error if the vent could not be switched on. A
    /// failed announcement is only logged.
    pub async fn on_press(&self) -> Result<(), VentHubError> {
        let device = &self.config.device;
        tracing::info!(button = %self.config.button, device = %device, "vent button pressed");
        self.actuator.force_on(device).await?;

        if let Some(announcer) = &self.announcer {
            let mut request = SpeechRequest::new(self.config.clip.clone(), Priority::Moderate);
            request.room.clone_from(&self.config.room);
            request.volume = self.config.volume;
            if let Err(error) = announcer.announce(request).await {
                tracing::warn!(device = %device, %error, "failed to play button clip");
            }
        }
        Ok(())
    }

    /// Handle presses until `shutdown` flips to `true` or the press channel
    /// closes. Presses of other buttons are ignored.
    pub async fn run(
        &self,
        mut presses: mpsc::Receiver<DeviceId>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                press = presses.recv() => match press {
                    Some(button) if button == self.config.button => {
                        if let Err(error) = self.on_press().await {
                            let device = &self.config.device;
                            tracing::error!(device = %device, %error, "vent button press failed");
                        }
                    }
                    Some(button) => {
                        tracing::debug!(button = %button, "press from unhandled button");
                    }
                    None => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!(button = %self.config.button, "button vent stopped");
    }
}
