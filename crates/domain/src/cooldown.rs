//! Cooldown gate — blocks actuation for a while after a forced timeout.
//!
//! The gate has two states, `Open` and `Blocked`, and the only stored datum is
//! the `blocked_until` deadline. `Blocked → Open` happens purely by time
//! passing; there is no explicit transition event.
//!
//! A gate that has never been initialised seeds itself to
//! `now + block_duration` the first time it is observed and reports that it
//! just did so ([`GateStatus::Bootstrapped`]). Until real behaviour is known
//! the controller stays conservative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Durable part of the gate, persisted per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CooldownState {
    /// `None` means the gate was never initialised.
    pub blocked_until: Option<Timestamp>,
}

/// What an observation of the gate found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// Actuation is permitted.
    Open,
    /// Actuation is forbidden until the deadline.
    Blocked { until: Timestamp },
    /// The gate was uninitialised and has just been seeded; it is blocked.
    Bootstrapped { until: Timestamp },
}

impl GateStatus {
    /// Whether actuation is currently forbidden.
    #[must_use]
    pub fn is_blocked(self) -> bool {
        !matches!(self, Self::Open)
    }

    /// Deadline of the current block, if any.
    #[must_use]
    pub fn blocked_until(self) -> Option<Timestamp> {
        match self {
            Self::Open => None,
            Self::Blocked { until } | Self::Bootstrapped { until } => Some(until),
        }
    }
}

/// In-memory view of a device's cooldown, combined with the block policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownGate {
    state: CooldownState,
    block_duration: chrono::Duration,
}

impl CooldownGate {
    /// Wrap a loaded state with the configured block duration.
    #[must_use]
    pub fn new(state: CooldownState, block_duration: chrono::Duration) -> Self {
        Self {
            state,
            block_duration,
        }
    }

    /// Observe the gate at `now`, seeding it if it was never initialised.
    pub fn observe(&mut self, now: Timestamp) -> GateStatus {
        match self.state.blocked_until {
            None => {
                let until = self.deadline_from(now);
                self.state.blocked_until = Some(until);
                GateStatus::Bootstrapped { until }
            }
            Some(until) if now < until => GateStatus::Blocked { until },
            Some(_) => GateStatus::Open,
        }
    }

    /// `true` iff actuation is forbidden at `now`. Seeds an uninitialised gate.
    pub fn is_blocked(&mut self, now: Timestamp) -> bool {
        self.observe(now).is_blocked()
    }

    /// Start a fresh block window at `now`, whatever the previous deadline.
    pub fn on_forced_timeout(&mut self, now: Timestamp) -> Timestamp {
        let until = self.deadline_from(now);
        self.state.blocked_until = Some(until);
        until
    }

    /// End of a block starting at `now`; saturates at the last representable
    /// instant.
    fn deadline_from(&self, now: Timestamp) -> Timestamp {
        now.checked_add_signed(self.block_duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Current durable state.
    #[must_use]
    pub fn state(&self) -> CooldownState {
        self.state
    }
}
