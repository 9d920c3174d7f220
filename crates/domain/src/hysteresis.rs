//! Hysteresis decider — turns an aggregate into an actuation decision.
//!
//! Actuation starts only when the current value exceeds the baseline by
//! `hysteresis_margin`, and never below `never_actuate_below`. It stops as soon
//! as the value falls back under that target, or under the absolute
//! `acceptable_threshold`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::sensor::AggregateState;

/// Static thresholds for one controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Below this value there is never any demand.
    pub acceptable_threshold: f64,
    /// Margin added on top of the baseline.
    pub hysteresis_margin: f64,
    /// Floor for the target, guarding against an anomalously low baseline.
    pub never_actuate_below: f64,
}

impl Thresholds {
    /// Check that every threshold is a finite, non-negative number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidNumber`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("acceptable_threshold", self.acceptable_threshold),
            ("hysteresis_margin", self.hysteresis_margin),
            ("never_actuate_below", self.never_actuate_below),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidNumber { field });
            }
        }
        Ok(())
    }

    /// Value the current reading has to exceed for actuation to start.
    #[must_use]
    pub fn target(&self, baseline_average: f64) -> f64 {
        (baseline_average + self.hysteresis_margin).max(self.never_actuate_below)
    }
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Demand exists and nothing forbids starting.
    Actuate,
    /// The target is reached; stop any running actuation.
    Deactuate,
    /// Demand exists but the cooldown forbids starting.
    NoChange,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Actuate => "actuate",
            Self::Deactuate => "deactuate",
            Self::NoChange => "no_change",
        })
    }
}

/// Decide what to do with the actuator for one poll.
#[must_use]
pub fn decide(
    aggregate: &AggregateState,
    thresholds: &Thresholds,
    cooldown_blocked: bool,
) -> Decision {
    if aggregate.current_max < thresholds.acceptable_threshold {
        return Decision::Deactuate;
    }
    if aggregate.current_max <= thresholds.target(aggregate.baseline_average) {
        return Decision::Deactuate;
    }
    if cooldown_blocked {
        return Decision::NoChange;
    }
    Decision::Actuate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        Thresholds {
            acceptable_threshold: 41.0,
            hysteresis_margin: 5.0,
            never_actuate_below: 50.0,
        }
    }

    fn state(current_max: f64, baseline_average: f64) -> AggregateState {
        AggregateState {
            current_max,
            baseline_average,
        }
    }

    #[test]
    fn should_deactuate_when_below_acceptable_regardless_of_baseline() {
        let t = thresholds();
        for baseline in [0.0, 20.0, 80.0] {
            assert_eq!(decide(&state(38.0, baseline), &t, false), Decision::Deactuate);
            assert_eq!(decide(&state(38.0, baseline), &t, true), Decision::Deactuate);
        }
    }

    #[test]
    fn should_actuate_when_above_floor_target_and_open() {
        // target = max(30 + 5, 50) = 50
        let t = thresholds();
        assert_eq!(decide(&state(55.0, 30.0), &t, false), Decision::Actuate);
    }

    #[test]
    fn should_hold_when_demand_exists_but_cooldown_blocks() {
        let t = thresholds();
        assert_eq!(decide(&state(55.0, 30.0), &t, true), Decision::NoChange);
    }

    #[test]
    fn should_deactuate_when_equal_to_target() {
        let t = thresholds();
        assert_eq!(decide(&state(50.0, 30.0), &t, false), Decision::Deactuate);
    }

    #[test]
    fn should_use_baseline_plus_margin_when_above_floor() {
        // target = max(60 + 5, 50) = 65
        let t = thresholds();
        assert_eq!(decide(&state(64.0, 60.0), &t, false), Decision::Deactuate);
        assert_eq!(decide(&state(66.0, 60.0), &t, false), Decision::Actuate);
    }

    #[test]
    fn should_compute_target_with_floor() {
        let t = thresholds();
        assert!((t.target(30.0) - 50.0).abs() < f64::EPSILON);
        assert!((t.target(52.0) - 57.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_reject_negative_or_nan_thresholds() {
        let mut t = thresholds();
        t.hysteresis_margin = -1.0;
        assert_eq!(
            t.validate(),
            Err(ValidationError::InvalidNumber {
                field: "hysteresis_margin"
            })
        );

        let mut t = thresholds();
        t.acceptable_threshold = f64::NAN;
        assert!(t.validate().is_err());
    }

    #[test]
    fn should_accept_valid_thresholds() {
        assert!(thresholds().validate().is_ok());
    }

    #[test]
    fn should_display_decision_in_snake_case() {
        assert_eq!(Decision::NoChange.to_string(), "no_change");
        assert_eq!(Decision::Actuate.to_string(), "actuate");
    }
}
