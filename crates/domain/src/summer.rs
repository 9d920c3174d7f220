//! Summer ventilation policy.
//!
//! On warm summer days the house is cooled by running a ventilation unit when
//! the outdoor air is both clean and noticeably cooler than indoors.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Tunables for [`should_ventilate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummerPolicy {
    /// First month (1-12) of the season, inclusive.
    pub first_month: u32,
    /// Last month (1-12) of the season, inclusive.
    pub last_month: u32,
    /// Highest acceptable outdoor PM2.5 (µg/m³).
    pub max_pm2_5: f64,
    /// Indoor temperature (°C) from which cooling is wanted.
    pub min_indoor: f64,
    /// How much cooler (°C) outside must be.
    pub min_delta: f64,
}

impl Default for SummerPolicy {
    fn default() -> Self {
        Self {
            first_month: 5,
            last_month: 8,
            max_pm2_5: 10.0,
            min_indoor: 25.0,
            min_delta: 2.0,
        }
    }
}

impl SummerPolicy {
    /// Whether `month` (1-12) falls inside the season.
    #[must_use]
    pub fn in_season(&self, month: u32) -> bool {
        (self.first_month..=self.last_month).contains(&month)
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidNumber`] for an out-of-range month or
    /// a non-finite threshold.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=12).contains(&self.first_month) || self.first_month > self.last_month {
            return Err(ValidationError::InvalidNumber {
                field: "first_month",
            });
        }
        if !(1..=12).contains(&self.last_month) {
            return Err(ValidationError::InvalidNumber {
                field: "last_month",
            });
        }
        for (field, value) in [
            ("max_pm2_5", self.max_pm2_5),
            ("min_indoor", self.min_indoor),
            ("min_delta", self.min_delta),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::InvalidNumber { field });
            }
        }
        Ok(())
    }
}

/// Measurements the policy looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummerConditions {
    pub pm2_5: f64,
    pub indoor: f64,
    pub outdoor: f64,
}

/// Whether the summer vent should run. Temperatures are compared after
/// rounding to whole degrees; PM2.5 is truncated to a whole number first, so
/// 10.9 passes a limit of 10.
#[must_use]
pub fn should_ventilate(month: u32, conditions: &SummerConditions, policy: &SummerPolicy) -> bool {
    if !policy.in_season(month) {
        return false;
    }
    let indoor = conditions.indoor.round_ties_even();
    let outdoor = conditions.outdoor.round_ties_even();
    conditions.pm2_5.trunc() <= policy.max_pm2_5
        && indoor >= policy.min_indoor
        && outdoor < indoor - policy.min_delta
}
