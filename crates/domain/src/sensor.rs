//! Sensor readings and the history aggregator.
//!
//! A controller polls a *group* of sensors and reduces their readings into an
//! [`AggregateState`]: the highest current value, and a baseline derived from
//! each sensor's historical average.
//!
//! The baseline uses a **ratchet**: scanning the readings in the order they
//! were supplied, a sensor's rounded average only counts if it exceeds every
//! average admitted before it. Lower averages seen later are discarded, which
//! biases the baseline toward the wettest sensor. The scan order is therefore
//! part of the result and [`aggregate`] never reorders its input.

use serde::{Deserialize, Serialize};

use crate::id::SensorId;
use crate::time::Timestamp;

/// One sensor's view for a single poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: SensorId,
    /// Latest value; `None` when the sensor is currently unavailable.
    pub current: Option<f64>,
    /// Mean over the history window; `None` when the store had no data.
    pub historical_average: Option<f64>,
}

impl SensorReading {
    /// A reading with a current value and no history attached yet.
    #[must_use]
    pub fn current(id: SensorId, current: Option<f64>) -> Self {
        Self {
            id,
            current,
            historical_average: None,
        }
    }

    /// Attach a historical average.
    #[must_use]
    pub fn with_history(mut self, historical_average: Option<f64>) -> Self {
        self.historical_average = historical_average;
        self
    }
}

/// A single timestamped value, as recorded into the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub sensor_id: SensorId,
    pub value: f64,
    pub recorded_at: Timestamp,
}

/// The representative values for one poll.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateState {
    /// Highest current value, with unavailable sensors counted as 0.
    pub current_max: f64,
    /// Rounded mean of the ratcheted historical averages, or 0.
    pub baseline_average: f64,
}

/// Result of [`aggregate`]: the state plus the sensors whose history lookup
/// came back empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregation {
    pub state: AggregateState,
    pub missing_history: Vec<SensorId>,
}

/// Highest current value across `readings`; unavailable sensors count as 0
/// and an empty slice yields 0.
///
/// The fold starts at 0, so the result is never negative: readings that are
/// all below zero also yield 0. Relative humidity cannot go negative, so this
/// only matters for other kinds of sensor.
#[must_use]
pub fn current_max(readings: &[SensorReading]) -> f64 {
    readings
        .iter()
        .map(|r| r.current.unwrap_or(0.0))
        .fold(0.0, f64::max)
}

/// Reduce `readings` into an [`Aggregation`], scanning in the given order.
#[must_use]
pub fn aggregate(readings: &[SensorReading]) -> Aggregation {
    let mut running_max = 0.0;
    let mut kept = Vec::new();
    let mut missing_history = Vec::new();

    for reading in readings {
        let Some(average) = reading.historical_average else {
            missing_history.push(reading.id.clone());
            continue;
        };
        let value = average.round_ties_even();
        if value > running_max {
            running_max = value;
            kept.push(value);
        }
    }

    Aggregation {
        state: AggregateState {
            current_max: current_max(readings),
            baseline_average: mean(&kept).map_or(0.0, f64::round_ties_even),
        },
        missing_history,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    // A sensor group never holds anywhere near 2^52 members.
    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;
    Some(values.iter().sum::<f64>() / len)
}
