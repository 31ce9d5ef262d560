//! Period-over-period change of a single metric.

use serde::{Deserialize, Serialize};

/// Changes smaller than this (in percent) are reported as stable.
const STABLE_THRESHOLD_PERCENT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Difference between two period values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    /// Signed difference `current - previous`.
    pub value: f64,
    /// Magnitude of the relative change in percent; 0 when `previous` is 0.
    pub percentage: f64,
    pub direction: TrendDirection,
}

pub fn calculate_trend(current: f64, previous: f64) -> Trend {
    let difference = current - previous;
    let percentage = if previous == 0.0 {
        0.0
    } else {
        difference / previous * 100.0
    };

    let direction = if percentage.abs() < STABLE_THRESHOLD_PERCENT {
        TrendDirection::Stable
    } else if percentage > 0.0 {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };

    Trend {
        value: difference,
        percentage: percentage.abs(),
        direction,
    }
}
