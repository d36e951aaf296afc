//! Position smoothing for sequences of noisy fixes.
//!
//! Two interchangeable strategies sit behind the [`PositionFilter`] trait: a
//! velocity-augmented Kalman filter for moving devices and a weighted moving
//! average for near-stationary use. Filters hold per-session mutable state
//! and must be exclusively owned by one logical tracking session; see
//! [`crate::session`].

mod kalman;
mod matrix;
mod moving_average;

pub use kalman::{KalmanConfig, KalmanPositionFilter};
pub use matrix::Mat2;
pub use moving_average::{MovingAverageConfig, MovingAverageFilter};

use chrono::{DateTime, Utc};
use geo_presence_core::{GeoPoint, PositionFix};

/// One measurement fed to a position filter.
///
/// Speed and heading are optional extras some devices report alongside the
/// fix; when present, the Kalman filter trusts them over its own
/// position-derivative velocity estimate.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilterMeasurement {
    /// The raw position fix
    pub fix: PositionFix,
    /// Device-reported ground speed in meters per second
    pub speed_mps: Option<f64>,
    /// Device-reported heading in degrees clockwise from north
    pub heading_deg: Option<f64>,
}

impl FilterMeasurement {
    /// Wrap a bare fix with no speed or heading.
    #[must_use]
    pub fn from_fix(fix: PositionFix) -> Self {
        Self {
            fix,
            speed_mps: None,
            heading_deg: None,
        }
    }
}

/// A smoothed position produced by a filter update.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SmoothedFix {
    /// Smoothed position
    pub point: GeoPoint,
    /// Estimated accuracy of the smoothed position, in meters
    pub accuracy_m: f64,
    /// Timestamp of the measurement that produced this estimate
    pub timestamp: DateTime<Utc>,
    /// Speed carried through from the measurement, if reported
    pub speed_mps: Option<f64>,
    /// Heading carried through from the measurement, if reported
    pub heading_deg: Option<f64>,
}

/// A stateful smoother of successive position fixes.
///
/// Implementations perform no locking; concurrent use of one filter instance
/// requires external synchronization.
pub trait PositionFilter {
    /// Fold one measurement into the estimate and return the smoothed fix.
    fn update(&mut self, measurement: &FilterMeasurement) -> SmoothedFix;

    /// Discard all state, returning the filter to its uninitialized state.
    fn reset(&mut self);

    /// Whether the filter has seen at least one measurement since the last
    /// reset.
    fn is_tracking(&self) -> bool;
}
