//! Kalman position filter over latitude/longitude fixes.
//!
//! Linear filter with a velocity-augmented 2-D state: position in degrees,
//! velocity in meters per second (north, east), and a 2x2 positional
//! covariance in square meters seeded from the first fix's reported
//! accuracy. Velocity propagates the prediction through the local
//! meters-per-degree conversion at the current latitude.
//!
//! Recovery rules, both local and silent to the caller:
//! - a measurement not later than the last update returns the previous
//!   output unchanged (out-of-order or duplicate timestamps);
//! - a singular innovation covariance skips the correction and keeps the
//!   prediction (degenerate accuracy values).

use chrono::{DateTime, Utc};

use geo_presence_core::{meters_per_degree_lat, meters_per_degree_lon, GeoPoint};

use super::matrix::Mat2;
use super::{FilterMeasurement, PositionFilter, SmoothedFix};

/// Configuration for [`KalmanPositionFilter`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct KalmanConfig {
    /// Process noise added to each positional variance per second of
    /// prediction, in square meters per second.
    pub process_noise: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self { process_noise: 1.0 }
    }
}

/// Internal tracking state, created on the first measurement.
#[derive(Debug, Clone)]
struct KalmanState {
    /// Current position estimate
    position: GeoPoint,
    /// Northward velocity in m/s
    v_north_mps: f64,
    /// Eastward velocity in m/s
    v_east_mps: f64,
    /// Positional covariance in m^2
    covariance: Mat2,
    /// Raw measured point of the last accepted measurement, for the
    /// velocity derivative
    last_raw: GeoPoint,
    /// Timestamp of the last accepted measurement
    timestamp: DateTime<Utc>,
    /// Output of the last update, replayed for non-monotonic timestamps
    last_output: SmoothedFix,
}

/// Recursive state estimator smoothing successive noisy fixes.
///
/// Two states: `Uninitialized` (no prior fix) and `Tracking`. The first
/// update seeds the state from the raw measurement; every later update runs
/// one predict/correct cycle in place.
#[derive(Debug, Clone)]
pub struct KalmanPositionFilter {
    config: KalmanConfig,
    state: Option<KalmanState>,
}

impl KalmanPositionFilter {
    /// Create a filter with the provided configuration.
    #[must_use]
    pub fn new(config: KalmanConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create a filter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(KalmanConfig::default())
    }

    /// Current velocity estimate as (north, east) in m/s, if tracking.
    #[must_use]
    pub fn velocity_mps(&self) -> Option<(f64, f64)> {
        self.state.as_ref().map(|s| (s.v_north_mps, s.v_east_mps))
    }

    /// Seed the state from the first measurement.
    fn initialize(&mut self, measurement: &FilterMeasurement) -> SmoothedFix {
        let fix = &measurement.fix;
        let output = SmoothedFix {
            point: fix.point,
            accuracy_m: fix.accuracy_m,
            timestamp: fix.timestamp,
            speed_mps: measurement.speed_mps,
            heading_deg: measurement.heading_deg,
        };

        let (v_north_mps, v_east_mps) =
            velocity_from_speed_heading(measurement).unwrap_or((0.0, 0.0));

        self.state = Some(KalmanState {
            position: fix.point,
            v_north_mps,
            v_east_mps,
            covariance: Mat2::scaled_identity(fix.accuracy_m * fix.accuracy_m),
            last_raw: fix.point,
            timestamp: fix.timestamp,
            last_output: output.clone(),
        });

        tracing::debug!(
            lat = fix.point.lat_deg,
            lon = fix.point.lon_deg,
            accuracy_m = fix.accuracy_m,
            "kalman filter initialized"
        );

        output
    }
}

impl PositionFilter for KalmanPositionFilter {
    fn update(&mut self, measurement: &FilterMeasurement) -> SmoothedFix {
        let Some(state) = self.state.as_mut() else {
            return self.initialize(measurement);
        };

        let fix = &measurement.fix;
        let dt_secs = (fix.timestamp - state.timestamp).num_milliseconds() as f64 / 1000.0;
        if dt_secs <= 0.0 {
            // Out-of-order or duplicate timestamp: keep the estimate as is.
            return state.last_output.clone();
        }

        // --- predict -----------------------------------------------------
        let predicted = GeoPoint::new(
            state.position.lat_deg + state.v_north_mps * dt_secs / meters_per_degree_lat(),
            state.position.lon_deg
                + state.v_east_mps * dt_secs / meters_per_degree_lon(state.position.lat_deg),
        );
        let p_pred = state
            .covariance
            .add_diagonal(self.config.process_noise * dt_secs);

        // --- correct -----------------------------------------------------
        let r = Mat2::scaled_identity(fix.accuracy_m * fix.accuracy_m);
        let s = p_pred + r;

        let (corrected, covariance) = match s.inverse() {
            // Singular innovation covariance: keep the prediction.
            None => (predicted, p_pred),
            Some(s_inv) => {
                let gain = p_pred * s_inv;
                let innovation = [
                    fix.point.lat_deg - predicted.lat_deg,
                    fix.point.lon_deg - predicted.lon_deg,
                ];
                let correction = gain * innovation;
                (
                    GeoPoint::new(
                        predicted.lat_deg + correction[0],
                        predicted.lon_deg + correction[1],
                    ),
                    (Mat2::identity() - gain) * p_pred,
                )
            }
        };

        // Direct speed/heading beats the measurement-derivative estimate.
        let (v_north_mps, v_east_mps) = match velocity_from_speed_heading(measurement) {
            Some(v) => v,
            None => (
                (fix.point.lat_deg - state.last_raw.lat_deg) * meters_per_degree_lat() / dt_secs,
                (fix.point.lon_deg - state.last_raw.lon_deg)
                    * meters_per_degree_lon(state.position.lat_deg)
                    / dt_secs,
            ),
        };

        let output = SmoothedFix {
            point: corrected,
            accuracy_m: covariance.mean_diagonal().max(0.0).sqrt(),
            timestamp: fix.timestamp,
            speed_mps: measurement.speed_mps,
            heading_deg: measurement.heading_deg,
        };

        state.position = corrected;
        state.v_north_mps = v_north_mps;
        state.v_east_mps = v_east_mps;
        state.covariance = covariance;
        state.last_raw = fix.point;
        state.timestamp = fix.timestamp;
        state.last_output = output.clone();

        output
    }

    fn reset(&mut self) {
        self.state = None;
    }

    fn is_tracking(&self) -> bool {
        self.state.is_some()
    }
}

/// Decompose explicit speed/heading into (north, east) m/s components.
///
/// Requires both fields; a speed without a heading cannot be oriented.
fn velocity_from_speed_heading(measurement: &FilterMeasurement) -> Option<(f64, f64)> {
    let speed = measurement.speed_mps?;
    let heading = measurement.heading_deg?;
    let heading_rad = heading.to_radians();
    Some((speed * heading_rad.cos(), speed * heading_rad.sin()))
}
