//! Tunable thresholds for the integrity scorer.
//!
//! The tier tables and decay windows are empirically chosen product values
//! with no derivation behind them; they are carried here as data so deploys
//! can tune them without touching scoring code. The defaults reproduce the
//! production behavior exactly.

use crate::VerifyError;

/// One tier of the inside-geofence distance bonus.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DistanceTier {
    /// Upper bound of the tier, in meters from the place center (inclusive)
    pub max_distance_m: f64,
    /// Points awarded within this tier
    pub points: u8,
}

/// One step of the GPS-accuracy step function.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AccuracyStep {
    /// Upper bound of reported accuracy, in meters (inclusive)
    pub max_accuracy_m: f64,
    /// Points awarded within this step
    pub points: u8,
}

/// One band of the motion-magnitude classification.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MotionBand {
    /// Upper bound of motion magnitude (exclusive)
    pub max_magnitude: f64,
    /// Points awarded within this band
    pub points: u8,
}

/// Configuration for [`IntegrityScorer`](super::IntegrityScorer).
///
/// Sub-score maxima under the default values: distance 40, Wi-Fi 25,
/// time 15, accuracy 10, motion 10, for an attainable total of 100.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScoringConfig {
    /// Minimum total for a check-in to be accepted
    pub pass_threshold: u8,

    /// Bonus tiers applied when the fix is inside the geofence, ordered by
    /// ascending `max_distance_m`
    pub distance_tiers: Vec<DistanceTier>,
    /// Points for an in-fence fix beyond the last tier
    pub distance_floor_points: u8,
    /// Width of the decay band just outside the geofence, in meters
    pub edge_buffer_m: f64,
    /// Points at the inner edge of the decay band, decaying linearly to zero
    pub edge_max_points: u8,

    /// Points contributed by each matched SSID
    pub points_per_ssid_match: u8,
    /// Cap on the Wi-Fi sub-score
    pub wifi_max: u8,

    /// Clock skew treated as fresh, in milliseconds
    pub time_fresh_window_ms: i64,
    /// Width of the linear staleness decay past the fresh window, in
    /// milliseconds
    pub time_decay_window_ms: i64,
    /// Points for a fresh timestamp
    pub time_max: u8,

    /// GPS-accuracy step function, ordered by ascending `max_accuracy_m`;
    /// worse than the last step scores zero
    pub accuracy_steps: Vec<AccuracyStep>,

    /// Motion-magnitude bands, ordered by ascending `max_magnitude`; faster
    /// than the last band scores zero (vehicular, likely a drive-by)
    pub motion_bands: Vec<MotionBand>,
    /// Score assigned when no motion data is present.
    ///
    /// Policy choice, not a derived invariant: clients that never report
    /// motion get the benefit of the doubt, which weakens anti-spoof
    /// guarantees for them. Flagged for product review.
    pub missing_motion_score: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 60,

            distance_tiers: vec![
                DistanceTier { max_distance_m: 20.0, points: 40 },
                DistanceTier { max_distance_m: 30.0, points: 35 },
                DistanceTier { max_distance_m: 40.0, points: 30 },
            ],
            distance_floor_points: 25,
            edge_buffer_m: 20.0,
            edge_max_points: 20,

            points_per_ssid_match: 12,
            wifi_max: 25,

            time_fresh_window_ms: 60_000,
            time_decay_window_ms: 120_000,
            time_max: 15,

            accuracy_steps: vec![
                AccuracyStep { max_accuracy_m: 10.0, points: 10 },
                AccuracyStep { max_accuracy_m: 20.0, points: 8 },
                AccuracyStep { max_accuracy_m: 30.0, points: 6 },
                AccuracyStep { max_accuracy_m: 50.0, points: 4 },
            ],

            motion_bands: vec![
                MotionBand { max_magnitude: 0.5, points: 10 }, // stationary
                MotionBand { max_magnitude: 1.5, points: 8 },  // walking
                MotionBand { max_magnitude: 3.0, points: 5 },  // jogging
            ],
            missing_motion_score: 5,
        }
    }
}

impl ScoringConfig {
    /// Maximum attainable distance sub-score.
    #[must_use]
    pub fn distance_max(&self) -> u8 {
        self.distance_tiers
            .iter()
            .map(|t| t.points)
            .max()
            .unwrap_or(0)
            .max(self.distance_floor_points)
            .max(self.edge_max_points)
    }

    /// Maximum attainable accuracy sub-score.
    #[must_use]
    pub fn accuracy_max(&self) -> u8 {
        self.accuracy_steps.iter().map(|s| s.points).max().unwrap_or(0)
    }

    /// Maximum attainable motion sub-score.
    #[must_use]
    pub fn motion_max(&self) -> u8 {
        self.motion_bands
            .iter()
            .map(|b| b.points)
            .max()
            .unwrap_or(0)
            .max(self.missing_motion_score)
    }

    /// Maximum attainable total under this configuration.
    #[must_use]
    pub fn max_total(&self) -> u16 {
        u16::from(self.distance_max())
            + u16::from(self.wifi_max)
            + u16::from(self.time_max)
            + u16::from(self.accuracy_max())
            + u16::from(self.motion_max())
    }

    /// Check the configuration for values that would break scoring
    /// invariants.
    ///
    /// Rejects a pass threshold no check-in could reach, a total that could
    /// exceed the 0-100 score range, non-positive time windows and edge
    /// buffer, and unordered tier tables.
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_total() > 100 {
            return Err(VerifyError::config(format!(
                "attainable total {} exceeds the 0-100 score range",
                self.max_total()
            )));
        }
        if u16::from(self.pass_threshold) > self.max_total() {
            return Err(VerifyError::config(format!(
                "pass threshold {} exceeds attainable total {}",
                self.pass_threshold,
                self.max_total()
            )));
        }
        if self.time_fresh_window_ms <= 0 || self.time_decay_window_ms <= 0 {
            return Err(VerifyError::config(
                "time windows must be positive".to_string(),
            ));
        }
        if self.edge_buffer_m <= 0.0 {
            return Err(VerifyError::config(
                "edge buffer must be positive".to_string(),
            ));
        }
        if !is_sorted_by(&self.distance_tiers, |t| t.max_distance_m) {
            return Err(VerifyError::config(
                "distance tiers must be ordered by ascending max_distance_m".to_string(),
            ));
        }
        if !is_sorted_by(&self.accuracy_steps, |s| s.max_accuracy_m) {
            return Err(VerifyError::config(
                "accuracy steps must be ordered by ascending max_accuracy_m".to_string(),
            ));
        }
        if !is_sorted_by(&self.motion_bands, |b| b.max_magnitude) {
            return Err(VerifyError::config(
                "motion bands must be ordered by ascending max_magnitude".to_string(),
            ));
        }
        Ok(())
    }
}

/// True when the extracted keys are strictly increasing.
fn is_sorted_by<T>(items: &[T], key: impl Fn(&T) -> f64) -> bool {
    items.windows(2).all(|pair| key(&pair[0]) < key(&pair[1]))
}
