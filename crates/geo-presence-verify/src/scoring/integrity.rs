//! The five-factor integrity scorer.
//!
//! Each factor is scored independently, clamped to its maximum, and summed;
//! the verdict is a simple threshold on the total. A complete breakdown and
//! diagnostic details are returned for every call, pass or fail, so callers
//! can always show the user why a check-in was rejected.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use geo_presence_core::{haversine_distance_m, MotionSample, Place, PositionFix, WifiObservation};

use super::config::ScoringConfig;

/// Per-factor sub-scores of one scoring call.
///
/// Invariant: each field is within its configured maximum and the sum fits
/// the 0-100 score range for any configuration accepted by
/// [`ScoringConfig::validate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IntegrityBreakdown {
    /// Proximity to the place center vs its geofence
    pub distance: u8,
    /// Overlap between observed and registered SSIDs
    pub wifi: u8,
    /// Consistency of the device clock with server time
    pub time: u8,
    /// Reported GPS accuracy
    pub accuracy: u8,
    /// Motion magnitude (stationary scores best)
    pub speed: u8,
}

impl IntegrityBreakdown {
    /// Sum of the five sub-scores.
    #[must_use]
    pub fn total(&self) -> u8 {
        self.distance + self.wifi + self.time + self.accuracy + self.speed
    }
}

/// Diagnostic measurements behind a breakdown.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoreDetails {
    /// Great-circle distance from the fix to the place center, in meters
    pub distance_meters: f64,
    /// Observed SSIDs that matched the place's registered set
    pub matched_ssids: Vec<String>,
    /// Absolute difference between server time and the fix timestamp
    pub time_diff_ms: i64,
    /// Accuracy reported by the device, in meters
    pub gps_accuracy: f64,
    /// Motion magnitude, when a sample was supplied
    pub motion_magnitude: Option<f64>,
}

/// Outcome of one scoring call.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IntegrityResult {
    /// Whether the total reached the pass threshold
    pub valid: bool,
    /// Total score in 0-100
    pub score: u8,
    /// Per-factor sub-scores
    pub breakdown: IntegrityBreakdown,
    /// Diagnostic measurements
    pub details: ScoreDetails,
}

/// Scores check-in attempts against a place.
///
/// Pure and reentrant: safe to share one scorer across any number of
/// threads. Inputs are assumed to have passed
/// [`RequestValidator`](crate::request::RequestValidator); behavior on
/// NaN or out-of-range coordinates is unspecified.
#[derive(Debug, Clone)]
pub struct IntegrityScorer {
    config: ScoringConfig,
}

impl IntegrityScorer {
    /// Create a scorer with the provided configuration.
    #[must_use]
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Create a scorer with the default production thresholds.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ScoringConfig::default())
    }

    /// Borrow the active configuration.
    #[must_use]
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one check-in attempt.
    ///
    /// Never panics for well-formed input and always returns a complete
    /// breakdown, including when `valid` is false.
    #[must_use]
    pub fn score(
        &self,
        fix: &PositionFix,
        wifi: Option<&WifiObservation>,
        motion: Option<&MotionSample>,
        place: &Place,
        server_time: DateTime<Utc>,
    ) -> IntegrityResult {
        let distance_meters = haversine_distance_m(fix.point, place.position);
        let time_diff_ms = (server_time - fix.timestamp).num_milliseconds().abs();
        let motion_magnitude = motion.map(MotionSample::magnitude);
        let matched_ssids = self.matched_ssids(wifi, place);

        let breakdown = IntegrityBreakdown {
            distance: self.distance_score(distance_meters, place.geofence_radius_m),
            wifi: self.wifi_score(matched_ssids.len()),
            time: self.time_score(time_diff_ms),
            accuracy: self.accuracy_score(fix.accuracy_m),
            speed: self.motion_score(motion_magnitude),
        };

        let score = breakdown.total();
        let valid = score >= self.config.pass_threshold;

        tracing::debug!(
            place = %place.id,
            score,
            valid,
            distance_m = distance_meters,
            "check-in scored"
        );

        IntegrityResult {
            valid,
            score,
            breakdown,
            details: ScoreDetails {
                distance_meters,
                matched_ssids,
                time_diff_ms,
                gps_accuracy: fix.accuracy_m,
                motion_magnitude,
            },
        }
    }

    /// Distance factor.
    ///
    /// Inside the geofence the bonus is tiered by absolute distance to the
    /// center; a narrow buffer just outside the fence decays linearly to
    /// zero, tolerating GPS slop at the edge; beyond the buffer the factor
    /// is zero.
    fn distance_score(&self, distance_m: f64, geofence_radius_m: f64) -> u8 {
        if distance_m <= geofence_radius_m {
            for tier in &self.config.distance_tiers {
                if distance_m <= tier.max_distance_m {
                    return tier.points;
                }
            }
            return self.config.distance_floor_points;
        }

        let overshoot = distance_m - geofence_radius_m;
        if overshoot <= self.config.edge_buffer_m {
            let fraction = 1.0 - overshoot / self.config.edge_buffer_m;
            return (f64::from(self.config.edge_max_points) * fraction).floor() as u8;
        }

        0
    }

    /// Wi-Fi factor: per-match points capped at the configured maximum.
    fn wifi_score(&self, matched: usize) -> u8 {
        let matched = u8::try_from(matched).unwrap_or(u8::MAX);
        matched
            .saturating_mul(self.config.points_per_ssid_match)
            .min(self.config.wifi_max)
    }

    /// Time factor: full marks within the fresh window, linear decay across
    /// the decay window, zero beyond it.
    fn time_score(&self, time_diff_ms: i64) -> u8 {
        if time_diff_ms <= self.config.time_fresh_window_ms {
            return self.config.time_max;
        }
        let past_fresh = time_diff_ms - self.config.time_fresh_window_ms;
        if past_fresh <= self.config.time_decay_window_ms {
            let fraction = 1.0 - past_fresh as f64 / self.config.time_decay_window_ms as f64;
            return (f64::from(self.config.time_max) * fraction).floor() as u8;
        }
        0
    }

    /// Accuracy factor: step function on the reported uncertainty.
    fn accuracy_score(&self, accuracy_m: f64) -> u8 {
        for step in &self.config.accuracy_steps {
            if accuracy_m <= step.max_accuracy_m {
                return step.points;
            }
        }
        0
    }

    /// Motion factor: banded by magnitude when a sample is present,
    /// otherwise the configured benefit-of-the-doubt score.
    fn motion_score(&self, magnitude: Option<f64>) -> u8 {
        let Some(magnitude) = magnitude else {
            return self.config.missing_motion_score;
        };
        for band in &self.config.motion_bands {
            if magnitude < band.max_magnitude {
                return band.points;
            }
        }
        0
    }

    /// Observed SSIDs that appear in the place's registered set, each
    /// counted once regardless of duplicates in the observation.
    fn matched_ssids(&self, wifi: Option<&WifiObservation>, place: &Place) -> Vec<String> {
        let Some(wifi) = wifi else {
            return Vec::new();
        };
        let registered: HashSet<&str> = place.wifi_ssids.iter().map(String::as_str).collect();
        let mut seen: HashSet<&str> = HashSet::new();
        wifi.ssids
            .iter()
            .filter(|ssid| registered.contains(ssid.as_str()) && seen.insert(ssid.as_str()))
            .cloned()
            .collect()
    }
}

impl Default for IntegrityScorer {
    fn default() -> Self {
        Self::with_defaults()
    }
}
