//! Weighted moving-average position smoother.
//!
//! A lower-cost alternative to the Kalman filter for near-stationary use
//! cases: no velocity model, just a bounded window of recent fixes combined
//! with recency and accuracy weights. Recent fixes count more, and tight
//! fixes count more than loose ones.

use std::collections::VecDeque;

use geo_presence_core::{GeoPoint, PositionFix};

use super::{FilterMeasurement, PositionFilter, SmoothedFix};

/// Configuration for [`MovingAverageFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MovingAverageConfig {
    /// Number of fixes kept in the window
    pub window_size: usize,
}

impl Default for MovingAverageConfig {
    fn default() -> Self {
        Self { window_size: 5 }
    }
}

/// Moving-average smoother over the last N fixes.
///
/// Each update appends the new fix, evicts the oldest beyond capacity, and
/// returns the weighted average where
/// `weight = recency * 1 / (accuracy + 1)` with recency linear from `1/N`
/// (oldest) to `N/N` (newest).
#[derive(Debug, Clone)]
pub struct MovingAverageFilter {
    config: MovingAverageConfig,
    window: VecDeque<PositionFix>,
}

impl MovingAverageFilter {
    /// Create a filter with the provided configuration.
    ///
    /// A zero window size is treated as one; an empty window cannot smooth.
    #[must_use]
    pub fn new(config: MovingAverageConfig) -> Self {
        let config = MovingAverageConfig {
            window_size: config.window_size.max(1),
        };
        Self {
            config,
            window: VecDeque::with_capacity(config.window_size),
        }
    }

    /// Create a filter with default configuration (window of 5).
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(MovingAverageConfig::default())
    }

    /// Number of fixes currently in the window.
    #[must_use]
    pub fn window_len(&self) -> usize {
        self.window.len()
    }
}

impl PositionFilter for MovingAverageFilter {
    fn update(&mut self, measurement: &FilterMeasurement) -> SmoothedFix {
        if self.window.len() == self.config.window_size {
            self.window.pop_front();
        }
        self.window.push_back(measurement.fix.clone());

        let n = self.window.len();
        let mut lat_sum = 0.0;
        let mut lon_sum = 0.0;
        let mut accuracy_sum = 0.0;
        let mut weight_sum = 0.0;

        for (i, fix) in self.window.iter().enumerate() {
            let recency = (i + 1) as f64 / n as f64;
            let weight = recency / (fix.accuracy_m + 1.0);
            lat_sum += fix.point.lat_deg * weight;
            lon_sum += fix.point.lon_deg * weight;
            accuracy_sum += fix.accuracy_m * weight;
            weight_sum += weight;
        }

        SmoothedFix {
            point: GeoPoint::new(lat_sum / weight_sum, lon_sum / weight_sum),
            accuracy_m: accuracy_sum / weight_sum,
            timestamp: measurement.fix.timestamp,
            speed_mps: measurement.speed_mps,
            heading_deg: measurement.heading_deg,
        }
    }

    fn reset(&mut self) {
        self.window.clear();
    }

    fn is_tracking(&self) -> bool {
        !self.window.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn measurement(lat: f64, lon: f64, accuracy_m: f64, offset_secs: i64) -> FilterMeasurement {
        FilterMeasurement::from_fix(PositionFix::new(
            GeoPoint::new(lat, lon),
            accuracy_m,
            Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
                + chrono::Duration::seconds(offset_secs),
        ))
    }

    #[test]
    fn test_single_fix_passes_through() {
        let mut filter = MovingAverageFilter::with_defaults();
        let out = filter.update(&measurement(52.52, 13.405, 7.0, 0));

        assert!((out.point.lat_deg - 52.52).abs() < 1e-12);
        assert!((out.point.lon_deg - 13.405).abs() < 1e-12);
        assert!((out.accuracy_m - 7.0).abs() < 1e-12);
        assert!(filter.is_tracking());
    }

    #[test]
    fn test_newer_fix_outweighs_older() {
        let mut filter = MovingAverageFilter::with_defaults();
        filter.update(&measurement(0.0, 0.0, 5.0, 0));
        let out = filter.update(&measurement(1.0, 0.0, 5.0, 1));

        // Equal accuracies: weights are 1/2 and 2/2, so the average sits at
        // 2/3 of the way toward the newer fix.
        assert!((out.point.lat_deg - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_accurate_fix_outweighs_loose_one() {
        let mut filter = MovingAverageFilter::with_defaults();
        filter.update(&measurement(0.0, 0.0, 0.0, 0));
        let out = filter.update(&measurement(1.0, 0.0, 19.0, 1));

        // Recency favors the newer fix 2:1 but its accuracy weight is
        // 1/20 against 1/1, so the old tight fix dominates.
        assert!(
            out.point.lat_deg < 0.2,
            "loose fix should barely move the average, got {}",
            out.point.lat_deg
        );
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut filter = MovingAverageFilter::new(MovingAverageConfig { window_size: 2 });
        filter.update(&measurement(100.0, 0.0, 5.0, 0));
        filter.update(&measurement(1.0, 0.0, 5.0, 1));
        let out = filter.update(&measurement(1.0, 0.0, 5.0, 2));

        // The far-off first fix left the window; only the two at lat 1.
        assert_eq!(filter.window_len(), 2);
        assert!((out.point.lat_deg - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_is_weighted_like_position() {
        let mut filter = MovingAverageFilter::with_defaults();
        filter.update(&measurement(0.0, 0.0, 4.0, 0));
        let out = filter.update(&measurement(0.0, 0.0, 9.0, 1));

        // weights: 0.5 * 1/5 = 0.1 and 1.0 * 1/10 = 0.1, an even split.
        assert!((out.accuracy_m - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_reset_clears_the_window() {
        let mut filter = MovingAverageFilter::with_defaults();
        filter.update(&measurement(52.52, 13.405, 5.0, 0));
        filter.reset();

        assert!(!filter.is_tracking());
        assert_eq!(filter.window_len(), 0);

        let out = filter.update(&measurement(1.0, 1.0, 5.0, 1));
        assert!((out.point.lat_deg - 1.0).abs() < 1e-12);
    }
}
