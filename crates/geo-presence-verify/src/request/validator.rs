//! Field validation of raw check-in payloads.
//!
//! The validator walks the whole payload and reports every violation it
//! finds, never just the first, so the caller can return a complete error
//! list in one round trip. Nothing is silently corrected: a payload either
//! converts cleanly into a [`ValidatedCheckIn`] or is rejected whole.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use geo_presence_core::{GeoPoint, MotionSample, PlaceId, PositionFix, UserId, WifiObservation};

use super::dto::CheckInRequest;

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FieldViolation {
    /// Dotted path of the offending field, e.g. `location.latitude`
    pub field: String,
    /// Human-readable description of the failure
    pub message: String,
}

impl FieldViolation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A rejected payload with the complete list of violations found.
#[derive(Debug, Clone, Error)]
#[error("request validation failed with {} violation(s)", violations.len())]
pub struct ValidationError {
    /// Every violation found in the payload
    pub violations: Vec<FieldViolation>,
}

/// Configuration for [`RequestValidator`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ValidationConfig {
    /// Maximum number of SSIDs accepted in one observation
    pub max_ssids: usize,
    /// Maximum byte length of user and place identifiers
    pub max_id_len: usize,
    /// Maximum byte length of a single SSID
    pub max_ssid_len: usize,
    /// Maximum accepted GPS accuracy in meters
    pub max_accuracy_m: f64,
    /// Maximum accepted distance between the payload timestamp and now
    pub max_timestamp_skew_hours: i64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_ssids: 50,
            max_id_len: 128,
            max_ssid_len: 64,
            max_accuracy_m: 1000.0,
            max_timestamp_skew_hours: 24,
        }
    }
}

/// A payload that passed validation, typed for the scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCheckIn {
    /// Validated user identifier
    pub user_id: UserId,
    /// Validated place identifier
    pub place_id: PlaceId,
    /// Validated position fix
    pub fix: PositionFix,
    /// Validated Wi-Fi observation, if supplied
    pub wifi: Option<WifiObservation>,
    /// Validated motion sample, if supplied
    pub motion: Option<MotionSample>,
}

/// Validates raw check-in payloads.
///
/// Pure and reentrant; `now` is passed in by the caller so validation is
/// deterministic under test.
#[derive(Debug, Clone)]
pub struct RequestValidator {
    config: ValidationConfig,
}

impl RequestValidator {
    /// Create a validator with the provided configuration.
    #[must_use]
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a validator with default limits.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Borrow the active configuration.
    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate one payload against `now`.
    ///
    /// Returns the typed check-in on success, or every violation found on
    /// failure.
    pub fn validate(
        &self,
        request: &CheckInRequest,
        now: DateTime<Utc>,
    ) -> Result<ValidatedCheckIn, ValidationError> {
        let mut violations = Vec::new();

        self.check_identifier(&mut violations, "user_id", &request.user_id);
        self.check_identifier(&mut violations, "place_id", &request.place_id);
        self.check_location(&mut violations, request);
        let timestamp = self.check_timestamp(&mut violations, &request.timestamp, now);
        self.check_wifi(&mut violations, request);
        self.check_motion(&mut violations, request);

        match (violations.is_empty(), timestamp) {
            (true, Some(timestamp)) => Ok(ValidatedCheckIn {
                user_id: UserId::new(request.user_id.clone()),
                place_id: PlaceId::new(request.place_id.clone()),
                fix: PositionFix::new(
                    GeoPoint::new(request.location.latitude, request.location.longitude),
                    request.location.accuracy,
                    timestamp,
                ),
                wifi: request
                    .wifi
                    .as_ref()
                    .map(|wifi| WifiObservation::new(wifi.ssids.clone())),
                motion: request
                    .motion
                    .as_ref()
                    .map(|m| MotionSample::new(m.x, m.y, m.z)),
            }),
            _ => Err(ValidationError { violations }),
        }
    }

    fn check_identifier(&self, violations: &mut Vec<FieldViolation>, field: &str, value: &str) {
        if value.is_empty() {
            violations.push(FieldViolation::new(field, "must not be empty"));
        } else if value.len() > self.config.max_id_len {
            violations.push(FieldViolation::new(
                field,
                format!("must be at most {} bytes", self.config.max_id_len),
            ));
        }
    }

    fn check_location(&self, violations: &mut Vec<FieldViolation>, request: &CheckInRequest) {
        let location = &request.location;

        if !location.latitude.is_finite() || location.latitude.abs() > 90.0 {
            violations.push(FieldViolation::new(
                "location.latitude",
                "must be a finite number in [-90, 90]",
            ));
        }
        if !location.longitude.is_finite() || location.longitude.abs() > 180.0 {
            violations.push(FieldViolation::new(
                "location.longitude",
                "must be a finite number in [-180, 180]",
            ));
        }
        if !location.accuracy.is_finite()
            || location.accuracy < 0.0
            || location.accuracy > self.config.max_accuracy_m
        {
            violations.push(FieldViolation::new(
                "location.accuracy",
                format!(
                    "must be a finite number in [0, {}]",
                    self.config.max_accuracy_m
                ),
            ));
        }
    }

    fn check_timestamp(
        &self,
        violations: &mut Vec<FieldViolation>,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let parsed = match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(_) => {
                violations.push(FieldViolation::new(
                    "timestamp",
                    "must be a valid RFC 3339 timestamp",
                ));
                return None;
            }
        };

        let skew = (now - parsed).abs();
        if skew > Duration::hours(self.config.max_timestamp_skew_hours) {
            violations.push(FieldViolation::new(
                "timestamp",
                format!(
                    "must be within {} hours of server time",
                    self.config.max_timestamp_skew_hours
                ),
            ));
            return None;
        }

        Some(parsed)
    }

    fn check_wifi(&self, violations: &mut Vec<FieldViolation>, request: &CheckInRequest) {
        let Some(wifi) = &request.wifi else {
            return;
        };

        if wifi.ssids.len() > self.config.max_ssids {
            violations.push(FieldViolation::new(
                "wifi.ssids",
                format!("must contain at most {} entries", self.config.max_ssids),
            ));
        }
        for (i, ssid) in wifi.ssids.iter().enumerate() {
            if ssid.is_empty() {
                violations.push(FieldViolation::new(
                    format!("wifi.ssids[{i}]"),
                    "must not be empty",
                ));
            } else if ssid.len() > self.config.max_ssid_len {
                violations.push(FieldViolation::new(
                    format!("wifi.ssids[{i}]"),
                    format!("must be at most {} bytes", self.config.max_ssid_len),
                ));
            }
        }
    }

    fn check_motion(&self, violations: &mut Vec<FieldViolation>, request: &CheckInRequest) {
        let Some(motion) = &request.motion else {
            return;
        };

        for (field, value) in [
            ("motion.x", motion.x),
            ("motion.y", motion.y),
            ("motion.z", motion.z),
        ] {
            if !value.is_finite() {
                violations.push(FieldViolation::new(field, "must be a finite number"));
            }
        }
    }
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::dto::{LocationDto, MotionDto, WifiDto};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 31, 0).unwrap()
    }

    fn valid_request() -> CheckInRequest {
        CheckInRequest {
            user_id: "user-42".into(),
            place_id: "cafe-17".into(),
            location: LocationDto {
                latitude: 52.5200,
                longitude: 13.4050,
                accuracy: 8.5,
            },
            wifi: Some(WifiDto {
                ssids: vec!["cafe-guest".into()],
            }),
            motion: Some(MotionDto {
                x: 0.02,
                y: -0.11,
                z: 0.31,
            }),
            timestamp: "2024-03-15T12:30:45Z".into(),
        }
    }

    #[test]
    fn test_valid_request_converts() {
        let validator = RequestValidator::with_defaults();
        let checked = validator
            .validate(&valid_request(), now())
            .expect("request is valid");

        assert_eq!(checked.user_id.as_str(), "user-42");
        assert_eq!(checked.place_id.as_str(), "cafe-17");
        assert!((checked.fix.point.lat_deg - 52.52).abs() < 1e-12);
        assert!(checked.wifi.is_some());
        assert!(checked.motion.is_some());
    }

    #[test]
    fn test_all_violations_are_reported() {
        let mut request = valid_request();
        request.user_id = String::new();
        request.location.latitude = 120.0;
        request.location.accuracy = 5000.0;
        request.timestamp = "not-a-timestamp".into();

        let validator = RequestValidator::with_defaults();
        let err = validator
            .validate(&request, now())
            .expect_err("request is invalid");

        let fields: Vec<&str> = err.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(err.violations.len(), 4);
        assert!(fields.contains(&"user_id"));
        assert!(fields.contains(&"location.latitude"));
        assert!(fields.contains(&"location.accuracy"));
        assert!(fields.contains(&"timestamp"));
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let mut request = valid_request();
        request.location.longitude = f64::NAN;
        request.motion = Some(MotionDto {
            x: f64::INFINITY,
            y: 0.0,
            z: 0.0,
        });

        let validator = RequestValidator::with_defaults();
        let err = validator
            .validate(&request, now())
            .expect_err("request is invalid");

        let fields: Vec<&str> = err.violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"location.longitude"));
        assert!(fields.contains(&"motion.x"));
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let mut request = valid_request();
        request.timestamp = "2024-03-13T12:30:45Z".into();

        let validator = RequestValidator::with_defaults();
        let err = validator
            .validate(&request, now())
            .expect_err("timestamp is stale");

        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "timestamp");
    }

    #[test]
    fn test_boundary_accuracy_is_accepted() {
        let mut request = valid_request();
        request.location.accuracy = 1000.0;

        let validator = RequestValidator::with_defaults();
        assert!(validator.validate(&request, now()).is_ok());

        request.location.accuracy = 1000.5;
        assert!(validator.validate(&request, now()).is_err());
    }

    #[test]
    fn test_oversized_ssid_list_is_rejected() {
        let mut request = valid_request();
        request.wifi = Some(WifiDto {
            ssids: (0..51).map(|i| format!("ssid-{i}")).collect(),
        });

        let validator = RequestValidator::with_defaults();
        let err = validator
            .validate(&request, now())
            .expect_err("too many ssids");
        assert_eq!(err.violations[0].field, "wifi.ssids");
    }

    #[test]
    fn test_empty_ssid_entries_are_flagged_individually() {
        let mut request = valid_request();
        request.wifi = Some(WifiDto {
            ssids: vec!["ok".into(), String::new(), String::new()],
        });

        let validator = RequestValidator::with_defaults();
        let err = validator
            .validate(&request, now())
            .expect_err("empty ssids");

        let fields: Vec<&str> = err.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["wifi.ssids[1]", "wifi.ssids[2]"]);
    }

    #[test]
    fn test_missing_optional_sections_are_fine() {
        let mut request = valid_request();
        request.wifi = None;
        request.motion = None;

        let validator = RequestValidator::with_defaults();
        let checked = validator
            .validate(&request, now())
            .expect("optional sections may be absent");
        assert!(checked.wifi.is_none());
        assert!(checked.motion.is_none());
    }

    #[test]
    fn test_validation_error_display_counts_violations() {
        let mut request = valid_request();
        request.user_id = String::new();
        request.place_id = String::new();

        let validator = RequestValidator::with_defaults();
        let err = validator.validate(&request, now()).expect_err("invalid");
        assert!(err.to_string().contains("2 violation(s)"));
        assert_eq!(err.violations[0].to_string(), "user_id: must not be empty");
    }
}
