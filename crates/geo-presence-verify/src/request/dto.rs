//! Data Transfer Objects for the check-in verification API.
//!
//! These types mirror the JSON the request handler receives. They carry no
//! invariants of their own; every range and size rule is enforced by
//! [`RequestValidator`](super::RequestValidator).

use serde::{Deserialize, Serialize};

/// Raw check-in request as received from a client.
///
/// ## Example
///
/// ```json
/// {
///   "user_id": "user-42",
///   "place_id": "cafe-17",
///   "location": { "latitude": 52.5200, "longitude": 13.4050, "accuracy": 8.5 },
///   "wifi": { "ssids": ["cafe-guest", "cafe-staff"] },
///   "motion": { "x": 0.02, "y": -0.11, "z": 0.31 },
///   "timestamp": "2024-03-15T12:30:45Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CheckInRequest {
    /// Account identifier of the user checking in
    pub user_id: String,
    /// Identifier of the place being checked into
    pub place_id: String,
    /// Reported GPS position
    pub location: LocationDto,
    /// Visible Wi-Fi networks, if the device reported any
    #[serde(default)]
    pub wifi: Option<WifiDto>,
    /// Accelerometer sample, if the device reported one
    #[serde(default)]
    pub motion: Option<MotionDto>,
    /// Capture time as an RFC 3339 / ISO-8601 string
    pub timestamp: String,
}

/// Reported GPS position and its claimed accuracy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LocationDto {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Reported accuracy in meters
    pub accuracy: f64,
}

/// Wi-Fi networks visible to the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WifiDto {
    /// Observed SSIDs
    pub ssids: Vec<String>,
}

/// Accelerometer-style motion triple.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MotionDto {
    /// X-axis acceleration
    pub x: f64,
    /// Y-axis acceleration
    pub y: f64,
    /// Z-axis acceleration
    pub z: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_round_trips_through_json() {
        let json = r#"{
            "user_id": "user-42",
            "place_id": "cafe-17",
            "location": { "latitude": 52.52, "longitude": 13.405, "accuracy": 8.5 },
            "wifi": { "ssids": ["cafe-guest"] },
            "motion": { "x": 0.02, "y": -0.11, "z": 0.31 },
            "timestamp": "2024-03-15T12:30:45Z"
        }"#;

        let request: CheckInRequest = serde_json::from_str(json).expect("valid payload");
        assert_eq!(request.user_id, "user-42");
        assert_eq!(request.place_id, "cafe-17");
        assert!((request.location.latitude - 52.52).abs() < 1e-12);

        let reencoded = serde_json::to_string(&request).expect("serializable");
        let again: CheckInRequest = serde_json::from_str(&reencoded).expect("stable");
        assert_eq!(again.timestamp, request.timestamp);
        assert_eq!(
            again.wifi.expect("wifi present").ssids,
            vec!["cafe-guest".to_string()]
        );
    }

    #[test]
    fn test_optional_sections_default_to_none() {
        let json = r#"{
            "user_id": "user-42",
            "place_id": "cafe-17",
            "location": { "latitude": 52.52, "longitude": 13.405, "accuracy": 8.5 },
            "timestamp": "2024-03-15T12:30:45Z"
        }"#;

        let request: CheckInRequest = serde_json::from_str(json).expect("valid payload");
        assert!(request.wifi.is_none());
        assert!(request.motion.is_none());
    }
}
