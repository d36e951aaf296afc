//! Core domain types for check-in verification.
//!
//! These types describe one check-in attempt (a position fix plus optional
//! Wi-Fi and motion telemetry) and the place it claims to be at. All of them
//! are immutable value types; the verification pipeline never mutates its
//! inputs.

use chrono::{DateTime, Utc};

use crate::geo::GeoPoint;

// =============================================================================
// Identifiers
// =============================================================================

/// Unique identifier for a user, as issued by the account collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserId(String);

impl UserId {
    /// Creates a new user ID from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the user ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a place, as issued by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceId(String);

impl PlaceId {
    /// Creates a new place ID from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the place ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Measurement types
// =============================================================================

/// A single GPS position fix reported by a client device.
///
/// One fix is consumed per scoring call. The reported accuracy is the
/// device's own uncertainty estimate in meters; the scorer treats it as a
/// claim, not a guarantee.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionFix {
    /// Reported position
    pub point: GeoPoint,
    /// Reported GPS accuracy in meters (non-negative)
    pub accuracy_m: f64,
    /// Device-reported capture time
    pub timestamp: DateTime<Utc>,
}

impl PositionFix {
    /// Create a fix from its parts.
    #[must_use]
    pub fn new(point: GeoPoint, accuracy_m: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            point,
            accuracy_m,
            timestamp,
        }
    }
}

/// Wi-Fi networks visible to the client device at check-in time.
///
/// SSIDs are treated as a set; duplicates in the observation count once when
/// matched against a place's registered networks. The request validator
/// bounds the list length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WifiObservation {
    /// Observed SSIDs
    pub ssids: Vec<String>,
}

impl WifiObservation {
    /// Create an observation from a list of SSIDs.
    #[must_use]
    pub fn new(ssids: Vec<String>) -> Self {
        Self { ssids }
    }

    /// Number of observed SSIDs, duplicates included.
    #[must_use]
    pub fn ssid_count(&self) -> usize {
        self.ssids.len()
    }
}

/// An accelerometer-style motion triple.
///
/// Only the scalar magnitude is used for scoring; the axes themselves carry
/// no meaning to the verifier.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionSample {
    /// X-axis acceleration
    pub x: f64,
    /// Y-axis acceleration
    pub y: f64,
    /// Z-axis acceleration
    pub z: f64,
}

impl MotionSample {
    /// Create a sample from its components.
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean magnitude of the triple.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

// =============================================================================
// Place
// =============================================================================

/// A check-in target supplied by the storage collaborator.
///
/// Read-only input to the scorer; this crate never mutates or persists it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Place {
    /// Storage-layer identifier
    pub id: PlaceId,
    /// Registered position of the place
    pub position: GeoPoint,
    /// Geofence radius in meters
    pub geofence_radius_m: f64,
    /// SSIDs registered as belonging to this place
    pub wifi_ssids: Vec<String>,
}

impl Place {
    /// Create a place record.
    #[must_use]
    pub fn new(
        id: PlaceId,
        position: GeoPoint,
        geofence_radius_m: f64,
        wifi_ssids: Vec<String>,
    ) -> Self {
        Self {
            id,
            position,
            geofence_radius_m,
            wifi_ssids,
        }
    }
}
