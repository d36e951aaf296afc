//! Geodesic math on the WGS-ish sphere used by the scoring pipeline.
//!
//! Distances are computed with the Haversine formula on a sphere of radius
//! [`EARTH_RADIUS_M`]. At geofence scale (tens of meters) the spherical
//! approximation error is far below typical GPS accuracy.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    /// Latitude in decimal degrees, valid range [-90, 90]
    pub lat_deg: f64,
    /// Longitude in decimal degrees, valid range [-180, 180]
    pub lon_deg: f64,
}

impl GeoPoint {
    /// Create a point from decimal-degree coordinates.
    ///
    /// Range checking is the caller's responsibility; the request validator
    /// is the gate for untrusted input.
    #[must_use]
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    /// Great-circle distance to another point in meters.
    #[must_use]
    pub fn distance_m(&self, other: GeoPoint) -> f64 {
        haversine_distance_m(*self, other)
    }
}

/// Haversine great-circle distance between two points, in meters.
///
/// Inputs are decimal degrees; the result is non-negative, symmetric, and
/// zero for identical points (modulo floating-point epsilon). Total for all
/// finite in-range inputs.
#[must_use]
pub fn haversine_distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat_deg.to_radians();
    let lat2 = b.lat_deg.to_radians();
    let dlat = (b.lat_deg - a.lat_deg).to_radians();
    let dlon = (b.lon_deg - a.lon_deg).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Meters spanned by one degree of latitude.
#[must_use]
pub fn meters_per_degree_lat() -> f64 {
    EARTH_RADIUS_M * std::f64::consts::PI / 180.0
}

/// Meters spanned by one degree of longitude at the given latitude.
///
/// Shrinks toward the poles; callers converting velocities to degrees must
/// evaluate this at their current latitude.
#[must_use]
pub fn meters_per_degree_lon(lat_deg: f64) -> f64 {
    meters_per_degree_lat() * lat_deg.to_radians().cos()
}
