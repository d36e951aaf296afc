//! # Geo-Presence Core
//!
//! Foundational types and primitives for the geo-presence check-in
//! verification system.
//!
//! This crate provides the building blocks shared by the verification
//! pipeline:
//!
//! - **Domain Types**: [`PositionFix`], [`WifiObservation`], [`MotionSample`],
//!   and [`Place`] describing one check-in attempt and its target location.
//!
//! - **Geodesic Math**: [`GeoPoint`] and [`haversine_distance_m`] for
//!   great-circle distances between latitude/longitude pairs.
//!
//! - **Idempotency Keys**: [`IdempotencyKeyDeriver`], a deterministic key
//!   derivation that lets the storage layer recognise a retried check-in
//!   request as the same logical attempt.
//!
//! Everything in this crate is pure, synchronous, and free of shared mutable
//! state; it performs no I/O.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization of domain types via serde
//!
//! ## Example
//!
//! ```rust
//! use geo_presence_core::{GeoPoint, haversine_distance_m};
//!
//! let center = GeoPoint::new(52.5200, 13.4050);
//! let nearby = GeoPoint::new(52.5201, 13.4050);
//!
//! assert!(haversine_distance_m(center, nearby) < 15.0);
//! ```

#![forbid(unsafe_code)]

pub mod geo;
pub mod idempotency;
pub mod types;

// Re-export commonly used types at the crate root
pub use geo::{
    haversine_distance_m, meters_per_degree_lat, meters_per_degree_lon, GeoPoint, EARTH_RADIUS_M,
};
pub use idempotency::{IdempotencyKey, IdempotencyKeyDeriver, KeyAlgorithm};
pub use types::{MotionSample, Place, PlaceId, PositionFix, UserId, WifiObservation};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
///
/// ```rust
/// use geo_presence_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::geo::{haversine_distance_m, GeoPoint, EARTH_RADIUS_M};
    pub use crate::idempotency::{IdempotencyKey, IdempotencyKeyDeriver, KeyAlgorithm};
    pub use crate::types::{MotionSample, Place, PlaceId, PositionFix, UserId, WifiObservation};
}
