//! # Geo-Presence Verify
//!
//! Verification algorithms for location check-ins: given a position fix and
//! place metadata, decide how much to trust the claim that the user is
//! physically there.
//!
//! ## Pipeline
//!
//! The surrounding request handler calls these components in order:
//!
//! ```text
//! RequestValidator -> (PositionFilter) -> IntegrityScorer -> caller
//! ```
//!
//! with the idempotency key (from `geo-presence-core`) derived independently
//! from validated input for deduplication.
//!
//! - [`request`]: schema/range validation of the raw check-in payload,
//!   reporting every violation found, not just the first.
//! - [`filter`]: stateful smoothing of successive noisy fixes, either a
//!   velocity-augmented Kalman filter or a weighted moving average.
//! - [`scoring`]: the five-factor integrity score (distance, Wi-Fi, time,
//!   accuracy, motion) combined into a bounded total and a pass/fail
//!   verdict.
//! - [`session`]: exclusive per-session ownership of filter state, so
//!   concurrent check-in flows never share a filter.
//!
//! Scoring and validation are pure and reentrant; the session registry is
//! the single synchronization point for filter state.
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use geo_presence_core::{GeoPoint, Place, PlaceId, PositionFix, WifiObservation};
//! use geo_presence_verify::scoring::IntegrityScorer;
//!
//! let place = Place::new(
//!     PlaceId::new("cafe-1"),
//!     GeoPoint::new(52.5200, 13.4050),
//!     50.0,
//!     vec!["cafe-guest".into()],
//! );
//!
//! let now = Utc::now();
//! let fix = PositionFix::new(place.position, 5.0, now);
//! let wifi = WifiObservation::new(vec!["cafe-guest".into()]);
//!
//! let scorer = IntegrityScorer::with_defaults();
//! let result = scorer.score(&fix, Some(&wifi), None, &place, now);
//!
//! assert!(result.valid);
//! ```

#![forbid(unsafe_code)]

pub mod filter;
pub mod request;
pub mod scoring;
pub mod session;

// Re-export main types
pub use filter::{
    FilterMeasurement, KalmanConfig, KalmanPositionFilter, MovingAverageConfig,
    MovingAverageFilter, PositionFilter, SmoothedFix,
};
pub use request::{
    CheckInRequest, FieldViolation, RequestValidator, ValidatedCheckIn, ValidationConfig,
    ValidationError,
};
pub use scoring::{
    IntegrityBreakdown, IntegrityResult, IntegrityScorer, ScoreDetails, ScoringConfig,
};
pub use session::{FilterStrategy, SessionId, SessionRegistry, TrackingSession};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for verification operations
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Unified error type for verification operations
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum VerifyError {
    /// The request payload failed field validation
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A configuration value is out of its usable range
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },
}

impl VerifyError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
