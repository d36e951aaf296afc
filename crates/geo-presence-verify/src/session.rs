//! Per-session ownership of position-filter state.
//!
//! A filter instance belongs to exactly one logical tracking session (one
//! user/device flow) and is never shared between concurrent check-in flows.
//! The [`SessionRegistry`] is the single synchronization point: it owns the
//! sessions behind one lock, and each update runs to completion under it, so
//! the filters themselves stay lock-free.

use std::collections::HashMap;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::filter::{
    FilterMeasurement, KalmanPositionFilter, MovingAverageFilter, PositionFilter, SmoothedFix,
};

/// Unique identifier for a tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Allocate a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Smoothing strategy for a session's filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStrategy {
    /// Velocity-augmented Kalman filter; the default for moving devices
    #[default]
    Kalman,
    /// Weighted moving average; cheaper, for near-stationary sessions
    MovingAverage,
}

impl FilterStrategy {
    /// Build a fresh filter for this strategy.
    #[must_use]
    pub fn build(&self) -> Box<dyn PositionFilter + Send> {
        match self {
            FilterStrategy::Kalman => Box::new(KalmanPositionFilter::with_defaults()),
            FilterStrategy::MovingAverage => Box::new(MovingAverageFilter::with_defaults()),
        }
    }
}

/// One tracking session and the filter it exclusively owns.
pub struct TrackingSession {
    id: SessionId,
    strategy: FilterStrategy,
    filter: Box<dyn PositionFilter + Send>,
}

impl TrackingSession {
    /// Create a session with a fresh filter for the given strategy.
    #[must_use]
    pub fn new(strategy: FilterStrategy) -> Self {
        Self {
            id: SessionId::new(),
            strategy,
            filter: strategy.build(),
        }
    }

    /// The session identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The strategy this session was created with.
    #[must_use]
    pub fn strategy(&self) -> FilterStrategy {
        self.strategy
    }

    /// Feed one measurement through the session's filter.
    pub fn update(&mut self, measurement: &FilterMeasurement) -> SmoothedFix {
        self.filter.update(measurement)
    }

    /// Return the filter to its uninitialized state.
    pub fn reset(&mut self) {
        self.filter.reset();
    }

    /// Whether the session's filter has seen a measurement since the last
    /// reset.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.filter.is_tracking()
    }
}

/// Registry of live tracking sessions.
///
/// Holds every session behind one lock so concurrent request handlers can
/// share the registry by reference; per-session exclusivity follows from
/// running each update under the lock.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, TrackingSession>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and return its ID.
    pub fn create(&self, strategy: FilterStrategy) -> SessionId {
        let session = TrackingSession::new(strategy);
        let id = session.id();
        self.sessions.lock().insert(id, session);
        tracing::debug!(session = %id, ?strategy, "tracking session created");
        id
    }

    /// Feed a measurement through the identified session's filter.
    ///
    /// Returns `None` for an unknown session.
    pub fn update(&self, id: &SessionId, measurement: &FilterMeasurement) -> Option<SmoothedFix> {
        self.sessions
            .lock()
            .get_mut(id)
            .map(|session| session.update(measurement))
    }

    /// Reset the identified session's filter.
    ///
    /// Returns `false` for an unknown session.
    pub fn reset(&self, id: &SessionId) -> bool {
        match self.sessions.lock().get_mut(id) {
            Some(session) => {
                session.reset();
                true
            }
            None => false,
        }
    }

    /// Remove a session, discarding its filter state.
    ///
    /// Returns `false` for an unknown session.
    pub fn remove(&self, id: &SessionId) -> bool {
        let removed = self.sessions.lock().remove(id).is_some();
        if removed {
            tracing::debug!(session = %id, "tracking session removed");
        }
        removed
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether the registry has no live sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use geo_presence_core::{GeoPoint, PositionFix};

    fn measurement(lat: f64, lon: f64, offset_secs: i64) -> FilterMeasurement {
        FilterMeasurement::from_fix(PositionFix::new(
            GeoPoint::new(lat, lon),
            10.0,
            Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
                + chrono::Duration::seconds(offset_secs),
        ))
    }

    #[test]
    fn test_sessions_do_not_interfere() {
        let registry = SessionRegistry::new();
        let berlin = registry.create(FilterStrategy::Kalman);
        let paris = registry.create(FilterStrategy::Kalman);
        assert_eq!(registry.len(), 2);

        let b1 = registry
            .update(&berlin, &measurement(52.52, 13.405, 0))
            .expect("session exists");
        let p1 = registry
            .update(&paris, &measurement(48.8566, 2.3522, 0))
            .expect("session exists");

        // Each session seeds from its own first fix.
        assert!((b1.point.lat_deg - 52.52).abs() < 1e-9);
        assert!((p1.point.lat_deg - 48.8566).abs() < 1e-9);

        // Feeding one session never moves the other.
        registry.update(&berlin, &measurement(52.53, 13.41, 1));
        let p2 = registry
            .update(&paris, &measurement(48.8566, 2.3522, 1))
            .expect("session exists");
        assert!((p2.point.lat_deg - 48.8566).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_session_returns_none() {
        let registry = SessionRegistry::new();
        let ghost = SessionId::new();

        assert!(registry.update(&ghost, &measurement(0.0, 0.0, 0)).is_none());
        assert!(!registry.reset(&ghost));
        assert!(!registry.remove(&ghost));
    }

    #[test]
    fn test_reset_reseeds_on_next_update() {
        let registry = SessionRegistry::new();
        let id = registry.create(FilterStrategy::Kalman);

        registry.update(&id, &measurement(52.52, 13.405, 0));
        registry.update(&id, &measurement(52.521, 13.406, 1));
        assert!(registry.reset(&id));

        // After a reset the next fix seeds the filter from scratch.
        let out = registry
            .update(&id, &measurement(40.0, -74.0, 2))
            .expect("session exists");
        assert!((out.point.lat_deg - 40.0).abs() < 1e-12);
        assert!((out.accuracy_m - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_remove_discards_state() {
        let registry = SessionRegistry::new();
        let id = registry.create(FilterStrategy::MovingAverage);
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(&id));
        assert!(registry.is_empty());
        assert!(registry.update(&id, &measurement(0.0, 0.0, 0)).is_none());
    }

    #[test]
    fn test_moving_average_strategy_builds_that_filter() {
        let mut session = TrackingSession::new(FilterStrategy::MovingAverage);
        assert_eq!(session.strategy(), FilterStrategy::MovingAverage);
        assert!(!session.is_tracking());

        session.update(&measurement(1.0, 2.0, 0));
        assert!(session.is_tracking());

        session.reset();
        assert!(!session.is_tracking());
    }
}
