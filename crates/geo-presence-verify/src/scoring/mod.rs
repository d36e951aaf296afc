//! Five-factor integrity scoring for location check-ins.
//!
//! The scorer combines distance, Wi-Fi, time, GPS-accuracy, and motion
//! evidence into a bounded total and a pass/fail verdict. Every threshold
//! that shapes the score lives in [`ScoringConfig`]; the scorer itself is
//! pure and reentrant.

mod config;
mod integrity;

pub use config::{AccuracyStep, DistanceTier, MotionBand, ScoringConfig};
pub use integrity::{IntegrityBreakdown, IntegrityResult, IntegrityScorer, ScoreDetails};
