//! Boundary search, gauntlet and validation.
//!
//! The engine in [`engine`] ties the pieces together: the generic boundary
//! search narrows a scalar bracket, the gauntlet qualifies acceleration
//! candidates, and the chaos validator confirms the final recommendation.

mod attempt;
mod binary;
mod engine;
mod results;
mod validate;

pub use attempt::{SearchAttempt, SearchKind};
pub use binary::{boundary_search, SearchOutcome};
pub use engine::{
    CalibrationOutcome, Calibrator, COMPANION_ACCEL_RATIO, MAX_MISSED_THRESHOLD,
    MIN_SHORT_MOVE_DISTANCE,
};
pub use results::SearchResult;
pub use validate::{
    chaos_waypoints, max_pattern_size, pattern_size, ValidationReport, CHAOS_LEGS,
};
