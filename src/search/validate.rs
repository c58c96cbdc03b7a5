//! Chaos-pattern validation geometry and reporting.
//!
//! The final confirmation run traces a fixed, intentionally non-monotonic
//! waypoint sequence ("chaos star") inside a centered square: corner-to-corner
//! diagonals, edge crossings and direction reversals that simple back-and-forth
//! probes never exercise. Step loss is measured cumulatively over a whole
//! iteration, not per leg - a throughput trade-off that can let small canceling
//! errors mask each other.

use crate::config::units::Millimeters;
use crate::config::MachineLimits;
use crate::error::{Result, UnsafeConfigError};
use crate::host::Target;

/// Legs per chaos iteration.
pub const CHAOS_LEGS: usize = 16;

/// Fixed clearance subtracted from the auto-derived pattern size, mm.
const PATTERN_CLEARANCE: f32 = 10.0 / 1.5;

/// Largest chaos square that fits the central third of the smaller XY travel,
/// minus a fixed clearance.
pub fn max_pattern_size(limits: &MachineLimits) -> Millimeters {
    let min_travel = limits.x.dist.value().min(limits.y.dist.value());
    Millimeters(min_travel / 3.0 - PATTERN_CLEARANCE)
}

/// Resolve the pattern size: configured value checked against the safe
/// maximum, or the maximum itself when unconfigured.
///
/// # Errors
///
/// Returns `UnsafeConfigError::PatternTooLarge` when a configured size
/// exceeds the safe maximum, or `UnsafeConfigError::NoSafeDistance` when
/// the travel is too short to fit any pattern at all; the validation run is
/// skipped, not attempted.
pub fn pattern_size(limits: &MachineLimits, configured: Option<Millimeters>) -> Result<Millimeters> {
    let max = max_pattern_size(limits);
    if max.value() <= 0.0 {
        let axis = if limits.x.dist.value() <= limits.y.dist.value() { 'x' } else { 'y' };
        return Err(UnsafeConfigError::NoSafeDistance { axis }.into());
    }
    match configured {
        None => Ok(max),
        Some(size) if size.value() <= max.value() => Ok(size),
        Some(size) => Err(UnsafeConfigError::PatternTooLarge {
            requested: size.value(),
            max: max.value(),
        }
        .into()),
    }
}

/// Build one chaos iteration: 16 waypoints over the corners (`c1`..`c4`,
/// counterclockwise from min/min) and edge midpoints (`m1`..`m4`) of a
/// `size`-sided square centered in XY.
pub fn chaos_waypoints(limits: &MachineLimits, size: Millimeters) -> [Target; CHAOS_LEGS] {
    let cx = limits.x.center.value();
    let cy = limits.y.center.value();
    let half = size.value() / 2.0;

    let at = |x: f32, y: f32| Target::xy(Millimeters(x), Millimeters(y));
    let c1 = at(cx - half, cy - half);
    let c2 = at(cx + half, cy - half);
    let c3 = at(cx + half, cy + half);
    let c4 = at(cx - half, cy + half);
    let m1 = at(cx - half, cy);
    let m2 = at(cx, cy - half);
    let m3 = at(cx + half, cy);
    let m4 = at(cx, cy + half);

    [
        c1, c2, c3, c4, c1, // perimeter lap
        c3, c1, c2, c4, c3, // crossing diagonals
        m1, m3, m2, m4, m1, // midpoint star
        c2,
    ]
}

/// Aggregate outcome of a validation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationReport {
    /// Chaos iterations executed.
    pub iterations: u32,
    /// Iterations whose cumulative drift stayed under the threshold.
    pub passes: u32,
    /// Iterations that exceeded it.
    pub failures: u32,
    /// Side length of the square actually used, mm.
    pub pattern_size: Millimeters,
    /// Worst cumulative drift seen across all iterations, fractional full steps.
    pub worst_missed: f32,
    /// Worst X drift seen across all iterations, fractional full steps.
    pub worst_x: f32,
    /// Worst Y drift seen across all iterations, fractional full steps.
    pub worst_y: f32,
    /// Total wall-clock duration, seconds.
    pub duration: f32,
}

impl ValidationReport {
    /// Whether every iteration passed.
    pub fn passed(&self) -> bool {
        self.failures == 0
    }
}
