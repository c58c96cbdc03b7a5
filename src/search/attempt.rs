//! Mutable state of one boundary search.

use crate::config::units::{MmPerSec, MmPerSecSquared};
use crate::config::CalibrationConfig;
use crate::geometry::{Axis, MotionPattern};
use crate::host::StepCounts;
use crate::oracle::DriftReading;

/// Which scalar parameter a search narrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// Maximum acceleration, probed by the gauntlet.
    Accel,
    /// Maximum velocity, probed by single plateau cycles.
    Velocity,
}

impl SearchKind {
    /// Human-readable parameter name for reports.
    pub fn as_str(self) -> &'static str {
        match self {
            SearchKind::Accel => "acceleration",
            SearchKind::Velocity => "velocity",
        }
    }
}

/// State of one search invocation: bracket, pattern, thresholds, and the
/// running tally. Created per search, discarded once the bracket converges.
#[derive(Debug)]
pub struct SearchAttempt {
    /// Parameter under search.
    pub kind: SearchKind,
    /// Axis under search.
    pub axis: Axis,
    /// Move pattern owned by this attempt.
    pub pattern: MotionPattern,
    /// Known-good lower bracket.
    pub min: f32,
    /// Known-bad upper bracket.
    pub max: f32,
    /// Relative convergence bound.
    pub accuracy: f32,
    /// Miss threshold in fractional full steps.
    pub max_missed: f32,
    /// Cornering velocity applied during stress legs.
    pub scv: MmPerSec,
    /// Fixed companion acceleration for velocity searches. `None` derives
    /// one per probe from the candidate velocity.
    pub accel: Option<MmPerSecSquared>,
    /// Trusted step snapshot from the most recent homing.
    pub baseline: StepCounts,
    /// Probes evaluated so far.
    pub tries: u32,
    /// Drift readings of the most recent probe.
    pub last_drift: Option<DriftReading>,
    /// Host clock at search start, seconds.
    pub started_at: f32,
    /// Total search duration, seconds. Set once on completion.
    pub duration: f32,
}

impl SearchAttempt {
    /// Build an attempt with the bracket and accuracy configured for `kind`.
    pub fn new(
        kind: SearchKind,
        axis: Axis,
        pattern: MotionPattern,
        config: &CalibrationConfig,
    ) -> Self {
        let (min, max, accuracy) = match kind {
            SearchKind::Accel => {
                (config.accel_min.value(), config.accel_max.value(), config.accel_accuracy)
            }
            SearchKind::Velocity => {
                (config.velocity_min.value(), config.velocity_max.value(), config.velocity_accuracy)
            }
        };

        Self {
            kind,
            axis,
            pattern,
            min,
            max,
            accuracy,
            max_missed: config.max_missed,
            scv: config.scv,
            accel: None,
            baseline: StepCounts::default(),
            tries: 0,
            last_drift: None,
            started_at: 0.0,
            duration: 0.0,
        }
    }

    /// Fold one probe's drift reading into the tally.
    pub fn record(&mut self, drift: DriftReading) {
        self.tries += 1;
        self.last_drift = Some(drift);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Microsteps, Millimeters, MmPerSec};
    use crate::config::{MachineLimits, RailConfig};

    fn test_pattern() -> MotionPattern {
        let rail = RailConfig {
            position_min: Millimeters(0.0),
            position_max: Millimeters(300.0),
            microsteps: Microsteps::SIXTEENTH,
            home_position: Millimeters(0.0),
            homing_retract_dist: Millimeters(5.0),
            second_homing_speed: MmPerSec(5.0),
        };
        let limits = MachineLimits::from_rails(&rail, &rail, &rail);
        MotionPattern::new(Axis::X, &limits, Millimeters(20.0), true).unwrap()
    }

    #[test]
    fn test_bracket_follows_kind() {
        let config = CalibrationConfig::default();

        let accel = SearchAttempt::new(SearchKind::Accel, Axis::X, test_pattern(), &config);
        assert_eq!(accel.min, 1_000.0);
        assert_eq!(accel.max, 100_000.0);
        assert_eq!(accel.accuracy, 0.05);

        let velocity = SearchAttempt::new(SearchKind::Velocity, Axis::X, test_pattern(), &config);
        assert_eq!(velocity.min, 50.0);
        assert_eq!(velocity.max, 5_000.0);
        assert!(velocity.accel.is_none());
    }

    #[test]
    fn test_record_tallies() {
        let config = CalibrationConfig::default();
        let mut attempt = SearchAttempt::new(SearchKind::Accel, Axis::X, test_pattern(), &config);

        attempt.record(DriftReading {
            x: Some(0.5),
            y: None,
            z: None,
            missed: 0.5,
            valid: true,
        });
        assert_eq!(attempt.tries, 1);
        assert!(attempt.last_drift.unwrap().valid);
    }
}
