//! Step-loss oracle.
//!
//! The only ground truth in the whole calibration scheme: after a stress
//! pattern, re-homing returns the toolhead to the endstops, and the stepper
//! counters at that trusted position are compared against the counters from
//! the previous trusted homing. Any drift is motion the host commanded but
//! the motors did not execute.
//!
//! Drift is reported in *fractional full motor steps* (raw microstep delta
//! divided by the microstep divisor) so thresholds are independent of driver
//! resolution.

use crate::config::units::Microsteps;
use crate::config::{PhysAxis, RailsConfig};
use crate::host::{HomeMask, StepCounts};

/// Step drift measured across one trusted-home-to-trusted-home interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftReading {
    /// X drift in fractional full steps, if X was measured.
    pub x: Option<f32>,
    /// Y drift in fractional full steps, if Y was measured.
    pub y: Option<f32>,
    /// Z drift in fractional full steps, if Z was measured.
    pub z: Option<f32>,
    /// Worst drift across measured axes, in fractional full steps.
    pub missed: f32,
    /// Whether every measured axis stayed at or under the threshold.
    pub valid: bool,
}

impl DriftReading {
    /// Drift of a single axis, if it was measured.
    pub fn axis(&self, axis: PhysAxis) -> Option<f32> {
        match axis {
            PhysAxis::X => self.x,
            PhysAxis::Y => self.y,
            PhysAxis::Z => self.z,
        }
    }
}

fn drift_full_steps(before: StepCounts, after: StepCounts, axis: PhysAxis, microsteps: Microsteps) -> f32 {
    let delta = before.axis(axis).abs_diff(after.axis(axis));
    delta as f32 / microsteps.value() as f32
}

/// Compare two trusted-position snapshots.
///
/// Only axes in `mask` are measured; the others report `None` and never
/// affect validity. `threshold` is inclusive: a drift exactly at the
/// threshold still passes.
pub fn measure(
    before: StepCounts,
    after: StepCounts,
    mask: HomeMask,
    rails: &RailsConfig,
    threshold: f32,
) -> DriftReading {
    let mut missed = 0.0f32;
    let mut per_axis = [None; 3];

    for (slot, (axis, microsteps)) in per_axis.iter_mut().zip([
        (PhysAxis::X, rails.x.microsteps),
        (PhysAxis::Y, rails.y.microsteps),
        (PhysAxis::Z, rails.z.microsteps),
    ]) {
        if !mask.contains(axis) {
            continue;
        }
        let drift = drift_full_steps(before, after, axis, microsteps);
        *slot = Some(drift);
        if drift > missed {
            missed = drift;
        }
    }

    DriftReading {
        x: per_axis[0],
        y: per_axis[1],
        z: per_axis[2],
        missed,
        valid: missed <= threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Millimeters, MmPerSec, Steps};
    use crate::config::RailConfig;

    fn rails(microsteps: Microsteps) -> RailsConfig {
        let rail = RailConfig {
            position_min: Millimeters(0.0),
            position_max: Millimeters(300.0),
            microsteps,
            home_position: Millimeters(0.0),
            homing_retract_dist: Millimeters(5.0),
            second_homing_speed: MmPerSec(5.0),
        };
        RailsConfig { x: rail.clone(), y: rail.clone(), z: rail }
    }

    fn counts(x: i64, y: i64, z: i64) -> StepCounts {
        StepCounts { x: Steps(x), y: Steps(y), z: Steps(z) }
    }

    #[test]
    fn test_small_drift_is_valid() {
        // 3 microsteps at 1/16 = 0.1875 full steps
        let reading = measure(
            counts(1000, 0, 0),
            counts(1003, 0, 0),
            HomeMask { x: true, y: false, z: false },
            &rails(Microsteps::SIXTEENTH),
            1.0,
        );
        assert_eq!(reading.x, Some(0.1875));
        assert_eq!(reading.y, None);
        assert!((reading.missed - 0.1875).abs() < 1e-6);
        assert!(reading.valid);
    }

    #[test]
    fn test_drift_over_threshold_is_invalid() {
        // 40 microsteps at 1/16 = 2.5 full steps
        let reading = measure(
            counts(0, 1000, 0),
            counts(0, 1040, 0),
            HomeMask::XY,
            &rails(Microsteps::SIXTEENTH),
            1.0,
        );
        assert_eq!(reading.y, Some(2.5));
        assert!(!reading.valid);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // exactly 16 microsteps at 1/16 = 1.0 full step
        let reading = measure(
            counts(0, 0, 0),
            counts(16, 0, 0),
            HomeMask { x: true, y: false, z: false },
            &rails(Microsteps::SIXTEENTH),
            1.0,
        );
        assert!(reading.valid);
    }

    #[test]
    fn test_unmasked_axis_never_invalidates() {
        // huge Z delta, but Z is not homed by this pattern
        let reading = measure(
            counts(0, 0, 0),
            counts(1, 2, 100_000),
            HomeMask::XY,
            &rails(Microsteps::SIXTEENTH),
            1.0,
        );
        assert_eq!(reading.z, None);
        assert!(reading.valid);
    }

    #[test]
    fn test_worst_axis_wins() {
        let reading = measure(
            counts(0, 0, 0),
            counts(8, 32, 0),
            HomeMask::XY,
            &rails(Microsteps::SIXTEENTH),
            3.0,
        );
        assert_eq!(reading.x, Some(0.5));
        assert_eq!(reading.y, Some(2.0));
        assert!((reading.missed - 2.0).abs() < 1e-6);
        assert!(reading.valid);
    }

    #[test]
    fn test_drift_sign_is_irrelevant() {
        let forward = measure(
            counts(1000, 0, 0),
            counts(1050, 0, 0),
            HomeMask { x: true, y: false, z: false },
            &rails(Microsteps::SIXTEENTH),
            1.0,
        );
        let backward = measure(
            counts(1050, 0, 0),
            counts(1000, 0, 0),
            HomeMask { x: true, y: false, z: false },
            &rails(Microsteps::SIXTEENTH),
            1.0,
        );
        assert_eq!(forward.missed, backward.missed);
    }
}
