//! Closed-form probe kinematics.
//!
//! Every stress probe converts a kinematic target into the *minimum* move
//! distance that actually reaches it, keeping probes as short as possible
//! without invalidating the measurement.

use libm::sqrtf;

use crate::config::units::{Millimeters, MmPerSec, MmPerSecSquared};

/// Exact distance to accelerate from rest to `velocity` and immediately
/// decelerate back to rest (a sharp triangular velocity profile):
/// `v² / a`.
///
/// `accel == 0` yields an infinite distance; callers clamp probe moves with a
/// minimum floor so this can never gate a real move.
pub fn accel_focused_dist(velocity: MmPerSec, accel: MmPerSecSquared) -> Millimeters {
    if accel.0 == 0.0 {
        return Millimeters(f32::INFINITY);
    }
    Millimeters((velocity.0 * velocity.0) / accel.0)
}

/// Distance of an accel/decel phase plus a constant-velocity coast segment.
///
/// The coast sustains peak velocity rather than peak acceleration, exercising
/// continuous high-speed tracking error instead of transient jerk.
pub fn velocity_plateau_dist(
    velocity: MmPerSec,
    accel: MmPerSecSquared,
    coast: Millimeters,
) -> Millimeters {
    accel_focused_dist(velocity, accel) + coast
}

/// Peak velocity reachable over `travel` under `accel` with a triangular
/// profile: `sqrt(a · d)`. Inverse of [`accel_focused_dist`] in `v`.
pub fn peak_velocity(accel: MmPerSecSquared, travel: Millimeters) -> MmPerSec {
    MmPerSec(sqrtf(accel.0 * travel.0))
}

/// Acceleration needed to reach `velocity` within `travel` with a triangular
/// profile: `v² / d`. Inverse of [`accel_focused_dist`] in `a`.
pub fn peak_accel(velocity: MmPerSec, travel: Millimeters) -> MmPerSecSquared {
    if travel.0 == 0.0 {
        return MmPerSecSquared(f32::INFINITY);
    }
    MmPerSecSquared((velocity.0 * velocity.0) / travel.0)
}

/// Euclidean length of a two-axis move.
pub fn diagonal(x: Millimeters, y: Millimeters) -> Millimeters {
    Millimeters(sqrtf(x.0 * x.0 + y.0 * y.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accel_focused_dist() {
        // 200 mm/s at 8000 mm/s² -> 40000/8000 = 5mm
        let d = accel_focused_dist(MmPerSec(200.0), MmPerSecSquared(8_000.0));
        assert!((d.value() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_accel_is_unbounded() {
        let d = accel_focused_dist(MmPerSec(200.0), MmPerSecSquared(0.0));
        assert!(d.value().is_infinite());

        let a = peak_accel(MmPerSec(200.0), Millimeters(0.0));
        assert!(a.value().is_infinite());
    }

    #[test]
    fn test_plateau_adds_coast() {
        let sharp = accel_focused_dist(MmPerSec(100.0), MmPerSecSquared(2_000.0));
        let long = velocity_plateau_dist(MmPerSec(100.0), MmPerSecSquared(2_000.0), Millimeters(80.0));
        assert!((long.value() - sharp.value() - 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_diagonal() {
        let d = diagonal(Millimeters(3.0), Millimeters(4.0));
        assert!((d.value() - 5.0).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_dist_matches_definition(v in 1.0f32..2_000.0, a in 1.0f32..200_000.0) {
            let d = accel_focused_dist(MmPerSec(v), MmPerSecSquared(a));
            prop_assert!((d.value() - v * v / a).abs() <= f32::EPSILON * v * v / a * 4.0);
        }

        #[test]
        fn prop_peak_velocity_inverts_dist(v in 10.0f32..1_000.0, a in 100.0f32..50_000.0) {
            let d = accel_focused_dist(MmPerSec(v), MmPerSecSquared(a));
            let back = peak_velocity(MmPerSecSquared(a), d);
            prop_assert!((back.value() - v).abs() / v < 1e-3);
        }

        #[test]
        fn prop_peak_accel_inverts_dist(v in 10.0f32..1_000.0, a in 100.0f32..50_000.0) {
            let d = accel_focused_dist(MmPerSec(v), MmPerSecSquared(a));
            let back = peak_accel(MmPerSec(v), d);
            prop_assert!((back.value() - a).abs() / a < 1e-3);
        }
    }
}
