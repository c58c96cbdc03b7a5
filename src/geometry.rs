//! Test-move geometry.
//!
//! Produces safe, centered, reversible back-and-forth patterns within travel
//! limits. The per-axis move classes of the original design collapse into a
//! closed variant set dispatched by one `compute` method: same behavioral
//! table, no virtual dispatch.

use core::fmt;
use core::str::FromStr;

use libm::sinf;

use crate::config::units::Millimeters;
use crate::config::MachineLimits;
use crate::error::{Result, UnsafeConfigError};
use crate::host::{HomeMask, Target};

/// Fraction of the relevant half-travel a stress move may span.
const SAFE_TRAVEL_FRACTION: f32 = 0.75;

/// A calibration axis: one of the three rails, or a 45° XY diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X rail only.
    X,
    /// Y rail only.
    Y,
    /// Z rail only.
    Z,
    /// XY diagonal along +x/+y.
    DiagX,
    /// XY diagonal along -x/+y.
    DiagY,
}

impl Axis {
    /// All valid calibration axes.
    pub const ALL: [Axis; 5] = [Axis::X, Axis::Y, Axis::Z, Axis::DiagX, Axis::DiagY];

    /// Default axis selection for a kinematics family: independently driven
    /// XY rails are probed per-rail, coupled ones through the diagonals.
    pub fn defaults(isolate_xy: bool) -> &'static [Axis] {
        if isolate_xy {
            &[Axis::X, Axis::Y]
        } else {
            &[Axis::DiagX, Axis::DiagY]
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
            Axis::DiagX => "diag_x",
            Axis::DiagY => "diag_y",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = ();

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            "diag_x" => Ok(Axis::DiagX),
            "diag_y" => Ok(Axis::DiagY),
            _ => Err(()),
        }
    }
}

/// A safe, centered, reversible stress-move pattern for one calibration axis.
///
/// Owned exclusively by the search that created it. `compute` re-derives the
/// per-call outputs (`dist`, `center`, `corner_a`, `corner_b`) for a new
/// requested distance; `max_safe_dist` and the home mask are fixed at init.
#[derive(Debug, Clone)]
pub struct MotionPattern {
    /// The axis this pattern stresses.
    pub axis: Axis,
    /// Axes that must be re-homed for the oracle to measure this pattern.
    pub home: HomeMask,
    /// Hard cap on the stress distance, derived once from travel limits.
    pub max_safe_dist: Millimeters,
    /// Stress distance of the last `compute` call (post-clamp).
    pub dist: Millimeters,
    /// Pattern midpoint.
    pub center: Target,
    /// First endpoint, at `+dist/2` along the axis direction.
    pub corner_a: Target,
    /// Second endpoint, at `-dist/2` along the axis direction.
    pub corner_b: Target,
}

impl MotionPattern {
    /// Configure a pattern for `axis`.
    ///
    /// `max_safe_dist` is 75% of the relevant half-travel (for diagonals, the
    /// smaller of the X/Y travels), additionally capped so corners stay at
    /// least `margin` away from both physical limits.
    ///
    /// # Errors
    ///
    /// Returns `UnsafeConfigError::NoSafeDistance` when the margin consumes
    /// the whole travel.
    pub fn new(
        axis: Axis,
        limits: &MachineLimits,
        margin: Millimeters,
        isolate_xy: bool,
    ) -> Result<Self> {
        let (travel, label) = match axis {
            Axis::X => (limits.x.dist, 'x'),
            Axis::Y => (limits.y.dist, 'y'),
            Axis::Z => (limits.z.dist, 'z'),
            Axis::DiagX | Axis::DiagY => {
                if limits.x.dist.0 <= limits.y.dist.0 {
                    (limits.x.dist, 'x')
                } else {
                    (limits.y.dist, 'y')
                }
            }
        };

        let fraction_cap = (travel.0 / 2.0) * SAFE_TRAVEL_FRACTION;
        let margin_cap = travel.0 - 2.0 * margin.0;
        let max_safe = fraction_cap.min(margin_cap);
        if max_safe <= 0.0 {
            return Err(UnsafeConfigError::NoSafeDistance { axis: label }.into());
        }

        let home = match axis {
            Axis::X => HomeMask { x: true, y: !isolate_xy, z: false },
            Axis::Y => HomeMask { x: !isolate_xy, y: true, z: false },
            Axis::Z => HomeMask { x: false, y: false, z: true },
            Axis::DiagX | Axis::DiagY => HomeMask::XY,
        };

        Ok(Self {
            axis,
            home,
            max_safe_dist: Millimeters(max_safe),
            dist: Millimeters(0.0),
            center: Target::HOLD,
            corner_a: Target::HOLD,
            corner_b: Target::HOLD,
        })
    }

    /// Place the corners for a requested stress distance.
    ///
    /// The distance is silently clamped to `max_safe_dist`; `corner_a` and
    /// `corner_b` end up symmetric about `center` by exactly `dist/2` along
    /// the axis direction. A zero distance degenerates to all three points
    /// coinciding, which always passes the oracle (no stress applied).
    pub fn compute(&mut self, limits: &MachineLimits, distance: Millimeters) {
        self.dist = Millimeters(distance.0.min(self.max_safe_dist.0).max(0.0));
        let half = self.dist.0 / 2.0;
        let cx = limits.x.center;
        let cy = limits.y.center;

        match self.axis {
            Axis::X => {
                self.center = Target::xy(cx, cy);
                self.corner_a = Target::xy(Millimeters(cx.0 + half), cy);
                self.corner_b = Target::xy(Millimeters(cx.0 - half), cy);
            }
            Axis::Y => {
                self.center = Target::xy(cx, cy);
                self.corner_a = Target::xy(cx, Millimeters(cy.0 + half));
                self.corner_b = Target::xy(cx, Millimeters(cy.0 - half));
            }
            Axis::Z => {
                let cz = limits.z.center;
                self.center = Target::z_only(cz);
                self.corner_a = Target::z_only(Millimeters(cz.0 + half));
                self.corner_b = Target::z_only(Millimeters(cz.0 - half));
            }
            Axis::DiagX => {
                let offset = half * sinf(core::f32::consts::FRAC_PI_4);
                self.center = Target::xy(cx, cy);
                self.corner_a = Target::xy(Millimeters(cx.0 + offset), Millimeters(cy.0 + offset));
                self.corner_b = Target::xy(Millimeters(cx.0 - offset), Millimeters(cy.0 - offset));
            }
            Axis::DiagY => {
                let offset = half * sinf(core::f32::consts::FRAC_PI_4);
                self.center = Target::xy(cx, cy);
                self.corner_a = Target::xy(Millimeters(cx.0 - offset), Millimeters(cy.0 + offset));
                self.corner_b = Target::xy(Millimeters(cx.0 + offset), Millimeters(cy.0 - offset));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Microsteps, MmPerSec};
    use crate::config::{MachineLimits, RailConfig};
    use proptest::prelude::*;

    fn rail(min: f32, max: f32) -> RailConfig {
        RailConfig {
            position_min: Millimeters(min),
            position_max: Millimeters(max),
            microsteps: Microsteps::SIXTEENTH,
            home_position: Millimeters(min),
            homing_retract_dist: Millimeters(5.0),
            second_homing_speed: MmPerSec(5.0),
        }
    }

    fn limits_300_250() -> MachineLimits {
        MachineLimits::from_rails(&rail(0.0, 300.0), &rail(0.0, 300.0), &rail(0.0, 250.0))
    }

    const MARGIN: Millimeters = Millimeters(20.0);

    #[test]
    fn test_x_max_safe_dist() {
        // 300mm travel -> (300/2) * 0.75 = 112.5
        let pattern = MotionPattern::new(Axis::X, &limits_300_250(), MARGIN, true).unwrap();
        assert!((pattern.max_safe_dist.value() - 112.5).abs() < 1e-4);
    }

    #[test]
    fn test_requested_distance_clamps() {
        let limits = limits_300_250();
        let mut pattern = MotionPattern::new(Axis::X, &limits, MARGIN, true).unwrap();
        pattern.compute(&limits, Millimeters(200.0));
        assert!((pattern.dist.value() - 112.5).abs() < 1e-4);
    }

    #[test]
    fn test_axis_aligned_corners_symmetric() {
        let limits = limits_300_250();
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let mut pattern = MotionPattern::new(axis, &limits, MARGIN, true).unwrap();
            pattern.compute(&limits, Millimeters(80.0));
            assert_eq!(pattern.dist.value(), 80.0);

            let (center, a, b) = match axis {
                Axis::X => (pattern.center.x, pattern.corner_a.x, pattern.corner_b.x),
                Axis::Y => (pattern.center.y, pattern.corner_a.y, pattern.corner_b.y),
                _ => (pattern.center.z, pattern.corner_a.z, pattern.corner_b.z),
            };
            let center = center.unwrap().value();
            assert!((a.unwrap().value() - center - 40.0).abs() < 1e-4);
            assert!((center - b.unwrap().value() - 40.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_diagonal_corners_reflect_through_center() {
        let limits = limits_300_250();
        for axis in [Axis::DiagX, Axis::DiagY] {
            let mut pattern = MotionPattern::new(axis, &limits, MARGIN, false).unwrap();
            pattern.compute(&limits, Millimeters(100.0));

            let expected = 50.0 * core::f32::consts::FRAC_1_SQRT_2;
            let cx = pattern.center.x.unwrap().value();
            let cy = pattern.center.y.unwrap().value();
            let ax = pattern.corner_a.x.unwrap().value();
            let ay = pattern.corner_a.y.unwrap().value();
            let bx = pattern.corner_b.x.unwrap().value();
            let by = pattern.corner_b.y.unwrap().value();

            // component offsets are dist/2 * sin(45°)
            assert!(((ax - cx).abs() - expected).abs() < 1e-3);
            assert!(((ay - cy).abs() - expected).abs() < 1e-3);
            // corner_b is the reflection of corner_a through the center
            assert!((ax - cx + (bx - cx)).abs() < 1e-3);
            assert!((ay - cy + (by - cy)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_diagonal_uses_smaller_travel() {
        let limits =
            MachineLimits::from_rails(&rail(0.0, 300.0), &rail(0.0, 200.0), &rail(0.0, 250.0));
        let pattern = MotionPattern::new(Axis::DiagX, &limits, MARGIN, false).unwrap();
        // (200/2) * 0.75 = 75
        assert!((pattern.max_safe_dist.value() - 75.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_distance_degenerates_to_center() {
        let limits = limits_300_250();
        let mut pattern = MotionPattern::new(Axis::X, &limits, MARGIN, true).unwrap();
        pattern.compute(&limits, Millimeters(0.0));
        assert_eq!(pattern.corner_a, pattern.center);
        assert_eq!(pattern.corner_b, pattern.center);
    }

    #[test]
    fn test_home_mask_follows_kinematics() {
        let limits = limits_300_250();
        let isolated = MotionPattern::new(Axis::X, &limits, MARGIN, true).unwrap();
        assert_eq!(isolated.home, HomeMask { x: true, y: false, z: false });

        let coupled = MotionPattern::new(Axis::X, &limits, MARGIN, false).unwrap();
        assert_eq!(coupled.home, HomeMask::XY);

        let diag = MotionPattern::new(Axis::DiagX, &limits, MARGIN, false).unwrap();
        assert_eq!(diag.home, HomeMask::XY);

        let z = MotionPattern::new(Axis::Z, &limits, MARGIN, true).unwrap();
        assert_eq!(z.home, HomeMask { x: false, y: false, z: true });
    }

    #[test]
    fn test_margin_can_exhaust_short_travel() {
        let limits =
            MachineLimits::from_rails(&rail(0.0, 300.0), &rail(0.0, 300.0), &rail(0.0, 30.0));
        let result = MotionPattern::new(Axis::Z, &limits, MARGIN, true);
        assert!(matches!(
            result,
            Err(crate::error::Error::Unsafe(UnsafeConfigError::NoSafeDistance { axis: 'z' }))
        ));
    }

    #[test]
    fn test_axis_parsing() {
        assert_eq!("diag_x".parse::<Axis>(), Ok(Axis::DiagX));
        assert_eq!("z".parse::<Axis>(), Ok(Axis::Z));
        assert!("w".parse::<Axis>().is_err());
        assert_eq!(Axis::defaults(true), &[Axis::X, Axis::Y]);
        assert_eq!(Axis::defaults(false), &[Axis::DiagX, Axis::DiagY]);
    }

    proptest! {
        #[test]
        fn prop_dist_never_exceeds_max_safe(requested in 0.0f32..10_000.0) {
            let limits = limits_300_250();
            let mut pattern = MotionPattern::new(Axis::Y, &limits, MARGIN, true).unwrap();
            pattern.compute(&limits, Millimeters(requested));
            prop_assert!(pattern.dist.0 <= pattern.max_safe_dist.0);
        }

        #[test]
        fn prop_corners_stay_inside_travel(requested in 0.0f32..10_000.0) {
            let limits = limits_300_250();
            let mut pattern = MotionPattern::new(Axis::DiagX, &limits, MARGIN, false).unwrap();
            pattern.compute(&limits, Millimeters(requested));
            for corner in [pattern.corner_a, pattern.corner_b] {
                let x = corner.x.unwrap().value();
                let y = corner.y.unwrap().value();
                prop_assert!(x >= limits.x.min.value() && x <= limits.x.max.value());
                prop_assert!(y >= limits.y.min.value() && y <= limits.y.max.value());
            }
        }
    }
}
