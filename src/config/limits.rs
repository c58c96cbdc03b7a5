//! Axis travel limits derived from rail configuration.
//!
//! These are computed once at engine initialization and shared read-only by
//! every pattern and search. They are only recomputed when the homing
//! configuration changes.

use serde::Deserialize;

use crate::error::{PreconditionError, Result};

use super::rail::RailConfig;
use super::units::Millimeters;

/// One of the three physical rails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhysAxis {
    /// X rail.
    X,
    /// Y rail.
    Y,
    /// Z rail.
    Z,
}

impl PhysAxis {
    /// All physical axes, in conventional order.
    pub const ALL: [PhysAxis; 3] = [PhysAxis::X, PhysAxis::Y, PhysAxis::Z];

    /// Single-character label for reports and errors.
    pub fn label(self) -> char {
        match self {
            PhysAxis::X => 'x',
            PhysAxis::Y => 'y',
            PhysAxis::Z => 'z',
        }
    }
}

/// Travel limits of one physical axis.
#[derive(Debug, Clone, Copy)]
pub struct AxisLimits {
    /// Minimum reachable position in mm.
    pub min: Millimeters,
    /// Maximum reachable position in mm.
    pub max: Millimeters,
    /// Midpoint of the travel range in mm.
    pub center: Millimeters,
    /// Total travel distance in mm.
    pub dist: Millimeters,
    /// Configured home position in mm.
    pub home: Millimeters,
}

impl AxisLimits {
    /// Derive limits from a rail configuration.
    pub fn from_rail(rail: &RailConfig) -> Self {
        Self {
            min: rail.position_min,
            max: rail.position_max,
            center: rail.center(),
            dist: rail.travel(),
            home: rail.home_position,
        }
    }
}

/// Travel limits of all three physical axes.
///
/// Owned by the calibration engine, borrowed read-only everywhere else.
#[derive(Debug, Clone, Copy)]
pub struct MachineLimits {
    /// X axis limits.
    pub x: AxisLimits,
    /// Y axis limits.
    pub y: AxisLimits,
    /// Z axis limits.
    pub z: AxisLimits,
}

impl MachineLimits {
    /// Derive limits for all rails.
    pub fn from_rails(x: &RailConfig, y: &RailConfig, z: &RailConfig) -> Self {
        Self {
            x: AxisLimits::from_rail(x),
            y: AxisLimits::from_rail(y),
            z: AxisLimits::from_rail(z),
        }
    }

    /// Limits of a single physical axis.
    pub fn axis(&self, axis: PhysAxis) -> &AxisLimits {
        match axis {
            PhysAxis::X => &self.x,
            PhysAxis::Y => &self.y,
            PhysAxis::Z => &self.z,
        }
    }

    /// Check that every axis has usable travel.
    ///
    /// # Errors
    ///
    /// Returns `PreconditionError::InvalidTravel` for the first axis whose
    /// travel is zero or negative.
    pub fn ensure_usable(&self) -> Result<()> {
        for axis in PhysAxis::ALL {
            if self.axis(axis).dist.0 <= 0.0 {
                return Err(PreconditionError::InvalidTravel { axis: axis.label() }.into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{Microsteps, MmPerSec};

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

    #[test]
    fn test_axis_limits_derivation() {
        let limits = AxisLimits::from_rail(&rail(0.0, 300.0));
        assert_eq!(limits.center.value(), 150.0);
        assert_eq!(limits.dist.value(), 300.0);
    }

    #[test]
    fn test_ensure_usable_rejects_zero_travel() {
        let limits = MachineLimits::from_rails(&rail(0.0, 300.0), &rail(0.0, 300.0), &rail(10.0, 10.0));
        let err = limits.ensure_usable().unwrap_err();
        assert_eq!(
            err,
            crate::error::Error::Precondition(PreconditionError::InvalidTravel { axis: 'z' })
        );
    }

    #[test]
    fn test_axis_lookup() {
        let limits = MachineLimits::from_rails(&rail(0.0, 100.0), &rail(0.0, 200.0), &rail(0.0, 50.0));
        assert_eq!(limits.axis(PhysAxis::Y).dist.value(), 200.0);
        assert_eq!(limits.axis(PhysAxis::Z).dist.value(), 50.0);
    }
}
