//! Per-axis rail configuration from TOML.

use serde::Deserialize;

use super::units::{Microsteps, Millimeters, MmPerSec};

/// Configuration of one physical rail (axis): travel range, stepper
/// resolution and homing parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct RailConfig {
    /// Minimum reachable position in mm.
    #[serde(rename = "position_min_mm")]
    pub position_min: Millimeters,

    /// Maximum reachable position in mm.
    #[serde(rename = "position_max_mm")]
    pub position_max: Millimeters,

    /// Microstep setting of the rail's stepper driver.
    #[serde(default)]
    pub microsteps: Microsteps,

    /// Configured home position in mm.
    #[serde(default, rename = "home_position_mm")]
    pub home_position: Millimeters,

    /// Distance the rail backs off after triggering the endstop in mm.
    #[serde(default = "default_homing_retract", rename = "homing_retract_dist_mm")]
    pub homing_retract_dist: Millimeters,

    /// Speed of the slow second homing pass in mm/s.
    #[serde(default = "default_second_homing_speed", rename = "second_homing_speed_mm_per_sec")]
    pub second_homing_speed: MmPerSec,
}

fn default_homing_retract() -> Millimeters {
    Millimeters(5.0)
}

fn default_second_homing_speed() -> MmPerSec {
    MmPerSec(5.0)
}

impl RailConfig {
    /// Total usable travel in mm.
    pub fn travel(&self) -> Millimeters {
        self.position_max - self.position_min
    }

    /// Midpoint of the travel range in mm.
    pub fn center(&self) -> Millimeters {
        Millimeters((self.position_min.0 + self.position_max.0) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_and_center() {
        let rail = RailConfig {
            position_min: Millimeters(0.0),
            position_max: Millimeters(300.0),
            microsteps: Microsteps::SIXTEENTH,
            home_position: Millimeters(0.0),
            homing_retract_dist: Millimeters(5.0),
            second_homing_speed: MmPerSec(5.0),
        };

        assert_eq!(rail.travel().value(), 300.0);
        assert_eq!(rail.center().value(), 150.0);
    }
}
