//! Machine configuration - root configuration structure.

use serde::Deserialize;

use super::calibration::CalibrationConfig;
use super::limits::MachineLimits;
use super::rail::RailConfig;

/// Kinematics family of the motion platform.
///
/// Determines whether X and Y motion can be stressed in isolation: on
/// cartesian and corexz machines each rail has its own motor, so a
/// single-axis probe only needs to re-home that axis. Cross-coupled
/// kinematics drive X and Y through shared motors, so every XY probe
/// re-homes both and the default test axes become the diagonals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kinematics {
    /// Independent X/Y/Z rails.
    #[default]
    Cartesian,
    /// A/B belt drive coupling X and Y.
    CoreXy,
    /// Coupled X and Z, independent Y.
    CoreXz,
    /// Three-tower delta.
    Delta,
}

impl Kinematics {
    /// Whether X and Y step loss can be attributed to a single motor.
    pub fn isolate_xy(self) -> bool {
        matches!(self, Kinematics::Cartesian | Kinematics::CoreXz)
    }
}

/// The three rail configurations.
#[derive(Debug, Clone, Deserialize)]
pub struct RailsConfig {
    /// X rail.
    pub x: RailConfig,
    /// Y rail.
    pub y: RailConfig,
    /// Z rail.
    pub z: RailConfig,
}

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineConfig {
    /// Kinematics family.
    #[serde(default)]
    pub kinematics: Kinematics,

    /// Per-axis rail configurations.
    pub rails: RailsConfig,

    /// Calibration session parameters.
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

impl MachineConfig {
    /// Derive the travel limits of all three axes.
    pub fn limits(&self) -> MachineLimits {
        MachineLimits::from_rails(&self.rails.x, &self.rails.y, &self.rails.z)
    }
}
