//! Configuration module for stepper-calibrate.
//!
//! Provides types for loading and validating machine and calibration-session
//! configurations from TOML files (with `std` feature) or pre-parsed data.

mod calibration;
mod limits;
#[cfg(feature = "std")]
mod loader;
mod rail;
mod system;
pub mod units;
mod validation;

pub use calibration::CalibrationConfig;
pub use limits::{AxisLimits, MachineLimits, PhysAxis};
pub use rail::RailConfig;
pub use system::{Kinematics, MachineConfig, RailsConfig};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Microsteps, Millimeters, MmPerSec, MmPerSecSquared, Steps};
