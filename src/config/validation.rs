//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::limits::PhysAxis;
use super::rail::RailConfig;
use super::{CalibrationConfig, MachineConfig};

/// Validate a machine configuration.
///
/// Checks:
/// - Rail ranges are valid (min < max)
/// - Search brackets are ordered and above 1.0
/// - Accuracies and derate are in (0, 1)
/// - Margin is positive and cornering velocity in range
pub fn validate_config(config: &MachineConfig) -> Result<()> {
    validate_rail(PhysAxis::X, &config.rails.x)?;
    validate_rail(PhysAxis::Y, &config.rails.y)?;
    validate_rail(PhysAxis::Z, &config.rails.z)?;
    validate_calibration(&config.calibration)?;
    Ok(())
}

fn validate_rail(axis: PhysAxis, rail: &RailConfig) -> Result<()> {
    if rail.position_min.0 >= rail.position_max.0 {
        return Err(Error::Config(ConfigError::InvalidRailRange {
            axis: axis.label(),
            min: rail.position_min.0,
            max: rail.position_max.0,
        }));
    }
    Ok(())
}

fn validate_calibration(cal: &CalibrationConfig) -> Result<()> {
    if cal.margin.0 <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidMargin(cal.margin.0)));
    }

    if cal.accel_min.0 <= 1.0 || cal.accel_max.0 <= cal.accel_min.0 {
        return Err(Error::Config(ConfigError::InvalidSearchBounds {
            min: cal.accel_min.0,
            max: cal.accel_max.0,
        }));
    }

    if cal.velocity_min.0 <= 1.0 || cal.velocity_max.0 <= cal.velocity_min.0 {
        return Err(Error::Config(ConfigError::InvalidSearchBounds {
            min: cal.velocity_min.0,
            max: cal.velocity_max.0,
        }));
    }

    if !(0.0..1.0).contains(&cal.accel_accuracy) || cal.accel_accuracy == 0.0 {
        return Err(Error::Config(ConfigError::InvalidAccuracy(cal.accel_accuracy)));
    }

    if !(0.0..1.0).contains(&cal.velocity_accuracy) || cal.velocity_accuracy == 0.0 {
        return Err(Error::Config(ConfigError::InvalidAccuracy(cal.velocity_accuracy)));
    }

    if cal.derate <= 0.0 || cal.derate >= 1.0 {
        return Err(Error::Config(ConfigError::InvalidDerate(cal.derate)));
    }

    if cal.scv.0 < 1.0 || cal.scv.0 > 50.0 {
        return Err(Error::Config(ConfigError::InvalidCorneringVelocity(cal.scv.0)));
    }

    if cal.endstop_samples < 2 {
        return Err(Error::Config(ConfigError::InvalidEndstopSamples(
            cal.endstop_samples,
        )));
    }

    Ok(())
}
