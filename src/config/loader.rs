//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::MachineConfig;

/// Load a machine configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
///
/// ```rust,ignore
/// use stepper_calibrate::load_config;
///
/// let config = load_config("machine.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MachineConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse a machine configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<MachineConfig> {
    let config: MachineConfig = toml::from_str(content).map_err(|e| {
        let msg = heapless::String::try_from(e.message()).unwrap_or_default();
        Error::Config(ConfigError::ParseError(msg))
    })?;

    // Validate the configuration
    super::validation::validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Kinematics;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[rails.x]
position_min_mm = 0.0
position_max_mm = 300.0

[rails.y]
position_min_mm = 0.0
position_max_mm = 300.0

[rails.z]
position_min_mm = 0.0
position_max_mm = 250.0
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.kinematics, Kinematics::Cartesian);
        assert_eq!(config.rails.x.travel().value(), 300.0);
        // calibration section defaults in
        assert_eq!(config.calibration.derate, 0.8);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
kinematics = "corexy"

[rails.x]
position_min_mm = 0.0
position_max_mm = 350.0
microsteps = 32

[rails.y]
position_min_mm = 0.0
position_max_mm = 350.0
microsteps = 32

[rails.z]
position_min_mm = 0.0
position_max_mm = 340.0
home_position_mm = 0.5

[calibration]
margin_mm = 25.0
accel_max_mm_per_sec2 = 50000.0
derate = 0.7
validation_pattern_size_mm = 60.0
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.kinematics, Kinematics::CoreXy);
        assert!(!config.kinematics.isolate_xy());
        assert_eq!(config.calibration.margin.value(), 25.0);
        assert_eq!(config.calibration.accel_max.value(), 50_000.0);
        // untouched defaults survive a partial [calibration] section
        assert_eq!(config.calibration.accel_min.value(), 1_000.0);
        assert_eq!(config.calibration.validation_pattern_size.unwrap().value(), 60.0);
    }

    #[test]
    fn test_parse_rejects_inverted_rail() {
        let toml = r#"
[rails.x]
position_min_mm = 300.0
position_max_mm = 0.0

[rails.y]
position_min_mm = 0.0
position_max_mm = 300.0

[rails.z]
position_min_mm = 0.0
position_max_mm = 250.0
"#;

        assert!(parse_config(toml).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_microsteps() {
        let toml = r#"
[rails.x]
position_min_mm = 0.0
position_max_mm = 300.0
microsteps = 24

[rails.y]
position_min_mm = 0.0
position_max_mm = 300.0

[rails.z]
position_min_mm = 0.0
position_max_mm = 250.0
"#;

        assert!(parse_config(toml).is_err());
    }
}
