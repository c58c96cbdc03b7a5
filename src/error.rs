//! Error types for stepper-calibrate.
//!
//! Provides unified error handling across configuration, pre-flight checks,
//! and motion-host faults. Note that a failed probe (step loss detected) is
//! *not* an error: it is a first-class boolean outcome that steers the
//! boundary search. Errors here abort the calibration run.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-calibrate operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Pre-flight condition not met; aborts before any stress motion
    Precondition(PreconditionError),
    /// Requested operation would exceed a computed safety bound
    Unsafe(UnsafeConfigError),
    /// Fault reported by the motion host (fatal for the run)
    Host(HostError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// Rail travel range is invalid (min must be < max)
    InvalidRailRange {
        /// Axis label ('x', 'y' or 'z')
        axis: char,
        /// Configured minimum position
        min: f32,
        /// Configured maximum position
        max: f32,
    },
    /// Search bracket is invalid (min must be < max, both above 1.0)
    InvalidSearchBounds {
        /// Lower bracket
        min: f32,
        /// Upper bracket
        max: f32,
    },
    /// Relative accuracy must be in (0, 1)
    InvalidAccuracy(f32),
    /// Derating factor must be in (0, 1)
    InvalidDerate(f32),
    /// Safety margin must be > 0
    InvalidMargin(f32),
    /// Cornering velocity out of range (must be 1-50)
    InvalidCorneringVelocity(f32),
    /// Endstop sample count must be at least 2
    InvalidEndstopSamples(u32),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Pre-flight errors: the machine is not in a state the oracle can trust.
#[derive(Debug, Clone, PartialEq)]
pub enum PreconditionError {
    /// An axis has zero or negative usable travel
    InvalidTravel {
        /// Axis label ('x', 'y' or 'z')
        axis: char,
    },
    /// Homing repeatability is worse than the miss threshold, so drift
    /// measurements would be meaningless
    EndstopVariance {
        /// Worst offending axis label
        axis: char,
        /// Measured variance in fractional full steps
        missed: f32,
        /// Configured miss threshold
        threshold: f32,
    },
}

/// Operations skipped because they would exceed a computed safety bound.
#[derive(Debug, Clone, PartialEq)]
pub enum UnsafeConfigError {
    /// Configured validation pattern does not fit the safe central region
    PatternTooLarge {
        /// Requested pattern size in mm
        requested: f32,
        /// Largest safe size in mm
        max: f32,
    },
    /// Margins leave no usable stress-move distance on an axis
    NoSafeDistance {
        /// Axis label
        axis: char,
    },
}

/// Opaque fault propagated from the motion host.
///
/// The engine never retries these; a stall or communication fault invalidates
/// the whole calibration run.
#[derive(Debug, Clone, PartialEq)]
pub struct HostError {
    message: heapless::String<96>,
}

impl HostError {
    /// Create a host error from a message (truncated to capacity).
    pub fn new(message: &str) -> Self {
        let mut buf: heapless::String<96> = heapless::String::new();
        for ch in message.chars() {
            if buf.push(ch).is_err() {
                break;
            }
        }
        Self { message: buf }
    }

    /// The fault description.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Precondition(e) => write!(f, "Precondition error: {}", e),
            Error::Unsafe(e) => write!(f, "Unsafe configuration: {}", e),
            Error::Host(e) => write!(f, "Motion host error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::InvalidRailRange { axis, min, max } => {
                write!(f, "Invalid {} rail range: min ({}) must be < max ({})", axis, min, max)
            }
            ConfigError::InvalidSearchBounds { min, max } => {
                write!(f, "Invalid search bounds: [{}, {}]. Require 1.0 < min < max", min, max)
            }
            ConfigError::InvalidAccuracy(v) => {
                write!(f, "Invalid relative accuracy: {}. Must be in (0, 1)", v)
            }
            ConfigError::InvalidDerate(v) => {
                write!(f, "Invalid derate factor: {}. Must be in (0, 1)", v)
            }
            ConfigError::InvalidMargin(v) => write!(f, "Invalid margin: {}. Must be > 0", v),
            ConfigError::InvalidCorneringVelocity(v) => {
                write!(f, "Invalid cornering velocity: {}. Must be 1-50", v)
            }
            ConfigError::InvalidEndstopSamples(v) => {
                write!(f, "Invalid endstop sample count: {}. Must be >= 2", v)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreconditionError::InvalidTravel { axis } => {
                write!(f, "Axis {} has no usable travel", axis)
            }
            PreconditionError::EndstopVariance { axis, missed, threshold } => {
                write!(
                    f,
                    "Endstop variance on {} is {:.2} steps (threshold {:.2}); tune homing before calibrating",
                    axis, missed, threshold
                )
            }
        }
    }
}

impl fmt::Display for UnsafeConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsafeConfigError::PatternTooLarge { requested, max } => {
                write!(
                    f,
                    "Validation pattern of {:.1}mm exceeds the safe maximum of {:.1}mm",
                    requested, max
                )
            }
            UnsafeConfigError::NoSafeDistance { axis } => {
                write!(f, "Margins leave no safe stress distance on axis {}", axis)
            }
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<PreconditionError> for Error {
    fn from(e: PreconditionError) -> Self {
        Error::Precondition(e)
    }
}

impl From<UnsafeConfigError> for Error {
    fn from(e: UnsafeConfigError) -> Self {
        Error::Unsafe(e)
    }
}

impl From<HostError> for Error {
    fn from(e: HostError) -> Self {
        Error::Host(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for PreconditionError {}

#[cfg(feature = "std")]
impl std::error::Error for UnsafeConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for HostError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_truncates() {
        let long = "x".repeat(200);
        let err = HostError::new(&long);
        assert_eq!(err.message().len(), 96);
    }

    #[test]
    fn test_error_conversions() {
        let e: Error = ConfigError::InvalidMargin(-1.0).into();
        assert!(matches!(e, Error::Config(_)));

        let e: Error = PreconditionError::InvalidTravel { axis: 'z' }.into();
        assert!(matches!(e, Error::Precondition(_)));
    }
}
