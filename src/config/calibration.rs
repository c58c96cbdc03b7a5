//! Calibration session parameters from TOML.
//!
//! Every field has a conservative default, so an empty `[calibration]`
//! section yields a usable session.

use serde::Deserialize;

use super::units::{Millimeters, MmPerSec, MmPerSecSquared};

/// Tunable parameters of a calibration session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Safety margin kept between pattern corners and physical limits, in mm.
    #[serde(rename = "margin_mm")]
    pub margin: Millimeters,

    /// Perform one extra X/Y home before sampling endstop variance.
    pub settling_home: bool,

    /// Miss threshold in fractional full steps for velocity searches,
    /// endstop variance and validation.
    pub max_missed: f32,

    /// Number of homing cycles used to sample endstop repeatability.
    pub endstop_samples: u32,

    /// Lower bracket of the acceleration search in mm/s².
    #[serde(rename = "accel_min_mm_per_sec2")]
    pub accel_min: MmPerSecSquared,

    /// Upper bracket of the acceleration search in mm/s².
    #[serde(rename = "accel_max_mm_per_sec2")]
    pub accel_max: MmPerSecSquared,

    /// Relative convergence bound of the acceleration search.
    pub accel_accuracy: f32,

    /// Square-corner (cornering) velocity applied during stress moves, mm/s.
    #[serde(rename = "scv_mm_per_sec")]
    pub scv: MmPerSec,

    /// Lower bracket of the velocity search in mm/s.
    #[serde(rename = "velocity_min_mm_per_sec")]
    pub velocity_min: MmPerSec,

    /// Upper bracket of the velocity search in mm/s.
    #[serde(rename = "velocity_max_mm_per_sec")]
    pub velocity_max: MmPerSec,

    /// Relative convergence bound of the velocity search.
    pub velocity_accuracy: f32,

    /// Safety factor applied to measured maxima before recommending them.
    pub derate: f32,

    /// Fixed velocity used for acceleration stress probes, mm/s.
    #[serde(rename = "accel_test_velocity_mm_per_sec")]
    pub accel_test_velocity: MmPerSec,

    /// Probe pairs per gauntlet profile (N forward + N reverse, twice).
    pub samples_per_test_type: u32,

    /// Iterations of the chaos pattern in final validation.
    pub validation_iterations: u32,

    /// Side length of the validation square in mm. `None` auto-derives the
    /// largest safe size from the travel limits.
    #[serde(rename = "validation_pattern_size_mm")]
    pub validation_pattern_size: Option<Millimeters>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            margin: Millimeters(20.0),
            settling_home: true,
            max_missed: 1.0,
            endstop_samples: 3,
            accel_min: MmPerSecSquared(1_000.0),
            accel_max: MmPerSecSquared(100_000.0),
            accel_accuracy: 0.05,
            scv: MmPerSec(5.0),
            velocity_min: MmPerSec(50.0),
            velocity_max: MmPerSec(5_000.0),
            velocity_accuracy: 0.05,
            derate: 0.8,
            accel_test_velocity: MmPerSec(200.0),
            samples_per_test_type: 3,
            validation_iterations: 5,
            validation_pattern_size: None,
        }
    }
}
