//! # stepper-calibrate
//!
//! Adaptive calibration of maximum acceleration and velocity for multi-axis
//! stepper motion platforms, driven by a physical pass/fail oracle.
//!
//! ## Features
//!
//! - **Boundary search**: narrows each parameter bracket with a monotonic
//!   binary search, using home-position drift as ground truth
//! - **Gauntlet qualification**: acceleration candidates must survive sharp
//!   and sustained stress profiles in both directions before being accepted
//! - **Safe geometry**: all test moves are centered, reversible and clamped
//!   inside travel limits with a configurable margin
//! - **Chaos validation**: final recommendations are confirmed against an
//!   irregular multi-waypoint pattern
//! - **Configuration-driven**: machine geometry and session parameters come
//!   from TOML files
//! - **no_std compatible**: the engine drives any [`MotionHost`] and needs no
//!   standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_calibrate::{Calibrator, MotionLimits, load_config};
//! use stepper_calibrate::{MmPerSec, MmPerSecSquared};
//!
//! let config = load_config("machine.toml")?;
//! let defaults = MotionLimits {
//!     velocity: MmPerSec(300.0),
//!     accel: MmPerSecSquared(3_000.0),
//!     square_corner_velocity: MmPerSec(5.0),
//!     cruise_ratio: None,
//! };
//!
//! // `host` implements MotionHost against the real motion controller
//! let mut calibrator = Calibrator::new(host, config, defaults)?;
//! let outcome = calibrator.calibrate(&[])?;
//! println!("recommended accel: {:?}", outcome.accel.recommended);
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod kinematics;
pub mod oracle;
pub mod search;

// Re-exports for ergonomic API
pub use config::{validate_config, CalibrationConfig, MachineConfig, MachineLimits, PhysAxis};
pub use error::{Error, Result};
pub use geometry::{Axis, MotionPattern};
pub use host::{HomeMask, MotionHost, MotionLimits, StepCounts, Target};
pub use oracle::{measure, DriftReading};
pub use search::{
    CalibrationOutcome, Calibrator, SearchKind, SearchResult, ValidationReport,
};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Microsteps, Millimeters, MmPerSec, MmPerSecSquared, Steps};
