//! Motion host abstraction.
//!
//! The calibration engine never generates step pulses itself; it drives an
//! external motion controller (the "host") through this trait: linear moves,
//! homing, absolute step-position snapshots and motion-limit overrides.
//! Probes are synchronous and blocking - the engine issues a move, waits for
//! completion, then snapshots positions, so a host implementation must make
//! `wait_moves` a true barrier.

use serde::Deserialize;

use crate::config::units::{Millimeters, MmPerSec, MmPerSecSquared, Steps};
use crate::config::PhysAxis;
use crate::error::HostError;

/// A 3-component move target. `None` components mean "hold current position".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Target {
    /// X coordinate in mm, if commanded.
    pub x: Option<Millimeters>,
    /// Y coordinate in mm, if commanded.
    pub y: Option<Millimeters>,
    /// Z coordinate in mm, if commanded.
    pub z: Option<Millimeters>,
}

impl Target {
    /// A target that commands no axis at all.
    pub const HOLD: Self = Self { x: None, y: None, z: None };

    /// Command X and Y, hold Z.
    pub fn xy(x: Millimeters, y: Millimeters) -> Self {
        Self { x: Some(x), y: Some(y), z: None }
    }

    /// Command all three axes.
    pub fn xyz(x: Millimeters, y: Millimeters, z: Millimeters) -> Self {
        Self { x: Some(x), y: Some(y), z: Some(z) }
    }

    /// Command only Z.
    pub fn z_only(z: Millimeters) -> Self {
        Self { x: None, y: None, z: Some(z) }
    }
}

/// Which physical axes an operation homes or measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HomeMask {
    /// Home/measure X.
    pub x: bool,
    /// Home/measure Y.
    pub y: bool,
    /// Home/measure Z.
    pub z: bool,
}

impl HomeMask {
    /// Mask covering X and Y.
    pub const XY: Self = Self { x: true, y: true, z: false };

    /// Mask covering a single axis.
    pub fn only(axis: PhysAxis) -> Self {
        match axis {
            PhysAxis::X => Self { x: true, y: false, z: false },
            PhysAxis::Y => Self { x: false, y: true, z: false },
            PhysAxis::Z => Self { x: false, y: false, z: true },
        }
    }

    /// Whether an axis is included in the mask.
    pub fn contains(self, axis: PhysAxis) -> bool {
        match axis {
            PhysAxis::X => self.x,
            PhysAxis::Y => self.y,
            PhysAxis::Z => self.z,
        }
    }

    /// Whether any axis is included.
    pub fn any(self) -> bool {
        self.x || self.y || self.z
    }
}

/// Absolute stepper position snapshot, one counter per physical axis.
///
/// Counters are in raw microsteps as reported by the host. Snapshots are
/// transient: they are only meaningful when compared against another snapshot
/// of the same axis taken at another trusted homing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepCounts {
    /// X stepper counter.
    pub x: Steps,
    /// Y stepper counter.
    pub y: Steps,
    /// Z stepper counter.
    pub z: Steps,
}

impl StepCounts {
    /// Counter of a single axis.
    pub fn axis(&self, axis: PhysAxis) -> Steps {
        match axis {
            PhysAxis::X => self.x,
            PhysAxis::Y => self.y,
            PhysAxis::Z => self.z,
        }
    }
}

/// Motion-limit profile pushed to the host before a move.
///
/// The engine keeps exactly two of these alive: the machine's default
/// profile (restored for every centering move) and the candidate profile
/// under test (applied only for the measured stress leg).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MotionLimits {
    /// Maximum velocity in mm/s.
    pub velocity: MmPerSec,
    /// Maximum acceleration in mm/s².
    pub accel: MmPerSecSquared,
    /// Square-corner (cornering) velocity in mm/s.
    pub square_corner_velocity: MmPerSec,
    /// Accel-to-decel or minimum-cruise ratio, when the host models one.
    pub cruise_ratio: Option<f32>,
}

impl MotionLimits {
    /// Build a stress profile: candidate velocity/accel, given scv, no cruise
    /// ratio so the host never softens the commanded acceleration.
    pub fn stress(velocity: MmPerSec, accel: MmPerSecSquared, scv: MmPerSec) -> Self {
        Self {
            velocity,
            accel,
            square_corner_velocity: scv,
            cruise_ratio: Some(0.0),
        }
    }
}

/// External motion-control host.
///
/// This is the only seam between the calibration engine and real hardware.
/// All methods are blocking or must be paired with [`MotionHost::wait_moves`];
/// any fault is returned as a [`HostError`] and aborts the calibration run.
pub trait MotionHost {
    /// Command a linear move to `target` at `speed`. May return before the
    /// motion finishes; pair with [`MotionHost::wait_moves`].
    fn move_to(&mut self, target: Target, speed: MmPerSec) -> Result<(), HostError>;

    /// Block until all queued motion (including settling) has finished.
    fn wait_moves(&mut self) -> Result<(), HostError>;

    /// Re-home the masked axes. Blocks until homing completes.
    fn home(&mut self, mask: HomeMask) -> Result<(), HostError>;

    /// Snapshot the absolute stepper counters of all axes.
    fn step_positions(&mut self) -> Result<StepCounts, HostError>;

    /// Override the host's velocity/acceleration/cornering limits.
    fn set_motion_limits(&mut self, limits: &MotionLimits) -> Result<(), HostError>;

    /// Monotonic clock in seconds since an arbitrary epoch. Used only for
    /// duration reporting.
    fn monotonic(&mut self) -> f32;
}
