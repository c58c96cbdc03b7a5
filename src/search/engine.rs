//! Calibration engine.
//!
//! Drives the motion host through pre-flight checks, boundary searches and
//! final validation. Every probe is atomic from the engine's perspective:
//! issue moves, wait for full completion, snapshot counters. The host's
//! motion limits are the only shared mutable resource - the engine restores
//! the default profile before every centering move and applies candidate
//! limits only to the measured stress leg, so a transient low default can
//! never soften the move under test and leftover test limits can never leak
//! into unrelated motion.

use log::{debug, info};

use super::attempt::{SearchAttempt, SearchKind};
use super::binary::boundary_search;
use super::results::SearchResult;
use super::validate::{self, ValidationReport};
use crate::config::units::{Millimeters, MmPerSec, MmPerSecSquared};
use crate::config::{validate_config, CalibrationConfig, MachineConfig, MachineLimits};
use crate::error::{PreconditionError, Result};
use crate::geometry::{Axis, MotionPattern};
use crate::host::{HomeMask, MotionHost, MotionLimits, StepCounts, Target};
use crate::kinematics;
use crate::oracle::{self, DriftReading};

/// Multiplier deriving a companion acceleration from a velocity candidate
/// when no fixed acceleration is given. Inherited tuning constant with no
/// derivation on record; tunable, but only with measurement evidence.
pub const COMPANION_ACCEL_RATIO: f32 = 2.5;

/// Miss threshold for gauntlet accel probes and chaos validation, in
/// fractional full steps. Deliberately looser than the velocity-search
/// threshold: sharp accel transients shake more microsteps loose without
/// indicating sustained step loss.
pub const MAX_MISSED_THRESHOLD: f32 = 3.0;

/// Floor on probe distance. At low accelerations the theoretical probe
/// shrinks toward zero and controller overhead would dominate the move,
/// producing false passes.
pub const MIN_SHORT_MOVE_DISTANCE: Millimeters = Millimeters(5.0);

/// Accel-focused probe distance with the short-move floor applied.
fn short_probe_dist(velocity: MmPerSec, accel: MmPerSecSquared) -> Millimeters {
    let dist = kinematics::accel_focused_dist(velocity, accel);
    Millimeters(dist.value().max(MIN_SHORT_MOVE_DISTANCE.value()))
}

/// Combined outcome of a full multi-stage calibration.
#[derive(Debug, Clone)]
pub struct CalibrationOutcome {
    /// Derated per-axis acceleration result (stage 1).
    pub accel: SearchResult,
    /// Derated per-axis velocity result (stage 2).
    pub velocity: SearchResult,
    /// Chaos validation of the recommended acceleration (stage 3).
    pub validation: ValidationReport,
    /// Total wall-clock duration, seconds.
    pub duration: f32,
}

/// The calibration engine: owns the host connection and the immutable
/// machine context, threads both through every search and validation call.
pub struct Calibrator<H> {
    host: H,
    config: MachineConfig,
    limits: MachineLimits,
    defaults: MotionLimits,
}

impl<H: MotionHost> Calibrator<H> {
    /// Build an engine for a validated machine configuration.
    ///
    /// `defaults` is the host's normal motion-limit profile; it is restored
    /// around every stress leg and used for all centering moves.
    ///
    /// # Errors
    ///
    /// Fails on configuration validation errors or axes with no usable
    /// travel, before any motion is commanded.
    pub fn new(host: H, config: MachineConfig, defaults: MotionLimits) -> Result<Self> {
        validate_config(&config)?;
        let limits = config.limits();
        limits.ensure_usable()?;
        Ok(Self { host, config, limits, defaults })
    }

    /// The machine configuration this engine was built with.
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Derived travel limits.
    pub fn limits(&self) -> &MachineLimits {
        &self.limits
    }

    /// Release the host connection.
    pub fn into_host(self) -> H {
        self.host
    }

    fn calib(&self) -> &CalibrationConfig {
        &self.config.calibration
    }

    fn restore_defaults(&mut self) -> Result<()> {
        self.host.set_motion_limits(&self.defaults)?;
        Ok(())
    }

    /// Home the masked axes under default limits and snapshot the counters
    /// at the resulting trusted position.
    fn trusted_home(&mut self, mask: HomeMask) -> Result<StepCounts> {
        self.restore_defaults()?;
        self.host.home(mask)?;
        self.host.wait_moves()?;
        Ok(self.host.step_positions()?)
    }

    /// Re-home after a stress move and compare against `baseline`.
    fn posttest(
        &mut self,
        baseline: StepCounts,
        mask: HomeMask,
        threshold: f32,
    ) -> Result<(DriftReading, StepCounts)> {
        self.host.wait_moves()?;
        let steps = self.trusted_home(mask)?;
        let drift = oracle::measure(baseline, steps, mask, &self.config.rails, threshold);
        Ok((drift, steps))
    }

    /// Center all three axes under default limits and wait for settling.
    fn center_all(&mut self) -> Result<()> {
        self.restore_defaults()?;
        let target = Target::xyz(self.limits.x.center, self.limits.y.center, self.limits.z.center);
        self.host.move_to(target, self.defaults.velocity)?;
        self.host.wait_moves()?;
        Ok(())
    }

    /// Pre-flight: center the toolhead, then verify endstop repeatability on
    /// the rails the session will actually stress.
    ///
    /// # Errors
    ///
    /// `PreconditionError::EndstopVariance` when homing repeatability is as
    /// bad as the miss threshold - the oracle could not tell endstop noise
    /// from step loss.
    pub fn prepare(&mut self, axes: &[Axis]) -> Result<()> {
        self.center_all()?;
        info!("toolhead centered and settled");
        self.check_endstop_variance(axes)
    }

    /// XY rails whose endstop repeatability gates the session. Coupled
    /// kinematics always involve both motors; isolated kinematics only
    /// check the rails the selected axes touch.
    fn variance_mask(&self, axes: &[Axis]) -> HomeMask {
        if !self.config.kinematics.isolate_xy() {
            return HomeMask::XY;
        }
        let diag = axes.contains(&Axis::DiagX) || axes.contains(&Axis::DiagY);
        HomeMask {
            x: diag || axes.contains(&Axis::X),
            y: diag || axes.contains(&Axis::Y),
            z: false,
        }
    }

    /// Sample homing repeatability over `endstop_samples` cycles on the
    /// rails relevant to `axes`. A Z-only session has nothing to sample.
    pub fn check_endstop_variance(&mut self, axes: &[Axis]) -> Result<()> {
        let samples = self.calib().endstop_samples;
        let threshold = self.calib().max_missed;
        let mask = self.variance_mask(axes);
        if !mask.any() {
            return Ok(());
        }

        if self.calib().settling_home {
            self.host.wait_moves()?;
            self.trusted_home(mask)?;
        }

        let mut worst_x = 0.0f32;
        let mut worst_y = 0.0f32;
        let mut prev: Option<StepCounts> = None;
        for _ in 0..samples {
            self.host.wait_moves()?;
            let steps = self.trusted_home(mask)?;
            if let Some(prev) = prev {
                let drift = oracle::measure(prev, steps, mask, &self.config.rails, threshold);
                worst_x = worst_x.max(drift.x.unwrap_or(0.0));
                worst_y = worst_y.max(drift.y.unwrap_or(0.0));
            }
            prev = Some(steps);
        }

        info!("endstop variance: X {:.2} steps, Y {:.2} steps", worst_x, worst_y);
        if worst_x >= threshold || worst_y >= threshold {
            let (axis, missed) =
                if worst_x >= worst_y { ('x', worst_x) } else { ('y', worst_y) };
            return Err(PreconditionError::EndstopVariance { axis, missed, threshold }.into());
        }
        Ok(())
    }

    /// One stress cycle: center under default limits, then run
    /// corner-to-corner under candidate limits, then re-home and measure.
    fn single_cycle(
        &mut self,
        baseline: StepCounts,
        pattern: &MotionPattern,
        velocity: MmPerSec,
        accel: MmPerSecSquared,
        scv: MmPerSec,
        threshold: f32,
        forward: bool,
    ) -> Result<(DriftReading, StepCounts)> {
        self.restore_defaults()?;
        self.host.move_to(pattern.center, self.defaults.velocity)?;
        self.host.wait_moves()?;

        self.host.set_motion_limits(&MotionLimits::stress(velocity, accel, scv))?;
        let (first, second) = if forward {
            (pattern.corner_a, pattern.corner_b)
        } else {
            (pattern.corner_b, pattern.corner_a)
        };
        self.host.move_to(first, velocity)?;
        self.host.move_to(second, velocity)?;
        self.host.wait_moves()?;

        self.posttest(baseline, pattern.home, threshold)
    }

    /// Run the full gauntlet for one acceleration candidate: N forward and N
    /// reverse sharp probes, then N forward and N reverse plateau probes at
    /// the longest safe distance. Short-circuits on the first failing probe.
    fn gauntlet(&mut self, attempt: &mut SearchAttempt, accel: MmPerSecSquared) -> Result<bool> {
        let samples = self.calib().samples_per_test_type;
        let velocity = self.calib().accel_test_velocity;

        attempt.baseline = self.trusted_home(attempt.pattern.home)?;

        let sharp = short_probe_dist(velocity, accel);
        let plateau = attempt.pattern.max_safe_dist;
        for dist in [sharp, plateau] {
            attempt.pattern.compute(&self.limits, dist);
            for _ in 0..samples {
                for forward in [true, false] {
                    let (drift, steps) = self.single_cycle(
                        attempt.baseline,
                        &attempt.pattern,
                        velocity,
                        accel,
                        attempt.scv,
                        attempt.max_missed,
                        forward,
                    )?;
                    attempt.record(drift);
                    attempt.baseline = steps;
                    if !drift.valid {
                        debug!(
                            "gauntlet a{:.0} on {} failed at {:.1}mm: missed {:.2}",
                            accel.value(),
                            attempt.axis,
                            attempt.pattern.dist.value(),
                            drift.missed
                        );
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    /// One velocity probe: a single centered forward cycle at the candidate
    /// velocity, with a fixed or derived companion acceleration.
    fn velocity_probe(&mut self, attempt: &mut SearchAttempt, velocity: MmPerSec) -> Result<bool> {
        let accel = match attempt.accel {
            Some(accel) => accel,
            None => {
                kinematics::peak_accel(velocity, attempt.pattern.max_safe_dist)
                    * COMPANION_ACCEL_RATIO
            }
        };
        let dist = short_probe_dist(velocity, accel);
        attempt.pattern.compute(&self.limits, dist);

        let (drift, steps) = self.single_cycle(
            attempt.baseline,
            &attempt.pattern,
            velocity,
            accel,
            attempt.scv,
            attempt.max_missed,
            true,
        )?;
        attempt.record(drift);
        attempt.baseline = steps;
        debug!(
            "velocity probe v{:.0}/a{:.0} on {}: missed {:.2}",
            velocity.value(),
            accel.value(),
            attempt.axis,
            drift.missed
        );
        Ok(drift.valid)
    }

    /// Search the maximum sustainable acceleration of each axis, gauntlet
    /// per candidate, then derate.
    ///
    /// Returned values are already derated; `recommended` holds the minimum
    /// across axes.
    pub fn find_max_accel(&mut self, axes: &[Axis]) -> Result<SearchResult> {
        let started = self.host.monotonic();
        let mut result = SearchResult::new(SearchKind::Accel);

        for &axis in axes {
            let pattern = MotionPattern::new(
                axis,
                &self.limits,
                self.calib().margin,
                self.config.kinematics.isolate_xy(),
            )?;
            let mut attempt = SearchAttempt::new(SearchKind::Accel, axis, pattern, self.calib());
            attempt.max_missed = MAX_MISSED_THRESHOLD;
            attempt.started_at = self.host.monotonic();

            info!(
                "acceleration search on {} in [{:.0}, {:.0}] at v{:.0}",
                axis,
                attempt.min,
                attempt.max,
                self.calib().accel_test_velocity.value()
            );
            let outcome = boundary_search(attempt.min, attempt.max, attempt.accuracy, |candidate| {
                self.gauntlet(&mut attempt, MmPerSecSquared(candidate))
            })?;
            attempt.duration = self.host.monotonic() - attempt.started_at;
            info!(
                "max acceleration on {}: {:.0} after {} probes in {:.2}s",
                axis, outcome.value, attempt.tries, attempt.duration
            );
            result.insert(axis, outcome.value);
        }

        result.duration = self.host.monotonic() - started;
        result.derate(self.calib().derate);
        Ok(result)
    }

    /// Search the maximum sustainable velocity of each axis, one plateau
    /// cycle per candidate, then derate.
    ///
    /// `accel` fixes the companion acceleration (the multi-stage flow passes
    /// the derated stage-1 result); `None` derives one per candidate via
    /// [`COMPANION_ACCEL_RATIO`].
    pub fn find_max_velocity(
        &mut self,
        axes: &[Axis],
        accel: Option<MmPerSecSquared>,
    ) -> Result<SearchResult> {
        let started = self.host.monotonic();
        let mut result = SearchResult::new(SearchKind::Velocity);

        for &axis in axes {
            let pattern = MotionPattern::new(
                axis,
                &self.limits,
                self.calib().margin,
                self.config.kinematics.isolate_xy(),
            )?;
            let mut attempt = SearchAttempt::new(SearchKind::Velocity, axis, pattern, self.calib());
            attempt.accel = accel;
            attempt.started_at = self.host.monotonic();
            attempt.baseline = self.trusted_home(attempt.pattern.home)?;

            info!(
                "velocity search on {} in [{:.0}, {:.0}]",
                axis, attempt.min, attempt.max
            );
            let outcome = boundary_search(attempt.min, attempt.max, attempt.accuracy, |candidate| {
                self.velocity_probe(&mut attempt, MmPerSec(candidate))
            })?;
            attempt.duration = self.host.monotonic() - attempt.started_at;
            info!(
                "max velocity on {}: {:.0} after {} probes in {:.2}s",
                axis, outcome.value, attempt.tries, attempt.duration
            );
            result.insert(axis, outcome.value);
        }

        result.duration = self.host.monotonic() - started;
        result.derate(self.calib().derate);
        Ok(result)
    }

    /// Chaos validation of a recommended acceleration: trace the full
    /// 16-waypoint pattern once per iteration and measure drift cumulatively
    /// across the whole iteration.
    ///
    /// # Errors
    ///
    /// `UnsafeConfigError::PatternTooLarge` when a configured pattern size
    /// exceeds the safe bound; the run is skipped entirely.
    pub fn validate(&mut self, accel: MmPerSecSquared) -> Result<ValidationReport> {
        let size = validate::pattern_size(&self.limits, self.calib().validation_pattern_size)?;
        let waypoints = validate::chaos_waypoints(&self.limits, size);
        let iterations = self.calib().validation_iterations;
        let velocity = self.calib().accel_test_velocity;
        let scv = self.calib().scv;
        let center = Target::xy(self.limits.x.center, self.limits.y.center);

        info!(
            "chaos validation: {} iterations of a {:.1}mm pattern at a{:.0}",
            iterations,
            size.value(),
            accel.value()
        );

        let started = self.host.monotonic();
        let mut passes = 0u32;
        let mut failures = 0u32;
        let mut worst_missed = 0.0f32;
        let mut worst_x = 0.0f32;
        let mut worst_y = 0.0f32;

        for iteration in 0..iterations {
            let baseline = self.trusted_home(HomeMask::XY)?;

            self.restore_defaults()?;
            self.host.move_to(center, self.defaults.velocity)?;
            self.host.wait_moves()?;

            self.host.set_motion_limits(&MotionLimits::stress(velocity, accel, scv))?;
            for waypoint in &waypoints {
                self.host.move_to(*waypoint, velocity)?;
            }
            self.host.wait_moves()?;

            let (drift, _) = self.posttest(baseline, HomeMask::XY, MAX_MISSED_THRESHOLD)?;
            worst_missed = worst_missed.max(drift.missed);
            worst_x = worst_x.max(drift.x.unwrap_or(0.0));
            worst_y = worst_y.max(drift.y.unwrap_or(0.0));
            if drift.valid {
                passes += 1;
            } else {
                failures += 1;
            }
            info!(
                "validation iteration {}/{}: missed X {:.2} Y {:.2} ({})",
                iteration + 1,
                iterations,
                drift.x.unwrap_or(0.0),
                drift.y.unwrap_or(0.0),
                if drift.valid { "pass" } else { "fail" }
            );
        }

        Ok(ValidationReport {
            iterations,
            passes,
            failures,
            pattern_size: size,
            worst_missed,
            worst_x,
            worst_y,
            duration: self.host.monotonic() - started,
        })
    }

    /// Full multi-stage calibration on the primary axis: pre-flight, accel
    /// search, velocity search at the derated acceleration, then chaos
    /// validation of that acceleration.
    ///
    /// An empty `axes` slice selects the kinematics-appropriate defaults.
    pub fn calibrate(&mut self, axes: &[Axis]) -> Result<CalibrationOutcome> {
        let axes = if axes.is_empty() {
            Axis::defaults(self.config.kinematics.isolate_xy())
        } else {
            axes
        };
        let primary = axes[0];
        let started = self.host.monotonic();

        self.prepare(axes)?;

        info!("stage 1: baseline max acceleration on {}", primary);
        let accel_result = self.find_max_accel(&[primary])?;
        let rec_accel =
            MmPerSecSquared(accel_result.recommended.unwrap_or(self.calib().accel_min.value()));

        info!("stage 2: max velocity on {} at safe accel {:.0}", primary, rec_accel.value());
        let velocity_result = self.find_max_velocity(&[primary], Some(rec_accel))?;

        info!("stage 3: chaos validation of accel {:.0}", rec_accel.value());
        let validation = self.validate(rec_accel)?;

        let outcome = CalibrationOutcome {
            accel: accel_result,
            velocity: velocity_result,
            validation,
            duration: self.host.monotonic() - started,
        };
        info!(
            "calibration complete in {:.2}s: accel {:.0}, velocity {:.0}, validation {}/{}",
            outcome.duration,
            outcome.accel.recommended.unwrap_or(0.0),
            outcome.velocity.recommended.unwrap_or(0.0),
            outcome.validation.passes,
            outcome.validation.iterations
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_probe_dist_floors() {
        // 200mm/s at 50000mm/s² -> 0.8mm theoretical, floored to 5mm
        let d = short_probe_dist(MmPerSec(200.0), MmPerSecSquared(50_000.0));
        assert_eq!(d.value(), 5.0);

        // 200mm/s at 2000mm/s² -> 20mm, floor inactive
        let d = short_probe_dist(MmPerSec(200.0), MmPerSecSquared(2_000.0));
        assert_eq!(d.value(), 20.0);
    }

    #[test]
    fn test_short_probe_dist_handles_unbounded() {
        let d = short_probe_dist(MmPerSec(200.0), MmPerSecSquared(0.0));
        assert!(d.value().is_infinite());
    }
}
