// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Per-frame simulation stepping
//!
//! One call to [`SimulationStepper::step`] runs two phases separated by a
//! full join:
//!
//! 1. **Stepping**: the motion policy is applied to every particle slot.
//! 2. **Rendering**: every position is turned into an instance transform.
//!
//! Both phases are embarrassingly parallel maps over slot indices. With the
//! `parallel` feature enabled and `use_parallel` set they are fanned out with
//! Rayon; otherwise they run as plain loops. A slot is only ever touched by
//! the task that owns it, so both strategies produce identical results.
//!
//! # Timestep clamping
//!
//! The frame delta is clamped to `max_delta_time` before use. A stalled frame
//! would otherwise turn into one huge explicit-Euler step.

use crate::config::{MotionMode, SimulationConfig};
use crate::error::ConfigError;
use crate::motion::{ModePolicy, MotionPolicy};
use crate::random::SeedSource;
use crate::store::{ColumnsMut, ParticleStore};
use crate::transform::InstanceTransform;
use glam::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Externally observable phase of the stepper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    /// No frame has been stepped yet
    Idle,
    /// Motion is being applied
    Stepping,
    /// Transforms for the current frame are ready
    Rendering,
}

/// Clamp a raw frame delta to `[0, max_dt]`
///
/// Negative and NaN deltas become zero, so a bogus clock never runs the
/// simulation backwards.
pub fn clamp_delta(raw_dt: f32, max_dt: f32) -> f32 {
    if raw_dt > 0.0 {
        raw_dt.min(max_dt)
    } else {
        0.0
    }
}

/// Owns the particle store and drives it one frame at a time
pub struct SimulationStepper {
    store: ParticleStore,
    transforms: Vec<InstanceTransform>,
    phase: StepPhase,
    last_mode: MotionMode,
    seeds: SeedSource,
    frame_count: u64,
    ran_parallel: bool,
    #[cfg(not(feature = "parallel"))]
    warned_serial_fallback: bool,
}

impl SimulationStepper {
    /// Create a stepper, reseeding from OS entropy on mode switches
    ///
    /// # Errors
    ///
    /// Returns the first problem found by [`SimulationConfig::validate`].
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        Self::with_seed_source(config, SeedSource::from_entropy())
    }

    /// Create a stepper drawing reseed values from `seeds`
    pub fn with_seed_source(config: &SimulationConfig, seeds: SeedSource) -> Result<Self, ConfigError> {
        config.validate()?;
        let store = ParticleStore::initialize(
            config.particle_count,
            config.bounds,
            config.radius,
            config.speed_range,
            config.seed,
        )?;
        let transforms = vec![InstanceTransform::default(); store.len()];

        Ok(SimulationStepper {
            store,
            transforms,
            phase: StepPhase::Idle,
            last_mode: config.mode,
            seeds,
            frame_count: 0,
            ran_parallel: false,
            #[cfg(not(feature = "parallel"))]
            warned_serial_fallback: false,
        })
    }

    /// Record the configured mode, reseeding streams on entry to Brownian
    ///
    /// Returns `true` if the streams were reseeded. Leaving Brownian, or any
    /// other transition, only updates the remembered mode.
    pub fn observe_mode(&mut self, mode: MotionMode) -> bool {
        if mode == self.last_mode {
            return false;
        }
        log::debug!("Motion mode changed: {} -> {}", self.last_mode, mode);
        self.last_mode = mode;

        if mode.needs_fresh_streams() {
            let seed = self.seeds.next_seed();
            self.store.reinit_random_streams(seed);
            true
        } else {
            false
        }
    }

    /// Advance the simulation by one frame
    ///
    /// Returns the timestep actually applied after clamping.
    pub fn step(&mut self, config: &SimulationConfig, raw_dt: f32) -> f32 {
        self.observe_mode(config.mode);

        let dt = clamp_delta(raw_dt, config.max_delta_time);
        let policy = ModePolicy::from_config(config);
        let parallel = self.use_parallel(config);
        self.ran_parallel = parallel;

        self.phase = StepPhase::Stepping;
        if parallel {
            advance_parallel(&policy, self.store.columns_mut(), dt, config.chunk_size);
        } else {
            advance_serial(&policy, self.store.columns_mut(), dt);
        }

        // Stepping has fully joined at this point
        self.phase = StepPhase::Rendering;
        let scale = config.radius * 2.0;
        if parallel {
            build_transforms_parallel(self.store.positions(), &mut self.transforms, scale, config.chunk_size);
        } else {
            build_transforms_serial(self.store.positions(), &mut self.transforms, scale);
        }

        self.frame_count += 1;
        dt
    }

    #[cfg(feature = "parallel")]
    fn use_parallel(&self, config: &SimulationConfig) -> bool {
        config.use_parallel
    }

    #[cfg(not(feature = "parallel"))]
    fn use_parallel(&mut self, config: &SimulationConfig) -> bool {
        if config.use_parallel && !self.warned_serial_fallback {
            log::warn!("Parallel execution requested but the `parallel` feature is disabled; running serially");
            self.warned_serial_fallback = true;
        }
        false
    }

    /// Release particle storage and the transform buffer
    ///
    /// Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.store.dispose();
        self.transforms = Vec::new();
    }

    /// Transforms produced by the most recent step
    pub fn transforms(&self) -> &[InstanceTransform] {
        &self.transforms
    }

    /// Particle state
    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// Mutable particle state, for hosts that place particles by hand
    pub fn store_mut(&mut self) -> &mut ParticleStore {
        &mut self.store
    }

    /// Current phase
    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    /// Mode seen at the most recent step
    pub fn last_mode(&self) -> MotionMode {
        self.last_mode
    }

    /// Whether the most recent step ran on the thread pool
    ///
    /// `false` before the first step, and always `false` when the crate is
    /// built without the `parallel` feature.
    pub fn ran_parallel(&self) -> bool {
        self.ran_parallel
    }

    /// Number of completed steps
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Number of simulated particles
    pub fn particle_count(&self) -> usize {
        self.store.len()
    }
}

fn advance_serial(policy: &ModePolicy, columns: ColumnsMut<'_>, dt: f32) {
    let slots = columns
        .positions
        .iter_mut()
        .zip(columns.velocities.iter_mut())
        .zip(columns.streams.iter_mut());
    for ((p, v), rng) in slots {
        let (np, nv) = policy.advance(*p, *v, dt, rng);
        *p = np;
        *v = nv;
    }
}

#[cfg(feature = "parallel")]
fn advance_parallel(policy: &ModePolicy, columns: ColumnsMut<'_>, dt: f32, chunk_size: usize) {
    columns
        .positions
        .par_iter_mut()
        .zip(columns.velocities.par_iter_mut())
        .zip(columns.streams.par_iter_mut())
        .with_min_len(chunk_size)
        .for_each(|((p, v), rng)| {
            let (np, nv) = policy.advance(*p, *v, dt, rng);
            *p = np;
            *v = nv;
        });
}

#[cfg(not(feature = "parallel"))]
fn advance_parallel(policy: &ModePolicy, columns: ColumnsMut<'_>, dt: f32, _chunk_size: usize) {
    advance_serial(policy, columns, dt);
}

fn build_transforms_serial(positions: &[Vec3], transforms: &mut [InstanceTransform], scale: f32) {
    for (t, p) in transforms.iter_mut().zip(positions) {
        *t = InstanceTransform::new(*p, scale);
    }
}

#[cfg(feature = "parallel")]
fn build_transforms_parallel(
    positions: &[Vec3],
    transforms: &mut [InstanceTransform],
    scale: f32,
    chunk_size: usize,
) {
    transforms
        .par_iter_mut()
        .zip(positions.par_iter())
        .with_min_len(chunk_size)
        .for_each(|(t, p)| *t = InstanceTransform::new(*p, scale));
}

#[cfg(not(feature = "parallel"))]
fn build_transforms_parallel(
    positions: &[Vec3],
    transforms: &mut [InstanceTransform],
    scale: f32,
    _chunk_size: usize,
) {
    build_transforms_serial(positions, transforms, scale);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(count: usize) -> SimulationConfig {
        SimulationConfig::new(count)
    }

    fn stepper(config: &SimulationConfig) -> SimulationStepper {
        SimulationStepper::with_seed_source(config, SeedSource::fixed(77)).unwrap()
    }

    #[test]
    fn test_clamp_delta() {
        assert_eq!(clamp_delta(0.016, 0.033), 0.016);
        assert_eq!(clamp_delta(0.5, 0.033), 0.033);
        assert_eq!(clamp_delta(f32::INFINITY, 0.033), 0.033);
        assert_eq!(clamp_delta(-0.1, 0.033), 0.0);
        assert_eq!(clamp_delta(f32::NAN, 0.033), 0.0);
    }

    #[test]
    fn test_phase_transitions() {
        let config = config(10);
        let mut stepper = stepper(&config);
        assert_eq!(stepper.phase(), StepPhase::Idle);
        stepper.step(&config, 0.016);
        assert_eq!(stepper.phase(), StepPhase::Rendering);
        assert_eq!(stepper.frame_count(), 1);
    }

    #[test]
    fn test_step_returns_clamped_dt() {
        let config = config(10);
        let mut stepper = stepper(&config);
        assert_eq!(stepper.step(&config, 1.0), 0.033);
        assert_eq!(stepper.step(&config, 0.01), 0.01);
    }

    #[test]
    fn test_transforms_follow_positions() {
        let config = config(100).with_radius(0.2);
        let mut stepper = stepper(&config);
        stepper.step(&config, 0.016);
        assert_eq!(stepper.transforms().len(), 100);
        for (t, p) in stepper.transforms().iter().zip(stepper.store().positions()) {
            assert_eq!(t.translation, *p);
            assert_eq!(t.scale, 0.4);
        }
    }

    #[test]
    fn test_reseed_only_entering_brownian() {
        let config = config(50);
        let mut stepper = stepper(&config);

        assert!(!stepper.observe_mode(MotionMode::Bounce));
        assert!(!stepper.observe_mode(MotionMode::Swarm));
        assert!(stepper.observe_mode(MotionMode::Brownian));
        assert!(!stepper.observe_mode(MotionMode::Brownian));
        assert!(!stepper.observe_mode(MotionMode::Galaxy));
        assert!(stepper.observe_mode(MotionMode::Brownian));
        assert_eq!(stepper.last_mode(), MotionMode::Brownian);
    }

    #[test]
    fn test_starting_in_brownian_does_not_reseed() {
        let config = config(20).with_mode(MotionMode::Brownian);
        let mut stepper = stepper(&config);
        let before = stepper.store().streams().to_vec();
        assert!(!stepper.observe_mode(MotionMode::Brownian));
        assert_eq!(stepper.store().streams(), before.as_slice());
    }

    #[test]
    fn test_serial_and_parallel_agree() {
        for mode in MotionMode::ALL {
            let serial_cfg = config(3000).with_mode(mode).with_parallel(false).with_chunk_size(64);
            let parallel_cfg = serial_cfg.clone().with_parallel(true);
            let mut serial = stepper(&serial_cfg);
            let mut parallel = stepper(&parallel_cfg);

            for _ in 0..20 {
                serial.step(&serial_cfg, 0.016);
                parallel.step(&parallel_cfg, 0.016);
            }

            assert_eq!(serial.store().positions(), parallel.store().positions(), "mode {}", mode);
            assert_eq!(serial.store().velocities(), parallel.store().velocities(), "mode {}", mode);
            assert_eq!(serial.transforms(), parallel.transforms(), "mode {}", mode);
        }
    }

    #[test]
    fn test_ran_parallel_tracks_last_step() {
        let mut config = config(10);
        let mut stepper = stepper(&config);
        assert!(!stepper.ran_parallel());

        stepper.step(&config, 0.016);
        assert_eq!(stepper.ran_parallel(), cfg!(feature = "parallel"));

        config.use_parallel = false;
        stepper.step(&config, 0.016);
        assert!(!stepper.ran_parallel());
    }

    #[cfg(not(feature = "parallel"))]
    #[test]
    fn test_parallel_request_falls_back_to_serial() {
        let serial_cfg = config(500).with_mode(MotionMode::Galaxy).with_parallel(false);
        let requested_cfg = serial_cfg.clone().with_parallel(true);
        let mut serial = stepper(&serial_cfg);
        let mut requested = stepper(&requested_cfg);

        for _ in 0..10 {
            serial.step(&serial_cfg, 0.016);
            requested.step(&requested_cfg, 0.016);
        }

        assert!(requested.warned_serial_fallback);
        assert!(!requested.ran_parallel());
        assert_eq!(requested.frame_count(), 10);
        assert_eq!(serial.store().positions(), requested.store().positions());
        assert_eq!(serial.store().velocities(), requested.store().velocities());
        assert_eq!(serial.transforms(), requested.transforms());
    }

    #[test]
    fn test_dispose_releases_everything() {
        let config = config(10);
        let mut stepper = stepper(&config);
        stepper.dispose();
        assert_eq!(stepper.particle_count(), 0);
        assert!(stepper.transforms().is_empty());
        stepper.dispose();
        assert_eq!(stepper.particle_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = config(10).with_radius(100.0);
        assert!(SimulationStepper::new(&bad).is_err());
    }
}
