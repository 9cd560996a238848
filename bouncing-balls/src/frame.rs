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
//! Frame loop and telemetry
//!
//! [`FrameLoop::tick`] is the only thing a host needs to call per frame:
//!
//! 1. step the simulation (mode-switch handling, dt clamp, motion, transforms)
//! 2. submit the transforms to the renderer in batches
//! 3. update the FPS counters and build a status line
//!
//! The status line is purely observational and never feeds back into the
//! simulation.

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::random::SeedSource;
use crate::render::{BatchRenderSubmitter, InstancedRenderer, MaterialHandle, MeshHandle};
use crate::stepper::SimulationStepper;
use std::fmt;

/// Length of the averaging window, in seconds
pub const FPS_WINDOW_SECS: f32 = 0.5;

/// Weight of the newest sample in the smoothed frame delta
pub const DELTA_SMOOTHING: f32 = 0.2;

/// Smallest frame delta used when converting to FPS
const MIN_FPS_DELTA: f32 = 1e-4;

/// Instant and windowed frame-rate tracking
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    window_time: f32,
    window_frames: u32,
    average_fps: f32,
    smoothed_delta: Option<f32>,
}

impl FpsCounter {
    /// Create a counter with no samples
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame
    ///
    /// `raw_dt` feeds the smoothed instant rate; `step_dt` (the clamped
    /// timestep) feeds the windowed average, which skips frames with a zero
    /// step. Once more than
    /// [`FPS_WINDOW_SECS`] has accumulated the average is recomputed and the
    /// window restarts.
    pub fn record(&mut self, raw_dt: f32, step_dt: f32) {
        if raw_dt.is_finite() && raw_dt >= 0.0 {
            self.smoothed_delta = Some(match self.smoothed_delta {
                Some(prev) => prev + (raw_dt - prev) * DELTA_SMOOTHING,
                None => raw_dt,
            });
        }

        // Paused frames would never close the window
        if step_dt.is_nan() || step_dt <= 0.0 {
            return;
        }
        self.window_time += step_dt;
        self.window_frames = self.window_frames.saturating_add(1);
        if self.window_time > FPS_WINDOW_SECS {
            self.average_fps = self.window_frames as f32 / self.window_time;
            self.window_time = 0.0;
            self.window_frames = 0;
        }
    }

    /// Frame rate from the smoothed frame delta
    pub fn instant_fps(&self) -> f32 {
        match self.smoothed_delta {
            Some(dt) => 1.0 / dt.max(MIN_FPS_DELTA),
            None => 0.0,
        }
    }

    /// Frame rate averaged over the last completed window
    pub fn average_fps(&self) -> f32 {
        self.average_fps
    }
}

/// Summary of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Number of simulated particles
    pub particle_count: usize,
    /// Whether the step actually ran on the thread pool
    pub parallel: bool,
    /// Timestep applied after clamping
    pub dt: f32,
    /// Draw calls issued
    pub batches: usize,
    /// Smoothed instant frame rate
    pub fps: f32,
    /// Windowed average frame rate
    pub average_fps: f32,
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Balls: {} | Parallel: {} | FPS: {} | AvgFps: {:.1}",
            self.particle_count, self.parallel, self.fps as i32, self.average_fps
        )
    }
}

/// Stepper, submitter and telemetry driven once per host tick
pub struct FrameLoop {
    stepper: SimulationStepper,
    submitter: BatchRenderSubmitter,
    fps: FpsCounter,
    mesh: MeshHandle,
    material: MaterialHandle,
    last_report: Option<FrameReport>,
}

impl FrameLoop {
    /// Create a frame loop drawing `mesh` with `material`
    pub fn new(
        config: &SimulationConfig,
        mesh: MeshHandle,
        material: MaterialHandle,
    ) -> Result<Self, ConfigError> {
        Self::with_stepper(SimulationStepper::new(config)?, config, mesh, material)
    }

    /// Create a frame loop whose reseeds come from `seeds`
    pub fn with_seed_source(
        config: &SimulationConfig,
        seeds: SeedSource,
        mesh: MeshHandle,
        material: MaterialHandle,
    ) -> Result<Self, ConfigError> {
        Self::with_stepper(
            SimulationStepper::with_seed_source(config, seeds)?,
            config,
            mesh,
            material,
        )
    }

    fn with_stepper(
        stepper: SimulationStepper,
        config: &SimulationConfig,
        mesh: MeshHandle,
        material: MaterialHandle,
    ) -> Result<Self, ConfigError> {
        Ok(FrameLoop {
            stepper,
            submitter: BatchRenderSubmitter::new(config.batch_capacity)?,
            fps: FpsCounter::new(),
            mesh,
            material,
            last_report: None,
        })
    }

    /// Run one frame
    ///
    /// A changed `batch_capacity` takes effect on this frame. An out-of-range
    /// capacity is logged and the previous one is kept.
    pub fn tick<R: InstancedRenderer + ?Sized>(
        &mut self,
        config: &SimulationConfig,
        raw_dt: f32,
        renderer: &mut R,
    ) -> FrameReport {
        self.sync_batch_capacity(config.batch_capacity);
        let dt = self.stepper.step(config, raw_dt);
        let batches = self
            .submitter
            .submit(self.stepper.transforms(), self.mesh, self.material, renderer);
        self.fps.record(raw_dt, dt);

        let report = FrameReport {
            particle_count: self.stepper.particle_count(),
            parallel: self.stepper.ran_parallel(),
            dt,
            batches,
            fps: self.fps.instant_fps(),
            average_fps: self.fps.average_fps(),
        };
        log::trace!("{}", report);
        self.last_report = Some(report.clone());
        report
    }

    fn sync_batch_capacity(&mut self, capacity: usize) {
        if capacity == self.submitter.capacity() {
            return;
        }
        match BatchRenderSubmitter::new(capacity) {
            Ok(submitter) => {
                log::debug!(
                    "Batch capacity changed: {} -> {}",
                    self.submitter.capacity(),
                    capacity
                );
                self.submitter = submitter;
            }
            Err(err) => log::warn!(
                "{}; keeping batch capacity {}",
                err,
                self.submitter.capacity()
            ),
        }
    }

    /// Status line of the most recent frame, empty before the first tick
    pub fn status_line(&self) -> String {
        self.last_report
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Release all simulation storage
    pub fn shutdown(&mut self) {
        self.stepper.dispose();
        log::info!("Frame loop shut down after {} frames", self.stepper.frame_count());
    }

    /// The underlying stepper
    pub fn stepper(&self) -> &SimulationStepper {
        &self.stepper
    }

    /// The underlying stepper, mutably
    pub fn stepper_mut(&mut self) -> &mut SimulationStepper {
        &mut self.stepper
    }

    /// Frame-rate counters
    pub fn fps(&self) -> &FpsCounter {
        &self.fps
    }
}
