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
//! Host-tunable simulation configuration
//!
//! [`SimulationConfig`] is owned by the host and may be changed freely between
//! frames. The stepper only ever borrows it immutably for the duration of a
//! step, so a frame always sees one consistent snapshot.
//!
//! Configurations can be built in code with the `with_*` methods or loaded
//! from JSON; missing JSON fields fall back to the defaults.
//!
//! ```
//! use bouncing_balls::config::{MotionMode, SimulationConfig};
//!
//! let config = SimulationConfig::from_json(r#"{ "particle_count": 2500, "mode": "Galaxy" }"#)
//!     .unwrap();
//! assert_eq!(config.particle_count, 2500);
//! assert_eq!(config.mode, MotionMode::Galaxy);
//! ```

use crate::error::{Axis, ConfigError};
use crate::render::MAX_INSTANCES_PER_BATCH;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default upper bound on a single step, in seconds
pub const DEFAULT_MAX_DELTA_TIME: f32 = 0.033;

/// Default minimum number of particles handed to one parallel task
pub const DEFAULT_CHUNK_SIZE: usize = 128;

/// Default seed for the initial particle placement
pub const DEFAULT_PLACEMENT_SEED: u64 = 0xABCDEF;

/// Motion model applied to every particle during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MotionMode {
    /// Straight-line motion reflected off the bounds rectangle
    #[default]
    Bounce,
    /// Spring-like attraction toward the target point
    Swarm,
    /// Random per-particle velocity jitter
    Brownian,
    /// Softened inverse-square attraction toward the target point
    Galaxy,
}

impl MotionMode {
    /// All modes in declaration order
    pub const ALL: [MotionMode; 4] = [
        MotionMode::Bounce,
        MotionMode::Swarm,
        MotionMode::Brownian,
        MotionMode::Galaxy,
    ];

    /// Display name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionMode::Bounce => "Bounce",
            MotionMode::Swarm => "Swarm",
            MotionMode::Brownian => "Brownian",
            MotionMode::Galaxy => "Galaxy",
        }
    }

    /// Whether entering this mode requires freshly seeded random streams
    pub fn needs_fresh_streams(&self) -> bool {
        matches!(self, MotionMode::Brownian)
    }
}

impl fmt::Display for MotionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bounce" => Ok(MotionMode::Bounce),
            "swarm" => Ok(MotionMode::Swarm),
            "brownian" => Ok(MotionMode::Brownian),
            "galaxy" => Ok(MotionMode::Galaxy),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// Axis-aligned rectangle particles live in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower-left corner (x min, y min)
    pub min: Vec2,
    /// Upper-right corner (x max, y max)
    pub max: Vec2,
}

impl Bounds {
    /// Create bounds from the two corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Bounds { min, max }
    }

    /// Create bounds from `(x_min, y_min, x_max, y_max)`
    pub fn from_xyxy(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Bounds::new(Vec2::new(x_min, y_min), Vec2::new(x_max, y_max))
    }

    /// Range a particle center may occupy on `axis` given its radius
    pub fn inner_range(&self, axis: Axis, radius: f32) -> (f32, f32) {
        match axis {
            Axis::X => (self.min.x + radius, self.max.x - radius),
            Axis::Y => (self.min.y + radius, self.max.y - radius),
        }
    }

    /// Check that both axes leave a non-empty placement interval
    pub fn validate_margin(&self, radius: f32) -> Result<(), ConfigError> {
        for axis in [Axis::X, Axis::Y] {
            let (min, max) = self.inner_range(axis, radius);
            // `!(min < max)` also rejects NaN edges
            if !(min < max) {
                return Err(ConfigError::EmptyPlacementArea { axis, min, max });
            }
        }
        Ok(())
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::from_xyxy(-8.0, -5.0, 8.0, 5.0)
    }
}

/// Range initial particle speeds are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    /// Minimum initial speed
    pub min: f32,
    /// Maximum initial speed
    pub max: f32,
}

impl SpeedRange {
    /// Create a speed range
    pub fn new(min: f32, max: f32) -> Self {
        SpeedRange { min, max }
    }

    /// Check that `0 <= min <= max` and both are finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min <= self.max;
        if ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidSpeedRange {
                min: self.min,
                max: self.max,
            })
        }
    }
}

impl Default for SpeedRange {
    fn default() -> Self {
        SpeedRange::new(0.5, 3.0)
    }
}

/// Full simulation configuration
///
/// `particle_count`, `speed_range` and `seed` are only read when the
/// simulation is created; everything else is sampled at the start of each
/// step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of particles, fixed for the lifetime of a simulation
    pub particle_count: usize,
    /// Particle radius; rendered scale is twice this value
    pub radius: f32,
    /// Rectangle Bounce mode keeps particles inside
    pub bounds: Bounds,
    /// Initial speed range
    pub speed_range: SpeedRange,
    /// Active motion model
    pub mode: MotionMode,
    /// Run per-particle work on the thread pool instead of serially
    pub use_parallel: bool,
    /// Attraction point for Swarm and Galaxy modes
    pub target: Vec3,
    /// Swarm spring strength
    pub attract_strength: f32,
    /// Brownian jitter magnitude
    pub jitter: f32,
    /// Galaxy gravity strength
    pub gravity_strength: f32,
    /// Upper bound on a single step, in seconds
    pub max_delta_time: f32,
    /// Minimum particles handed to one parallel task
    pub chunk_size: usize,
    /// Maximum transforms per draw call
    pub batch_capacity: usize,
    /// Seed for the initial placement and initial random streams
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            particle_count: 50_000,
            radius: 0.05,
            bounds: Bounds::default(),
            speed_range: SpeedRange::default(),
            mode: MotionMode::Bounce,
            use_parallel: true,
            target: Vec3::ZERO,
            attract_strength: 0.5,
            jitter: 2.0,
            gravity_strength: 10.0,
            max_delta_time: DEFAULT_MAX_DELTA_TIME,
            chunk_size: DEFAULT_CHUNK_SIZE,
            batch_capacity: MAX_INSTANCES_PER_BATCH,
            seed: DEFAULT_PLACEMENT_SEED,
        }
    }
}

impl SimulationConfig {
    /// Create a default configuration with the given particle count
    pub fn new(particle_count: usize) -> Self {
        SimulationConfig {
            particle_count,
            ..Default::default()
        }
    }

    /// Parse a configuration from JSON and validate it
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the motion mode
    pub fn with_mode(mut self, mode: MotionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the bounds rectangle
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the particle radius
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Set the initial speed range
    pub fn with_speed_range(mut self, min: f32, max: f32) -> Self {
        self.speed_range = SpeedRange::new(min, max);
        self
    }

    /// Choose parallel or serial execution
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Set the Swarm/Galaxy attraction point
    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    /// Set the Swarm attraction strength
    pub fn with_attract_strength(mut self, strength: f32) -> Self {
        self.attract_strength = strength;
        self
    }

    /// Set the Brownian jitter magnitude
    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the Galaxy gravity strength
    pub fn with_gravity_strength(mut self, strength: f32) -> Self {
        self.gravity_strength = strength;
        self
    }

    /// Set the upper bound on a single step
    pub fn with_max_delta_time(mut self, max_dt: f32) -> Self {
        self.max_delta_time = max_dt;
        self
    }

    /// Set the parallel chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the number of transforms per draw call
    pub fn with_batch_capacity(mut self, capacity: usize) -> Self {
        self.batch_capacity = capacity;
        self
    }

    /// Set the placement seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check every field a simulation depends on
    ///
    /// Invalid placement areas are reported rather than clamped to a
    /// degenerate range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        if !(self.radius >= 0.0 && self.radius.is_finite()) {
            return Err(ConfigError::InvalidRadius(self.radius));
        }
        self.bounds.validate_margin(self.radius)?;
        self.speed_range.validate()?;
        if !(self.max_delta_time > 0.0 && self.max_delta_time.is_finite()) {
            return Err(ConfigError::InvalidDeltaClamp(self.max_delta_time));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize);
        }
        if self.batch_capacity == 0 || self.batch_capacity > MAX_INSTANCES_PER_BATCH {
            return Err(ConfigError::InvalidBatchCapacity(self.batch_capacity));
        }
        Ok(())
    }
}
