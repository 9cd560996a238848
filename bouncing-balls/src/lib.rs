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
//! # Bouncing Balls
//!
//! A data-oriented 2D particle simulation: a fixed population of particles
//! stored as flat columns, advanced every frame under a selectable motion
//! model and handed to an instanced renderer in bounded batches.
//!
//! ## Features
//!
//! - **Columnar storage**: positions, velocities and random streams live in
//!   parallel arrays indexed by particle
//! - **Motion models**: Bounce, Swarm, Brownian and Galaxy policies behind a
//!   single [`motion::MotionPolicy`] trait
//! - **Parallelization**: optional Rayon fan-out over particle slots with a
//!   serial fallback that produces identical results
//! - **Batched submission**: transforms are cut into draw calls of at most
//!   1023 instances
//!
//! ## Example
//!
//! ```rust
//! use bouncing_balls::config::{MotionMode, SimulationConfig};
//! use bouncing_balls::frame::FrameLoop;
//! use bouncing_balls::render::{MaterialHandle, MeshHandle, NullRenderer};
//!
//! let mut config = SimulationConfig::new(2500);
//! let mut frame_loop = FrameLoop::new(&config, MeshHandle(0), MaterialHandle(0)).unwrap();
//! let mut renderer = NullRenderer::default();
//!
//! let report = frame_loop.tick(&config, 1.0 / 60.0, &mut renderer);
//! assert_eq!(report.batches, 3);
//!
//! config.mode = MotionMode::Brownian;
//! frame_loop.tick(&config, 1.0 / 60.0, &mut renderer);
//! frame_loop.shutdown();
//! ```

#![warn(missing_docs)]

/// Simulation configuration
pub mod config;

/// Configuration errors
pub mod error;

/// Frame loop and telemetry
pub mod frame;

/// Per-particle motion models
pub mod motion;

/// Per-particle random streams
pub mod random;

/// Batched instanced-draw submission
pub mod render;

/// Per-frame stepping
pub mod stepper;

/// Columnar particle storage
pub mod store;

/// Per-instance render transforms
pub mod transform;

pub use config::{MotionMode, SimulationConfig};
pub use error::ConfigError;
pub use frame::FrameLoop;
pub use stepper::SimulationStepper;
pub use store::ParticleStore;
