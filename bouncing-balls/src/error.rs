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
//! Error types for simulation setup
//!
//! Stepping and rendering are total over well-formed numeric input, so the
//! only failures this crate reports happen while a configuration is being
//! validated or loaded.

use std::fmt;

/// Axis of the 2D bounds rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal axis
    X,
    /// Vertical axis
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Errors raised when a simulation configuration cannot be used
#[derive(Debug)]
pub enum ConfigError {
    /// The bounds minus the radius margin leave no room to place a particle
    EmptyPlacementArea {
        /// Offending axis
        axis: Axis,
        /// Lower edge after applying the radius margin
        min: f32,
        /// Upper edge after applying the radius margin
        max: f32,
    },
    /// Radius is negative or not finite
    InvalidRadius(f32),
    /// Speed range is reversed, negative or not finite
    InvalidSpeedRange {
        /// Minimum speed
        min: f32,
        /// Maximum speed
        max: f32,
    },
    /// A simulation needs at least one particle
    ZeroParticles,
    /// Batch capacity must lie in `1..=MAX_INSTANCES_PER_BATCH`
    InvalidBatchCapacity(usize),
    /// Delta-time clamp is not positive and finite
    InvalidDeltaClamp(f32),
    /// Parallel chunk size must be at least one
    InvalidChunkSize,
    /// Motion mode name was not recognized
    UnknownMode(String),
    /// Configuration text could not be parsed
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyPlacementArea { axis, min, max } => write!(
                f,
                "Placement interval on the {} axis is empty after the radius margin: [{}, {}]",
                axis, min, max
            ),
            ConfigError::InvalidRadius(r) => {
                write!(f, "Invalid radius: {}. Must be non-negative and finite.", r)
            }
            ConfigError::InvalidSpeedRange { min, max } => write!(
                f,
                "Invalid speed range: [{}, {}]. Expected 0 <= min <= max, both finite.",
                min, max
            ),
            ConfigError::ZeroParticles => write!(f, "Particle count must be at least 1"),
            ConfigError::InvalidBatchCapacity(k) => write!(
                f,
                "Invalid batch capacity: {}. Must be between 1 and {}.",
                k,
                crate::render::MAX_INSTANCES_PER_BATCH
            ),
            ConfigError::InvalidDeltaClamp(dt) => {
                write!(f, "Invalid maximum delta time: {}. Must be positive and finite.", dt)
            }
            ConfigError::InvalidChunkSize => write!(f, "Chunk size must be at least 1"),
            ConfigError::UnknownMode(name) => write!(f, "Unknown motion mode: {:?}", name),
            ConfigError::Parse(e) => write!(f, "Failed to parse configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
