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
//! Galaxy policy: softened central gravity
//!
//! ```text
//! d  = target - p
//! a  = normalize(d) * G / (|d|² + ε)
//! v' = v + a * dt
//! p' = p + v' * dt
//! ```
//!
//! ## Softening
//!
//! The ε term in the denominator bounds the pull at `G / ε` when a particle
//! sits on the target, the same softening used in N-body codes. It is a
//! numerical-stability guard, not an error path: no runtime check is made.
//! At exactly zero distance the direction is taken as zero, so the particle
//! feels no acceleration instead of producing NaN.

use super::MotionPolicy;
use crate::random::RandomStream;
use glam::Vec3;

/// Softening added to the squared distance
pub const GALAXY_SOFTENING: f32 = 0.1;

/// Inverse-square attraction toward a fixed point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Galaxy {
    target: Vec3,
    gravity: f32,
}

impl Galaxy {
    /// Create a galaxy policy
    pub fn new(target: Vec3, gravity: f32) -> Self {
        Galaxy { target, gravity }
    }

    /// Acceleration felt at `position`
    #[inline]
    pub fn acceleration(&self, position: Vec3) -> Vec3 {
        let dir = self.target - position;
        let dist_sq = dir.length_squared();
        dir.normalize_or_zero() * (self.gravity / (dist_sq + GALAXY_SOFTENING))
    }
}

impl MotionPolicy for Galaxy {
    fn name(&self) -> &str {
        "Galaxy"
    }

    #[inline]
    fn advance(
        &self,
        position: Vec3,
        velocity: Vec3,
        dt: f32,
        _rng: &mut RandomStream,
    ) -> (Vec3, Vec3) {
        let v = velocity + self.acceleration(position) * dt;
        let p = position + v * dt;
        (p, v)
    }
}
