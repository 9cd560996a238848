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
//! Swarm policy: undamped spring toward a target
//!
//! ```text
//! v' = v + (target - p) * k * dt
//! p' = p + v' * dt
//! ```
//!
//! There is no damping and no clamping, so particles overshoot the target and
//! oscillate around it indefinitely.

use super::MotionPolicy;
use crate::random::RandomStream;
use glam::Vec3;

/// Pull every particle toward a point with a linear spring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swarm {
    target: Vec3,
    strength: f32,
}

impl Swarm {
    /// Create a swarm policy
    pub fn new(target: Vec3, strength: f32) -> Self {
        Swarm { target, strength }
    }
}

impl MotionPolicy for Swarm {
    fn name(&self) -> &str {
        "Swarm"
    }

    #[inline]
    fn advance(
        &self,
        position: Vec3,
        velocity: Vec3,
        dt: f32,
        _rng: &mut RandomStream,
    ) -> (Vec3, Vec3) {
        let v = velocity + (self.target - position) * self.strength * dt;
        let p = position + v * dt;
        (p, v)
    }
}
