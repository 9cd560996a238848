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
//! Brownian policy: random velocity kicks
//!
//! Each step draws `jx` then `jy` uniformly from `[-jitter, jitter)` out of
//! the particle's own stream:
//!
//! ```text
//! v' = v + (jx, jy, 0) * dt
//! p' = p + v' * dt
//! ```

use super::MotionPolicy;
use crate::random::RandomStream;
use glam::Vec3;

/// Random walk in velocity space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brownian {
    jitter: f32,
}

impl Brownian {
    /// Create a Brownian policy with the given jitter magnitude
    pub fn new(jitter: f32) -> Self {
        Brownian { jitter }
    }
}

impl MotionPolicy for Brownian {
    fn name(&self) -> &str {
        "Brownian"
    }

    #[inline]
    fn advance(
        &self,
        position: Vec3,
        velocity: Vec3,
        dt: f32,
        rng: &mut RandomStream,
    ) -> (Vec3, Vec3) {
        let jx = rng.next_uniform_f32(-self.jitter, self.jitter);
        let jy = rng.next_uniform_f32(-self.jitter, self.jitter);
        let v = velocity + Vec3::new(jx, jy, 0.0) * dt;
        let p = position + v * dt;
        (p, v)
    }
}
