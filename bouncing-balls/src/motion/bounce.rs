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
//! Bounce policy: free flight reflected off the walls
//!
//! ```text
//! p' = p + v*dt
//! if p'.x leaves [x_min + r, x_max - r]: clamp p'.x, v.x = -v.x
//! if p'.y leaves [y_min + r, y_max - r]: clamp p'.y, v.y = -v.y
//! ```
//!
//! The clamp guarantees containment after every step no matter how far the
//! particle travelled, so a large timestep costs accuracy but never lets a
//! particle escape.

use super::MotionPolicy;
use crate::config::Bounds;
use crate::random::RandomStream;
use glam::Vec3;

/// Reflect particles off the inside of a rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounce {
    bounds: Bounds,
    radius: f32,
}

impl Bounce {
    /// Create a bounce policy for particles of the given radius
    pub fn new(bounds: Bounds, radius: f32) -> Self {
        Bounce { bounds, radius }
    }
}

/// Clamp one coordinate into `[min, max]`, reflecting its velocity on contact
#[inline]
fn reflect_axis(p: &mut f32, v: &mut f32, min: f32, max: f32) {
    if *p < min {
        *p = min;
        *v = -*v;
    } else if *p > max {
        *p = max;
        *v = -*v;
    }
}

impl MotionPolicy for Bounce {
    fn name(&self) -> &str {
        "Bounce"
    }

    #[inline]
    fn advance(
        &self,
        position: Vec3,
        velocity: Vec3,
        dt: f32,
        _rng: &mut RandomStream,
    ) -> (Vec3, Vec3) {
        let mut p = position + velocity * dt;
        let mut v = velocity;

        let x_min = self.bounds.min.x + self.radius;
        let x_max = self.bounds.max.x - self.radius;
        reflect_axis(&mut p.x, &mut v.x, x_min, x_max);

        let y_min = self.bounds.min.y + self.radius;
        let y_max = self.bounds.max.y - self.radius;
        reflect_axis(&mut p.y, &mut v.y, y_min, y_max);

        (p, v)
    }
}
