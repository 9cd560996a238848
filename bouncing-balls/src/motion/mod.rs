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
//! Per-particle motion models
//!
//! A motion policy is a pure transition from one particle's
//! `(position, velocity)` to its next state over a timestep. Policies never
//! look at other particles, which is what lets the stepper fan the update out
//! across threads with no synchronization.
//!
//! # Policies
//!
//! - **Bounce**: explicit Euler with reflection at the bounds rectangle
//! - **Swarm**: linear spring toward a target point, undamped
//! - **Brownian**: random velocity kicks drawn from the particle's own stream
//! - **Galaxy**: softened inverse-square pull toward a target point
//!
//! All policies integrate velocity first and then position with the updated
//! velocity (semi-implicit Euler), except Bounce which has no acceleration.
//! Motion is planar: the z component of position and velocity is carried
//! through untouched by Bounce and never gains a contribution elsewhere as
//! long as the target lies in the z = 0 plane.

use crate::config::{MotionMode, SimulationConfig};
use crate::random::RandomStream;
use glam::Vec3;

mod bounce;
mod brownian;
mod galaxy;
mod swarm;

pub use bounce::Bounce;
pub use brownian::Brownian;
pub use galaxy::{Galaxy, GALAXY_SOFTENING};
pub use swarm::Swarm;

/// Trait for per-particle motion models
///
/// Implementations must be pure apart from advancing `rng`, and must not
/// depend on any particle other than the one being advanced.
pub trait MotionPolicy: Send + Sync {
    /// Get the name of this policy
    fn name(&self) -> &str;

    /// Advance one particle by `dt` seconds
    ///
    /// Returns the new `(position, velocity)`. `rng` is the particle's own
    /// stream; policies that do not need randomness leave it untouched.
    fn advance(
        &self,
        position: Vec3,
        velocity: Vec3,
        dt: f32,
        rng: &mut RandomStream,
    ) -> (Vec3, Vec3);
}

/// Policy for the configured mode, resolved once per step
///
/// Dispatching through an enum keeps the per-particle loop free of virtual
/// calls while still exposing each variant through [`MotionPolicy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModePolicy {
    /// See [`Bounce`]
    Bounce(Bounce),
    /// See [`Swarm`]
    Swarm(Swarm),
    /// See [`Brownian`]
    Brownian(Brownian),
    /// See [`Galaxy`]
    Galaxy(Galaxy),
}

impl ModePolicy {
    /// Snapshot the parameters of `config.mode`
    pub fn from_config(config: &SimulationConfig) -> Self {
        match config.mode {
            MotionMode::Bounce => ModePolicy::Bounce(Bounce::new(config.bounds, config.radius)),
            MotionMode::Swarm => {
                ModePolicy::Swarm(Swarm::new(config.target, config.attract_strength))
            }
            MotionMode::Brownian => ModePolicy::Brownian(Brownian::new(config.jitter)),
            MotionMode::Galaxy => {
                ModePolicy::Galaxy(Galaxy::new(config.target, config.gravity_strength))
            }
        }
    }

    /// Mode this policy implements
    pub fn mode(&self) -> MotionMode {
        match self {
            ModePolicy::Bounce(_) => MotionMode::Bounce,
            ModePolicy::Swarm(_) => MotionMode::Swarm,
            ModePolicy::Brownian(_) => MotionMode::Brownian,
            ModePolicy::Galaxy(_) => MotionMode::Galaxy,
        }
    }
}

impl MotionPolicy for ModePolicy {
    fn name(&self) -> &str {
        self.mode().as_str()
    }

    #[inline]
    fn advance(
        &self,
        position: Vec3,
        velocity: Vec3,
        dt: f32,
        rng: &mut RandomStream,
    ) -> (Vec3, Vec3) {
        match self {
            ModePolicy::Bounce(p) => p.advance(position, velocity, dt, rng),
            ModePolicy::Swarm(p) => p.advance(position, velocity, dt, rng),
            ModePolicy::Brownian(p) => p.advance(position, velocity, dt, rng),
            ModePolicy::Galaxy(p) => p.advance(position, velocity, dt, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Bounds;

    #[test]
    fn test_from_config_picks_mode() {
        for mode in MotionMode::ALL {
            let config = SimulationConfig::new(1).with_mode(mode);
            let policy = ModePolicy::from_config(&config);
            assert_eq!(policy.mode(), mode);
            assert_eq!(policy.name(), mode.as_str());
        }
    }

    #[test]
    fn test_from_config_copies_parameters() {
        let config = SimulationConfig::new(1)
            .with_mode(MotionMode::Bounce)
            .with_bounds(Bounds::from_xyxy(-1.0, -2.0, 3.0, 4.0))
            .with_radius(0.25);
        assert_eq!(
            ModePolicy::from_config(&config),
            ModePolicy::Bounce(Bounce::new(Bounds::from_xyxy(-1.0, -2.0, 3.0, 4.0), 0.25))
        );

        let config = config
            .with_mode(MotionMode::Galaxy)
            .with_target(Vec3::new(1.0, 1.0, 0.0))
            .with_gravity_strength(4.0);
        assert_eq!(
            ModePolicy::from_config(&config),
            ModePolicy::Galaxy(Galaxy::new(Vec3::new(1.0, 1.0, 0.0), 4.0))
        );
    }

    #[test]
    fn test_enum_dispatch_matches_direct_call() {
        let swarm = Swarm::new(Vec3::new(1.0, -1.0, 0.0), 0.7);
        let mut rng_a = RandomStream::new(5);
        let mut rng_b = RandomStream::new(5);
        let p = Vec3::new(3.0, 2.0, 0.0);
        let v = Vec3::new(-0.5, 0.1, 0.0);
        assert_eq!(
            ModePolicy::Swarm(swarm).advance(p, v, 0.02, &mut rng_a),
            swarm.advance(p, v, 0.02, &mut rng_b)
        );
    }
}
