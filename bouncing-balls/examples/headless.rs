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
//! Headless simulation run
//!
//! Drives the frame loop at a fixed 60 Hz without a window, cycling through
//! every motion mode and toggling parallel execution, and prints the status
//! line once per simulated second.
//!
//! Run with `RUST_LOG=debug` to see mode switches and reseeds.

use bouncing_balls::config::{MotionMode, SimulationConfig};
use bouncing_balls::render::{MaterialHandle, MeshHandle, NullRenderer};
use bouncing_balls::FrameLoop;
use glam::Vec3;
use std::time::Instant;

const FRAMES_PER_MODE: usize = 180;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Bouncing Balls - Headless Run");
    println!("=============================\n");

    let mut config = SimulationConfig::new(50_000).with_target(Vec3::new(1.0, 0.5, 0.0));
    println!("Configuration:\n{}\n", config.to_json()?);

    let mut frame_loop = FrameLoop::new(&config, MeshHandle(0), MaterialHandle(0))?;
    let mut renderer = NullRenderer::default();
    let dt = 1.0 / 60.0;

    for (round, mode) in MotionMode::ALL.iter().cycle().take(8).enumerate() {
        config.mode = *mode;
        config.use_parallel = round < 4;
        println!("--- {} (parallel: {}) ---", mode, config.use_parallel);

        let start = Instant::now();
        for frame in 0..FRAMES_PER_MODE {
            frame_loop.tick(&config, dt, &mut renderer);
            if (frame + 1) % 60 == 0 {
                println!("  {}", frame_loop.status_line());
            }
        }
        let elapsed = start.elapsed();
        println!(
            "  {} frames in {:.2?} ({:.2?} per frame)\n",
            FRAMES_PER_MODE,
            elapsed,
            elapsed / FRAMES_PER_MODE as u32
        );
    }

    println!(
        "Submitted {} draw calls, {} instances total",
        renderer.draw_calls, renderer.instances
    );
    frame_loop.shutdown();
    Ok(())
}
