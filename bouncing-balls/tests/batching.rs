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
//! Draw submission through the full frame loop

use bouncing_balls::config::SimulationConfig;
use bouncing_balls::random::SeedSource;
use bouncing_balls::render::{InstancedRenderer, MaterialHandle, MeshHandle};
use bouncing_balls::FrameLoop;
use glam::Mat4;

/// Renderer that keeps a copy of everything it is asked to draw
#[derive(Default)]
struct RecordingRenderer {
    calls: Vec<(MeshHandle, MaterialHandle, usize)>,
    matrices: Vec<Mat4>,
}

impl InstancedRenderer for RecordingRenderer {
    fn submit_instanced_batch(&mut self, mesh: MeshHandle, material: MaterialHandle, transforms: &[Mat4]) {
        self.calls.push((mesh, material, transforms.len()));
        self.matrices.extend_from_slice(transforms);
    }
}

fn frame_loop(config: &SimulationConfig) -> FrameLoop {
    FrameLoop::with_seed_source(config, SeedSource::fixed(3), MeshHandle(7), MaterialHandle(11)).unwrap()
}

#[test]
fn test_2500_particles_split_into_three_batches() {
    let config = SimulationConfig::new(2500);
    let mut frame_loop = frame_loop(&config);
    let mut renderer = RecordingRenderer::default();

    let report = frame_loop.tick(&config, 0.016, &mut renderer);

    assert_eq!(report.batches, 3);
    let sizes: Vec<usize> = renderer.calls.iter().map(|c| c.2).collect();
    assert_eq!(sizes, vec![1023, 1023, 454]);
    assert!(renderer
        .calls
        .iter()
        .all(|&(mesh, material, _)| mesh == MeshHandle(7) && material == MaterialHandle(11)));
}

#[test]
fn test_batches_cover_transforms_in_order() {
    let config = SimulationConfig::new(2500).with_batch_capacity(1000);
    let mut frame_loop = frame_loop(&config);
    let mut renderer = RecordingRenderer::default();

    frame_loop.tick(&config, 0.016, &mut renderer);

    let expected: Vec<Mat4> = frame_loop
        .stepper()
        .transforms()
        .iter()
        .map(|t| t.to_matrix())
        .collect();
    assert_eq!(renderer.matrices.len(), 2500);
    assert_eq!(renderer.matrices, expected);
}

#[test]
fn test_matrices_follow_positions_and_radius() {
    let config = SimulationConfig::new(100).with_radius(0.2);
    let mut frame_loop = frame_loop(&config);
    let mut renderer = RecordingRenderer::default();

    frame_loop.tick(&config, 0.016, &mut renderer);

    let positions = frame_loop.stepper().store().positions();
    for (m, p) in renderer.matrices.iter().zip(positions) {
        assert_eq!(m.w_axis.truncate(), *p);
        assert!((m.x_axis.x - 0.4).abs() < 1e-6);
        assert!((m.y_axis.y - 0.4).abs() < 1e-6);
    }
}

#[test]
fn test_batch_count_stable_across_frames() {
    let mut config = SimulationConfig::new(5000);
    let mut frame_loop = frame_loop(&config);

    for frame in 0..12 {
        config.use_parallel = frame % 2 == 0;
        let mut renderer = RecordingRenderer::default();
        let report = frame_loop.tick(&config, 0.016, &mut renderer);
        assert_eq!(report.batches, 5);
        assert_eq!(renderer.matrices.len(), 5000);
    }
}
