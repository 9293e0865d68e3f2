//! Game simulation system
//!
//! Manages the fixed-timestep frame loop:
//! - Delta time calculation
//! - Accumulating wall-clock time into whole physics frames
//! - Physics stepping

use std::time::Instant;

use slab2d_level::ActiveScene;

use crate::config::SimulationConfig;

/// Result of a simulation update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationResult {
    /// Physics frames stepped during this update
    pub frames: u32,
}

/// Manages the game simulation loop
///
/// Elapsed time is capped at `max_frame_dt` and split into whole frames of
/// `frame_dt`; the remainder carries over to the next update.
pub struct SimulationSystem {
    last_frame: Instant,
    accumulator: f32,
    frame_dt: f32,
    max_frame_dt: f32,
    total_frames: u64,
}

impl SimulationSystem {
    /// Create a new simulation system
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            last_frame: Instant::now(),
            accumulator: 0.0,
            frame_dt: config.frame_dt,
            max_frame_dt: config.max_frame_dt,
            total_frames: 0,
        }
    }

    /// Run the frames owed since the previous call, measured on the wall clock
    pub fn update(&mut self, scene: &mut ActiveScene) -> SimulationResult {
        let now = Instant::now();
        let elapsed = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(scene, elapsed)
    }

    /// Feed `elapsed` seconds into the accumulator and step whole frames
    pub fn advance(&mut self, scene: &mut ActiveScene, elapsed: f32) -> SimulationResult {
        if self.frame_dt <= 0.0 {
            return SimulationResult { frames: 0 };
        }

        // Cap dt to prevent spiral of death after a stall
        self.accumulator += elapsed.clamp(0.0, self.max_frame_dt);

        let mut frames = 0;
        while self.accumulator >= self.frame_dt {
            scene.update(self.frame_dt);
            self.accumulator -= self.frame_dt;
            frames += 1;
        }
        self.total_frames += u64::from(frames);

        SimulationResult { frames }
    }

    /// Frames stepped since creation
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Time carried over to the next update
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new(&SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slab2d_level::{BodyTemplate, Scene};
    use slab2d_math::Vec2;

    fn falling_scene() -> ActiveScene {
        let mut scene = Scene::new("Fall");
        scene.add_body(BodyTemplate::new(Vec2::new(0.0, 100.0), Vec2::splat(10.0)).with_name("box"));
        ActiveScene::from_template(&scene, None)
    }

    fn config(frame_dt: f32, max_frame_dt: f32) -> SimulationConfig {
        SimulationConfig {
            frame_dt,
            max_frame_dt,
            frames: 0,
        }
    }

    #[test]
    fn test_whole_frames_and_remainder() {
        let mut scene = falling_scene();
        let mut sim = SimulationSystem::new(&config(0.1, 1.0));

        let result = sim.advance(&mut scene, 0.25);
        assert_eq!(result.frames, 2);
        assert!((sim.accumulator() - 0.05).abs() < 1e-5);

        let result = sim.advance(&mut scene, 0.06);
        assert_eq!(result.frames, 1);
        assert_eq!(sim.total_frames(), 3);
    }

    #[test]
    fn test_delta_time_capped() {
        let mut scene = falling_scene();
        let mut sim = SimulationSystem::new(&config(0.1, 0.25));

        // A long stall only owes max_frame_dt worth of frames
        let result = sim.advance(&mut scene, 5.0);
        assert_eq!(result.frames, 2);
    }

    #[test]
    fn test_frames_move_bodies() {
        let mut scene = falling_scene();
        let mut sim = SimulationSystem::default();
        sim.advance(&mut scene, 1.0 / 60.0);

        let body = scene.world.body(scene.handle("box").unwrap()).unwrap();
        assert!(body.position().y < 100.0);
        assert!(body.velocity.y < 0.0);
    }

    #[test]
    fn test_negative_elapsed_ignored() {
        let mut scene = falling_scene();
        let mut sim = SimulationSystem::default();
        assert_eq!(sim.advance(&mut scene, -1.0).frames, 0);
        assert_eq!(sim.accumulator(), 0.0);
    }

    #[test]
    fn test_wall_clock_update() {
        let mut scene = falling_scene();
        let mut sim = SimulationSystem::new(&config(0.01, 0.25));
        std::thread::sleep(std::time::Duration::from_millis(30));

        let result = sim.update(&mut scene);
        assert!(result.frames >= 2);
    }
}
