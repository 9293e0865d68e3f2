//! Slab2D - headless demo
//!
//! Loads the configured scene, wires up the demo callbacks, and runs the
//! fixed-timestep frame loop for the configured number of frames.

use std::cell::Cell;
use std::rc::Rc;

use slab2d::config::AppConfig;
use slab2d::systems::SimulationSystem;
use slab2d_level::{load_level, ActiveScene, BodyTemplate, Scene, TileMap};
use slab2d_math::Vec2;
use slab2d_physics::CollisionLayer;

/// Scene used when the configured scene file cannot be read
fn fallback_scene() -> Scene {
    let mut scene = Scene::new("Fallback");
    scene.add_static(Vec2::new(0.0, -10.0), Vec2::new(800.0, 20.0), CollisionLayer::TERRAIN);
    scene.add_body(
        BodyTemplate::new(Vec2::new(0.0, 100.0), Vec2::new(16.0, 32.0))
            .with_name("player")
            .with_collision(CollisionLayer::PLAYER, CollisionLayer::TERRAIN),
    );
    scene
}

fn main() {
    let config = AppConfig::load();
    let log_level = config
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
    log::info!("Starting Slab2D");

    let config = config.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    let template = Scene::load(&config.level.scene).unwrap_or_else(|e| {
        log::warn!(
            "Failed to load scene '{}': {}. Using fallback scene.",
            config.level.scene.display(),
            e
        );
        fallback_scene()
    });
    let mut scene = ActiveScene::from_template(&template, Some(config.physics.clone()));

    // Saved level geometry replaces the scene's own statics when present
    let paths = config.level.paths();
    if paths.static_bodies.exists() {
        let mut tiles = TileMap::new();
        if load_level(scene.world.statics_mut(), &mut tiles, &paths).is_ok() {
            log::info!("Using level geometry from {}", paths.static_bodies.display());
        }
    }

    let grounded = Rc::new(Cell::new(false));
    if let Some(player) = scene.body_mut("player") {
        let flag = Rc::clone(&grounded);
        *player = player
            .clone()
            .with_on_hit_static(move |_, _, hit| {
                if hit.normal.y > 0.0 {
                    flag.set(true);
                }
            })
            .with_on_hit(|_, other, hit| {
                log::debug!("Player bumped into body {} at {:?}", hit.other_id, other.position());
            });
    }

    if let Some(fire) = scene.body_mut("fire") {
        *fire = fire.clone().with_on_hit(|_, target, hit| {
            if target.is_active {
                log::info!("Fire hit body {}", hit.other_id);
                target.is_active = false;
            }
        });
    }

    let mut sim = SimulationSystem::new(&config.simulation);
    for _ in 0..config.simulation.frames {
        // Only a floor contact during this frame counts
        grounded.set(false);
        sim.advance(&mut scene, config.simulation.frame_dt);
    }

    log::info!(
        "Ran {} frames of '{}': {} of {} bodies active",
        sim.total_frames(),
        scene.name,
        scene.world.bodies().active_count(),
        scene.world.bodies().len()
    );
    if let Some(player) = scene.handle("player").and_then(|h| scene.world.body(h)) {
        log::info!(
            "Player at ({:.2}, {:.2}), speed {:.2}, grounded: {}",
            player.position().x,
            player.position().y,
            player.velocity.length(),
            grounded.get()
        );
    }
}
