//! Physics world and simulation

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use slab2d_math::{Axis, Vec2};

use crate::body::{Body, StaticBody};
use crate::collision::{sweep_aabb, CollisionLayer, Hit};
use crate::shapes::{aabb_intersect_aabb, minkowski_difference, penetration, point_intersect_aabb, Aabb};
use crate::store::{BodyStore, StaticBodyStore};

/// Configuration for the physics simulation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Acceleration applied to every non-kinematic body (negative y = down)
    pub gravity: Vec2,
    /// Lower bound on the vertical velocity of non-kinematic bodies
    pub terminal_velocity: f32,
    /// Maximum contacts resolved per body per substep
    pub max_resolution_iterations: u32,
    /// Number of equal substeps each `step` is split into
    pub substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -200.0),
            terminal_velocity: -10_000.0,
            max_resolution_iterations: 4,
            substeps: 1,
        }
    }
}

impl PhysicsConfig {
    /// Create a new physics config with the given gravity
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    /// Config with no gravity, for top-down games and tests
    pub fn zero_gravity() -> Self {
        Self::new(Vec2::ZERO)
    }
}

/// Something a moving body can strike
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Obstacle {
    Static(usize),
    Body(usize),
}

/// The physics world containing all dynamic and static bodies
#[derive(Debug, Default)]
pub struct PhysicsWorld {
    bodies: BodyStore,
    statics: StaticBodyStore,
    /// Physics configuration
    pub config: PhysicsConfig,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: BodyStore::new(),
            statics: StaticBodyStore::new(),
            config,
        }
    }

    /// Dynamic bodies
    pub fn bodies(&self) -> &BodyStore {
        &self.bodies
    }

    /// Mutable dynamic bodies
    pub fn bodies_mut(&mut self) -> &mut BodyStore {
        &mut self.bodies
    }

    /// Static geometry
    pub fn statics(&self) -> &StaticBodyStore {
        &self.statics
    }

    /// Mutable static geometry
    pub fn statics_mut(&mut self) -> &mut StaticBodyStore {
        &mut self.statics
    }

    /// Add a dynamic body and return its handle
    pub fn create_body(&mut self, body: Body) -> usize {
        self.bodies.create(body)
    }

    /// Add static geometry from its center and full size and return its index
    pub fn create_static(&mut self, position: Vec2, size: Vec2, layer: CollisionLayer) -> usize {
        self.statics.create(position, size, layer)
    }

    /// Get a dynamic body by handle
    pub fn body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    /// Get a mutable dynamic body by handle
    pub fn body_mut(&mut self, index: usize) -> Option<&mut Body> {
        self.bodies.get_mut(index)
    }

    /// Step the physics simulation forward by dt seconds
    ///
    /// Bodies are processed one at a time in handle order. For each active
    /// body this performs:
    /// 1. Velocity integration (gravity and terminal velocity for non-kinematic bodies)
    /// 2. Push-out from static and kinematic bodies it already overlaps
    /// 3. Swept resolution against the earliest contact, sliding along the
    ///    struck face for the rest of the motion
    ///
    /// Kinematic bodies skip 2 and 3; they move freely and then report every
    /// body they overlap through `on_hit`.
    pub fn step(&mut self, dt: f32) {
        let substeps = self.config.substeps.max(1);
        let sub_dt = dt / substeps as f32;
        for _ in 0..substeps {
            self.substep(sub_dt);
        }
    }

    fn substep(&mut self, dt: f32) {
        // Callbacks cannot add or remove slots, so the length is stable
        let count = self.bodies.len();
        for index in 0..count {
            let Some(body) = self.bodies.get(index) else {
                break;
            };
            if !body.is_active {
                continue;
            }

            if body.is_kinematic {
                self.step_kinematic(index, dt);
            } else {
                self.step_dynamic(index, dt);
            }
        }
    }

    fn step_dynamic(&mut self, index: usize, dt: f32) {
        let gravity = self.config.gravity;
        let terminal_velocity = self.config.terminal_velocity;

        let Some(body) = self.bodies.get_mut(index) else {
            return;
        };
        body.velocity += (body.acceleration + gravity) * dt;
        body.velocity.y = body.velocity.y.max(terminal_velocity);
        let displacement = body.velocity * dt;

        self.resolve_motion(index, displacement);
    }

    fn step_kinematic(&mut self, index: usize, dt: f32) {
        let Some(body) = self.bodies.get_mut(index) else {
            return;
        };
        body.velocity += body.acceleration * dt;
        body.aabb.position += body.velocity * dt;

        let Some(on_hit) = body.on_hit.clone() else {
            return;
        };

        for other in 0..self.bodies.len() {
            let Some((this, target)) = self.bodies.pair_mut(index, other) else {
                continue;
            };
            if !this.is_active {
                break;
            }
            if !target.is_active
                || !this.collision_mask.accepts(target.collision_layer)
                || !aabb_intersect_aabb(this.aabb, target.aabb)
            {
                continue;
            }

            let exit = penetration(minkowski_difference(target.aabb, this.aabb));
            let hit = Hit {
                other_id: other,
                time: 0.0,
                position: this.aabb.position,
                normal: exit.normal,
                is_hit: true,
            };
            debug!("Kinematic body {} overlaps body {}", index, other);
            on_hit(this, target, hit);
        }
    }

    /// Move a body out of static and kinematic bodies it overlaps
    ///
    /// The body is placed flush against the face of least penetration. Bodies
    /// that merely touch are left alone, and no callbacks fire.
    fn push_out_of_overlaps(&mut self, index: usize) {
        let Some(body) = self.bodies.get(index) else {
            return;
        };
        let mask = body.collision_mask;
        let mut aabb = body.aabb;

        let obstacles = self
            .statics
            .iter()
            .enumerate()
            .map(|(i, s)| (Obstacle::Static(i), s.collision_layer, s.aabb))
            .chain(
                self.bodies
                    .iter_active()
                    .filter(|(i, b)| *i != index && b.is_kinematic)
                    .map(|(i, b)| (Obstacle::Body(i), b.collision_layer, b.aabb)),
            );

        for (obstacle, layer, obstacle_aabb) in obstacles {
            if !mask.accepts(layer) {
                continue;
            }
            let difference = minkowski_difference(obstacle_aabb, aabb);
            if !difference.contains_strict(Vec2::ZERO) {
                continue;
            }

            let exit = penetration(difference);
            aabb.position = flush_position(aabb, obstacle_aabb, exit.axis, exit.normal, aabb.position);
            debug!("Pushed body {} out of {:?} along {:?}", index, obstacle, exit.normal);
        }

        if let Some(body) = self.bodies.get_mut(index) {
            body.aabb = aabb;
        }
    }

    /// Sweep a body along `displacement`, resolving contacts earliest-first
    fn resolve_motion(&mut self, index: usize, displacement: Vec2) {
        let max_iterations = self.config.max_resolution_iterations.max(1);
        let mut remaining = displacement;
        let mut excluded: Vec<Obstacle> = Vec::new();

        for _ in 0..max_iterations {
            match self.bodies.get(index) {
                Some(body) if body.is_active => {}
                _ => return,
            }

            // Also catches rounding drift into a neighbour after a slide
            self.push_out_of_overlaps(index);
            if remaining.is_zero() {
                return;
            }

            let Some(body) = self.bodies.get(index) else {
                return;
            };

            let Some((obstacle, obstacle_aabb, hit)) = self.earliest_hit(index, body, remaining, &excluded)
            else {
                if let Some(body) = self.bodies.get_mut(index) {
                    body.aabb.position += remaining;
                }
                return;
            };

            let Some(axis) = hit.normal_axis() else {
                return;
            };

            let Some(body) = self.bodies.get_mut(index) else {
                return;
            };
            let position = flush_position(body.aabb, obstacle_aabb, axis, hit.normal, hit.position);
            body.aabb.position = position;
            body.velocity.set(axis, 0.0);
            let hit = Hit { position, ..hit };

            remaining = (remaining * (1.0 - hit.time)).with(axis, 0.0);
            excluded.push(obstacle);

            debug!(
                "Body {} hit {:?} at t={:.4} normal=({}, {})",
                index, obstacle, hit.time, hit.normal.x, hit.normal.y
            );
            self.dispatch_hit(index, obstacle, hit);
        }

        if !remaining.is_zero() {
            warn!(
                "Body {} hit the resolution cap of {} contacts; dropping remaining motion ({}, {})",
                index, max_iterations, remaining.x, remaining.y
            );
        }
    }

    /// Earliest contact of `body` moving by `displacement`
    ///
    /// Statics are tested before dynamic bodies and each in index order; only a
    /// strictly earlier time replaces the current best, so ties go to statics
    /// and then to the lowest index.
    fn earliest_hit(
        &self,
        index: usize,
        body: &Body,
        displacement: Vec2,
        excluded: &[Obstacle],
    ) -> Option<(Obstacle, Aabb, Hit)> {
        let mask = body.collision_mask;

        let statics = self
            .statics
            .iter()
            .enumerate()
            .map(|(i, s)| (Obstacle::Static(i), s.collision_layer, s.aabb));
        let dynamics = self
            .bodies
            .iter_active()
            .filter(|(i, _)| *i != index)
            .map(|(i, b)| (Obstacle::Body(i), b.collision_layer, b.aabb));

        let mut best: Option<(Obstacle, Aabb, Hit)> = None;
        for (obstacle, layer, obstacle_aabb) in statics.chain(dynamics) {
            if !mask.accepts(layer) || excluded.contains(&obstacle) {
                continue;
            }

            let hit = sweep_aabb(body.aabb, displacement, obstacle_aabb);
            if !hit.is_hit {
                continue;
            }
            if best.as_ref().map_or(true, |(_, _, b)| hit.time < b.time) {
                let other_id = match obstacle {
                    Obstacle::Static(i) | Obstacle::Body(i) => i,
                };
                best = Some((obstacle, obstacle_aabb, Hit { other_id, ..hit }));
            }
        }
        best
    }

    fn dispatch_hit(&mut self, index: usize, obstacle: Obstacle, hit: Hit) {
        match obstacle {
            Obstacle::Static(other) => {
                let Some(other_body) = self.statics.get(other).copied() else {
                    return;
                };
                let Some(body) = self.bodies.get_mut(index) else {
                    return;
                };
                if let Some(on_hit_static) = body.on_hit_static.clone() {
                    on_hit_static(body, &other_body, hit);
                }
            }
            Obstacle::Body(other) => {
                let Some((body, other_body)) = self.bodies.pair_mut(index, other) else {
                    return;
                };
                if let Some(on_hit) = body.on_hit.clone() {
                    on_hit(body, other_body, hit);
                }
            }
        }
    }

    /// Static bodies whose box contains `point`, in index order
    pub fn statics_at(&self, point: Vec2) -> Vec<usize> {
        self.statics
            .iter()
            .enumerate()
            .filter(|(_, s)| point_intersect_aabb(point, s.aabb))
            .map(|(i, _)| i)
            .collect()
    }

    /// Active bodies overlapping `aabb` (touching included), in handle order
    pub fn bodies_overlapping(&self, aabb: Aabb) -> Vec<usize> {
        self.bodies
            .iter_active()
            .filter(|(_, b)| aabb_intersect_aabb(aabb, b.aabb))
            .map(|(i, _)| i)
            .collect()
    }

    /// Replace the static geometry, e.g. after loading a level
    pub fn set_statics(&mut self, statics: Vec<StaticBody>) {
        self.statics.replace_all(statics);
    }
}

/// Position of `body` resting exactly on the `normal` face of `obstacle`
///
/// The normal-axis coordinate is rebuilt from the obstacle's center so that
/// resting contacts land on the face exactly and are not left a rounding
/// error inside it.
fn flush_position(body: Aabb, obstacle: Aabb, axis: Axis, normal: Vec2, position: Vec2) -> Vec2 {
    let reach = obstacle.half_size.get(axis) + body.half_size.get(axis);
    position.with(axis, obstacle.position.get(axis) + normal.get(axis) * reach)
}
