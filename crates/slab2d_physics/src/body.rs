//! Body types for 2D physics simulation

use std::fmt;
use std::rc::Rc;

use slab2d_math::Vec2;

use crate::collision::{CollisionLayer, Hit};
use crate::shapes::Aabb;

/// Reaction to a dynamic-vs-dynamic contact: `(self, other, hit)`
///
/// Both bodies may be mutated, including deactivating either one.
pub type OnHit = Rc<dyn Fn(&mut Body, &mut Body, Hit)>;

/// Reaction to a dynamic-vs-static contact: `(self, other, hit)`
pub type OnHitStatic = Rc<dyn Fn(&mut Body, &StaticBody, Hit)>;

/// A moving 2D box with velocity and collision filtering
///
/// Bodies live in a [`BodyStore`](crate::store::BodyStore) and are referred to
/// elsewhere only by index.
#[derive(Clone)]
pub struct Body {
    /// Collision box (center + half-size)
    pub aabb: Aabb,
    /// Velocity (units per second)
    pub velocity: Vec2,
    /// Acceleration (units per second squared)
    pub acceleration: Vec2,
    /// Layers this body belongs to
    pub collision_layer: CollisionLayer,
    /// Layers this body generates contacts against
    pub collision_mask: CollisionLayer,
    /// Mass of the body
    pub mass: f32,
    /// Kinematic bodies move themselves but are never blocked or pushed
    pub is_kinematic: bool,
    /// Inactive bodies are skipped by the simulation and their slot may be reused
    pub is_active: bool,
    /// Called when this body strikes another dynamic body
    pub on_hit: Option<OnHit>,
    /// Called when this body strikes a static body
    pub on_hit_static: Option<OnHitStatic>,
}

impl Body {
    /// Create an active body centered at `position` with full `size`
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            aabb: Aabb::from_size(position, size),
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            collision_layer: CollisionLayer::empty(),
            collision_mask: CollisionLayer::ALL,
            mass: 1.0,
            is_kinematic: false,
            is_active: true,
            on_hit: None,
            on_hit_static: None,
        }
    }

    /// Set the velocity of this body
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the acceleration of this body
    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Set the mass of this body
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Set the layer this body belongs to and the layers it collides with
    pub fn with_collision(mut self, layer: CollisionLayer, mask: CollisionLayer) -> Self {
        self.collision_layer = layer;
        self.collision_mask = mask;
        self
    }

    /// Set whether this body is kinematic
    pub fn with_kinematic(mut self, is_kinematic: bool) -> Self {
        self.is_kinematic = is_kinematic;
        self
    }

    /// Set the dynamic-vs-dynamic contact callback
    pub fn with_on_hit(mut self, on_hit: impl Fn(&mut Body, &mut Body, Hit) + 'static) -> Self {
        self.on_hit = Some(Rc::new(on_hit));
        self
    }

    /// Set the dynamic-vs-static contact callback
    pub fn with_on_hit_static(
        mut self,
        on_hit_static: impl Fn(&mut Body, &StaticBody, Hit) + 'static,
    ) -> Self {
        self.on_hit_static = Some(Rc::new(on_hit_static));
        self
    }

    /// Center of the body
    pub fn position(&self) -> Vec2 {
        self.aabb.position
    }

    /// Move the body to a new center
    pub fn set_position(&mut self, position: Vec2) {
        self.aabb.position = position;
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("aabb", &self.aabb)
            .field("velocity", &self.velocity)
            .field("acceleration", &self.acceleration)
            .field("collision_layer", &self.collision_layer)
            .field("collision_mask", &self.collision_mask)
            .field("mass", &self.mass)
            .field("is_kinematic", &self.is_kinematic)
            .field("is_active", &self.is_active)
            .field("on_hit", &self.on_hit.is_some())
            .field("on_hit_static", &self.on_hit_static.is_some())
            .finish()
    }
}

/// Immovable collision geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticBody {
    /// Collision box (center + half-size)
    pub aabb: Aabb,
    /// Layers this geometry belongs to
    pub collision_layer: CollisionLayer,
}

impl StaticBody {
    /// Create static geometry centered at `position` with full `size`
    pub fn new(position: Vec2, size: Vec2, collision_layer: CollisionLayer) -> Self {
        Self {
            aabb: Aabb::from_size(position, size),
            collision_layer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_new_body() {
        let body = Body::new(Vec2::new(200.0, 100.0), Vec2::new(24.0, 24.0));

        assert_eq!(body.position(), Vec2::new(200.0, 100.0));
        assert_eq!(body.aabb.half_size, Vec2::new(12.0, 12.0));
        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(body.mass, 1.0);
        assert!(body.is_active);
        assert!(!body.is_kinematic);
        assert!(body.on_hit.is_none());
        assert!(body.on_hit_static.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let body = Body::new(Vec2::ZERO, Vec2::splat(2.0))
            .with_velocity(Vec2::new(1.0, 2.0))
            .with_acceleration(Vec2::new(0.0, -1.0))
            .with_mass(0.4)
            .with_collision(CollisionLayer::PLAYER, CollisionLayer::ENEMY | CollisionLayer::TERRAIN)
            .with_kinematic(true);

        assert_eq!(body.velocity, Vec2::new(1.0, 2.0));
        assert_eq!(body.acceleration, Vec2::new(0.0, -1.0));
        assert_eq!(body.mass, 0.4);
        assert_eq!(body.collision_layer, CollisionLayer::PLAYER);
        assert!(body.collision_mask.contains(CollisionLayer::TERRAIN));
        assert!(body.is_kinematic);
    }

    #[test]
    fn test_callbacks_are_invocable() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let body = Body::new(Vec2::ZERO, Vec2::splat(1.0))
            .with_on_hit_static(move |this, _other, hit| {
                counter.set(counter.get() + 1);
                this.velocity = hit.normal;
            });

        let mut subject = body.clone();
        let wall = StaticBody::new(Vec2::ZERO, Vec2::splat(4.0), CollisionLayer::TERRAIN);
        let callback = body.on_hit_static.clone().unwrap();
        let mut hit = Hit::miss();
        hit.normal = Vec2::X;
        callback(&mut subject, &wall, hit);

        assert_eq!(calls.get(), 1);
        assert_eq!(subject.velocity, Vec2::X);
    }

    #[test]
    fn test_set_position() {
        let mut body = Body::new(Vec2::ZERO, Vec2::splat(1.0));
        body.set_position(Vec2::new(5.0, -3.0));
        assert_eq!(body.aabb.position, Vec2::new(5.0, -3.0));
    }

    #[test]
    fn test_debug_hides_closures() {
        let body = Body::new(Vec2::ZERO, Vec2::splat(1.0)).with_on_hit(|_, _, _| {});
        let debug = format!("{:?}", body);
        assert!(debug.contains("on_hit: true"));
        assert!(debug.contains("on_hit_static: false"));
    }

    #[test]
    fn test_static_body_from_size() {
        let body = StaticBody::new(Vec2::new(100.0, 50.0), Vec2::new(100.0, 20.0), CollisionLayer::TERRAIN);
        assert_eq!(body.aabb.half_size, Vec2::new(50.0, 10.0));
        assert_eq!(body.collision_layer, CollisionLayer::TERRAIN);
    }
}
