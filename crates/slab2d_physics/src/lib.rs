//! 2D collision core for slab2d
//!
//! This crate owns all AABB geometry and the per-frame simulation step:
//! - Geometry primitives (Minkowski difference, penetration vector, ray sweep)
//! - Spatial queries (point and box overlap tests)
//! - Dynamic and static body stores with index handles
//! - Swept collision detection and positional resolution with hit callbacks
//! - Versioned binary persistence of static geometry

pub mod body;
pub mod collision;
pub mod error;
pub mod persist;
pub mod shapes;
pub mod store;
pub mod world;

// Re-export commonly used types
pub use body::{Body, OnHit, OnHitStatic, StaticBody};
pub use collision::{ray_intersect_aabb, sweep_aabb, CollisionLayer, Hit};
pub use error::{PersistError, PhysicsError};
pub use shapes::{
    aabb_intersect_aabb, minkowski_difference, penetration, penetration_vector,
    point_intersect_aabb, Aabb, Penetration,
};
pub use store::{BodyStore, StaticBodyStore};
pub use world::{PhysicsConfig, PhysicsWorld};
