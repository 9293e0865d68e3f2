//! Slab2D - 2D AABB collision engine
//!
//! Re-exports the engine crates and provides the application configuration
//! and frame loop used by the demo binary.

pub mod config;
pub mod systems;

pub use slab2d_level as level;
pub use slab2d_math as math;
pub use slab2d_physics as physics;
