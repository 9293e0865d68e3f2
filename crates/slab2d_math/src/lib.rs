//! 2D Mathematics Library
//!
//! This crate provides the vector type shared by the slab2d physics core and
//! the level tooling built on top of it.
//!
//! ## Core Types
//!
//! - [`Vec2`] - 2D vector with x, y components

mod vec2;

pub use vec2::{Axis, Vec2};
