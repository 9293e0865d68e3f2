//! Axis-aligned boxes and the pure functions operating on them
//!
//! Everything here is stateless and allocation-free. Boxes are stored as
//! center + half-size; a zero half-size is a legal point box.

use serde::{Deserialize, Serialize};
use slab2d_math::{Axis, Vec2};

/// A 2D axis-aligned bounding box
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Center of the box
    pub position: Vec2,
    /// Half the size in each dimension (non-negative)
    pub half_size: Vec2,
}

impl Aabb {
    /// Create a box from its center and half-size
    pub fn new(position: Vec2, half_size: Vec2) -> Self {
        Self { position, half_size }
    }

    /// Create a box from its center and full size
    pub fn from_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position, size * 0.5)
    }

    /// Minimum corner
    pub fn min(&self) -> Vec2 {
        self.position - self.half_size
    }

    /// Maximum corner
    pub fn max(&self) -> Vec2 {
        self.position + self.half_size
    }

    /// Both corners at once
    pub fn min_max(&self) -> (Vec2, Vec2) {
        (self.min(), self.max())
    }

    /// Full size in each dimension
    pub fn size(&self) -> Vec2 {
        self.half_size * 2.0
    }

    /// Grow the box by `half_size` on every side, keeping its center
    pub fn expanded(&self, half_size: Vec2) -> Self {
        Self::new(self.position, self.half_size + half_size)
    }

    /// Check if a point lies strictly inside the box (boundary excluded)
    pub fn contains_strict(&self, point: Vec2) -> bool {
        let (min, max) = self.min_max();
        point.x > min.x && point.x < max.x && point.y > min.y && point.y < max.y
    }
}

/// Minkowski difference of two boxes
///
/// The result is centered at `a.position - b.position` and extends by the sum
/// of both half-sizes. `a` and `b` overlap iff the result contains the origin.
pub fn minkowski_difference(a: Aabb, b: Aabb) -> Aabb {
    Aabb::new(a.position - b.position, a.half_size + b.half_size)
}

/// Least-penetration exit from a box containing the origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Penetration {
    /// Axis of least penetration
    pub axis: Axis,
    /// Vector from the origin to the nearest edge of the box
    pub vector: Vec2,
    /// Unit direction of `vector`; well defined even when the depth is zero
    pub normal: Vec2,
}

/// Find the nearest edge of `aabb` as seen from the origin
///
/// Edges are checked min-x, max-x, min-y, max-y and only a strictly closer
/// edge replaces the current one, so equal distances resolve horizontally.
pub fn penetration(aabb: Aabb) -> Penetration {
    let (min, max) = aabb.min_max();

    let mut axis = Axis::X;
    let mut edge = min.x;
    let mut sign = -1.0;
    let mut best = min.x.abs();

    let candidates = [(Axis::X, max.x, 1.0), (Axis::Y, min.y, -1.0), (Axis::Y, max.y, 1.0)];
    for (candidate_axis, candidate_edge, candidate_sign) in candidates {
        if candidate_edge.abs() < best {
            best = candidate_edge.abs();
            axis = candidate_axis;
            edge = candidate_edge;
            sign = candidate_sign;
        }
    }

    Penetration {
        axis,
        vector: Vec2::ZERO.with(axis, edge),
        normal: Vec2::axis_unit(axis, sign),
    }
}

/// Minimal vector pushing the origin out of `aabb`
///
/// Only meaningful for a box that contains the origin (an overlap).
pub fn penetration_vector(aabb: Aabb) -> Vec2 {
    penetration(aabb).vector
}

/// Check if a point lies in the box, boundary included
pub fn point_intersect_aabb(point: Vec2, aabb: Aabb) -> bool {
    let (min, max) = aabb.min_max();
    point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
}

/// Check if two boxes overlap, touching edges included
pub fn aabb_intersect_aabb(a: Aabb, b: Aabb) -> bool {
    let (a_min, a_max) = a.min_max();
    let (b_min, b_max) = b.min_max();
    a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
}
