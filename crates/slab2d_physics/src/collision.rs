//! Swept collision detection
//!
//! Provides the hit record, the slab-method ray sweep, and collision
//! filtering via layer masks.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use slab2d_math::{Axis, Vec2};

use crate::shapes::Aabb;

bitflags! {
    /// Collision layers for filtering which bodies can collide
    ///
    /// A body belongs to the layers in its `collision_layer` and generates
    /// contacts only against bodies whose layer intersects its
    /// `collision_mask`. The relationship is one-directional: a projectile can
    /// detect enemies without enemies detecting the projectile.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CollisionLayer: u32 {
        /// Player character layer
        const PLAYER = 1 << 0;
        /// Enemy/NPC layer
        const ENEMY = 1 << 1;
        /// Level geometry (floors, walls, platforms)
        const TERRAIN = 1 << 2;
        /// All layers
        const ALL = u32::MAX;
    }
}

impl CollisionLayer {
    /// Check if a mask accepts contacts with the given layer
    pub fn accepts(self, layer: CollisionLayer) -> bool {
        self.intersects(layer)
    }
}

/// Result of a swept collision test
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Index of the static or dynamic body that was struck
    pub other_id: usize,
    /// Fraction of the swept motion at which contact occurs, in `[0, 1]`
    pub time: f32,
    /// Center of the moving box at the moment of contact
    pub position: Vec2,
    /// Unit axis-aligned normal of the struck face
    pub normal: Vec2,
    /// Whether contact occurred during this sweep
    pub is_hit: bool,
}

impl Hit {
    /// A sweep that completed its full motion without contact
    pub fn miss() -> Self {
        Self {
            other_id: 0,
            time: 1.0,
            position: Vec2::ZERO,
            normal: Vec2::ZERO,
            is_hit: false,
        }
    }

    /// Axis the normal lies on, if this is a hit
    pub fn normal_axis(&self) -> Option<Axis> {
        if self.normal.x != 0.0 {
            Some(Axis::X)
        } else if self.normal.y != 0.0 {
            Some(Axis::Y)
        } else {
            None
        }
    }
}

impl Default for Hit {
    fn default() -> Self {
        Self::miss()
    }
}

/// Sweep a point by `displacement` against `aabb` using the slab method
///
/// Per axis, entry and exit fractions are computed; the overall entry is the
/// later of the two entries and the overall exit the earlier of the exits.
/// A zero displacement component misses unless the origin lies strictly
/// between that axis's bounds. The normal comes from the axis with the later
/// entry (horizontal on ties), facing against the motion.
pub fn ray_intersect_aabb(origin: Vec2, displacement: Vec2, aabb: Aabb) -> Hit {
    let (min, max) = aabb.min_max();

    let mut last_entry = f32::NEG_INFINITY;
    let mut first_exit = f32::INFINITY;
    let mut entry_axis = None;

    for axis in Axis::ALL {
        let delta = displacement.get(axis);
        let start = origin.get(axis);

        if delta == 0.0 {
            // Parallel to this slab: never enters it unless already inside
            if start <= min.get(axis) || start >= max.get(axis) {
                return Hit::miss();
            }
            continue;
        }

        let t1 = (min.get(axis) - start) / delta;
        let t2 = (max.get(axis) - start) / delta;
        let entry = t1.min(t2);
        let exit = t1.max(t2);

        if entry > last_entry {
            last_entry = entry;
            entry_axis = Some(axis);
        }
        first_exit = first_exit.min(exit);
    }

    let Some(axis) = entry_axis else {
        return Hit::miss();
    };

    // Equal entry and exit is a zero-width slab, which still blocks
    if last_entry > first_exit || !(0.0..=1.0).contains(&last_entry) {
        return Hit::miss();
    }

    let sign = if displacement.get(axis) > 0.0 { -1.0 } else { 1.0 };

    Hit {
        other_id: 0,
        time: last_entry,
        position: origin + displacement * last_entry,
        normal: Vec2::axis_unit(axis, sign),
        is_hit: true,
    }
}

/// Sweep a moving box against a stationary one
///
/// The obstacle is grown by the mover's half-size (their Minkowski
/// difference, anchored at the obstacle's center instead of the origin) and
/// the mover's center is swept against it. Staying in world space keeps face
/// coordinates bit-identical to `obstacle.position ± half_size sum`.
pub fn sweep_aabb(mover: Aabb, displacement: Vec2, obstacle: Aabb) -> Hit {
    ray_intersect_aabb(mover.position, displacement, obstacle.expanded(mover.half_size))
}
