//! Index-addressed storage for dynamic and static bodies
//!
//! Both stores hand out plain `usize` handles. Their removal policies differ
//! and callers holding handles across a removal must account for it:
//!
//! - [`BodyStore::remove`] swaps the last body into the freed slot, so only the
//!   handle of the previously-last body changes.
//! - [`StaticBodyStore::remove`] shifts every later element down by one, so any
//!   stored index greater than the removed one must be decremented.
//!
//! Game logic should usually deactivate bodies instead of removing them; the
//! deactivated slot is reused by the next [`BodyStore::create`].

use std::path::Path;

use log::{debug, info, warn};
use slab2d_math::Vec2;

use crate::body::{Body, StaticBody};
use crate::collision::CollisionLayer;
use crate::error::{PersistError, PhysicsError};
use crate::persist;
use crate::shapes::point_intersect_aabb;

/// Arena of dynamic bodies with first-fit reuse of inactive slots
#[derive(Debug, Default, Clone)]
pub struct BodyStore {
    bodies: Vec<Body>,
}

impl BodyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a body and return its handle
    ///
    /// The first inactive slot is reused if there is one; otherwise the body
    /// is appended. The stored body is always active.
    pub fn create(&mut self, mut body: Body) -> usize {
        body.is_active = true;

        if let Some(index) = self.bodies.iter().position(|b| !b.is_active) {
            debug!("Reusing inactive body slot {}", index);
            self.bodies[index] = body;
            return index;
        }

        self.bodies.push(body);
        self.bodies.len() - 1
    }

    /// Get a body by handle
    pub fn get(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    /// Get a mutable body by handle
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Body> {
        self.bodies.get_mut(index)
    }

    /// Mutable access to two distinct bodies at once
    ///
    /// Returns `None` if the handles are equal or either is out of range.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut Body, &mut Body)> {
        let len = self.bodies.len();
        if a == b || a >= len || b >= len {
            return None;
        }

        if a < b {
            let (low, high) = self.bodies.split_at_mut(b);
            Some((&mut low[a], &mut high[0]))
        } else {
            let (low, high) = self.bodies.split_at_mut(a);
            Some((&mut high[0], &mut low[b]))
        }
    }

    /// Soft-delete a body, keeping every handle valid
    pub fn deactivate(&mut self, index: usize) -> Result<(), PhysicsError> {
        let len = self.bodies.len();
        match self.bodies.get_mut(index) {
            Some(body) => {
                body.is_active = false;
                Ok(())
            }
            None => Err(PhysicsError::InvalidBody { index, len }),
        }
    }

    /// Physically remove a body, moving the last body into its slot
    pub fn remove(&mut self, index: usize) -> Result<Body, PhysicsError> {
        if index >= self.bodies.len() {
            warn!("Refusing to remove body {}: store holds {}", index, self.bodies.len());
            return Err(PhysicsError::InvalidBody {
                index,
                len: self.bodies.len(),
            });
        }
        Ok(self.bodies.swap_remove(index))
    }

    /// Number of slots, active or not
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Check if the store has no slots
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Number of active bodies
    pub fn active_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_active).count()
    }

    /// Iterate over `(handle, body)` pairs, including inactive slots
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Body)> {
        self.bodies.iter().enumerate()
    }

    /// Iterate over `(handle, body)` pairs of active bodies only
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &Body)> {
        self.iter().filter(|(_, b)| b.is_active)
    }

    /// Remove every body
    pub fn clear(&mut self) {
        self.bodies.clear();
    }
}

/// Ordered collection of immovable collision geometry
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StaticBodyStore {
    bodies: Vec<StaticBody>,
}

impl StaticBodyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create static geometry from its center and full size, returning its index
    pub fn create(&mut self, position: Vec2, size: Vec2, layer: CollisionLayer) -> usize {
        self.add(StaticBody::new(position, size, layer))
    }

    /// Append an existing static body, returning its index
    pub fn add(&mut self, body: StaticBody) -> usize {
        self.bodies.push(body);
        self.bodies.len() - 1
    }

    /// Get a static body by index
    pub fn get(&self, index: usize) -> Option<&StaticBody> {
        self.bodies.get(index)
    }

    /// Get a mutable static body by index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut StaticBody> {
        self.bodies.get_mut(index)
    }

    /// Remove a static body, shifting every later index down by one
    pub fn remove(&mut self, index: usize) -> Result<StaticBody, PhysicsError> {
        if index >= self.bodies.len() {
            warn!("Refusing to remove static body {}: store holds {}", index, self.bodies.len());
            return Err(PhysicsError::InvalidStaticBody {
                index,
                len: self.bodies.len(),
            });
        }
        Ok(self.bodies.remove(index))
    }

    /// Number of static bodies
    pub fn count(&self) -> usize {
        self.bodies.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Iterate over static bodies in index order
    pub fn iter(&self) -> impl Iterator<Item = &StaticBody> {
        self.bodies.iter()
    }

    /// All static bodies as a slice
    pub fn as_slice(&self) -> &[StaticBody] {
        &self.bodies
    }

    /// Remove every static body
    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    /// Replace the whole store in one step
    pub fn replace_all(&mut self, bodies: Vec<StaticBody>) {
        self.bodies = bodies;
    }

    /// Index of the first static body containing `point` (boundary included)
    pub fn pick(&self, point: Vec2) -> Option<usize> {
        self.bodies
            .iter()
            .position(|b| point_intersect_aabb(point, b.aabb))
    }

    /// Write every static body to `path`
    ///
    /// The file is written next to its destination and renamed into place, so
    /// a failure never leaves a partial file at `path`.
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        persist::write_file(path, &self.bodies)?;
        info!("Dumped {} static bodies to {}", self.bodies.len(), path.display());
        Ok(())
    }

    /// Replace the store with the static bodies stored at `path`
    ///
    /// On error the current contents are left untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let bodies = persist::read_file(path).map_err(|err| {
            warn!("Failed to load static bodies from {}: {}", path.display(), err);
            err
        })?;
        info!("Loaded {} static bodies from {}", bodies.len(), path.display());
        self.bodies = bodies;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_at(x: f32) -> Body {
        Body::new(Vec2::new(x, 0.0), Vec2::splat(2.0))
    }

    #[test]
    fn test_create_appends() {
        let mut store = BodyStore::new();
        assert_eq!(store.create(body_at(0.0)), 0);
        assert_eq!(store.create(body_at(1.0)), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_count(), 2);
    }

    #[test]
    fn test_create_reuses_first_inactive_slot() {
        let mut store = BodyStore::new();
        for i in 0..4 {
            store.create(body_at(i as f32));
        }
        store.deactivate(2).unwrap();
        store.deactivate(1).unwrap();

        let handle = store.create(body_at(10.0));
        assert_eq!(handle, 1);
        assert_eq!(store.len(), 4);
        assert_eq!(store.get(1).unwrap().position().x, 10.0);
        assert!(store.get(1).unwrap().is_active);

        assert_eq!(store.create(body_at(11.0)), 2);
        assert_eq!(store.create(body_at(12.0)), 4);
    }

    #[test]
    fn test_create_forces_active() {
        let mut store = BodyStore::new();
        let mut body = body_at(0.0);
        body.is_active = false;
        let handle = store.create(body);
        assert!(store.get(handle).unwrap().is_active);
    }

    #[test]
    fn test_get_out_of_range() {
        let mut store = BodyStore::new();
        store.create(body_at(0.0));
        assert!(store.get(1).is_none());
        assert!(store.get_mut(99).is_none());
    }

    #[test]
    fn test_deactivate_keeps_handles() {
        let mut store = BodyStore::new();
        let a = store.create(body_at(0.0));
        let b = store.create(body_at(5.0));
        let c = store.create(body_at(9.0));

        store.deactivate(b).unwrap();

        assert_eq!(store.get(a).unwrap().position().x, 0.0);
        assert_eq!(store.get(c).unwrap().position().x, 9.0);
        assert_eq!(store.active_count(), 2);
        assert_eq!(store.iter_active().map(|(i, _)| i).collect::<Vec<_>>(), vec![a, c]);
    }

    #[test]
    fn test_deactivate_invalid() {
        let mut store = BodyStore::new();
        assert_eq!(
            store.deactivate(0),
            Err(PhysicsError::InvalidBody { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_remove_swaps_last_into_slot() {
        let mut store = BodyStore::new();
        for i in 0..3 {
            store.create(body_at(i as f32));
        }

        let removed = store.remove(0).unwrap();
        assert_eq!(removed.position().x, 0.0);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().position().x, 2.0);
        assert_eq!(store.get(1).unwrap().position().x, 1.0);
    }

    #[test]
    fn test_remove_invalid() {
        let mut store = BodyStore::new();
        store.create(body_at(0.0));
        assert_eq!(
            store.remove(3).unwrap_err(),
            PhysicsError::InvalidBody { index: 3, len: 1 }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_pair_mut() {
        let mut store = BodyStore::new();
        store.create(body_at(0.0));
        store.create(body_at(1.0));
        store.create(body_at(2.0));

        let (a, b) = store.pair_mut(2, 0).unwrap();
        assert_eq!(a.position().x, 2.0);
        assert_eq!(b.position().x, 0.0);
        a.velocity = Vec2::X;
        b.is_active = false;

        assert_eq!(store.get(2).unwrap().velocity, Vec2::X);
        assert!(!store.get(0).unwrap().is_active);
        assert!(store.pair_mut(1, 1).is_none());
        assert!(store.pair_mut(1, 3).is_none());
    }

    #[test]
    fn test_static_create_and_count() {
        let mut store = StaticBodyStore::new();
        let i = store.create(Vec2::new(100.0, 50.0), Vec2::new(100.0, 20.0), CollisionLayer::TERRAIN);
        assert_eq!(i, 0);
        assert_eq!(store.count(), 1);
        assert_eq!(store.get(0).unwrap().aabb.half_size, Vec2::new(50.0, 10.0));
    }

    #[test]
    fn test_static_remove_shifts_later_indices() {
        let mut store = StaticBodyStore::new();
        for i in 0..4 {
            store.create(Vec2::new(i as f32, 0.0), Vec2::splat(1.0), CollisionLayer::TERRAIN);
        }

        let removed = store.remove(1).unwrap();
        assert_eq!(removed.aabb.position.x, 1.0);

        let xs: Vec<f32> = store.iter().map(|b| b.aabb.position.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 3.0]);
    }

    #[test]
    fn test_static_remove_invalid() {
        let mut store = StaticBodyStore::new();
        assert_eq!(
            store.remove(0).unwrap_err(),
            PhysicsError::InvalidStaticBody { index: 0, len: 0 }
        );
    }

    #[test]
    fn test_static_pick_first_in_index_order() {
        let mut store = StaticBodyStore::new();
        store.create(Vec2::new(0.0, 0.0), Vec2::splat(10.0), CollisionLayer::TERRAIN);
        store.create(Vec2::new(2.0, 0.0), Vec2::splat(10.0), CollisionLayer::TERRAIN);

        assert_eq!(store.pick(Vec2::new(5.0, 0.0)), Some(0));
        assert_eq!(store.pick(Vec2::new(6.0, 0.0)), Some(1));
        assert_eq!(store.pick(Vec2::new(50.0, 0.0)), None);
    }

    #[test]
    fn test_static_replace_and_clear() {
        let mut store = StaticBodyStore::new();
        store.create(Vec2::ZERO, Vec2::splat(1.0), CollisionLayer::TERRAIN);
        store.replace_all(vec![
            StaticBody::new(Vec2::X, Vec2::splat(1.0), CollisionLayer::ENEMY),
            StaticBody::new(Vec2::Y, Vec2::splat(1.0), CollisionLayer::ENEMY),
        ]);
        assert_eq!(store.count(), 2);
        assert_eq!(store.as_slice()[1].aabb.position, Vec2::Y);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_static_dump_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("static-bodies.bin");

        let mut store = StaticBodyStore::new();
        store.create(Vec2::new(100.0, 50.0), Vec2::new(100.0, 20.0), CollisionLayer::TERRAIN);
        store.create(Vec2::new(-3.5, 7.25), Vec2::new(1.0, 0.0), CollisionLayer::ALL);
        store.dump(&path).unwrap();

        let mut loaded = StaticBodyStore::new();
        loaded.load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_static_failed_load_keeps_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, b"definitely not geometry").unwrap();

        let mut store = StaticBodyStore::new();
        store.create(Vec2::ZERO, Vec2::splat(4.0), CollisionLayer::TERRAIN);
        let before = store.clone();

        assert!(store.load(&path).is_err());
        assert!(store.load(dir.path().join("missing.bin")).is_err());
        assert_eq!(store, before);
    }
}
