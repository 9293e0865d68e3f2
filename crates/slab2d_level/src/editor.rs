//! Level editor core
//!
//! The editor works on the static body store directly. It has no knowledge of
//! input devices: the host feeds it pointer presses, drags and releases in
//! world coordinates, and it creates, resizes, moves and removes static
//! geometry while keeping its [`TileMap`] in step with the store.

use log::debug;
use slab2d_math::Vec2;
use slab2d_physics::{point_intersect_aabb, Aabb, CollisionLayer, PhysicsError, StaticBody, StaticBodyStore};

use crate::level::{self, LevelError, LevelPaths, TileCoordinates, TileMap};

/// Full size of the square resize handle drawn at a body's bottom-right corner
pub const RESIZE_HANDLE_SIZE: f32 = 5.0;

/// What the editor is doing with the active body
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditorAction {
    #[default]
    Idle,
    /// Dragging out a brand-new body
    Creating,
    /// Dragging an existing body's resize handle
    Resizing,
    /// Dragging an existing body around
    Moving,
}

/// Box produced by dragging from `start_mouse` to `current_mouse`
///
/// The drag delta is added to the initial size and the center moves by half
/// the delta. The size is made absolute so dragging past the anchor in any
/// direction still yields a valid box.
pub fn compute_resized_aabb(
    initial_position: Vec2,
    initial_size: Vec2,
    start_mouse: Vec2,
    current_mouse: Vec2,
) -> Aabb {
    let delta = current_mouse - start_mouse;
    let size = (initial_size + delta).abs();
    Aabb::from_size(initial_position + delta * 0.5, size)
}

/// Resize handle of a static body: a small square inside its bottom-right corner
pub fn resize_handle(body: &StaticBody) -> Aabb {
    let half = RESIZE_HANDLE_SIZE * 0.5;
    let aabb = body.aabb;
    Aabb::new(
        Vec2::new(
            aabb.position.x + aabb.half_size.x - half,
            aabb.position.y - aabb.half_size.y + half,
        ),
        Vec2::splat(half),
    )
}

/// Editor state machine
#[derive(Clone, Debug, Default)]
pub struct EditorCore {
    action: EditorAction,
    active_body: Option<usize>,
    start_mouse: Vec2,
    initial_position: Vec2,
    initial_size: Vec2,
    offset: Vec2,
    /// Tile assigned to newly created bodies
    pub selected_tile: TileCoordinates,
    tiles: TileMap,
}

impl EditorCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(&self) -> EditorAction {
        self.action
    }

    pub fn active_body(&self) -> Option<usize> {
        self.active_body
    }

    pub fn tiles(&self) -> &TileMap {
        &self.tiles
    }

    /// Secondary button pressed: grab a resize handle, or start a new body
    ///
    /// Ignored while another gesture is in progress.
    pub fn begin_shape(&mut self, statics: &mut StaticBodyStore, mouse: Vec2) {
        if self.action != EditorAction::Idle {
            return;
        }

        let handle = statics
            .iter()
            .position(|body| point_intersect_aabb(mouse, resize_handle(body)));

        if let Some((index, aabb)) = handle.and_then(|i| statics.get(i).map(|b| (i, b.aabb))) {
            self.active_body = Some(index);
            self.action = EditorAction::Resizing;
            self.start_mouse = mouse;
            self.initial_size = aabb.size();
            self.initial_position = aabb.position;
            debug!("Resizing static body {}", index);
            return;
        }

        let index = statics.create(mouse, Vec2::ZERO, CollisionLayer::TERRAIN);
        self.tiles.attach(self.selected_tile, index);
        self.active_body = Some(index);
        self.action = EditorAction::Creating;
        self.start_mouse = mouse;
        self.initial_size = Vec2::ZERO;
        self.initial_position = mouse;
        debug!("Creating static body {}", index);
    }

    /// Secondary button held: reshape the body being created or resized
    pub fn drag_shape(&mut self, statics: &mut StaticBodyStore, mouse: Vec2) {
        if !matches!(self.action, EditorAction::Creating | EditorAction::Resizing) {
            return;
        }
        let Some(body) = self.active_body.and_then(|i| statics.get_mut(i)) else {
            return;
        };
        body.aabb = compute_resized_aabb(self.initial_position, self.initial_size, self.start_mouse, mouse);
    }

    /// Secondary button released
    pub fn end_shape(&mut self) {
        if matches!(self.action, EditorAction::Creating | EditorAction::Resizing) {
            self.action = EditorAction::Idle;
        }
    }

    /// Primary button pressed: select the first body under the pointer
    ///
    /// Clears the selection when nothing is under the pointer. Ignored while
    /// another gesture is in progress.
    pub fn begin_move(&mut self, statics: &StaticBodyStore, mouse: Vec2) {
        if self.action != EditorAction::Idle {
            return;
        }

        match statics.pick(mouse).and_then(|i| statics.get(i).map(|b| (i, b.aabb))) {
            Some((index, aabb)) => {
                self.active_body = Some(index);
                self.action = EditorAction::Moving;
                self.offset = aabb.position - mouse;
            }
            None => self.active_body = None,
        }
    }

    /// Primary button held: drag the selected body with the pointer
    pub fn drag_move(&mut self, statics: &mut StaticBodyStore, mouse: Vec2) {
        if self.action != EditorAction::Moving {
            return;
        }
        if let Some(body) = self.active_body.and_then(|i| statics.get_mut(i)) {
            body.aabb.position = mouse + self.offset;
        }
    }

    /// Primary button released
    pub fn end_move(&mut self) {
        if self.action == EditorAction::Moving {
            self.action = EditorAction::Idle;
        }
    }

    /// Delete the active body and fix up every tile index after it
    pub fn remove_active(&mut self, statics: &mut StaticBodyStore) -> Result<Option<StaticBody>, PhysicsError> {
        let Some(index) = self.active_body.take() else {
            return Ok(None);
        };
        let removed = statics.remove(index)?;
        self.tiles.remove_static_body(index);
        debug!("Removed static body {}", index);
        Ok(Some(removed))
    }

    /// Save the level being edited
    pub fn save(&self, statics: &StaticBodyStore, paths: &LevelPaths) -> Result<(), LevelError> {
        level::save_level(statics, &self.tiles, paths)
    }

    /// Load a level, dropping the current selection on success
    pub fn load(&mut self, statics: &mut StaticBodyStore, paths: &LevelPaths) -> Result<(), LevelError> {
        level::load_level(statics, &mut self.tiles, paths)?;
        self.active_body = None;
        self.action = EditorAction::Idle;
        Ok(())
    }
}
