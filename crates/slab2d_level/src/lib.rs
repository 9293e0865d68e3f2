//! Level editing core for slab2d
//!
//! Sits directly on top of the physics crate's static body store:
//! - `level`: the tile map that pairs static bodies with tileset cells, and
//!   all-or-nothing level save/load
//! - `editor`: the pointer-driven create/resize/move/remove state machine
//! - `scene`: RON scene templates that instantiate a `PhysicsWorld`

pub mod editor;
pub mod level;
pub mod scene;

pub use editor::{compute_resized_aabb, resize_handle, EditorAction, EditorCore, RESIZE_HANDLE_SIZE};
pub use level::{
    load_level, save_level, LevelError, LevelPaths, TileCoordinates, TileMap, TiledStaticBody,
};
pub use scene::{ActiveScene, BodyTemplate, Scene, SceneLoadError, SceneSaveError, StaticTemplate};
