//! Tiled static geometry and level files
//!
//! A level is the static body store plus a list pairing each static body with
//! the tileset cell it is drawn with. The list refers to static bodies by
//! index, so it must be adjusted whenever the static store removes an element.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use slab2d_physics::persist;
use slab2d_physics::{PersistError, StaticBody, StaticBodyStore};

/// Default file name of the static geometry within a level directory
pub const STATIC_BODIES_FILE: &str = "static-bodies.bin";

/// Default file name of the tile list within a level directory
pub const TILES_FILE: &str = "tiled-static-bodies.ron";

/// Cell of the tileset a static body is drawn with
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoordinates {
    pub row: i32,
    pub column: i32,
}

impl TileCoordinates {
    pub fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }
}

/// A static body index paired with its tile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiledStaticBody {
    pub tile: TileCoordinates,
    pub static_body: usize,
}

/// Ordered list of tiled static bodies
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMap {
    tiles: Vec<TiledStaticBody>,
}

impl TileMap {
    /// Create an empty tile map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `static_body` is drawn with `tile`
    pub fn attach(&mut self, tile: TileCoordinates, static_body: usize) {
        self.tiles.push(TiledStaticBody { tile, static_body });
    }

    /// Tile of the first entry referring to `static_body`
    pub fn tile_for(&self, static_body: usize) -> Option<TileCoordinates> {
        self.tiles
            .iter()
            .find(|t| t.static_body == static_body)
            .map(|t| t.tile)
    }

    /// Forget a static body that was just removed from the store
    ///
    /// Entries referring to `removed` are dropped and entries referring to a
    /// later index are decremented, mirroring the store's ordered removal.
    pub fn remove_static_body(&mut self, removed: usize) {
        self.tiles.retain_mut(|entry| {
            if entry.static_body == removed {
                return false;
            }
            if entry.static_body > removed {
                entry.static_body -= 1;
            }
            true
        });
    }

    /// Check every entry refers to a static body in a store of `count`
    pub fn validate(&self, count: usize) -> Result<(), LevelError> {
        match self.tiles.iter().find(|t| t.static_body >= count) {
            Some(entry) => Err(LevelError::DanglingTile {
                static_body: entry.static_body,
                count,
            }),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TiledStaticBody> {
        self.tiles.iter()
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }
}

/// Error saving or loading a level
#[derive(Debug)]
pub enum LevelError {
    /// Static geometry could not be written or read
    Persist(PersistError),
    /// IO error on the tile list
    Io(io::Error),
    /// Parse error (invalid RON syntax in the tile list)
    Parse(ron::error::SpannedError),
    /// Serialization error writing the tile list
    Serialize(ron::Error),
    /// A tile refers to a static body that does not exist
    DanglingTile { static_body: usize, count: usize },
}

impl From<PersistError> for LevelError {
    fn from(e: PersistError) -> Self {
        LevelError::Persist(e)
    }
}

impl From<io::Error> for LevelError {
    fn from(e: io::Error) -> Self {
        LevelError::Io(e)
    }
}

impl From<ron::error::SpannedError> for LevelError {
    fn from(e: ron::error::SpannedError) -> Self {
        LevelError::Parse(e)
    }
}

impl From<ron::Error> for LevelError {
    fn from(e: ron::Error) -> Self {
        LevelError::Serialize(e)
    }
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::Persist(e) => write!(f, "Static geometry error: {}", e),
            LevelError::Io(e) => write!(f, "IO error: {}", e),
            LevelError::Parse(e) => write!(f, "Parse error: {}", e),
            LevelError::Serialize(e) => write!(f, "Serialization error: {}", e),
            LevelError::DanglingTile { static_body, count } => write!(
                f,
                "Tile refers to static body {} but the level has {}",
                static_body, count
            ),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Persist(e) => Some(e),
            LevelError::Io(e) => Some(e),
            LevelError::Parse(e) => Some(e),
            LevelError::Serialize(e) => Some(e),
            LevelError::DanglingTile { .. } => None,
        }
    }
}

/// Where a level's two files live
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelPaths {
    pub static_bodies: PathBuf,
    pub tiles: PathBuf,
}

impl LevelPaths {
    pub fn new(static_bodies: impl Into<PathBuf>, tiles: impl Into<PathBuf>) -> Self {
        Self {
            static_bodies: static_bodies.into(),
            tiles: tiles.into(),
        }
    }

    /// Default file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(STATIC_BODIES_FILE), dir.join(TILES_FILE))
    }
}

/// Write the static geometry and the tile list
///
/// Both files are staged next to their destinations before either is
/// replaced. If the tile list cannot be moved into place the previous level
/// is left on disk; if the geometry then fails, the previous tile list is
/// restored.
pub fn save_level(
    statics: &StaticBodyStore,
    tiles: &TileMap,
    paths: &LevelPaths,
) -> Result<(), LevelError> {
    tiles.validate(statics.count())?;

    let pretty = ron::ser::PrettyConfig::new().struct_names(true);
    let contents = ron::ser::to_string_pretty(tiles, pretty)?;

    let geometry_temp = temp_path(&paths.static_bodies);
    let tiles_temp = temp_path(&paths.tiles);
    let discard = || {
        let _ = fs::remove_file(&geometry_temp);
        let _ = fs::remove_file(&tiles_temp);
    };

    if let Err(e) = fs::write(&geometry_temp, persist::encode(statics.as_slice())) {
        discard();
        return Err(PersistError::from(e).into());
    }
    if let Err(e) = fs::write(&tiles_temp, contents) {
        discard();
        return Err(e.into());
    }

    let previous_tiles = fs::read(&paths.tiles).ok();
    if let Err(e) = fs::rename(&tiles_temp, &paths.tiles) {
        discard();
        warn!("Failed to save level: {}", e);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&geometry_temp, &paths.static_bodies) {
        discard();
        let _ = match previous_tiles {
            Some(bytes) => fs::write(&paths.tiles, bytes),
            None => fs::remove_file(&paths.tiles),
        };
        warn!("Failed to save level: {}", e);
        return Err(PersistError::from(e).into());
    }

    info!(
        "Saved level: {} static bodies, {} tiles",
        statics.count(),
        tiles.len()
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut temp = path.as_os_str().to_os_string();
    temp.push(".tmp");
    PathBuf::from(temp)
}

/// Replace the static geometry and tile list with a saved level
///
/// Both files are read and cross-checked before anything is replaced; on
/// error `statics` and `tiles` are left exactly as they were.
pub fn load_level(
    statics: &mut StaticBodyStore,
    tiles: &mut TileMap,
    paths: &LevelPaths,
) -> Result<(), LevelError> {
    let (bodies, loaded_tiles) = read_level(paths).map_err(|e| {
        warn!("Failed to load level: {}", e);
        e
    })?;

    info!(
        "Loaded level: {} static bodies, {} tiles",
        bodies.len(),
        loaded_tiles.len()
    );
    statics.replace_all(bodies);
    *tiles = loaded_tiles;
    Ok(())
}

fn read_level(paths: &LevelPaths) -> Result<(Vec<StaticBody>, TileMap), LevelError> {
    let bodies = persist::read_file(&paths.static_bodies)?;
    let contents = fs::read_to_string(&paths.tiles)?;
    let tiles: TileMap = ron::from_str(&contents)?;
    tiles.validate(bodies.len())?;
    Ok((bodies, tiles))
}
