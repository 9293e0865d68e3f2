//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`SLAB_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

use slab2d_level::LevelPaths;
use slab2d_physics::PhysicsConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Physics configuration
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Frame loop configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Level and scene file locations
    #[serde(default)]
    pub level: LevelConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`SLAB_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Optional, never committed
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // SLAB_PHYSICS__SUBSTEPS=4 -> physics.substeps = 4
        figment = figment.merge(Env::prefixed("SLAB_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Fixed-timestep frame loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Length of one physics frame in seconds
    pub frame_dt: f32,
    /// Longest wall-clock gap fed into the accumulator at once
    pub max_frame_dt: f32,
    /// Frames the headless demo runs before exiting
    pub frames: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame_dt: 1.0 / 60.0,
            max_frame_dt: 0.25,
            frames: 600,
        }
    }
}

/// Level file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Binary static geometry file
    pub static_bodies: PathBuf,
    /// RON tile list paired with the static geometry
    pub tiles: PathBuf,
    /// RON scene template the demo instantiates
    pub scene: PathBuf,
}

impl LevelConfig {
    /// Paths of the editor's level files
    pub fn paths(&self) -> LevelPaths {
        LevelPaths::new(&self.static_bodies, &self.tiles)
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            static_bodies: PathBuf::from("levels/static-bodies.bin"),
            tiles: PathBuf::from("levels/tiled-static-bodies.ron"),
            scene: PathBuf::from("scenes/demo.ron"),
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace), used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
