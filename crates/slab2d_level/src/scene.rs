//! Scene serialization
//!
//! Provides Scene struct for loading/saving scenes from RON files.
//! Scenes contain static geometry, body templates, and physics settings.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use slab2d_math::Vec2;
use slab2d_physics::{Body, CollisionLayer, PhysicsConfig, PhysicsWorld, StaticBody};

/// Static geometry entry in a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticTemplate {
    /// Center of the box
    pub position: Vec2,
    /// Full size of the box
    pub size: Vec2,
    /// Collision layer (defaults to terrain)
    #[serde(default = "default_static_layer")]
    pub layer: CollisionLayer,
}

fn default_static_layer() -> CollisionLayer {
    CollisionLayer::TERRAIN
}

fn default_mask() -> CollisionLayer {
    CollisionLayer::ALL
}

fn default_mass() -> f32 {
    1.0
}

/// Dynamic body entry in a scene
///
/// Callbacks cannot be serialized; attach them after instantiation through
/// [`ActiveScene::body_mut`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyTemplate {
    /// Name used to look the body up after instantiation
    #[serde(default)]
    pub name: Option<String>,
    pub position: Vec2,
    pub size: Vec2,
    #[serde(default)]
    pub velocity: Vec2,
    #[serde(default)]
    pub acceleration: Vec2,
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default = "CollisionLayer::empty")]
    pub layer: CollisionLayer,
    #[serde(default = "default_mask")]
    pub mask: CollisionLayer,
    #[serde(default)]
    pub kinematic: bool,
}

impl BodyTemplate {
    /// Create a template for a body at `position` with full `size`
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            name: None,
            position,
            size,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            mass: default_mass(),
            layer: CollisionLayer::empty(),
            mask: default_mask(),
            kinematic: false,
        }
    }

    /// Set the lookup name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set layer and mask
    pub fn with_collision(mut self, layer: CollisionLayer, mask: CollisionLayer) -> Self {
        self.layer = layer;
        self.mask = mask;
        self
    }

    /// Build the runtime body
    pub fn to_body(&self) -> Body {
        Body::new(self.position, self.size)
            .with_velocity(self.velocity)
            .with_acceleration(self.acceleration)
            .with_mass(self.mass)
            .with_collision(self.layer, self.mask)
            .with_kinematic(self.kinematic)
    }
}

/// A serializable scene containing geometry and body templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene name (for display/debugging)
    pub name: String,
    /// Gravity override for physics
    #[serde(default)]
    pub gravity: Option<Vec2>,
    /// Static geometry, in index order
    #[serde(default)]
    pub statics: Vec<StaticTemplate>,
    /// Dynamic bodies, in handle order
    #[serde(default)]
    pub bodies: Vec<BodyTemplate>,
}

impl Scene {
    /// Create a new empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gravity: None,
            statics: Vec::new(),
            bodies: Vec::new(),
        }
    }

    /// Load a scene from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path)?;
        let scene = ron::from_str(&contents)?;
        Ok(scene)
    }

    /// Save a scene to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneSaveError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Set the gravity override
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Add static geometry
    pub fn add_static(&mut self, position: Vec2, size: Vec2, layer: CollisionLayer) {
        self.statics.push(StaticTemplate { position, size, layer });
    }

    /// Add a body template
    pub fn add_body(&mut self, body: BodyTemplate) {
        self.bodies.push(body);
    }
}

/// Error loading a scene
#[derive(Debug)]
pub enum SceneLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
}

impl From<io::Error> for SceneLoadError {
    fn from(e: io::Error) -> Self {
        SceneLoadError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneLoadError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneLoadError::Parse(e)
    }
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "IO error: {}", e),
            SceneLoadError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// Error saving a scene
#[derive(Debug)]
pub enum SceneSaveError {
    /// IO error (permission denied, disk full, etc.)
    Io(io::Error),
    /// Serialization error
    Serialize(ron::Error),
}

impl From<io::Error> for SceneSaveError {
    fn from(e: io::Error) -> Self {
        SceneSaveError::Io(e)
    }
}

impl From<ron::Error> for SceneSaveError {
    fn from(e: ron::Error) -> Self {
        SceneSaveError::Serialize(e)
    }
}

impl std::fmt::Display for SceneSaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneSaveError::Io(e) => write!(f, "IO error: {}", e),
            SceneSaveError::Serialize(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for SceneSaveError {}

/// A runtime scene containing an instantiated physics world
pub struct ActiveScene {
    /// Scene name (from template or custom)
    pub name: String,
    /// The live physics world
    pub world: PhysicsWorld,
    named: Vec<(String, usize)>,
}

impl ActiveScene {
    /// Create an active scene from a Scene template
    ///
    /// An explicit `physics_config` wins over the template's gravity override.
    pub fn from_template(template: &Scene, physics_config: Option<PhysicsConfig>) -> Self {
        let config = match (physics_config, template.gravity) {
            (Some(config), _) => config,
            (None, Some(gravity)) => PhysicsConfig::new(gravity),
            (None, None) => PhysicsConfig::default(),
        };
        let mut world = PhysicsWorld::with_config(config);

        for s in &template.statics {
            world.statics_mut().add(StaticBody::new(s.position, s.size, s.layer));
        }

        let mut named = Vec::new();
        for body in &template.bodies {
            let handle = world.create_body(body.to_body());
            if let Some(name) = &body.name {
                named.push((name.clone(), handle));
            }
        }

        log::info!(
            "Instantiated scene '{}': {} static bodies, {} bodies",
            template.name,
            world.statics().count(),
            world.bodies().len()
        );

        Self {
            name: template.name.clone(),
            world,
            named,
        }
    }

    /// Handle of the first body instantiated under `name`
    pub fn handle(&self, name: &str) -> Option<usize> {
        self.named
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, handle)| *handle)
    }

    /// Mutable body by template name
    pub fn body_mut(&mut self, name: &str) -> Option<&mut Body> {
        let handle = self.handle(name)?;
        self.world.body_mut(handle)
    }

    /// Update the scene (steps physics)
    pub fn update(&mut self, dt: f32) {
        self.world.step(dt);
    }
}
