//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`D3D_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

use dungeon_math::Vec3;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`D3D_*`)
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

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // D3D_CONTENT__BASE_URL=http://host -> content.base_url = "http://host"
        figment = figment.merge(Env::prefixed("D3D_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Start in fullscreen mode
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Dungeon3D".to_string(),
            width: 1024,
            height: 800,
            fullscreen: false,
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Starting position [x, y, z]
    pub start_position: [f32; 3],
    /// Field of view in degrees
    pub fov: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_position: [50.0, 50.0, 20.0],
            fov: 45.0,
        }
    }
}

impl CameraConfig {
    pub fn start(&self) -> Vec3 {
        Vec3::from(self.start_position)
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Gravity vector [x, y, z]; the world is Z-up
    pub gravity: [f32; 3],
    /// Fixed simulation timestep in seconds
    pub timestep: f32,
    /// Upper bound on steps run for one frame
    pub max_steps_per_frame: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, 0.0, -9.8],
            timestep: 1.0 / 60.0,
            max_steps_per_frame: 5,
        }
    }
}

impl PhysicsConfig {
    /// Convert to the physics engine's config
    pub fn to_physics_config(&self) -> dungeon_physics::PhysicsConfig {
        dungeon_physics::PhysicsConfig::new(Vec3::from(self.gravity))
    }
}

/// Level and asset service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Base URL the `/dungeon`, `/materials` and `/object/{id}` routes hang off
    pub base_url: String,
    /// Dungeon window requested around the origin [x, y, w, h]
    pub dungeon_window: [i32; 4],
    /// Seed used when none is given on the command line
    pub default_seed: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            dungeon_window: [-50, -50, 250, 250],
            default_seed: "dungeon".to_string(),
        }
    }
}

/// Audio configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Bank files loaded at startup, in order
    pub banks: Vec<String>,
    /// Looping background music event
    pub music_event: String,
    /// One-shot event played on impacts
    pub impact_event: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            banks: ["Master_Bank.bank", "Master_Bank.strings.bank", "Music.bank", "SFX.bank"]
                .iter()
                .map(|b| b.to_string())
                .collect(),
            music_event: "event:/Music/Level 01".to_string(),
            impact_event: "event:/Weapons/Explosion".to_string(),
        }
    }
}

/// Scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Path to the RON scene spawned at startup
    pub path: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            path: "scenes/arena.ron".to_string(),
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
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
#[derive(Debug, thiserror::Error)]
#[error("Configuration error: {message}")]
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
