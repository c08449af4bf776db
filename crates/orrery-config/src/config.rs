//! Configuration structs with defaults and RON persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub simulation: SimulationConfig,
    pub features: FeaturesConfig,
    pub input: InputConfig,
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in borderless fullscreen.
    pub fullscreen: bool,
    pub title: String,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Free-fly speed in scene units per second.
    pub move_speed: f32,
    /// Degrees of rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Initial vertical field of view in degrees.
    pub fov_degrees: f32,
    pub fov_min: f32,
    pub fov_max: f32,
    pub near: f32,
    pub far: f32,
    /// Closest a locked camera gets to the target's surface.
    pub orbit_distance_min: f32,
    /// Farthest a locked camera gets from the target's center.
    pub orbit_distance_max: f32,
    /// Orbit distance change per scroll line.
    pub orbit_zoom_step: f32,
}

/// Simulation clock and eclipse configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_speed: f64,
    /// Speed multiplier while watching for an eclipse.
    pub watch_speed: f64,
    /// Factor applied by the speed up/down commands.
    pub speed_step: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Perpendicular distance under which bodies count as aligned.
    pub eclipse_threshold: f32,
    /// Moon scale reached during a solar eclipse watch.
    pub moon_growth: f32,
    /// Easing rate of the moon scale, per second.
    pub moon_growth_rate: f32,
    /// RON scenario file. `None` uses the built-in Sun/Earth/Moon system.
    pub scenario: Option<PathBuf>,
}

/// Optional render outputs and modes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeaturesConfig {
    pub skybox: bool,
    pub orbit_paths: bool,
    pub eclipse_watch: bool,
}

/// Input configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Invert vertical mouse look.
    pub invert_y: bool,
    /// Keybinding overrides (action name -> key name).
    pub keybindings: HashMap<String, String>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Log every frame event at info level instead of debug.
    pub log_frame_events: bool,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_speed: 2.5,
            mouse_sensitivity: 0.1,
            fov_degrees: 45.0,
            fov_min: 1.0,
            fov_max: 45.0,
            near: 0.1,
            far: 100.0,
            orbit_distance_min: 0.5,
            orbit_distance_max: 80.0,
            orbit_zoom_step: 0.5,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_speed: 1.0,
            watch_speed: 3.0,
            speed_step: 2.0,
            min_speed: 1.0 / 16.0,
            max_speed: 64.0,
            eclipse_threshold: 0.3,
            moon_growth: 2.0,
            moon_growth_rate: 1.5,
            scenario: None,
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            skybox: true,
            orbit_paths: false,
            eclipse_watch: true,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            invert_y: false,
            keybindings: HashMap::new(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_frame_events: false,
        }
    }
}

// --- Load / Save ---

const CONFIG_FILE: &str = "config.ron";

impl Config {
    /// Loads `config.ron` from `config_dir`, writing the defaults there first
    /// if the file does not exist.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Writes the config to `config_dir/config.ron`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        let path = config_dir.join(CONFIG_FILE);
        std::fs::write(&path, serialized).map_err(|source| ConfigError::Write { path, source })
    }
}
