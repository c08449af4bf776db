//! Turns a loaded [`Config`] into simulation settings, key bindings and a
//! ready [`Orrery`].

use orrery_config::Config;
use orrery_input::Keybindings;
use orrery_sim::{
    CameraSettings, ClockSettings, Features, Orrery, OrrerySettings, ScenarioDef, Scene,
};
use tracing::{info, warn};

use crate::error::AppError;
use crate::platform::PlatformDirs;

/// Simulation settings from the `camera`, `simulation` and `features`
/// sections. Out-of-range values are repaired by
/// [`OrrerySettings::validated`] and logged.
#[must_use]
pub fn orrery_settings(config: &Config) -> OrrerySettings {
    let camera = &config.camera;
    let sim = &config.simulation;

    OrrerySettings {
        camera: CameraSettings {
            move_speed: camera.move_speed,
            mouse_sensitivity: camera.mouse_sensitivity,
            zoom: camera.fov_degrees,
            zoom_min: camera.fov_min,
            zoom_max: camera.fov_max,
            near: camera.near,
            far: camera.far,
            aspect_ratio: aspect_ratio(config.window.width, config.window.height),
            orbit_distance_min: camera.orbit_distance_min,
            orbit_distance_max: camera.orbit_distance_max,
            orbit_zoom_step: camera.orbit_zoom_step,
        },
        clock: ClockSettings {
            initial_speed: sim.initial_speed,
            watch_speed: sim.watch_speed,
            speed_step: sim.speed_step,
            min_speed: sim.min_speed,
            max_speed: sim.max_speed,
        },
        eclipse_threshold: sim.eclipse_threshold,
        moon_growth: sim.moon_growth,
        moon_growth_rate: sim.moon_growth_rate,
        features: Features {
            skybox: config.features.skybox,
            orbit_paths: config.features.orbit_paths,
            eclipse_watch: config.features.eclipse_watch,
        },
    }
    .validated()
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        CameraSettings::default().aspect_ratio
    } else {
        width as f32 / height as f32
    }
}

/// Default bindings with the config's overrides applied. Bad entries are
/// logged and skipped.
#[must_use]
pub fn keybindings(config: &Config) -> Keybindings {
    let mut bindings = Keybindings::default();
    for error in bindings.apply_overrides(&config.input.keybindings) {
        warn!("Ignoring keybinding: {error}");
    }
    bindings.set_invert_y(config.input.invert_y);
    bindings
}

/// The configured scenario file, or the built-in Sun/Earth/Moon system.
pub fn load_scenario(config: &Config, dirs: &PlatformDirs) -> Result<ScenarioDef, AppError> {
    match &config.simulation.scenario {
        Some(path) => Ok(ScenarioDef::load(&dirs.locate_scenario(path))?),
        None => {
            info!("Using built-in Sun/Earth/Moon scenario");
            Ok(ScenarioDef::solar_system_basic())
        }
    }
}

/// Loads and validates the scenario and builds the orchestrator.
pub fn build_orrery(config: &Config, dirs: &PlatformDirs) -> Result<Orrery, AppError> {
    let scenario = load_scenario(config, dirs)?;
    let scene = Scene::from_scenario(&scenario)?;
    Ok(Orrery::new(scene, orrery_settings(config)))
}
