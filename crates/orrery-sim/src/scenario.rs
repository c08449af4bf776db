//! Serializable scenario descriptions and the built-in Sun/Earth/Moon system.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::body::{MeshHandle, TextureHandle};
use crate::error::SceneError;

/// One body as written in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyDef {
    pub name: String,
    pub radius: f32,
    pub texture: TextureHandle,
    pub mesh: MeshHandle,
    pub emissive: bool,
    pub orbit_radius: f32,
    /// Radians per simulated second.
    pub orbit_speed: f32,
    /// Radians per simulated second.
    pub rotation_speed: f32,
    /// Normalized at load; must not be zero.
    pub rotation_axis: [f32; 3],
    /// Name of the body this one orbits. `None` orbits the origin.
    pub parent: Option<String>,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            radius: 1.0,
            texture: TextureHandle::default(),
            mesh: MeshHandle::default(),
            emissive: false,
            orbit_radius: 0.0,
            orbit_speed: 0.0,
            rotation_speed: 0.0,
            rotation_axis: [0.0, 1.0, 0.0],
            parent: None,
        }
    }
}

impl BodyDef {
    /// A body with the given name and radius at the origin.
    pub fn new(name: impl Into<String>, radius: f32) -> Self {
        Self {
            name: name.into(),
            radius,
            ..Self::default()
        }
    }

    /// Sets orbit radius and angular speed.
    #[must_use]
    pub fn orbiting(mut self, orbit_radius: f32, orbit_speed: f32) -> Self {
        self.orbit_radius = orbit_radius;
        self.orbit_speed = orbit_speed;
        self
    }

    /// Sets the parent body by name.
    #[must_use]
    pub fn around(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn spinning(mut self, rotation_speed: f32) -> Self {
        self.rotation_speed = rotation_speed;
        self
    }

    #[must_use]
    pub fn textured(mut self, texture: impl Into<String>) -> Self {
        self.texture = TextureHandle::new(texture);
        self
    }

    #[must_use]
    pub fn with_mesh(mut self, rings: u32, sectors: u32) -> Self {
        self.mesh = MeshHandle { rings, sectors };
        self
    }

    #[must_use]
    pub fn emissive(mut self) -> Self {
        self.emissive = true;
        self
    }
}

/// Names of the bodies playing each eclipse role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EclipseRoles {
    pub sun: String,
    pub planet: String,
    pub moon: String,
}

/// A complete scene description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioDef {
    /// Bodies in definition order. Parents may appear after their children.
    pub bodies: Vec<BodyDef>,
    pub initial_camera_position: [f32; 3],
    /// Used when no body is emissive.
    pub light_position: [f32; 3],
    pub light_color: [f32; 3],
    /// Lock-cycle order. `None` means every body in definition order.
    pub lockable: Option<Vec<String>>,
    /// `None` falls back to bodies named `Sun`, `Earth` and `Moon`.
    pub eclipse: Option<EclipseRoles>,
}

impl Default for ScenarioDef {
    fn default() -> Self {
        Self {
            bodies: Vec::new(),
            initial_camera_position: [0.0, 5.0, 20.0],
            light_position: [0.0, 0.0, 0.0],
            light_color: [1.0, 1.0, 0.9],
            lockable: None,
            eclipse: None,
        }
    }
}

impl ScenarioDef {
    /// The built-in Sun, Earth and Moon.
    #[must_use]
    pub fn solar_system_basic() -> Self {
        Self {
            bodies: vec![
                BodyDef::new("Sun", 2.0)
                    .textured("textures/sun.jpg")
                    .spinning(0.1)
                    .emissive(),
                BodyDef::new("Earth", 0.5)
                    .textured("textures/earth.jpg")
                    .orbiting(10.0, 0.5)
                    .spinning(1.0)
                    .around("Sun"),
                BodyDef::new("Moon", 0.135)
                    .textured("textures/moon.jpg")
                    .orbiting(1.5, 1.0)
                    .spinning(0.1)
                    .around("Earth")
                    .with_mesh(32, 32),
            ],
            ..Self::default()
        }
    }

    /// Parses a scenario from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, SceneError> {
        ron::from_str(text).map_err(SceneError::ScenarioParse)
    }

    /// Reads and parses a RON scenario file.
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::ScenarioRead {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::from_ron_str(&text)?;
        info!(
            "Loaded scenario {} ({} bodies)",
            path.display(),
            scenario.bodies.len()
        );
        Ok(scenario)
    }

    /// Pretty-printed RON.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(false)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, pretty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_system_constants() {
        let def = ScenarioDef::solar_system_basic();
        let names: Vec<_> = def.bodies.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Sun", "Earth", "Moon"]);

        let sun = &def.bodies[0];
        assert!(sun.emissive);
        assert_eq!(sun.radius, 2.0);
        assert_eq!(sun.parent, None);

        let earth = &def.bodies[1];
        assert_eq!((earth.orbit_radius, earth.orbit_speed), (10.0, 0.5));
        assert_eq!(earth.parent.as_deref(), Some("Sun"));

        let moon = &def.bodies[2];
        assert_eq!(moon.radius, 0.135);
        assert_eq!(moon.mesh, MeshHandle { rings: 32, sectors: 32 });
        assert_eq!(moon.parent.as_deref(), Some("Earth"));

        assert_eq!(def.initial_camera_position, [0.0, 5.0, 20.0]);
        assert_eq!(def.light_color, [1.0, 1.0, 0.9]);
    }

    #[test]
    fn test_parse_minimal_ron() {
        let text = r#"(
            bodies: [
                (name: "Star", radius: 3.0, emissive: true),
                (name: "Rock", radius: 0.2, orbit_radius: 4.0, orbit_speed: 2.0, parent: Some("Star")),
            ],
            initial_camera_position: (1.0, 2.0, 3.0),
        )"#;
        let def = ScenarioDef::from_ron_str(text).unwrap();
        assert_eq!(def.bodies.len(), 2);
        assert_eq!(def.bodies[1].parent.as_deref(), Some("Star"));
        assert_eq!(def.bodies[1].rotation_axis, [0.0, 1.0, 0.0]);
        assert_eq!(def.bodies[0].mesh, MeshHandle::default());
        assert_eq!(def.initial_camera_position, [1.0, 2.0, 3.0]);
        assert_eq!(def.light_color, [1.0, 1.0, 0.9]);
        assert_eq!(def.lockable, None);
    }

    #[test]
    fn test_to_ron_parses_back() {
        let def = ScenarioDef::solar_system_basic();
        let text = def.to_ron().unwrap();
        assert!(text.contains("\"Earth\""));
        assert_eq!(ScenarioDef::from_ron_str(&text).unwrap(), def);
    }

    #[test]
    fn test_invalid_ron_is_parse_error() {
        let err = ScenarioDef::from_ron_str("(bodies: [").unwrap_err();
        assert!(matches!(err, SceneError::ScenarioParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("system.ron");
        std::fs::write(&path, ScenarioDef::solar_system_basic().to_ron().unwrap()).unwrap();
        let def = ScenarioDef::load(&path).unwrap();
        assert_eq!(def.bodies.len(), 3);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScenarioDef::load(&dir.path().join("missing.ron")).unwrap_err();
        assert!(matches!(err, SceneError::ScenarioRead { .. }));
    }
}
