//! The per-frame step tying clock, scene, eclipse detector and camera
//! together.

use glam::{Mat3, Mat4, Vec3};
use tracing::{debug, info, warn};

use crate::body::{BodyId, MeshHandle, TextureHandle};
use crate::camera::{CameraController, CameraMode, CameraSettings, Projection};
use crate::clock::{ClockSettings, ClockState, EclipseEvent, SimulationClock};
use crate::controls::{Command, FrameInput};
use crate::eclipse::{DEFAULT_ECLIPSE_THRESHOLD, EclipseDetector, EclipseKind};
use crate::error::SceneError;
use crate::scene::{Light, OrbitPath, Scene};

/// Optional parts of the frame output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    /// Emit a rotation-only view matrix for a skybox pass.
    pub skybox: bool,
    /// Emit orbit circles.
    pub orbit_paths: bool,
    /// Accept eclipse-watch commands.
    pub eclipse_watch: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            skybox: true,
            orbit_paths: false,
            eclipse_watch: true,
        }
    }
}

/// Everything [`Orrery`] needs besides the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrrerySettings {
    pub camera: CameraSettings,
    pub clock: ClockSettings,
    /// Perpendicular-distance threshold for alignment.
    pub eclipse_threshold: f32,
    /// Moon visual scale targeted while a solar watch is active.
    pub moon_growth: f32,
    /// Easing rate of the moon visual scale, per wall-clock second.
    pub moon_growth_rate: f32,
    pub features: Features,
}

impl OrrerySettings {
    /// Validates the clock and camera settings, and replaces a non-positive
    /// eclipse threshold, moon growth or growth rate with its default.
    #[must_use]
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let positive = |value: f32, fallback: f32, name: &str| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                warn!("{name} must be finite and positive, got {value}; using {fallback}");
                fallback
            }
        };
        Self {
            camera: self.camera.validated(),
            clock: self.clock.validated(),
            eclipse_threshold: positive(
                self.eclipse_threshold,
                defaults.eclipse_threshold,
                "eclipse_threshold",
            ),
            moon_growth: positive(self.moon_growth, defaults.moon_growth, "moon_growth"),
            moon_growth_rate: positive(
                self.moon_growth_rate,
                defaults.moon_growth_rate,
                "moon_growth_rate",
            ),
            features: self.features,
        }
    }
}

impl Default for OrrerySettings {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            clock: ClockSettings::default(),
            eclipse_threshold: DEFAULT_ECLIPSE_THRESHOLD,
            moon_growth: 2.0,
            moon_growth_rate: 1.5,
            features: Features::default(),
        }
    }
}

/// Why a command did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("no lockable bodies")]
    EmptyLockList,
    #[error("camera is not locked")]
    NotLocked,
    #[error("clock is frozen")]
    Frozen,
    #[error("no eclipse watch is active")]
    NotWatching,
    #[error("feature disabled")]
    FeatureDisabled,
    #[error("scene has no sun/planet/moon roles")]
    NoEclipseBodies,
}

/// Something that happened during a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    /// A watched eclipse froze the clock.
    EclipseOccurred(EclipseEvent),
    WatchStarted(EclipseKind),
    WatchEnded,
    CameraLocked {
        target: BodyId,
        name: String,
    },
    CameraReleased,
    SpeedChanged(f64),
    CommandRejected {
        command: Command,
        reason: RejectReason,
    },
}

/// Draw data for one body.
#[derive(Debug, Clone, Copy)]
pub struct BodyFrame<'a> {
    pub id: BodyId,
    pub name: &'a str,
    /// `world · scale(radius · visual_scale)`.
    pub model: Mat4,
    pub texture: &'a TextureHandle,
    pub mesh: MeshHandle,
    pub emissive: bool,
    /// Inside an eclipse shadow this frame.
    pub shadowed: bool,
}

/// Render parameters for one frame.
#[derive(Debug, Clone)]
pub struct FrameOutput<'a> {
    /// Bodies in definition order.
    pub bodies: Vec<BodyFrame<'a>>,
    pub view: Mat4,
    pub projection: Projection,
    pub camera_position: Vec3,
    pub camera_mode: CameraMode,
    pub light: Light,
    pub simulated_time: f64,
    pub clock_state: ClockState,
    /// View without translation, when the skybox feature is on.
    pub skybox_view: Option<Mat4>,
    /// Empty unless the orbit-path feature is on.
    pub orbit_paths: Vec<OrbitPath>,
    pub events: Vec<FrameEvent>,
}

impl FrameOutput<'_> {
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection.matrix() * self.view
    }
}

/// Owns the scene, clock and camera for a session.
#[derive(Debug)]
pub struct Orrery {
    scene: Scene,
    clock: SimulationClock,
    camera: CameraController,
    detector: EclipseDetector,
    settings: OrrerySettings,
    alignment: Option<EclipseKind>,
}

impl Orrery {
    #[must_use]
    pub fn new(scene: Scene, settings: OrrerySettings) -> Self {
        let settings = settings.validated();
        let camera = CameraController::new(settings.camera, scene.initial_camera_position());
        Self {
            clock: SimulationClock::new(settings.clock),
            camera,
            detector: EclipseDetector::new(settings.eclipse_threshold),
            settings,
            alignment: None,
            scene,
        }
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    #[must_use]
    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    #[must_use]
    pub fn settings(&self) -> &OrrerySettings {
        &self.settings
    }

    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        self.camera.set_aspect_ratio(width, height);
    }

    /// Locks the camera onto a body by name.
    pub fn lock_onto_name(&mut self, name: &str) -> Result<BodyId, SceneError> {
        let id = self.scene.lookup(name)?;
        self.camera.lock_onto(id, &self.scene)?;
        Ok(id)
    }

    /// Starts an eclipse watch outside the command stream.
    pub fn enter_eclipse_watch(&mut self, kind: EclipseKind) -> Result<(), RejectReason> {
        if !self.settings.features.eclipse_watch {
            return Err(RejectReason::FeatureDisabled);
        }
        if self.scene.eclipse_bodies().is_none() {
            return Err(RejectReason::NoEclipseBodies);
        }
        if !self.clock.enter_eclipse_watch(kind) {
            return Err(RejectReason::Frozen);
        }
        Ok(())
    }

    /// Advances one frame.
    ///
    /// Commands apply first, then camera input, then the clock tick, body
    /// resolution and eclipse check. Non-finite or negative `wall_dt` counts
    /// as zero.
    pub fn step(&mut self, wall_dt: f64, input: &FrameInput) -> FrameOutput<'_> {
        let wall_dt = if wall_dt.is_finite() && wall_dt > 0.0 {
            wall_dt
        } else {
            0.0
        };
        let mut events = Vec::new();

        for &command in &input.commands {
            self.apply(command, &mut events);
        }

        self.camera.update(input, wall_dt as f32, &self.scene);

        let sim_dt = self.clock.tick(wall_dt);
        let simulated_time = self.clock.simulated_time();
        self.scene.resolve(simulated_time, sim_dt);

        self.update_eclipse(wall_dt as f32, &mut events);

        let view = self.camera.view_matrix(&self.scene);
        let features = self.settings.features;
        let bodies = self
            .scene
            .iter()
            .map(|(id, body)| BodyFrame {
                id,
                name: &body.name,
                model: body.model_matrix(),
                texture: &body.texture,
                mesh: body.mesh,
                emissive: body.emissive,
                shadowed: body.is_shadowed(),
            })
            .collect();

        FrameOutput {
            bodies,
            view,
            projection: self.camera.projection(),
            camera_position: self.camera.eye(&self.scene),
            camera_mode: self.camera.mode(),
            light: self.scene.light(),
            simulated_time,
            clock_state: self.clock.state(),
            skybox_view: features
                .skybox
                .then(|| Mat4::from_mat3(Mat3::from_mat4(view))),
            orbit_paths: if features.orbit_paths {
                self.scene.orbit_paths()
            } else {
                Vec::new()
            },
            events,
        }
    }

    fn apply(&mut self, command: Command, events: &mut Vec<FrameEvent>) {
        let outcome = match command {
            Command::CycleLockTarget => match self.camera.cycle_target(&self.scene) {
                Some(target) => {
                    let name = self
                        .scene
                        .body(target)
                        .map(|b| b.name.clone())
                        .unwrap_or_default();
                    Ok(FrameEvent::CameraLocked { target, name })
                }
                None => Err(RejectReason::EmptyLockList),
            },
            Command::ReleaseLock => {
                if self.camera.release(&self.scene) {
                    Ok(FrameEvent::CameraReleased)
                } else {
                    Err(RejectReason::NotLocked)
                }
            }
            Command::EnterSolarEclipseWatch => self
                .enter_eclipse_watch(EclipseKind::Solar)
                .map(|()| FrameEvent::WatchStarted(EclipseKind::Solar)),
            Command::EnterLunarEclipseWatch => self
                .enter_eclipse_watch(EclipseKind::Lunar)
                .map(|()| FrameEvent::WatchStarted(EclipseKind::Lunar)),
            Command::ExitEclipseWatch => {
                if self.clock.exit_eclipse_watch() {
                    Ok(FrameEvent::WatchEnded)
                } else {
                    Err(RejectReason::NotWatching)
                }
            }
            Command::SpeedUp => Ok(FrameEvent::SpeedChanged(self.clock.speed_up())),
            Command::SpeedDown => Ok(FrameEvent::SpeedChanged(self.clock.speed_down())),
        };

        match outcome {
            Ok(event) => events.push(event),
            Err(reason) => {
                debug!("Command {} rejected: {reason}", command.name());
                events.push(FrameEvent::CommandRejected { command, reason });
            }
        }
    }

    fn update_eclipse(&mut self, wall_dt: f32, events: &mut Vec<FrameEvent>) {
        let Some(roles) = self.scene.eclipse_bodies() else {
            return;
        };
        let position = |id: BodyId| {
            self.scene
                .body(id)
                .map_or(Vec3::ZERO, |b| b.world_position())
        };
        let (sun, planet, moon) = (position(roles.sun), position(roles.planet), position(roles.moon));

        // The watched kind wins when degenerate geometry matches both.
        let detected = match self.clock.watch() {
            Some(kind) if self.detector.detect(kind, sun, planet, moon) => Some(kind),
            _ => self.detector.classify(sun, planet, moon),
        };

        if detected != self.alignment {
            match detected {
                Some(kind) => debug!("{kind} alignment at t={:.3}", self.clock.simulated_time()),
                None => debug!("Alignment ended at t={:.3}", self.clock.simulated_time()),
            }
            self.alignment = detected;
        }

        if let Some(event) = self.clock.observe(detected) {
            info!("{} eclipse occurred at t={:.3}", event.kind, event.simulated_time);
            events.push(FrameEvent::EclipseOccurred(event));
        }

        let growth_target = if self.clock.watch() == Some(EclipseKind::Solar) {
            self.settings.moon_growth
        } else {
            1.0
        };
        let blend = (self.settings.moon_growth_rate * wall_dt).clamp(0.0, 1.0);

        if let Some(body) = self.scene.body_mut(roles.planet) {
            body.shadowed = detected == Some(EclipseKind::Solar);
        }
        if let Some(body) = self.scene.body_mut(roles.moon) {
            body.shadowed = detected == Some(EclipseKind::Lunar);
            body.visual_scale += (growth_target - body.visual_scale) * blend;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{BodyDef, ScenarioDef};

    fn orrery(def: &ScenarioDef, settings: OrrerySettings) -> Orrery {
        Orrery::new(Scene::from_scenario(def).unwrap(), settings)
    }

    fn basic() -> Orrery {
        orrery(&ScenarioDef::solar_system_basic(), OrrerySettings::default())
    }

    fn command(c: Command) -> FrameInput {
        FrameInput::idle().with_command(c)
    }

    #[test]
    fn test_output_lists_every_body() {
        let mut o = basic();
        let out = o.step(0.016, &FrameInput::idle());
        let names: Vec<_> = out.bodies.iter().map(|b| b.name).collect();
        assert_eq!(names, ["Sun", "Earth", "Moon"]);
        assert!(out.bodies[0].emissive);
        assert_eq!(out.camera_mode, CameraMode::Free);
        assert!((out.simulated_time - 0.016).abs() < 1e-12);
    }

    #[test]
    fn test_model_matrix_scales_by_radius() {
        let mut o = basic();
        let out = o.step(0.0, &FrameInput::idle());
        let sun = out.bodies[0].model;
        let edge = sun.transform_point3(Vec3::X);
        assert!((edge.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_skybox_view_drops_translation() {
        let mut o = basic();
        let out = o.step(0.016, &FrameInput::idle());
        let sky = out.skybox_view.unwrap();
        assert_eq!(sky.w_axis, glam::Vec4::W);
        assert!((sky.x_axis.truncate() - out.view.x_axis.truncate()).length() < 1e-6);
    }

    #[test]
    fn test_features_toggle_optional_outputs() {
        let settings = OrrerySettings {
            features: Features {
                skybox: false,
                orbit_paths: true,
                eclipse_watch: false,
            },
            ..OrrerySettings::default()
        };
        let mut o = orrery(&ScenarioDef::solar_system_basic(), settings);
        let out = o.step(0.016, &command(Command::EnterSolarEclipseWatch));
        assert!(out.skybox_view.is_none());
        assert_eq!(out.orbit_paths.len(), 2);
        assert_eq!(
            out.events,
            vec![FrameEvent::CommandRejected {
                command: Command::EnterSolarEclipseWatch,
                reason: RejectReason::FeatureDisabled,
            }]
        );
    }

    #[test]
    fn test_cycle_then_release_events() {
        let mut o = basic();
        let out = o.step(0.016, &command(Command::CycleLockTarget));
        assert_eq!(
            out.events,
            vec![FrameEvent::CameraLocked {
                target: BodyId(0),
                name: "Sun".into(),
            }]
        );
        assert_eq!(out.camera_mode, CameraMode::LockedTo(BodyId(0)));

        let out = o.step(0.016, &command(Command::ReleaseLock));
        assert_eq!(out.events, vec![FrameEvent::CameraReleased]);
        assert_eq!(out.camera_mode, CameraMode::Free);

        let out = o.step(0.016, &command(Command::ReleaseLock));
        assert!(matches!(
            out.events[0],
            FrameEvent::CommandRejected {
                reason: RejectReason::NotLocked,
                ..
            }
        ));
    }

    #[test]
    fn test_watch_without_roles_is_rejected() {
        let def = ScenarioDef {
            bodies: vec![BodyDef::new("Star", 1.0)],
            ..ScenarioDef::default()
        };
        let mut o = orrery(&def, OrrerySettings::default());
        let out = o.step(0.016, &command(Command::EnterLunarEclipseWatch));
        assert!(matches!(
            out.events[0],
            FrameEvent::CommandRejected {
                reason: RejectReason::NoEclipseBodies,
                ..
            }
        ));
    }

    #[test]
    fn test_lunar_watch_freezes_at_alignment() {
        // The basic system starts in lunar alignment: Sun, Earth, Moon on +X.
        let mut o = basic();
        let out = o.step(0.01, &command(Command::EnterLunarEclipseWatch));
        assert_eq!(out.events[0], FrameEvent::WatchStarted(EclipseKind::Lunar));
        let Some(FrameEvent::EclipseOccurred(event)) = out.events.get(1).cloned() else {
            panic!("expected eclipse event, got {:?}", out.events);
        };
        assert_eq!(event.kind, EclipseKind::Lunar);
        assert!(matches!(out.clock_state, ClockState::Frozen { .. }));
        assert!(out.bodies[2].shadowed);
        assert!(!out.bodies[1].shadowed);

        let frozen_at = out.simulated_time;
        for _ in 0..10 {
            let out = o.step(0.5, &FrameInput::idle());
            assert_eq!(out.simulated_time, frozen_at);
            assert!(out.events.is_empty());
        }
    }

    #[test]
    fn test_exit_watch_resumes() {
        let mut o = basic();
        o.step(0.01, &command(Command::EnterLunarEclipseWatch));
        let out = o.step(0.1, &command(Command::ExitEclipseWatch));
        assert_eq!(out.events, vec![FrameEvent::WatchEnded]);
        assert_eq!(out.clock_state, ClockState::Running { speed: 1.0 });

        let out = o.step(0.1, &command(Command::ExitEclipseWatch));
        assert!(matches!(
            out.events[0],
            FrameEvent::CommandRejected {
                reason: RejectReason::NotWatching,
                ..
            }
        ));
    }

    #[test]
    fn test_watch_request_while_frozen_rejected() {
        let mut o = basic();
        o.step(0.01, &command(Command::EnterLunarEclipseWatch));
        let out = o.step(0.01, &command(Command::EnterSolarEclipseWatch));
        assert!(matches!(
            out.events[0],
            FrameEvent::CommandRejected {
                reason: RejectReason::Frozen,
                ..
            }
        ));
        assert_eq!(o.clock().watch(), Some(EclipseKind::Lunar));
    }

    #[test]
    fn test_moon_grows_during_solar_watch() {
        let mut o = basic();
        o.step(0.0, &command(Command::EnterSolarEclipseWatch));
        let moon = BodyId(2);
        for _ in 0..5 {
            o.step(0.2, &FrameInput::idle());
        }
        let grown = o.scene().body(moon).unwrap().visual_scale();
        assert!(grown > 1.5, "visual scale {grown}");

        o.step(0.0, &command(Command::ExitEclipseWatch));
        for _ in 0..20 {
            o.step(0.2, &FrameInput::idle());
        }
        let shrunk = o.scene().body(moon).unwrap().visual_scale();
        assert!((shrunk - 1.0).abs() < 0.01, "visual scale {shrunk}");
    }

    #[test]
    fn test_speed_commands_report_new_speed() {
        let mut o = basic();
        let out = o.step(0.0, &command(Command::SpeedUp));
        assert_eq!(out.events, vec![FrameEvent::SpeedChanged(2.0)]);
        let out = o.step(0.0, &command(Command::SpeedDown).with_command(Command::SpeedDown));
        assert_eq!(
            out.events,
            vec![FrameEvent::SpeedChanged(1.0), FrameEvent::SpeedChanged(0.5)]
        );
    }

    #[test]
    fn test_lock_onto_name() {
        let mut o = basic();
        assert_eq!(o.lock_onto_name("Moon").unwrap(), BodyId(2));
        assert!(matches!(
            o.lock_onto_name("Vulcan"),
            Err(SceneError::UnknownBody(_))
        ));
        assert_eq!(o.camera().mode(), CameraMode::LockedTo(BodyId(2)));
    }

    #[test]
    fn test_light_tracks_sun() {
        let mut o = basic();
        let out = o.step(0.016, &FrameInput::idle());
        assert!(out.light.position.length() < 1e-6);
        assert_eq!(out.light.color, Vec3::new(1.0, 1.0, 0.9));
    }
}
