//! Runs the frame loop without a window, at a fixed wall delta.

use orrery_render::{FrameSink, submit};
use orrery_sim::{EclipseEvent, EclipseKind, FrameEvent, FrameInput, Orrery};
use tracing::{info, warn};

use crate::error::AppError;

/// What to do before and during a headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessOptions {
    pub frames: u64,
    /// Wall seconds per frame.
    pub frame_time: f64,
    /// Start this eclipse watch before the first frame.
    pub watch: Option<EclipseKind>,
    /// Lock the camera onto this body before the first frame.
    pub lock: Option<String>,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_time: 1.0 / 60.0,
            watch: None,
            lock: None,
        }
    }
}

/// Summary of a finished headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessReport {
    pub frames: u64,
    pub simulated_time: f64,
    pub eclipses: Vec<EclipseEvent>,
}

/// Steps `orrery` for `options.frames` frames with idle input, presenting
/// each frame to `sink`.
///
/// An unknown `lock` body is an error; a rejected watch is only logged.
pub fn run_headless(
    orrery: &mut Orrery,
    options: &HeadlessOptions,
    sink: &mut dyn FrameSink,
) -> Result<HeadlessReport, AppError> {
    if let Some(name) = &options.lock {
        orrery.lock_onto_name(name)?;
        info!("Camera locked onto {name}");
    }
    if let Some(kind) = options.watch {
        match orrery.enter_eclipse_watch(kind) {
            Ok(()) => info!("Watching for a {kind} eclipse"),
            Err(reason) => warn!("Cannot watch for a {kind} eclipse: {reason}"),
        }
    }

    let input = FrameInput::idle();
    let mut eclipses = Vec::new();
    let mut simulated_time = orrery.clock().simulated_time();

    for _ in 0..options.frames {
        let output = orrery.step(options.frame_time, &input);
        eclipses.extend(output.events.iter().filter_map(|event| match event {
            FrameEvent::EclipseOccurred(eclipse) => Some(*eclipse),
            _ => None,
        }));
        simulated_time = output.simulated_time;
        submit(sink, &output);
    }

    info!(
        "Headless run finished: {} frames, t={simulated_time:.3}, {} eclipse(s)",
        options.frames,
        eclipses.len()
    );
    Ok(HeadlessReport {
        frames: options.frames,
        simulated_time,
        eclipses,
    })
}

#[cfg(test)]
mod tests {
    use orrery_render::LogSink;
    use orrery_sim::{CameraMode, OrrerySettings, ScenarioDef, Scene, SceneError};

    use super::*;

    fn basic() -> Orrery {
        let scene = Scene::from_scenario(&ScenarioDef::solar_system_basic()).unwrap();
        Orrery::new(scene, OrrerySettings::default())
    }

    #[test]
    fn test_idle_run_advances_time() {
        let mut orrery = basic();
        let mut sink = LogSink::default();
        let options = HeadlessOptions {
            frames: 60,
            ..HeadlessOptions::default()
        };
        let report = run_headless(&mut orrery, &options, &mut sink).unwrap();
        assert_eq!(report.frames, 60);
        assert_eq!(sink.frames(), 60);
        assert!((report.simulated_time - 1.0).abs() < 1e-9);
        assert!(report.eclipses.is_empty());
    }

    #[test]
    fn test_lunar_watch_freezes_on_first_frame() {
        let mut orrery = basic();
        let options = HeadlessOptions {
            frames: 30,
            watch: Some(EclipseKind::Lunar),
            ..HeadlessOptions::default()
        };
        let report = run_headless(&mut orrery, &options, &mut LogSink::default()).unwrap();
        assert_eq!(report.eclipses.len(), 1);
        assert_eq!(report.eclipses[0].kind, EclipseKind::Lunar);
        assert!((report.eclipses[0].simulated_time - 0.05).abs() < 1e-9);
        assert!((report.simulated_time - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_solar_watch_finds_next_new_moon() {
        let mut orrery = basic();
        let options = HeadlessOptions {
            frames: 600,
            watch: Some(EclipseKind::Solar),
            ..HeadlessOptions::default()
        };
        let report = run_headless(&mut orrery, &options, &mut LogSink::default()).unwrap();
        assert_eq!(report.eclipses.len(), 1);
        let t = report.eclipses[0].simulated_time;
        assert!(t > 5.8 && t < std::f64::consts::TAU, "eclipse at {t}");
        assert!(orrery.clock().is_frozen());
    }

    #[test]
    fn test_lock_option_locks_camera() {
        let mut orrery = basic();
        let options = HeadlessOptions {
            frames: 5,
            lock: Some("Earth".to_string()),
            ..HeadlessOptions::default()
        };
        run_headless(&mut orrery, &options, &mut LogSink::default()).unwrap();
        let earth = orrery.scene().find("Earth").unwrap();
        assert_eq!(orrery.camera().mode(), CameraMode::LockedTo(earth));
    }

    #[test]
    fn test_unknown_lock_body_is_an_error() {
        let mut orrery = basic();
        let options = HeadlessOptions {
            lock: Some("Pluto".to_string()),
            ..HeadlessOptions::default()
        };
        let err = run_headless(&mut orrery, &options, &mut LogSink::default()).unwrap_err();
        assert!(matches!(err, AppError::Scene(SceneError::UnknownBody(_))));
    }

    #[test]
    fn test_disabled_watch_only_warns() {
        let scene = Scene::from_scenario(&ScenarioDef::solar_system_basic()).unwrap();
        let mut settings = OrrerySettings::default();
        settings.features.eclipse_watch = false;
        let mut orrery = Orrery::new(scene, settings);
        let options = HeadlessOptions {
            frames: 10,
            watch: Some(EclipseKind::Lunar),
            ..HeadlessOptions::default()
        };
        let report = run_headless(&mut orrery, &options, &mut LogSink::default()).unwrap();
        assert!(report.eclipses.is_empty());
        assert!(!orrery.clock().is_frozen());
    }
}
