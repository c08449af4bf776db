//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]: input events feed
//! the keyboard and mouse state, and every redraw steps the [`Orrery`] once
//! and presents the frame.

use std::sync::Arc;

use orrery_config::Config;
use orrery_input::{KeyboardState, Keybindings, MouseState};
use orrery_render::{LogSink, submit};
use orrery_sim::{ClockState, Orrery};
use tracing::{error, info, instrument};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::error::AppError;
use crate::frame_timer::FrameTimer;

/// Returns [`WindowAttributes`] based on the given configuration.
#[must_use]
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attributes = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ));
    if config.window.fullscreen {
        attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attributes
    }
}

/// Title bar text: base title, frame rate, simulated time and clock state.
#[must_use]
pub fn window_title(base: &str, fps: f64, simulated_time: f64, clock: ClockState) -> String {
    let clock = match clock {
        ClockState::Running { speed } => format!("{speed:.2}x"),
        ClockState::Frozen { .. } => "frozen".to_string(),
    };
    format!("{base} | {fps:.0} fps | t={simulated_time:.1} | {clock}")
}

/// Window, simulation and input state for the windowed run.
pub struct AppState {
    window: Option<Arc<Window>>,
    config: Config,
    orrery: Orrery,
    keybindings: Keybindings,
    keyboard: KeyboardState,
    mouse: MouseState,
    timer: FrameTimer,
    sink: LogSink,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, orrery: Orrery, keybindings: Keybindings) -> Self {
        let sink = LogSink::new(config.debug.log_frame_events, 300);
        Self {
            window: None,
            config,
            orrery,
            keybindings,
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(),
            timer: FrameTimer::new(),
            sink,
        }
    }

    fn set_captured(&mut self, captured: bool) {
        if let Some(window) = &self.window {
            self.mouse.set_captured(window, captured);
        }
    }

    fn redraw(&mut self) {
        let dt = self.timer.tick();
        let input = self.keybindings.frame_input(&self.keyboard, &self.mouse);
        let output = self.orrery.step(dt, &input);
        submit(&mut self.sink, &output);
        let (simulated_time, clock) = (output.simulated_time, output.clock_state);

        if let Some(fps) = self.timer.take_fps()
            && let Some(window) = &self.window
        {
            window.set_title(&window_title(
                &self.config.window.title,
                fps,
                simulated_time,
                clock,
            ));
        }

        self.keyboard.clear_transients();
        self.mouse.clear_transients();

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        if size.height > 0 {
            self.orrery
                .set_aspect_ratio(size.width as f32, size.height as f32);
        }
        info!(
            "Window created: {}x{} (scale: {:.2})",
            size.width,
            size.height,
            window.scale_factor()
        );

        window.request_redraw();
        self.window = Some(window);
        self.set_captured(true);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    self.orrery
                        .set_aspect_ratio(new_size.width as f32, new_size.height as f32);
                    info!("Window resized to {}x{}", new_size.width, new_size.height);
                }
            }
            WindowEvent::Focused(focused) => {
                if !focused {
                    self.keyboard.release_all();
                }
                self.set_captured(focused);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                    && event.state == ElementState::Pressed
                {
                    info!("Escape pressed, shutting down");
                    event_loop.exit();
                    return;
                }
                self.keyboard.process_event(&event);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse.on_cursor_left();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.mouse.on_scroll(delta);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.mouse.on_raw_motion(delta.0, delta.1);
        }
    }
}

/// Creates an event loop and runs until the window closes.
#[instrument(skip_all)]
pub fn run(config: Config, orrery: Orrery, keybindings: Keybindings) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, orrery, keybindings);
    event_loop.run_app(&mut app)?;
    Ok(())
}
