//! Frame-coherent mouse motion and scroll.
//!
//! While the cursor is captured, raw device motion drives the delta. While it
//! is free, deltas come from successive cursor positions, skipping the first
//! position after the cursor (re)enters so the view does not jump.

use glam::Vec2;
use winit::event::MouseScrollDelta;

/// Pixels per scroll line for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f64 = 40.0;

/// Accumulated mouse input for the current frame.
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    last_position: Option<Vec2>,
    delta: Vec2,
    scroll: f32,
    captured: bool,
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a `CursorMoved` event.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        if !self.captured
            && let Some(last) = self.last_position
        {
            self.delta += position - last;
        }
        self.last_position = Some(position);
    }

    /// Process a `CursorLeft` event: the next position starts fresh.
    pub fn on_cursor_left(&mut self) {
        self.last_position = None;
    }

    /// Process a `DeviceEvent::MouseMotion` raw delta (only used when captured).
    pub fn on_raw_motion(&mut self, dx: f64, dy: f64) {
        if self.captured {
            self.delta += Vec2::new(dx as f32, dy as f32);
        }
    }

    /// Process a `MouseWheel` event. Positive is away from the user.
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_x, y) => self.scroll += y,
            MouseScrollDelta::PixelDelta(pos) => self.scroll += (pos.y / PIXELS_PER_LINE) as f32,
        }
    }

    /// Captures or releases the cursor on `window`.
    ///
    /// Captured: hidden and locked (confined when locking is unsupported).
    pub fn set_captured(&mut self, window: &winit::window::Window, captured: bool) {
        use winit::window::CursorGrabMode;
        self.set_captured_flag(captured);
        if captured {
            if window.set_cursor_grab(CursorGrabMode::Locked).is_err() {
                let _ = window.set_cursor_grab(CursorGrabMode::Confined);
            }
            window.set_cursor_visible(false);
        } else {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
    }

    /// Capture flag without touching a window (headless runs and tests).
    pub fn set_captured_flag(&mut self, captured: bool) {
        self.captured = captured;
        self.last_position = None;
    }

    /// Motion since the last [`clear_transients`](Self::clear_transients),
    /// +y pointing down.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Scroll lines since the last clear.
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Call at the end of each frame.
    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_cursor_position_has_no_delta() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(400.0, 300.0);
        assert_eq!(ms.delta(), Vec2::ZERO);
        ms.on_cursor_moved(410.0, 295.0);
        assert_eq!(ms.delta(), Vec2::new(10.0, -5.0));
    }

    #[test]
    fn test_reentry_does_not_jump() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(0.0, 0.0);
        ms.on_cursor_left();
        ms.on_cursor_moved(800.0, 600.0);
        assert_eq!(ms.delta(), Vec2::ZERO);
    }

    #[test]
    fn test_raw_motion_only_when_captured() {
        let mut ms = MouseState::new();
        ms.on_raw_motion(5.0, 5.0);
        assert_eq!(ms.delta(), Vec2::ZERO);
        ms.set_captured_flag(true);
        ms.on_raw_motion(5.0, -3.0);
        ms.on_raw_motion(1.0, 1.0);
        assert_eq!(ms.delta(), Vec2::new(6.0, -2.0));
        ms.on_cursor_moved(100.0, 100.0);
        ms.on_cursor_moved(200.0, 200.0);
        assert_eq!(ms.delta(), Vec2::new(6.0, -2.0));
    }

    #[test]
    fn test_scroll_lines_and_pixels() {
        let mut ms = MouseState::new();
        ms.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        ms.on_scroll(MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, 20.0),
        ));
        assert!((ms.scroll() - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_clear_transients_resets_delta_and_scroll() {
        let mut ms = MouseState::new();
        ms.on_cursor_moved(0.0, 0.0);
        ms.on_cursor_moved(3.0, 4.0);
        ms.on_scroll(MouseScrollDelta::LineDelta(0.0, 2.0));
        ms.clear_transients();
        assert_eq!(ms.delta(), Vec2::ZERO);
        assert_eq!(ms.scroll(), 0.0);
        ms.on_cursor_moved(4.0, 4.0);
        assert_eq!(ms.delta(), Vec2::new(1.0, 0.0));
    }
}
