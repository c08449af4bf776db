//! Frame-coherent keyboard state.
//!
//! [`KeyboardState`] accumulates winit key events during a frame and answers
//! whether a key is held and whether it went down this frame. Keys are
//! tracked by physical [`KeyCode`] so WASD sits in the same place on every
//! layout; events without an identified code are dropped.

use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Minimal description of a key event.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: PhysicalKey,
    pub state: ElementState,
    /// OS auto-repeat.
    pub repeat: bool,
}

/// Held keys plus the keys pressed since the last [`clear_transients`].
///
/// [`clear_transients`]: Self::clear_transients
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<KeyCode>,
    just_pressed: HashSet<KeyCode>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a winit [`KeyEvent`].
    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// Feeds a [`RawKeyEvent`]. Repeats never count as fresh presses.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        let PhysicalKey::Code(code) = event.key else {
            return;
        };
        match event.state {
            ElementState::Pressed => {
                if self.held.insert(code) && !event.repeat {
                    self.just_pressed.insert(code);
                }
            }
            ElementState::Released => {
                self.held.remove(&code);
            }
        }
    }

    #[must_use]
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// `true` only during the frame the key went down.
    #[must_use]
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Drops every held key, e.g. when the window loses focus and release
    /// events would go elsewhere.
    pub fn release_all(&mut self) {
        self.held.clear();
        self.just_pressed.clear();
    }

    /// Call at the end of each frame.
    pub fn clear_transients(&mut self) {
        self.just_pressed.clear();
    }
}
