//! Key bindings: which physical key drives which movement or command.
//!
//! [`Keybindings`] owns the table, applies overrides from the config's
//! `input.keybindings` map, and builds the [`FrameInput`] for a frame from
//! the current keyboard and mouse state.

use std::collections::HashMap;

use thiserror::Error;
use winit::keyboard::KeyCode;

use orrery_sim::{Command, FrameInput, Movement};

use crate::keyboard::KeyboardState;
use crate::mouse::MouseState;

/// A held movement direction for the free-fly camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 4] = [
        MoveDirection::Forward,
        MoveDirection::Backward,
        MoveDirection::Left,
        MoveDirection::Right,
    ];

    /// Action name used in config files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            MoveDirection::Forward => "move_forward",
            MoveDirection::Backward => "move_backward",
            MoveDirection::Left => "move_left",
            MoveDirection::Right => "move_right",
        }
    }
}

/// What a key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// Held: contributes to [`Movement`] every frame it is down.
    Move(MoveDirection),
    /// Edge-triggered: fires once on the frame the key goes down.
    Command(Command),
}

impl Binding {
    /// Parses a config action name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Binding> {
        MoveDirection::ALL
            .into_iter()
            .find(|d| d.name() == name)
            .map(Binding::Move)
            .or_else(|| Command::from_name(name).map(Binding::Command))
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Binding::Move(direction) => direction.name(),
            Binding::Command(command) => command.name(),
        }
    }
}

/// A rejected entry in the keybinding overrides.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("unknown key `{key}` for action `{action}`")]
    UnknownKey { action: String, key: String },
}

/// Parses a key name in winit's `KeyCode` debug spelling (`"KeyW"`, `"Tab"`).
#[must_use]
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    Some(match name {
        "KeyA" => KeyCode::KeyA,
        "KeyB" => KeyCode::KeyB,
        "KeyC" => KeyCode::KeyC,
        "KeyD" => KeyCode::KeyD,
        "KeyE" => KeyCode::KeyE,
        "KeyF" => KeyCode::KeyF,
        "KeyG" => KeyCode::KeyG,
        "KeyH" => KeyCode::KeyH,
        "KeyI" => KeyCode::KeyI,
        "KeyJ" => KeyCode::KeyJ,
        "KeyK" => KeyCode::KeyK,
        "KeyL" => KeyCode::KeyL,
        "KeyM" => KeyCode::KeyM,
        "KeyN" => KeyCode::KeyN,
        "KeyO" => KeyCode::KeyO,
        "KeyP" => KeyCode::KeyP,
        "KeyQ" => KeyCode::KeyQ,
        "KeyR" => KeyCode::KeyR,
        "KeyS" => KeyCode::KeyS,
        "KeyT" => KeyCode::KeyT,
        "KeyU" => KeyCode::KeyU,
        "KeyV" => KeyCode::KeyV,
        "KeyW" => KeyCode::KeyW,
        "KeyX" => KeyCode::KeyX,
        "KeyY" => KeyCode::KeyY,
        "KeyZ" => KeyCode::KeyZ,
        "Digit0" => KeyCode::Digit0,
        "Digit1" => KeyCode::Digit1,
        "Digit2" => KeyCode::Digit2,
        "Digit3" => KeyCode::Digit3,
        "Digit4" => KeyCode::Digit4,
        "Digit5" => KeyCode::Digit5,
        "Digit6" => KeyCode::Digit6,
        "Digit7" => KeyCode::Digit7,
        "Digit8" => KeyCode::Digit8,
        "Digit9" => KeyCode::Digit9,
        "Numpad0" => KeyCode::Numpad0,
        "Numpad1" => KeyCode::Numpad1,
        "Numpad2" => KeyCode::Numpad2,
        "Numpad3" => KeyCode::Numpad3,
        "Numpad4" => KeyCode::Numpad4,
        "Numpad5" => KeyCode::Numpad5,
        "Numpad6" => KeyCode::Numpad6,
        "Numpad7" => KeyCode::Numpad7,
        "Numpad8" => KeyCode::Numpad8,
        "Numpad9" => KeyCode::Numpad9,
        "NumpadAdd" => KeyCode::NumpadAdd,
        "NumpadSubtract" => KeyCode::NumpadSubtract,
        "F1" => KeyCode::F1,
        "F2" => KeyCode::F2,
        "F3" => KeyCode::F3,
        "F4" => KeyCode::F4,
        "F5" => KeyCode::F5,
        "F6" => KeyCode::F6,
        "F7" => KeyCode::F7,
        "F8" => KeyCode::F8,
        "F9" => KeyCode::F9,
        "F10" => KeyCode::F10,
        "F11" => KeyCode::F11,
        "F12" => KeyCode::F12,
        "Equal" => KeyCode::Equal,
        "Minus" => KeyCode::Minus,
        "BracketLeft" => KeyCode::BracketLeft,
        "BracketRight" => KeyCode::BracketRight,
        "Comma" => KeyCode::Comma,
        "Period" => KeyCode::Period,
        "Space" => KeyCode::Space,
        "Enter" => KeyCode::Enter,
        "Tab" => KeyCode::Tab,
        "Backspace" => KeyCode::Backspace,
        "ShiftLeft" => KeyCode::ShiftLeft,
        "ShiftRight" => KeyCode::ShiftRight,
        "ControlLeft" => KeyCode::ControlLeft,
        "ControlRight" => KeyCode::ControlRight,
        "AltLeft" => KeyCode::AltLeft,
        "AltRight" => KeyCode::AltRight,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        _ => return None,
    })
}

/// Key table plus mouse options.
#[derive(Debug, Clone)]
pub struct Keybindings {
    keys: HashMap<KeyCode, Binding>,
    invert_y: bool,
}

impl Default for Keybindings {
    fn default() -> Self {
        let keys = [
            (KeyCode::KeyW, Binding::Move(MoveDirection::Forward)),
            (KeyCode::KeyS, Binding::Move(MoveDirection::Backward)),
            (KeyCode::KeyA, Binding::Move(MoveDirection::Left)),
            (KeyCode::KeyD, Binding::Move(MoveDirection::Right)),
            (KeyCode::Tab, Binding::Command(Command::CycleLockTarget)),
            (KeyCode::KeyF, Binding::Command(Command::ReleaseLock)),
            (KeyCode::KeyE, Binding::Command(Command::EnterSolarEclipseWatch)),
            (KeyCode::KeyL, Binding::Command(Command::EnterLunarEclipseWatch)),
            (KeyCode::KeyX, Binding::Command(Command::ExitEclipseWatch)),
            (KeyCode::Equal, Binding::Command(Command::SpeedUp)),
            (KeyCode::Minus, Binding::Command(Command::SpeedDown)),
        ]
        .into_iter()
        .collect();
        Self {
            keys,
            invert_y: false,
        }
    }
}

impl Keybindings {
    /// Rebinds actions from an `action -> key` map.
    ///
    /// A rebound action loses its previous key; a key taken from another
    /// action leaves that action unbound. Bad entries are skipped and
    /// returned.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<BindingError> {
        let mut errors = Vec::new();
        let mut entries: Vec<_> = overrides.iter().collect();
        entries.sort();

        for (action, key_name) in entries {
            let Some(binding) = Binding::from_name(action) else {
                errors.push(BindingError::UnknownAction(action.clone()));
                continue;
            };
            let Some(key) = key_from_name(key_name) else {
                errors.push(BindingError::UnknownKey {
                    action: action.clone(),
                    key: key_name.clone(),
                });
                continue;
            };
            self.keys.retain(|_, b| *b != binding);
            if let Some(previous) = self.keys.insert(key, binding) {
                tracing::debug!(key = key_name.as_str(), unbound = previous.name(), "key rebound");
            }
        }
        errors
    }

    pub fn set_invert_y(&mut self, invert_y: bool) {
        self.invert_y = invert_y;
    }

    #[must_use]
    pub fn invert_y(&self) -> bool {
        self.invert_y
    }

    /// The key currently bound to `binding`, if any.
    #[must_use]
    pub fn key_for(&self, binding: Binding) -> Option<KeyCode> {
        self.keys
            .iter()
            .find_map(|(key, b)| (*b == binding).then_some(*key))
    }

    /// Builds this frame's input. Commands are ordered as in [`Command::ALL`].
    #[must_use]
    pub fn frame_input(&self, keyboard: &KeyboardState, mouse: &MouseState) -> FrameInput {
        let mut movement = Movement::default();
        let mut fired = Vec::new();

        for (&key, &binding) in &self.keys {
            match binding {
                Binding::Move(direction) if keyboard.is_pressed(key) => match direction {
                    MoveDirection::Forward => movement.forward = true,
                    MoveDirection::Backward => movement.backward = true,
                    MoveDirection::Left => movement.left = true,
                    MoveDirection::Right => movement.right = true,
                },
                Binding::Command(command) if keyboard.just_pressed(key) => fired.push(command),
                _ => {}
            }
        }

        let commands = Command::ALL
            .into_iter()
            .filter(|c| fired.contains(c))
            .collect();

        let mut mouse_delta = mouse.delta();
        if self.invert_y {
            mouse_delta.y = -mouse_delta.y;
        }

        FrameInput {
            movement,
            mouse_delta,
            scroll: mouse.scroll(),
            commands,
        }
    }
}
