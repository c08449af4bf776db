//! Per-frame input handed to the simulation.

use glam::Vec2;

/// Held movement keys for the free-fly camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Movement {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl Movement {
    /// `true` if no movement key is held.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !(self.forward || self.backward || self.left || self.right)
    }
}

/// Discrete commands, fired once per key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Lock onto the next lockable body, wrapping.
    CycleLockTarget,
    /// Return to free-fly from the current locked view.
    ReleaseLock,
    EnterSolarEclipseWatch,
    EnterLunarEclipseWatch,
    ExitEclipseWatch,
    SpeedUp,
    SpeedDown,
}

impl Command {
    /// Every command, in binding-table order.
    pub const ALL: [Command; 7] = [
        Command::CycleLockTarget,
        Command::ReleaseLock,
        Command::EnterSolarEclipseWatch,
        Command::EnterLunarEclipseWatch,
        Command::ExitEclipseWatch,
        Command::SpeedUp,
        Command::SpeedDown,
    ];

    /// Stable action name used in config files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Command::CycleLockTarget => "cycle_lock_target",
            Command::ReleaseLock => "release_lock",
            Command::EnterSolarEclipseWatch => "solar_eclipse_watch",
            Command::EnterLunarEclipseWatch => "lunar_eclipse_watch",
            Command::ExitEclipseWatch => "exit_eclipse_watch",
            Command::SpeedUp => "speed_up",
            Command::SpeedDown => "speed_down",
        }
    }

    /// Inverse of [`name`](Self::name).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Command> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Everything the frame step consumes besides wall time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Held movement keys.
    pub movement: Movement,
    /// Raw mouse delta in pixels since last frame, +y pointing down.
    pub mouse_delta: Vec2,
    /// Scroll in lines since last frame, positive away from the user.
    pub scroll: f32,
    /// Commands fired this frame, applied in order.
    pub commands: Vec<Command>,
}

impl FrameInput {
    /// A frame with no input.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Appends a command.
    #[must_use]
    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Replaces the mouse delta.
    #[must_use]
    pub fn with_mouse_delta(mut self, dx: f32, dy: f32) -> Self {
        self.mouse_delta = Vec2::new(dx, dy);
        self
    }
}
