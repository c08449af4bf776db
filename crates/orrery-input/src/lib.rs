//! Keyboard and mouse state collected from winit events, and the key
//! bindings that turn it into an [`orrery_sim::FrameInput`] each frame.

pub mod bindings;
pub mod keyboard;
pub mod mouse;

pub use bindings::{Binding, BindingError, Keybindings, MoveDirection, key_from_name};
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::MouseState;
