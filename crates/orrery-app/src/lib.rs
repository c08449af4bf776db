//! Orrery application: platform directories, configuration wiring, the
//! windowed winit loop and a headless runner.

pub mod error;
pub mod frame_timer;
pub mod headless;
pub mod platform;
pub mod settings;
pub mod window;

pub use error::AppError;
