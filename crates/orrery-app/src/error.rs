use orrery_config::ConfigError;
use orrery_sim::SceneError;
use thiserror::Error;

use crate::platform::PlatformError;

/// Anything that stops the application from starting.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("scene: {0}")]
    Scene(#[from] SceneError),
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}
