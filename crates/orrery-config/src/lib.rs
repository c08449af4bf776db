//! Configuration for the Orrery.
//!
//! Settings persist to disk as a RON file, every section falls back to its
//! defaults when missing, and CLI flags override what was loaded.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CameraConfig, Config, DebugConfig, FeaturesConfig, InputConfig, SimulationConfig,
    WindowConfig,
};
pub use error::ConfigError;
