//! Command-line overrides for the persisted configuration.

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Flags that override settings loaded from `config.ron`.
///
/// Flattened into the application's own parser.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// RON scenario file to load instead of the built-in system.
    #[arg(long)]
    pub scenario: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref scenario) = args.scenario {
            self.simulation.scenario = Some(scenario.clone());
        }
    }
}
