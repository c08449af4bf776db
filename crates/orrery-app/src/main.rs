//! The `orrery` binary.

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use orrery_app::AppError;
use orrery_app::headless::{HeadlessOptions, run_headless};
use orrery_app::platform::PlatformDirs;
use orrery_app::settings::{build_orrery, keybindings};
use orrery_config::{CliArgs, Config};
use orrery_render::LogSink;
use orrery_sim::EclipseKind;
use tracing::{error, info, warn};

/// Sun, Earth and Moon orrery.
#[derive(Parser, Debug)]
#[command(name = "orrery", version)]
struct AppArgs {
    #[command(flatten)]
    cli: CliArgs,

    /// Run without a window and exit after `--frames` frames.
    #[arg(long)]
    headless: bool,

    /// Frames to simulate in headless mode.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Start an eclipse watch immediately.
    #[arg(long, value_enum)]
    watch: Option<WatchArg>,

    /// Lock the camera onto a body by name at start-up.
    #[arg(long)]
    lock: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WatchArg {
    Solar,
    Lunar,
}

impl From<WatchArg> for EclipseKind {
    fn from(arg: WatchArg) -> Self {
        match arg {
            WatchArg::Solar => EclipseKind::Solar,
            WatchArg::Lunar => EclipseKind::Lunar,
        }
    }
}

fn main() -> ExitCode {
    let args = AppArgs::parse();

    let dirs = match args.cli.config.as_deref() {
        Some(root) => Ok(PlatformDirs::resolve_with_root(root)),
        None => PlatformDirs::resolve(),
    };
    let dirs = match dirs.and_then(|dirs| dirs.create_dirs().map(|()| dirs)) {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to initialize platform directories: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args.cli);

    orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!("Config directory: {}", dirs.config_dir.display());

    match run(args, config, &dirs) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: AppArgs, config: Config, dirs: &PlatformDirs) -> Result<(), AppError> {
    let mut orrery = build_orrery(&config, dirs)?;

    if args.headless {
        let options = HeadlessOptions {
            frames: args.frames,
            watch: args.watch.map(EclipseKind::from),
            lock: args.lock,
            ..HeadlessOptions::default()
        };
        let mut sink = LogSink::new(config.debug.log_frame_events, 60);
        let report = run_headless(&mut orrery, &options, &mut sink)?;
        for eclipse in &report.eclipses {
            info!("{} eclipse at t={:.3}", eclipse.kind, eclipse.simulated_time);
        }
        return Ok(());
    }

    if let Some(name) = &args.lock {
        orrery.lock_onto_name(name)?;
    }
    if let Some(kind) = args.watch
        && let Err(reason) = orrery.enter_eclipse_watch(kind.into())
    {
        warn!("Cannot start eclipse watch: {reason}");
    }

    let bindings = keybindings(&config);
    orrery_app::window::run(config, orrery, bindings)
}
