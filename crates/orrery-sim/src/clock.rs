//! Simulated time: speed multiplier, freeze state, and eclipse watch.
//!
//! The clock is either `Running(speed)` or `Frozen(at)`. Entering an eclipse
//! watch speeds the clock up; the first matching detection freezes it at the
//! current simulated time until the watch is exited.

use tracing::{debug, info, warn};

use crate::eclipse::EclipseKind;

/// Tunables for [`SimulationClock`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockSettings {
    /// Speed multiplier at start-up and after leaving an eclipse watch.
    pub initial_speed: f64,
    /// Speed multiplier while an eclipse watch is active.
    pub watch_speed: f64,
    /// Factor applied by [`SimulationClock::speed_up`] / [`SimulationClock::speed_down`].
    pub speed_step: f64,
    /// Lower bound for manual speed changes (> 0).
    pub min_speed: f64,
    /// Upper bound for manual speed changes.
    pub max_speed: f64,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            initial_speed: 1.0,
            watch_speed: 3.0,
            speed_step: 2.0,
            min_speed: 1.0 / 16.0,
            max_speed: 64.0,
        }
    }
}

impl ClockSettings {
    /// Returns settings the clock can run on: every speed finite and
    /// positive, and `min_speed <= max_speed`. Bad values fall back to the
    /// defaults and inverted bounds are swapped.
    #[must_use]
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let mut min_speed = positive_or(self.min_speed, defaults.min_speed, "min_speed");
        let mut max_speed = positive_or(self.max_speed, defaults.max_speed, "max_speed");
        if min_speed > max_speed {
            warn!("min_speed {min_speed} exceeds max_speed {max_speed}, swapping");
            std::mem::swap(&mut min_speed, &mut max_speed);
        }
        Self {
            initial_speed: positive_or(self.initial_speed, defaults.initial_speed, "initial_speed"),
            watch_speed: positive_or(self.watch_speed, defaults.watch_speed, "watch_speed"),
            speed_step: positive_or(self.speed_step, defaults.speed_step, "speed_step"),
            min_speed,
            max_speed,
        }
    }
}

fn positive_or(value: f64, fallback: f64, name: &str) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!("Clock {name} must be finite and positive, got {value}; using {fallback}");
        fallback
    }
}

/// Observable state of the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockState {
    /// Time advances by `wall_dt · speed`.
    Running {
        /// Current multiplier.
        speed: f64,
    },
    /// Time is pinned.
    Frozen {
        /// The pinned simulated time.
        at: f64,
    },
}

/// One-shot notification emitted when a watched eclipse freezes the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipseEvent {
    /// Which eclipse occurred.
    pub kind: EclipseKind,
    /// Simulated time the clock froze at.
    pub simulated_time: f64,
}

/// Owns simulated time for the session.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    settings: ClockSettings,
    time: f64,
    speed: f64,
    frozen_at: Option<f64>,
    watch: Option<EclipseKind>,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(ClockSettings::default())
    }
}

impl SimulationClock {
    /// Creates a running clock at time zero. `settings` pass through
    /// [`ClockSettings::validated`] first.
    #[must_use]
    pub fn new(settings: ClockSettings) -> Self {
        let settings = settings.validated();
        Self {
            settings,
            time: 0.0,
            speed: settings.initial_speed,
            frozen_at: None,
            watch: None,
        }
    }

    /// Simulated time reported to consumers. Equals the freeze point exactly
    /// while frozen.
    #[must_use]
    pub fn simulated_time(&self) -> f64 {
        self.frozen_at.unwrap_or(self.time)
    }

    /// Current speed multiplier (kept while frozen).
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Whether time is pinned.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen_at.is_some()
    }

    /// The eclipse kind being watched, if any.
    #[must_use]
    pub fn watch(&self) -> Option<EclipseKind> {
        self.watch
    }

    /// Running or frozen, with the relevant value.
    #[must_use]
    pub fn state(&self) -> ClockState {
        match self.frozen_at {
            Some(at) => ClockState::Frozen { at },
            None => ClockState::Running { speed: self.speed },
        }
    }

    /// Advances simulated time by `wall_dt · speed` and returns the advance.
    ///
    /// Returns 0 while frozen. Negative or non-finite deltas count as 0.
    pub fn tick(&mut self, wall_dt: f64) -> f64 {
        if self.frozen_at.is_some() || !wall_dt.is_finite() || wall_dt <= 0.0 {
            return 0.0;
        }
        let advance = wall_dt * self.speed;
        self.time += advance;
        advance
    }

    /// Starts watching for `kind` at the accelerated watch speed.
    ///
    /// Returns `false` and changes nothing while frozen: a pending freeze is
    /// only released by [`exit_eclipse_watch`](Self::exit_eclipse_watch).
    pub fn enter_eclipse_watch(&mut self, kind: EclipseKind) -> bool {
        if self.frozen_at.is_some() {
            debug!("Ignoring {kind} eclipse watch request while frozen");
            return false;
        }
        self.watch = Some(kind);
        self.speed = self.settings.watch_speed;
        info!("Watching for {kind} eclipse at {:.1}x", self.speed);
        true
    }

    /// Leaves watch mode, un-freezes, and restores the initial speed.
    ///
    /// Returns `true` if a watch or freeze was active.
    pub fn exit_eclipse_watch(&mut self) -> bool {
        let was_active = self.watch.is_some() || self.frozen_at.is_some();
        if let Some(at) = self.frozen_at.take() {
            self.time = at;
        }
        self.watch = None;
        self.speed = self.settings.initial_speed;
        if was_active {
            info!("Eclipse watch ended at t={:.3}", self.time);
        }
        was_active
    }

    /// Feeds this frame's detection result. Freezes on the first detection
    /// of the watched kind and returns the event exactly once.
    pub fn observe(&mut self, detected: Option<EclipseKind>) -> Option<EclipseEvent> {
        let watched = self.watch?;
        if self.frozen_at.is_some() || detected != Some(watched) {
            return None;
        }
        self.frozen_at = Some(self.time);
        info!("{watched} eclipse at t={:.3}, clock frozen", self.time);
        Some(EclipseEvent {
            kind: watched,
            simulated_time: self.time,
        })
    }

    /// Multiplies the speed by the step factor, clamped to the maximum.
    pub fn speed_up(&mut self) -> f64 {
        self.set_speed(self.speed * self.settings.speed_step)
    }

    /// Divides the speed by the step factor, clamped to the minimum.
    pub fn speed_down(&mut self) -> f64 {
        self.set_speed(self.speed / self.settings.speed_step)
    }

    fn set_speed(&mut self, speed: f64) -> f64 {
        self.speed = speed.clamp(self.settings.min_speed, self.settings.max_speed);
        debug!("Simulation speed {:.3}x", self.speed);
        self.speed
    }
}
