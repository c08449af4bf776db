//! Scene construction and lookup errors.

use std::path::PathBuf;

/// Errors raised while building a [`Scene`](crate::Scene) from a scenario or
/// resolving a body by name.
///
/// None of these are fatal to the frame loop: load-time errors reject the
/// scenario, lookup errors reject the single operation that caused them.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Two bodies share the same name.
    #[error("duplicate body name: {0}")]
    DuplicateBody(String),

    /// A body names a parent that does not exist in the scenario.
    #[error("body {body} references unknown parent {parent}")]
    UnknownParent {
        /// The child body.
        body: String,
        /// The missing parent name.
        parent: String,
    },

    /// Following parent links from this body leads back to it.
    #[error("parent cycle involving body {0}")]
    ParentCycle(String),

    /// Radius must be finite and strictly positive.
    #[error("body {body} has invalid radius {radius}")]
    InvalidRadius {
        /// The offending body.
        body: String,
        /// The rejected radius.
        radius: f32,
    },

    /// Orbit radius must be finite and non-negative.
    #[error("body {body} has invalid orbit radius {orbit_radius}")]
    InvalidOrbitRadius {
        /// The offending body.
        body: String,
        /// The rejected orbit radius.
        orbit_radius: f32,
    },

    /// The rotation axis cannot be normalized.
    #[error("body {0} has a zero-length rotation axis")]
    ZeroRotationAxis(String),

    /// A lookup by name found nothing.
    #[error("unknown body: {0}")]
    UnknownBody(String),

    /// The lockable list names a body that does not exist.
    #[error("lockable list references unknown body {0}")]
    UnknownLockable(String),

    /// An eclipse role names a body that does not exist.
    #[error("eclipse {role} references unknown body {name}")]
    UnknownEclipseBody {
        /// Which role (`sun`, `planet`, `moon`).
        role: &'static str,
        /// The missing body name.
        name: String,
    },

    /// The scenario file could not be read.
    #[error("failed to read scenario {path}: {source}")]
    ScenarioRead {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The scenario file is not valid RON for [`ScenarioDef`](crate::ScenarioDef).
    #[error("failed to parse scenario: {0}")]
    ScenarioParse(#[source] ron::error::SpannedError),
}
