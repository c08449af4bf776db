//! Per-OS directory resolution.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur during platform operations.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Directory name under the OS config/data roots.
pub const APP_NAME: &str = "orrery";

/// OS-specific directory paths for the Orrery.
///
/// XDG on Linux, Known Folders on Windows, Library on macOS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDirs {
    /// `config.ron` lives here.
    pub config_dir: PathBuf,
    /// User scenario files.
    pub scenario_dir: PathBuf,
    /// Log files.
    pub log_dir: PathBuf,
}

impl PlatformDirs {
    /// Resolve platform-specific directories without creating them on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoConfigDir`] if the OS does not expose a
    /// configuration directory.
    pub fn resolve() -> Result<Self, PlatformError> {
        let config_base = dirs::config_dir().ok_or(PlatformError::NoConfigDir)?;
        let app_config = config_base.join(APP_NAME);

        let data_dir = dirs::data_dir()
            .map(|d| d.join(APP_NAME))
            .unwrap_or_else(|| app_config.clone());

        Ok(Self {
            config_dir: app_config.clone(),
            scenario_dir: data_dir.join("scenarios"),
            log_dir: app_config.join("logs"),
        })
    }

    /// Directories rooted under `root`, for `--config` and tests.
    #[must_use]
    pub fn resolve_with_root(root: &Path) -> Self {
        Self {
            config_dir: root.to_path_buf(),
            scenario_dir: root.join("scenarios"),
            log_dir: root.join("logs"),
        }
    }

    /// Create all directories on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Io`] if any directory cannot be created.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.scenario_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }

    /// Relative scenario paths are looked up in [`scenario_dir`] first,
    /// then against the working directory.
    ///
    /// [`scenario_dir`]: Self::scenario_dir
    #[must_use]
    pub fn locate_scenario(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let candidate = self.scenario_dir.join(path);
        if candidate.exists() {
            candidate
        } else {
            path.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_dirs_resolve() {
        let Ok(dirs) = PlatformDirs::resolve() else {
            // Headless CI images may lack a home directory.
            return;
        };
        assert!(dirs.config_dir.is_absolute());
        assert!(dirs.log_dir.starts_with(&dirs.config_dir));
        assert!(dirs.config_dir.ends_with(APP_NAME));
    }

    #[test]
    fn test_directory_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().unwrap();
        assert!(dirs.config_dir.exists());
        assert!(dirs.scenario_dir.exists());
        assert!(dirs.log_dir.exists());
    }

    #[test]
    fn test_locate_scenario_prefers_scenario_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().unwrap();
        std::fs::write(dirs.scenario_dir.join("binary.ron"), "()").unwrap();

        assert_eq!(
            dirs.locate_scenario(Path::new("binary.ron")),
            dirs.scenario_dir.join("binary.ron")
        );
        assert_eq!(
            dirs.locate_scenario(Path::new("missing.ron")),
            PathBuf::from("missing.ron")
        );
    }

    #[test]
    fn test_absolute_scenario_path_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        let absolute = tmp.path().join("elsewhere.ron");
        assert_eq!(dirs.locate_scenario(&absolute), absolute);
    }
}
