//! Path management for FitCheck files.
//!
//! ```text
//! ~/.config/fitcheck/          # Config directory
//! ├── config.toml              # Application configuration
//! └── secret.json              # API keys
//!
//! ~/.local/share/fitcheck/     # Data directory
//! ├── store/                   # Durable key-value store
//! └── session/                 # Short-lived key-value store
//! ```

use std::path::PathBuf;

use fitcheck_core::config::StorageConfig;
use fitcheck_core::error::{FitCheckError, Result};
use version_migrate::AppPaths;

const APP_NAME: &str = "fitcheck";

/// Resolves FitCheck directories, optionally under an explicit base directory.
///
/// With a base directory (tests, `--home`), the config and data directories
/// are `<base>/config` and `<base>/data`.
#[derive(Debug, Clone, Default)]
pub struct FitCheckPaths {
    base: Option<PathBuf>,
}

impl FitCheckPaths {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    fn app_paths() -> AppPaths {
        AppPaths::new(APP_NAME)
    }

    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base {
            return Ok(base.join("config"));
        }
        Self::app_paths()
            .config_dir()
            .or_else(|_| home_fallback(".config"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base {
            return Ok(base.join("data"));
        }
        Self::app_paths()
            .data_dir()
            .or_else(|_| home_fallback(".local/share"))
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn secret_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    /// Durable store directory, honouring `storage.data_dir`.
    pub fn durable_store_dir(&self, storage: &StorageConfig) -> Result<PathBuf> {
        match &storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.data_dir()?.join("store")),
        }
    }

    /// Short-lived store directory, honouring `storage.session_dir`.
    pub fn session_store_dir(&self, storage: &StorageConfig) -> Result<PathBuf> {
        match &storage.session_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.data_dir()?.join("session")),
        }
    }
}

fn home_fallback(relative: &str) -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(relative).join(APP_NAME))
        .ok_or_else(|| FitCheckError::config("Cannot find home directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_layout() {
        let paths = FitCheckPaths::new(Some(PathBuf::from("/tmp/fc")));
        assert_eq!(paths.config_file().unwrap(), PathBuf::from("/tmp/fc/config/config.toml"));
        assert_eq!(paths.secret_file().unwrap(), PathBuf::from("/tmp/fc/config/secret.json"));

        let storage = StorageConfig::default();
        assert_eq!(
            paths.durable_store_dir(&storage).unwrap(),
            PathBuf::from("/tmp/fc/data/store")
        );
        assert_eq!(
            paths.session_store_dir(&storage).unwrap(),
            PathBuf::from("/tmp/fc/data/session")
        );
    }

    #[test]
    fn test_storage_overrides_win() {
        let paths = FitCheckPaths::new(Some(PathBuf::from("/tmp/fc")));
        let storage = StorageConfig {
            data_dir: Some(PathBuf::from("/srv/durable")),
            session_dir: Some(PathBuf::from("/run/fitcheck")),
        };
        assert_eq!(paths.durable_store_dir(&storage).unwrap(), PathBuf::from("/srv/durable"));
        assert_eq!(paths.session_store_dir(&storage).unwrap(), PathBuf::from("/run/fitcheck"));
    }
}
