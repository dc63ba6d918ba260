//! Configuration loading: `config.toml` and `secret.json`.

use std::fs;
use std::path::{Path, PathBuf};

use fitcheck_core::config::{FitCheckConfig, GeminiConfig, SecretConfig};
use fitcheck_core::error::{FitCheckError, Result};
use version_migrate::{FileStorage, FileStorageStrategy, FormatStrategy, LoadBehavior};

use crate::dto::create_config_migrator;

/// Environment variable overriding the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Loads `config.toml`, creating it with defaults when missing.
#[derive(Debug, Clone)]
pub struct ConfigService {
    config_path: PathBuf,
}

impl ConfigService {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<FitCheckConfig> {
        let migrator = create_config_migrator();
        let strategy = FileStorageStrategy::new()
            .with_format(FormatStrategy::Toml)
            .with_load_behavior(LoadBehavior::CreateIfMissing);

        let mut storage = FileStorage::new(self.config_path.clone(), migrator, strategy)
            .map_err(|e| FitCheckError::config(format!("Failed to open config storage: {}", e)))?;

        let configs: Vec<FitCheckConfig> = storage
            .query("fitcheck_config")
            .map_err(|e| FitCheckError::config(format!("Failed to query fitcheck_config: {}", e)))?;

        match configs.into_iter().next() {
            Some(config) => Ok(config),
            None => {
                let default_config = FitCheckConfig::default();
                storage
                    .update_and_save("fitcheck_config", vec![default_config.clone()])
                    .map_err(|e| {
                        FitCheckError::config(format!("Failed to save default config: {}", e))
                    })?;
                tracing::info!("Created default config at {}", self.config_path.display());
                Ok(default_config)
            }
        }
    }
}

/// Loads `secret.json`; `GEMINI_API_KEY` overrides the stored key.
///
/// A missing file is not an error: the result simply has no Gemini entry
/// unless the environment provides a key.
pub fn load_secret_config(secret_path: &Path) -> Result<SecretConfig> {
    let env_key = std::env::var(GEMINI_API_KEY_ENV).ok();
    load_secret_config_with(secret_path, env_key)
}

fn load_secret_config_with(secret_path: &Path, env_key: Option<String>) -> Result<SecretConfig> {
    let mut secrets = if secret_path.exists() {
        let content = fs::read_to_string(secret_path).map_err(|e| {
            FitCheckError::config(format!(
                "Failed to read secret file at {}: {}",
                secret_path.display(),
                e
            ))
        })?;
        serde_json::from_str::<SecretConfig>(&content).map_err(|e| {
            FitCheckError::config(format!(
                "Failed to parse secret file at {}: {}",
                secret_path.display(),
                e
            ))
        })?
    } else {
        SecretConfig::default()
    };

    if let Some(api_key) = env_key.filter(|key| !key.trim().is_empty()) {
        match secrets.gemini.as_mut() {
            Some(gemini) => gemini.api_key = api_key,
            None => {
                secrets.gemini = Some(GeminiConfig {
                    api_key,
                    model_name: None,
                })
            }
        }
    }

    Ok(secrets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));

        let config = service.load().unwrap();
        assert_eq!(config, FitCheckConfig::default());
        assert_eq!(service.load().unwrap(), config);
    }

    #[test]
    fn test_missing_secret_without_env() {
        let temp_dir = TempDir::new().unwrap();
        let secrets = load_secret_config_with(&temp_dir.path().join("secret.json"), None).unwrap();
        assert!(secrets.gemini.is_none());
    }

    #[test]
    fn test_env_key_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        fs::write(
            &path,
            r#"{"gemini": {"api_key": "from-file", "model_name": "custom-model"}}"#,
        )
        .unwrap();

        let from_file = load_secret_config_with(&path, None).unwrap();
        assert_eq!(from_file.gemini.as_ref().unwrap().api_key, "from-file");

        let overridden = load_secret_config_with(&path, Some("from-env".into())).unwrap();
        let gemini = overridden.gemini.unwrap();
        assert_eq!(gemini.api_key, "from-env");
        assert_eq!(gemini.model_name.as_deref(), Some("custom-model"));
    }

    #[test]
    fn test_malformed_secret_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        fs::write(&path, "{oops").unwrap();
        assert!(matches!(
            load_secret_config_with(&path, None),
            Err(FitCheckError::Config(_))
        ));
    }
}
