//! Configuration model.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use version_migrate::DeriveQueryable as Queryable;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Queryable)]
#[queryable(entity = "fitcheck_config")]
pub struct FitCheckConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Settings of the image generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub api_base_url: String,
    pub model: String,
    /// Upper bound of a single generation call
    pub request_timeout_secs: u64,
    /// Accessory images sent per call; `None` sends all of them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_accessories_per_request: Option<usize>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_accessories_per_request: None,
        }
    }
}

impl GenerationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Overrides of the store locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the durable store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Directory of the short-lived store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_dir: Option<PathBuf>,
}

/// Root of `secret.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FitCheckConfig = toml::from_str(
            r#"
            [generation]
            api_base_url = "http://localhost:8080"
            model = "test-model"
            request_timeout_secs = 0
            max_accessories_per_request = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.generation.max_accessories_per_request, Some(1));
        assert_eq!(config.generation.request_timeout(), Duration::from_secs(1));
        assert_eq!(config.storage, StorageConfig::default());
    }
}
