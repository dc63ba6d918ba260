//! Configuration DTOs and migrator.

use fitcheck_core::config::{FitCheckConfig, GenerationConfig, StorageConfig};
use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, Versioned};

/// `config.toml` schema V1.0.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct FitCheckConfigV1_0_0 {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl IntoDomain<FitCheckConfig> for FitCheckConfigV1_0_0 {
    fn into_domain(self) -> FitCheckConfig {
        FitCheckConfig {
            generation: self.generation,
            storage: self.storage,
        }
    }
}

impl version_migrate::FromDomain<FitCheckConfig> for FitCheckConfigV1_0_0 {
    fn from_domain(config: FitCheckConfig) -> Self {
        FitCheckConfigV1_0_0 {
            generation: config.generation,
            storage: config.storage,
        }
    }
}

/// Creates a migrator for `config.toml`.
pub fn create_config_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let config_path = version_migrate::Migrator::define("fitcheck_config")
        .from::<FitCheckConfigV1_0_0>()
        .into_with_save::<FitCheckConfig>();

    migrator
        .register(config_path)
        .expect("Failed to register fitcheck_config migration path");

    migrator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_toml() {
        let migrator = create_config_migrator();
        let toml_value: toml::Value = toml::from_str(
            r#"
version = "1.0.0"

[generation]
model = "custom-image-model"
max_accessories_per_request = 1
"#,
        )
        .unwrap();

        let config: FitCheckConfig = migrator.load_flat_from("fitcheck_config", toml_value).unwrap();
        assert_eq!(config.generation.model, "custom-image-model");
        assert_eq!(config.generation.max_accessories_per_request, Some(1));
        assert_eq!(config.generation.request_timeout_secs, 60);
        assert!(config.storage.data_dir.is_none());
    }
}
