//! Wires the stores, services and studio from config and secrets.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use fitcheck_application::FitCheckStudio;
use fitcheck_core::error::GenerationError;
use fitcheck_core::generation::{CompositeRequest, GenerationService, ImageResolver};
use fitcheck_core::storage::KeyValueStore;
use fitcheck_core::wardrobe::WardrobeStore;
use fitcheck_infrastructure::{
    ConfigService, FitCheckPaths, JsonFileKeyValueStore, KvPendingImportSource,
    KvSessionRepository, KvWardrobeRepository, load_secret_config,
};
use fitcheck_interaction::{GeminiImageService, HttpImageResolver};

pub struct AppContext {
    pub studio: FitCheckStudio,
    pub imports: KvPendingImportSource,
    pub resolver: Arc<dyn ImageResolver>,
}

impl AppContext {
    pub fn build(home: Option<PathBuf>) -> Result<Self> {
        let paths = FitCheckPaths::new(home);
        let config = ConfigService::new(paths.config_file()?).load()?;
        let secrets = load_secret_config(&paths.secret_file()?)?;

        let durable_dir = paths.durable_store_dir(&config.storage)?;
        let session_dir = paths.session_store_dir(&config.storage)?;
        tracing::debug!(
            "Stores: durable={}, short-lived={}",
            durable_dir.display(),
            session_dir.display()
        );
        let durable: Arc<dyn KeyValueStore> = Arc::new(JsonFileKeyValueStore::new(durable_dir));
        let short_lived: Arc<dyn KeyValueStore> = Arc::new(JsonFileKeyValueStore::new(session_dir));

        let resolver: Arc<dyn ImageResolver> =
            Arc::new(HttpImageResolver::new().with_timeout(config.generation.request_timeout()));
        let generator: Arc<dyn GenerationService> =
            match GeminiImageService::from_config(&config.generation, &secrets, resolver.clone()) {
                Ok(service) => {
                    tracing::debug!("Using image model {}", service.model());
                    Arc::new(service)
                }
                Err(e) => {
                    tracing::debug!("Image generation unavailable: {}", e);
                    Arc::new(UnconfiguredGenerator {
                        reason: e.to_string(),
                    })
                }
            };

        let wardrobe = Arc::new(WardrobeStore::new(Arc::new(
            KvWardrobeRepository::new(durable.clone()).with_mirror(short_lived.clone()),
        )));
        let sessions = Arc::new(KvSessionRepository::new(durable.clone(), short_lived));

        Ok(Self {
            studio: FitCheckStudio::new(wardrobe, sessions, generator, resolver.clone()),
            imports: KvPendingImportSource::new(durable),
            resolver,
        })
    }
}

/// Stands in for the backend when no API key is configured, so commands
/// that never generate keep working.
struct UnconfiguredGenerator {
    reason: String,
}

#[async_trait]
impl GenerationService for UnconfiguredGenerator {
    async fn composite(&self, _request: CompositeRequest) -> Result<String, GenerationError> {
        Err(GenerationError::InvalidInput(self.reason.clone()))
    }

    async fn repose(&self, _base_image: &str, _instruction: &str) -> Result<String, GenerationError> {
        Err(GenerationError::InvalidInput(self.reason.clone()))
    }

    async fn generate_model(&self, _photo: &str) -> Result<String, GenerationError> {
        Err(GenerationError::InvalidInput(self.reason.clone()))
    }
}
