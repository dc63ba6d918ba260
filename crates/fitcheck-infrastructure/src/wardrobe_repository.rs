//! Wardrobe repository over key-value stores.

use std::sync::Arc;

use async_trait::async_trait;
use fitcheck_core::error::{FitCheckError, Result};
use fitcheck_core::garment::GarmentDescriptor;
use fitcheck_core::storage::{KeyValueStore, keys};
use fitcheck_core::wardrobe::{StoredGarment, WardrobeRepository};
use version_migrate::Migrator;

use crate::dto::{StoredWardrobe, create_wardrobe_migrator, normalize_legacy_wardrobe};

/// Stores the wardrobe under [`keys::WARDROBE`].
///
/// Writes go to the durable store and are mirrored into the short-lived store
/// when one is attached. Reads prefer the durable copy.
pub struct KvWardrobeRepository {
    durable: Arc<dyn KeyValueStore>,
    mirror: Option<Arc<dyn KeyValueStore>>,
    migrator: Migrator,
}

impl KvWardrobeRepository {
    pub fn new(durable: Arc<dyn KeyValueStore>) -> Self {
        Self {
            durable,
            mirror: None,
            migrator: create_wardrobe_migrator(),
        }
    }

    pub fn with_mirror(mut self, mirror: Arc<dyn KeyValueStore>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    fn parse(&self, raw: &str) -> Result<Vec<StoredGarment>> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let wardrobe: StoredWardrobe = self
            .migrator
            .load_flat_from("wardrobe", normalize_legacy_wardrobe(value))
            .map_err(|e| FitCheckError::migration(format!("Failed to migrate wardrobe: {}", e)))?;
        Ok(wardrobe.garments)
    }
}

#[async_trait]
impl WardrobeRepository for KvWardrobeRepository {
    async fn load(&self) -> Result<Option<Vec<StoredGarment>>> {
        if let Some(raw) = self.durable.get(keys::WARDROBE)? {
            return self.parse(&raw).map(Some);
        }
        if let Some(mirror) = &self.mirror {
            if let Some(raw) = mirror.get(keys::WARDROBE)? {
                tracing::debug!("Wardrobe restored from short-lived store");
                return self.parse(&raw).map(Some);
            }
        }
        Ok(None)
    }

    async fn save(&self, garments: &[GarmentDescriptor]) -> Result<()> {
        let wardrobe = StoredWardrobe {
            garments: garments.iter().cloned().map(StoredGarment::from).collect(),
        };
        let serialized = self
            .migrator
            .save_domain_flat("wardrobe", &wardrobe)
            .map_err(|e| FitCheckError::persistence(format!("Failed to serialize wardrobe: {}", e)))?;

        self.durable.set(keys::WARDROBE, &serialized)?;
        if let Some(mirror) = &self.mirror {
            if let Err(e) = mirror.set(keys::WARDROBE, &serialized) {
                tracing::debug!("Failed to mirror wardrobe into short-lived store: {}", e);
            }
        }
        Ok(())
    }
}
