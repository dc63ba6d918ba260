//! In-memory wardrobe backed by a [`WardrobeRepository`].

use std::sync::Arc;

use tokio::sync::RwLock;

use super::catalog::default_catalog;
use super::repository::{StoredGarment, WardrobeRepository};
use crate::garment::{Category, GarmentDescriptor};

/// The garments available for try-on.
///
/// Every mutation writes the full list through the repository. Write failures
/// are logged and never reach the caller.
pub struct WardrobeStore {
    garments: RwLock<Vec<GarmentDescriptor>>,
    repository: Arc<dyn WardrobeRepository>,
}

impl WardrobeStore {
    /// Creates an empty store. Call [`load`](Self::load) before use.
    pub fn new(repository: Arc<dyn WardrobeRepository>) -> Self {
        Self {
            garments: RwLock::new(Vec::new()),
            repository,
        }
    }

    /// Loads the stored list, seeding the default catalog when absent or unreadable.
    ///
    /// The category backfill runs over every item; the list is written back
    /// when it was seeded or any category changed.
    pub async fn load(&self) -> Vec<GarmentDescriptor> {
        let stored: Vec<StoredGarment> = match self.repository.load().await {
            Ok(Some(items)) => items,
            Ok(None) => {
                tracing::info!("No stored wardrobe, seeding default catalog");
                return self.seed().await;
            }
            Err(e) => {
                tracing::warn!("Failed to load wardrobe, seeding default catalog: {}", e);
                return self.seed().await;
            }
        };

        let mut dirty = false;
        let garments: Vec<GarmentDescriptor> = stored
            .into_iter()
            .map(|record| {
                let previous = record.category;
                let (garment, changed) = record.backfilled();
                if changed {
                    tracing::info!(
                        "Backfilled category of '{}': {} -> {}",
                        garment.name,
                        previous.map(|c| c.to_string()).unwrap_or_else(|| "none".into()),
                        garment.category
                    );
                    dirty = true;
                }
                garment
            })
            .collect();

        if dirty {
            self.persist(&garments).await;
        }

        *self.garments.write().await = garments.clone();
        garments
    }

    async fn seed(&self) -> Vec<GarmentDescriptor> {
        let garments = default_catalog();
        self.persist(&garments).await;
        *self.garments.write().await = garments.clone();
        garments
    }

    /// Inserts `garment` at the front unless an entry with the same url exists.
    ///
    /// Returns `true` when the garment was inserted.
    pub async fn add(&self, garment: GarmentDescriptor) -> bool {
        let snapshot = {
            let mut garments = self.garments.write().await;
            if garments.iter().any(|existing| existing.url == garment.url) {
                tracing::debug!("Wardrobe already holds url of '{}'", garment.name);
                return false;
            }
            garments.insert(0, garment);
            garments.clone()
        };
        self.persist(&snapshot).await;
        true
    }

    /// Changes the category of the garment with `id`.
    ///
    /// Returns `false` without writing when the garment is unknown or already
    /// has that category.
    pub async fn update_category(&self, id: &str, category: Category) -> bool {
        let snapshot = {
            let mut garments = self.garments.write().await;
            match garments.iter_mut().find(|garment| garment.id == id) {
                Some(garment) if garment.category != category => {
                    garment.category = category;
                }
                _ => return false,
            }
            garments.clone()
        };
        self.persist(&snapshot).await;
        true
    }

    pub async fn list(&self) -> Vec<GarmentDescriptor> {
        self.garments.read().await.clone()
    }

    pub async fn find(&self, id: &str) -> Option<GarmentDescriptor> {
        self.garments
            .read()
            .await
            .iter()
            .find(|garment| garment.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.garments.read().await.len()
    }

    async fn persist(&self, garments: &[GarmentDescriptor]) {
        if let Err(e) = self.repository.save(garments).await {
            tracing::warn!("Failed to persist wardrobe ({} items): {}", garments.len(), e);
        }
    }
}
