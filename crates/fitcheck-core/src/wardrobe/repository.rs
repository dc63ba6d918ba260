//! Wardrobe repository trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::garment::{Category, GarmentDescriptor};

/// A garment exactly as it was read back from storage.
///
/// `category` is `None` when the record carries no category or one that no
/// longer parses. The category backfill runs in the store, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGarment {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl StoredGarment {
    /// Applies the category backfill.
    ///
    /// The flag is `true` when the resolved category differs from what was
    /// stored, meaning the record must be written back.
    pub fn backfilled(self) -> (GarmentDescriptor, bool) {
        let category = Category::backfill(self.category, &self.name);
        let changed = self.category != Some(category);
        let garment = GarmentDescriptor {
            id: self.id,
            name: self.name,
            url: self.url,
            price: self.price,
            category,
        };
        (garment, changed)
    }
}

impl From<GarmentDescriptor> for StoredGarment {
    fn from(garment: GarmentDescriptor) -> Self {
        Self {
            id: garment.id,
            name: garment.name,
            url: garment.url,
            price: garment.price,
            category: Some(garment.category),
        }
    }
}

/// Persistence of the garment list.
#[async_trait]
pub trait WardrobeRepository: Send + Sync {
    /// Reads the stored list without touching categories.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<Vec<StoredGarment>>>;

    /// Replaces the stored list.
    async fn save(&self, garments: &[GarmentDescriptor]) -> Result<()>;
}
