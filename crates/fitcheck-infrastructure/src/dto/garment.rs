//! Garment record shared by the wardrobe and session DTOs.

use fitcheck_core::garment::{Category, GarmentDescriptor};
use fitcheck_core::wardrobe::StoredGarment;
use serde::{Deserialize, Serialize};

/// A stored garment.
///
/// The category is optional because lists written before categories existed
/// carry none; unknown category strings are treated the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl GarmentRecord {
    /// Reads the record as stored; unknown category strings become `None`.
    pub fn into_stored(self) -> StoredGarment {
        StoredGarment {
            category: self.category.as_deref().and_then(Category::parse_lenient),
            id: self.id,
            name: self.name,
            url: self.url,
            price: self.price,
        }
    }

    /// Converts to a descriptor, applying the category backfill rule.
    pub fn into_descriptor(self) -> GarmentDescriptor {
        self.into_stored().backfilled().0
    }
}

impl From<StoredGarment> for GarmentRecord {
    fn from(garment: StoredGarment) -> Self {
        Self {
            id: garment.id,
            name: garment.name,
            url: garment.url,
            price: garment.price,
            category: garment.category.map(|category| category.to_string()),
        }
    }
}

impl From<GarmentDescriptor> for GarmentRecord {
    fn from(garment: GarmentDescriptor) -> Self {
        Self {
            id: garment.id,
            name: garment.name,
            url: garment.url,
            price: garment.price,
            category: Some(garment.category.to_string()),
        }
    }
}
