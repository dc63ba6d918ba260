//! Wardrobe DTOs and migrator.

use fitcheck_core::wardrobe::StoredGarment;
use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, Versioned};

use super::garment::GarmentRecord;

/// The stored garment list, categories as written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredWardrobe {
    pub garments: Vec<StoredGarment>,
}

/// Wardrobe schema V1.0.0.
///
/// Items may lack a category; the wardrobe store fills it in on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct WardrobeV1_0_0 {
    #[serde(default)]
    pub garments: Vec<GarmentRecord>,
}

impl IntoDomain<StoredWardrobe> for WardrobeV1_0_0 {
    fn into_domain(self) -> StoredWardrobe {
        StoredWardrobe {
            garments: self
                .garments
                .into_iter()
                .map(GarmentRecord::into_stored)
                .collect(),
        }
    }
}

impl version_migrate::FromDomain<StoredWardrobe> for WardrobeV1_0_0 {
    fn from_domain(wardrobe: StoredWardrobe) -> Self {
        WardrobeV1_0_0 {
            garments: wardrobe.garments.into_iter().map(GarmentRecord::from).collect(),
        }
    }
}

/// Lifts the legacy bare-array shape into a V1.0.0 document.
pub fn normalize_legacy_wardrobe(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Array(items) => serde_json::json!({
            "version": "1.0.0",
            "garments": items,
        }),
        other => super::with_legacy_version(other),
    }
}

/// Creates a migrator for the wardrobe list.
pub fn create_wardrobe_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let wardrobe_path = version_migrate::Migrator::define("wardrobe")
        .from::<WardrobeV1_0_0>()
        .into_with_save::<StoredWardrobe>();

    migrator
        .register(wardrobe_path)
        .expect("Failed to register wardrobe migration path");

    migrator
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitcheck_core::garment::{Category, GarmentDescriptor};

    #[test]
    fn test_bare_array_loads() {
        let migrator = create_wardrobe_migrator();
        let value = normalize_legacy_wardrobe(serde_json::json!([
            {"id": "1", "name": "Quần Jean Nam", "url": "jeans.png"},
            {"id": "2", "name": "Bộ Đồ Ngủ", "url": "pj.png", "category": "top"}
        ]));

        let wardrobe: StoredWardrobe = migrator.load_flat_from("wardrobe", value).unwrap();
        assert_eq!(wardrobe.garments.len(), 2);
        assert_eq!(wardrobe.garments[0].category, None);
        assert_eq!(wardrobe.garments[1].category, Some(Category::Top));
    }

    #[test]
    fn test_save_is_versioned() {
        let migrator = create_wardrobe_migrator();
        let wardrobe = StoredWardrobe {
            garments: vec![GarmentDescriptor::new("1", "Áo Thun", "tee.png", Category::Top).into()],
        };
        let json = migrator.save_domain_flat("wardrobe", &wardrobe).unwrap();
        assert!(json.contains("\"version\":\"1.0.0\""));
        assert!(json.contains("\"category\":\"top\""));
    }
}
