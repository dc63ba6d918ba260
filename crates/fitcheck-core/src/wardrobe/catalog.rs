//! Garments seeded into an empty wardrobe.

use crate::garment::{Category, GarmentDescriptor};

const CATALOG_BASE_URL: &str = "https://static.fitcheck.app/wardrobe";

/// The default wardrobe, used when nothing is stored or the stored list is unreadable.
pub fn default_catalog() -> Vec<GarmentDescriptor> {
    [
        ("default-white-shirt", "Áo Sơ Mi Trắng", "white-shirt.png", Category::Top, 350_000.0),
        ("default-denim-jacket", "Denim Jacket", "denim-jacket.png", Category::Top, 590_000.0),
        ("default-jeans", "Quần Jean Nam", "jeans.png", Category::Bottom, 450_000.0),
        ("default-pleated-skirt", "Chân Váy Xếp Ly", "pleated-skirt.png", Category::Bottom, 320_000.0),
        ("default-ao-dai", "Áo Dài Cách Tân", "ao-dai.png", Category::FullBody, 890_000.0),
        ("default-cap", "Nón Lưỡi Trai", "cap.png", Category::Accessory, 150_000.0),
        ("default-crossbody-bag", "Túi Đeo Chéo", "crossbody-bag.png", Category::Accessory, 280_000.0),
    ]
    .into_iter()
    .map(|(id, name, file, category, price)| {
        GarmentDescriptor::new(id, name, format!("{CATALOG_BASE_URL}/{file}"), category)
            .with_price(price)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garment::classify;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_is_consistent() {
        let catalog = default_catalog();
        let ids: HashSet<_> = catalog.iter().map(|g| g.id.as_str()).collect();
        let urls: HashSet<_> = catalog.iter().map(|g| g.url.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
        assert_eq!(urls.len(), catalog.len());
        // Seeded categories agree with the classifier, so backfill leaves them alone
        for garment in &catalog {
            assert_eq!(classify(&garment.name), garment.category, "{}", garment.name);
        }
    }
}
