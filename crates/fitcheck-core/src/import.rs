//! One-shot garment handoff from the product catalog.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::garment::GarmentDescriptor;

/// Catalog product id; the catalog writes either a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Text(id) => f.write_str(id),
            ProductId::Number(id) => write!(f, "{}", id),
        }
    }
}

/// The record left by the product page for the try-on studio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingImport {
    pub id: ProductId,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
}

impl PendingImport {
    /// Converts the record into a wardrobe garment issued at `issued_at_millis`.
    pub fn into_descriptor(self, issued_at_millis: i64) -> GarmentDescriptor {
        GarmentDescriptor::imported(
            &self.id.to_string(),
            self.name,
            self.url,
            self.price,
            self.category.as_deref(),
            issued_at_millis,
        )
    }
}

/// Source of pending imports.
#[async_trait]
pub trait PendingImportSource: Send + Sync {
    /// Removes and returns the pending record.
    ///
    /// The record is deleted even when it cannot be parsed; an unparseable
    /// record yields `Err` once and `Ok(None)` afterwards.
    async fn take(&self) -> Result<Option<PendingImport>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garment::Category;

    #[test]
    fn test_numeric_and_text_ids() {
        let numeric: PendingImport =
            serde_json::from_str(r#"{"id": 42, "name": "Quần Jean Nam", "url": "jeans.png", "price": 450000}"#)
                .unwrap();
        assert_eq!(numeric.id.to_string(), "42");

        let text: PendingImport =
            serde_json::from_str(r#"{"id": "p-7", "name": "Áo Thun", "url": "tee.png"}"#).unwrap();
        assert_eq!(text.id.to_string(), "p-7");
        assert_eq!(text.price, None);
    }

    #[test]
    fn test_into_descriptor_classifies_without_hint() {
        let record: PendingImport =
            serde_json::from_str(r#"{"id": 42, "name": "Quần Jean Nam", "url": "jeans.png"}"#).unwrap();
        let garment = record.into_descriptor(1_700_000_000_000);
        assert_eq!(garment.id, "imported-42-1700000000000");
        assert_eq!(garment.category, Category::Bottom);
    }

    #[test]
    fn test_into_descriptor_uses_explicit_category() {
        let record: PendingImport = serde_json::from_str(
            r#"{"id": "9", "name": "Quần Jean Nam", "url": "jeans.png", "category": "accessory"}"#,
        )
        .unwrap();
        assert_eq!(record.into_descriptor(1).category, Category::Accessory);
    }
}
