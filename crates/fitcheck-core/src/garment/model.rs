//! Garment domain models.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::classifier::classify;

/// The outfit slot a garment occupies.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
    Top,
    Bottom,
    #[serde(alias = "full_body")]
    #[strum(to_string = "fullbody", serialize = "full_body")]
    FullBody,
    Accessory,
}

impl Category {
    /// Parses a stored category string, returning `None` for anything unknown.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    /// Resolves the category of a stored wardrobe entry.
    ///
    /// Entries without a category are classified from their name. An entry
    /// stored as `top` whose name now classifies as `fullbody` is switched to
    /// `fullbody`; every other stored category is kept as is.
    pub fn backfill(stored: Option<Category>, name: &str) -> Category {
        let detected = classify(name);
        match stored {
            None => detected,
            Some(Category::Top) if detected == Category::FullBody => Category::FullBody,
            Some(existing) => existing,
        }
    }
}

/// A garment available for try-on.
///
/// Descriptors are immutable once created, except for the category which may
/// be corrected by the wardrobe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentDescriptor {
    /// Stable identifier, unique within the wardrobe
    pub id: String,
    /// Display name
    pub name: String,
    /// Image source: remote URL, data URL or local object reference
    pub url: String,
    /// Catalog price, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub category: Category,
}

impl GarmentDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            price: None,
            category,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Builds the descriptor for a catalog product handed over by the product page.
    ///
    /// An explicit category wins when it parses; otherwise the name is classified.
    pub fn imported(
        product_id: &str,
        name: impl Into<String>,
        url: impl Into<String>,
        price: Option<f64>,
        category_hint: Option<&str>,
        issued_at_millis: i64,
    ) -> Self {
        let name = name.into();
        let category = category_hint
            .and_then(Category::parse_lenient)
            .unwrap_or_else(|| classify(&name));
        Self {
            id: format!("imported-{}-{}", product_id, issued_at_millis),
            name,
            url: url.into(),
            price,
            category,
        }
    }

    /// Builds the descriptor for a file the user uploaded by hand.
    pub fn custom_upload(
        name: impl Into<String>,
        url: impl Into<String>,
        category_hint: Option<Category>,
        issued_at_millis: i64,
    ) -> Self {
        let name = name.into();
        let category = category_hint.unwrap_or_else(|| classify(&name));
        Self {
            id: format!("custom-{}", issued_at_millis),
            name,
            url: url.into(),
            price: None,
            category,
        }
    }

    /// Whether this descriptor came from a manual upload.
    pub fn is_custom_upload(&self) -> bool {
        self.id.starts_with("custom-")
    }
}
