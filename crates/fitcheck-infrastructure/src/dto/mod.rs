//! Data Transfer Objects (DTOs) for persistence.
//!
//! Every stored document is a flat JSON (or TOML) object carrying a
//! `version` key. Documents written before versioning have no such key and are
//! read as `1.0.0`.
//!
//! ### Session snapshot
//! - **1.0.0**: legacy shape (singular `accessory`, optional `fullbody`)
//! - **2.0.0**: `accessories` array, explicit `fullbody`
//!
//! ### Wardrobe
//! - **1.0.0**: `{ garments: [...] }`; a bare array is the pre-versioning shape
//!
//! ### Config
//! - **1.0.0**: `generation` and `storage` tables

mod config;
mod garment;
mod session;
mod wardrobe;

pub use config::{FitCheckConfigV1_0_0, create_config_migrator};
pub use garment::GarmentRecord;
pub use session::{
    HistoryEntryV1_0_0, HistoryEntryV2_0_0, OutfitRecordV1_0_0, OutfitRecordV2_0_0,
    SessionSnapshotV1_0_0, SessionSnapshotV2_0_0, create_session_snapshot_migrator,
};
pub use wardrobe::{StoredWardrobe, WardrobeV1_0_0, create_wardrobe_migrator, normalize_legacy_wardrobe};

/// Version assumed for documents stored without a `version` key.
pub const LEGACY_VERSION: &str = "1.0.0";

/// Tags an unversioned JSON object as [`LEGACY_VERSION`].
///
/// Anything that is not an object, or already has a version, is returned untouched.
pub fn with_legacy_version(mut value: serde_json::Value) -> serde_json::Value {
    if let Some(object) = value.as_object_mut() {
        if !object.contains_key("version") {
            object.insert(
                "version".to_string(),
                serde_json::Value::String(LEGACY_VERSION.to_string()),
            );
        }
    }
    value
}
