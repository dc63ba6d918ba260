//! Session snapshot DTOs and migrations.
//!
//! - V1.0.0: shape written before versioning. The outfit may carry a singular
//!   `accessory` instead of `accessories`, may lack `fullbody`, and the cursor
//!   and pose may be missing.
//! - V2.0.0: `accessories` array and explicit `fullbody` on every outfit.
//!
//! Field names follow the camelCase keys of the stored documents.

use fitcheck_core::history::HistoryEntry;
use fitcheck_core::outfit::OutfitState;
use fitcheck_core::pose::Pose;
use fitcheck_core::session::SessionSnapshot;
use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, MigratesTo, Versioned};

use super::garment::GarmentRecord;

// ============================================================================
// V1.0.0
// ============================================================================

/// Outfit as stored by V1.0.0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutfitRecordV1_0_0 {
    #[serde(default)]
    pub top: Option<GarmentRecord>,
    #[serde(default)]
    pub bottom: Option<GarmentRecord>,
    #[serde(default)]
    pub fullbody: Option<GarmentRecord>,
    #[serde(default)]
    pub accessories: Option<Vec<GarmentRecord>>,
    /// Single accessory slot that predates `accessories`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessory: Option<GarmentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryV1_0_0 {
    #[serde(flatten)]
    pub outfit: OutfitRecordV1_0_0,
    pub result_image: String,
    #[serde(default)]
    pub pose: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshotV1_0_0 {
    #[serde(default)]
    pub model_image_url: String,
    #[serde(default)]
    pub current_outfit: Option<OutfitRecordV1_0_0>,
    #[serde(default)]
    pub history: Vec<HistoryEntryV1_0_0>,
    #[serde(default)]
    pub history_index: Option<i64>,
    #[serde(default)]
    pub current_pose_id: Option<String>,
}

// ============================================================================
// V2.0.0
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutfitRecordV2_0_0 {
    pub top: Option<GarmentRecord>,
    pub bottom: Option<GarmentRecord>,
    pub fullbody: Option<GarmentRecord>,
    #[serde(default)]
    pub accessories: Vec<GarmentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryV2_0_0 {
    #[serde(flatten)]
    pub outfit: OutfitRecordV2_0_0,
    pub result_image: String,
    pub pose: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "2.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshotV2_0_0 {
    pub model_image_url: String,
    pub current_outfit: OutfitRecordV2_0_0,
    #[serde(default)]
    pub history: Vec<HistoryEntryV2_0_0>,
    /// `-1` when the history is empty
    pub history_index: i64,
    pub current_pose_id: String,
}

// ============================================================================
// Migration implementations
// ============================================================================

impl OutfitRecordV1_0_0 {
    /// Wraps a singular `accessory` into `accessories` and drops the old field.
    fn migrate(self) -> OutfitRecordV2_0_0 {
        let accessories = match (self.accessories, self.accessory) {
            (Some(accessories), _) => accessories,
            (None, Some(single)) => vec![single],
            (None, None) => Vec::new(),
        };
        OutfitRecordV2_0_0 {
            top: self.top,
            bottom: self.bottom,
            fullbody: self.fullbody,
            accessories,
        }
    }
}

impl MigratesTo<SessionSnapshotV2_0_0> for SessionSnapshotV1_0_0 {
    fn migrate(self) -> SessionSnapshotV2_0_0 {
        let history = self
            .history
            .into_iter()
            .map(|entry| HistoryEntryV2_0_0 {
                outfit: entry.outfit.migrate(),
                result_image: entry.result_image,
                pose: entry.pose.unwrap_or_else(|| Pose::Standing.to_string()),
            })
            .collect();

        SessionSnapshotV2_0_0 {
            model_image_url: self.model_image_url,
            current_outfit: self.current_outfit.unwrap_or_default().migrate(),
            history,
            history_index: self.history_index.unwrap_or(-1),
            current_pose_id: self
                .current_pose_id
                .unwrap_or_else(|| Pose::Standing.to_string()),
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl OutfitRecordV2_0_0 {
    fn into_domain(self) -> OutfitState {
        OutfitState::from_parts(
            self.top.map(GarmentRecord::into_descriptor),
            self.bottom.map(GarmentRecord::into_descriptor),
            self.fullbody.map(GarmentRecord::into_descriptor),
            self.accessories
                .into_iter()
                .map(GarmentRecord::into_descriptor)
                .collect(),
        )
    }

    fn from_domain(outfit: &OutfitState) -> Self {
        Self {
            top: outfit.top().cloned().map(GarmentRecord::from),
            bottom: outfit.bottom().cloned().map(GarmentRecord::from),
            fullbody: outfit.fullbody().cloned().map(GarmentRecord::from),
            accessories: outfit
                .accessories()
                .iter()
                .cloned()
                .map(GarmentRecord::from)
                .collect(),
        }
    }
}

impl IntoDomain<SessionSnapshot> for SessionSnapshotV2_0_0 {
    fn into_domain(self) -> SessionSnapshot {
        let entries = self
            .history
            .into_iter()
            .map(|entry| {
                HistoryEntry::new(
                    entry.outfit.into_domain(),
                    entry.result_image,
                    Pose::from_stored(Some(&entry.pose)),
                )
            })
            .collect();
        let cursor = usize::try_from(self.history_index).ok();

        SessionSnapshot::from_stored(
            self.model_image_url,
            self.current_outfit.into_domain(),
            entries,
            cursor,
            Pose::from_stored(Some(&self.current_pose_id)),
        )
    }
}

impl version_migrate::FromDomain<SessionSnapshot> for SessionSnapshotV2_0_0 {
    fn from_domain(snapshot: SessionSnapshot) -> Self {
        let history: Vec<HistoryEntryV2_0_0> = snapshot
            .history()
            .entries()
            .iter()
            .map(|entry| HistoryEntryV2_0_0 {
                outfit: OutfitRecordV2_0_0::from_domain(&entry.outfit),
                result_image: entry.result_image.clone(),
                pose: entry.pose.to_string(),
            })
            .collect();
        let history_index = snapshot.cursor().map(|index| index as i64).unwrap_or(-1);

        SessionSnapshotV2_0_0 {
            current_outfit: OutfitRecordV2_0_0::from_domain(&snapshot.outfit),
            history,
            history_index,
            current_pose_id: snapshot.pose.to_string(),
            model_image_url: snapshot.model_image_url,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates a migrator for session snapshots.
///
/// # Migration Path
///
/// - V1.0.0 → V2.0.0: folds `accessory` into `accessories`, defaults `fullbody`,
///   cursor (`-1`) and pose (`standing`)
/// - V2.0.0 → SessionSnapshot: trims the history to the entry under the cursor
pub fn create_session_snapshot_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let snapshot_path = version_migrate::Migrator::define("session_snapshot")
        .from::<SessionSnapshotV1_0_0>()
        .step::<SessionSnapshotV2_0_0>()
        .into_with_save::<SessionSnapshot>();

    migrator
        .register(snapshot_path)
        .expect("Failed to register session_snapshot migration path");

    migrator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::with_legacy_version;
    use fitcheck_core::garment::Category;

    #[test]
    fn test_legacy_accessory_is_wrapped() {
        let migrator = create_session_snapshot_migrator();
        let value = with_legacy_version(serde_json::json!({
            "modelImageUrl": "data:image/png;base64,AAAA",
            "currentOutfit": {
                "top": null,
                "bottom": null,
                "accessory": {"id": "a1", "name": "Nón Lưỡi Trai", "url": "cap.png", "category": "accessory"}
            }
        }));

        let snapshot: SessionSnapshot = migrator
            .load_flat_from("session_snapshot", value)
            .expect("legacy snapshot should migrate");

        let ids: Vec<_> = snapshot.outfit.accessories().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a1"]);
        assert!(snapshot.outfit.fullbody().is_none());
        assert_eq!(snapshot.pose, Pose::Standing);
        assert_eq!(snapshot.cursor(), None);
    }

    #[test]
    fn test_legacy_history_entries_migrate() {
        let migrator = create_session_snapshot_migrator();
        let value = with_legacy_version(serde_json::json!({
            "modelImageUrl": "model.png",
            "currentOutfit": {"top": {"id": "t1", "name": "Áo Thun", "url": "tee.png"}, "bottom": null, "accessories": []},
            "history": [
                {"top": null, "bottom": null, "accessories": [], "fullbody": null, "resultImage": "model.png", "pose": "standing"},
                {"top": {"id": "t1", "name": "Áo Thun", "url": "tee.png"}, "bottom": null, "accessory": null, "resultImage": "r1.png", "pose": "walking"}
            ],
            "historyIndex": 1,
            "currentPoseId": "walking"
        }));

        let snapshot: SessionSnapshot = migrator.load_flat_from("session_snapshot", value).unwrap();
        assert_eq!(snapshot.history().len(), 1);
        let entry = snapshot.current_entry().unwrap();
        assert_eq!(entry.result_image, "r1.png");
        assert_eq!(entry.pose, Pose::Walking);
        assert_eq!(entry.outfit.top().unwrap().category, Category::Top);
    }

    #[test]
    fn test_save_writes_current_version() {
        let migrator = create_session_snapshot_migrator();
        let snapshot = SessionSnapshot::from_stored(
            "model.png",
            OutfitState::empty(),
            vec![HistoryEntry::base("model.png")],
            Some(0),
            Pose::Side,
        );

        let json = migrator
            .save_domain_flat("session_snapshot", &snapshot)
            .unwrap();
        assert!(json.contains("\"version\":\"2.0.0\""));
        assert!(json.contains("\"currentPoseId\":\"side\""));
        assert!(json.contains("\"historyIndex\":0"));
    }
}
