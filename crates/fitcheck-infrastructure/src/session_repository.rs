//! Session repository over key-value stores.

use std::sync::Arc;

use async_trait::async_trait;
use fitcheck_core::error::{FitCheckError, Result};
use fitcheck_core::session::{SessionRepository, SessionSnapshot};
use fitcheck_core::storage::{KeyValueStore, keys};
use version_migrate::Migrator;

use crate::dto::{create_session_snapshot_migrator, with_legacy_version};

/// Keeps the trimmed snapshot in the durable store and the model image and
/// uploaded photo in the short-lived store.
pub struct KvSessionRepository {
    durable: Arc<dyn KeyValueStore>,
    short_lived: Arc<dyn KeyValueStore>,
    migrator: Migrator,
}

impl KvSessionRepository {
    pub fn new(durable: Arc<dyn KeyValueStore>, short_lived: Arc<dyn KeyValueStore>) -> Self {
        Self {
            durable,
            short_lived,
            migrator: create_session_snapshot_migrator(),
        }
    }
}

#[async_trait]
impl SessionRepository for KvSessionRepository {
    async fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let serialized = self
            .migrator
            .save_domain_flat("session_snapshot", snapshot)
            .map_err(|e| FitCheckError::persistence(format!("Failed to serialize session: {}", e)))?;
        self.durable.set(keys::CURRENT_SESSION, &serialized)
    }

    async fn load_snapshot(&self) -> Result<Option<SessionSnapshot>> {
        let Some(raw) = self.durable.get(keys::CURRENT_SESSION)? else {
            return Ok(None);
        };

        let value: serde_json::Value = serde_json::from_str(&raw)?;
        let snapshot: SessionSnapshot = self
            .migrator
            .load_flat_from("session_snapshot", with_legacy_version(value))
            .map_err(|e| FitCheckError::migration(format!("Failed to migrate session: {}", e)))?;

        // A snapshot without a model image cannot be restored
        if snapshot.model_image_url.is_empty() {
            tracing::debug!("Stored session has no model image, ignoring it");
            return Ok(None);
        }
        Ok(Some(snapshot))
    }

    async fn save_model_image(&self, url: &str) -> Result<()> {
        self.short_lived.set(keys::MODEL_IMAGE, url)
    }

    async fn load_model_image(&self) -> Result<Option<String>> {
        Ok(self
            .short_lived
            .get(keys::MODEL_IMAGE)?
            .filter(|url| !url.is_empty()))
    }

    async fn save_uploaded_photo(&self, url: &str) -> Result<()> {
        self.short_lived.set(keys::UPLOADED_PHOTO, url)
    }

    async fn load_uploaded_photo(&self) -> Result<Option<String>> {
        self.short_lived.get(keys::UPLOADED_PHOTO)
    }

    async fn clear(&self) -> Result<()> {
        // Attempt every key before reporting the first failure
        let mut first_error = self.durable.remove(keys::CURRENT_SESSION).err();
        for key in keys::SHORT_LIVED {
            if let Err(e) = self.short_lived.remove(key) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use fitcheck_core::garment::{Category, GarmentDescriptor};
    use fitcheck_core::history::{HistoryEntry, HistoryLog};
    use fitcheck_core::outfit::OutfitState;
    use fitcheck_core::pose::Pose;

    fn repo() -> (KvSessionRepository, Arc<MemoryKeyValueStore>, Arc<MemoryKeyValueStore>) {
        let durable = Arc::new(MemoryKeyValueStore::new());
        let short_lived = Arc::new(MemoryKeyValueStore::new());
        (
            KvSessionRepository::new(durable.clone(), short_lived.clone()),
            durable,
            short_lived,
        )
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let (repo, _, _) = repo();
        let outfit = OutfitState::empty()
            .with_selection(&GarmentDescriptor::new("d1", "Đầm Maxi", "dress.png", Category::FullBody))
            .with_selection(&GarmentDescriptor::new("a1", "Nón", "hat.png", Category::Accessory));
        let mut history = HistoryLog::with_base("model.png");
        history.push(HistoryEntry::new(outfit.clone(), "r1.png", Pose::Standing));
        history.push(HistoryEntry::new(outfit.clone(), "r2.png", Pose::Leaning));

        let snapshot = SessionSnapshot::capture("model.png", outfit.clone(), &history, Pose::Leaning);
        repo.save_snapshot(&snapshot).await.unwrap();

        let restored = repo.load_snapshot().await.unwrap().unwrap();
        assert_eq!(restored, snapshot);
        assert!(restored.outfit.same_selection(&outfit));
        assert_eq!(restored.pose, Pose::Leaning);
        assert_eq!(restored.history().len(), 1);
    }

    #[tokio::test]
    async fn test_legacy_unversioned_snapshot_loads() {
        let (repo, durable, _) = repo();
        durable
            .set(
                keys::CURRENT_SESSION,
                r#"{"modelImageUrl": "model.png", "currentOutfit": {"top": null, "bottom": null, "accessory": {"id": "a1", "name": "Túi", "url": "bag.png"}}, "history": [], "historyIndex": -1}"#,
            )
            .unwrap();

        let snapshot = repo.load_snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot.outfit.accessories().len(), 1);
        assert_eq!(snapshot.outfit.accessories()[0].id, "a1");
    }

    #[tokio::test]
    async fn test_snapshot_without_model_is_ignored() {
        let (repo, durable, _) = repo();
        durable
            .set(keys::CURRENT_SESSION, r#"{"currentOutfit": null}"#)
            .unwrap();
        assert!(repo.load_snapshot().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_erases_everything() {
        let (repo, durable, short_lived) = repo();
        let snapshot = SessionSnapshot::capture(
            "model.png",
            OutfitState::empty(),
            &HistoryLog::with_base("model.png"),
            Pose::Standing,
        );
        repo.save_snapshot(&snapshot).await.unwrap();
        repo.save_model_image("model.png").await.unwrap();
        repo.save_uploaded_photo("photo.png").await.unwrap();
        short_lived.set(keys::WARDROBE, "[]").unwrap();

        repo.clear().await.unwrap();

        assert!(!durable.contains(keys::CURRENT_SESSION));
        assert!(repo.load_model_image().await.unwrap().is_none());
        assert!(repo.load_uploaded_photo().await.unwrap().is_none());
        assert!(!short_lived.contains(keys::WARDROBE));
    }
}
