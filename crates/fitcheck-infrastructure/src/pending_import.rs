//! Pending-import handoff stored under [`keys::PENDING_PRODUCT`].

use std::sync::Arc;

use async_trait::async_trait;
use fitcheck_core::error::Result;
use fitcheck_core::import::{PendingImport, PendingImportSource};
use fitcheck_core::storage::{KeyValueStore, keys};

/// Reads the one-shot product record and deletes it.
pub struct KvPendingImportSource {
    store: Arc<dyn KeyValueStore>,
}

impl KvPendingImportSource {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Writes a handoff record, as the product page does.
    pub fn offer(&self, record: &PendingImport) -> Result<()> {
        let serialized = serde_json::to_string(record)?;
        self.store.set(keys::PENDING_PRODUCT, &serialized)
    }
}

#[async_trait]
impl PendingImportSource for KvPendingImportSource {
    async fn take(&self) -> Result<Option<PendingImport>> {
        let Some(raw) = self.store.get(keys::PENDING_PRODUCT)? else {
            return Ok(None);
        };
        self.store.remove(keys::PENDING_PRODUCT)?;

        let record: PendingImport = serde_json::from_str(&raw)?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    #[tokio::test]
    async fn test_take_consumes_once() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store
            .set(
                keys::PENDING_PRODUCT,
                r#"{"id": 12, "name": "Quần Short", "url": "shorts.png", "price": 199000}"#,
            )
            .unwrap();
        let source = KvPendingImportSource::new(store.clone());

        let record = source.take().await.unwrap().unwrap();
        assert_eq!(record.name, "Quần Short");
        assert!(source.take().await.unwrap().is_none());
        assert!(!store.contains(keys::PENDING_PRODUCT));
    }

    #[tokio::test]
    async fn test_corrupt_record_is_deleted() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(keys::PENDING_PRODUCT, "{broken").unwrap();
        let source = KvPendingImportSource::new(store.clone());

        assert!(source.take().await.is_err());
        assert!(source.take().await.unwrap().is_none());
    }
}
