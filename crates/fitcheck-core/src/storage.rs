//! Durable key-value persistence capability.
//!
//! Every store is synchronous from the caller's point of view. Callers treat
//! failures as [`FitCheckError::Persistence`](crate::error::FitCheckError) and
//! log them; they never abort an in-memory session.

use crate::error::Result;

/// Storage keys shared by the durable and the short-lived store.
pub mod keys {
    /// Garment list (durable, mirrored in the short-lived store)
    pub const WARDROBE: &str = "fitcheck_wardrobe";
    /// Trimmed session snapshot (durable)
    pub const CURRENT_SESSION: &str = "fitcheck_current_session";
    /// One-shot product handoff written by the catalog (durable)
    pub const PENDING_PRODUCT: &str = "fitcheck_pending_product";
    /// Finalized model image (short-lived)
    pub const MODEL_IMAGE: &str = "fitcheck_model_image";
    /// Raw photo the user uploaded before the model was finalized (short-lived)
    pub const UPLOADED_PHOTO: &str = "fitcheck_uploaded_photo";

    /// Keys erased from the short-lived store on start over.
    pub const SHORT_LIVED: &[&str] = &[MODEL_IMAGE, UPLOADED_PHOTO, WARDROBE];
}

/// A string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;
}
