//! Session repository trait.

use async_trait::async_trait;

use super::model::SessionSnapshot;
use crate::error::Result;

/// Persistence of the trimmed snapshot and the short-lived fallback entries.
///
/// The snapshot lives in the durable store. The model image and the uploaded
/// photo live in the short-lived store and back the narrower restore path used
/// when no snapshot exists.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Writes the snapshot, replacing the previous one.
    async fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<()>;

    /// Reads and migrates the stored snapshot.
    ///
    /// - `Ok(Some(_))`: a snapshot was stored
    /// - `Ok(None)`: nothing stored
    /// - `Err(_)`: storage unreadable or document corrupt
    async fn load_snapshot(&self) -> Result<Option<SessionSnapshot>>;

    async fn save_model_image(&self, url: &str) -> Result<()>;

    async fn load_model_image(&self) -> Result<Option<String>>;

    async fn save_uploaded_photo(&self, url: &str) -> Result<()>;

    async fn load_uploaded_photo(&self) -> Result<Option<String>>;

    /// Erases the snapshot and every short-lived entry.
    async fn clear(&self) -> Result<()>;
}
