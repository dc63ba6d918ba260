//! Capabilities of the external image services.

use async_trait::async_trait;

use crate::error::{GenerationError, Result};

/// Raw image bytes with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Turns an image reference into bytes.
#[async_trait]
pub trait ImageResolver: Send + Sync {
    /// Fetches `url` (remote URL or `data:` URL).
    ///
    /// Fails with [`FitCheckError::Resolution`](crate::error::FitCheckError)
    /// when the image cannot be obtained.
    async fn fetch(&self, url: &str) -> Result<ImagePayload>;
}

/// Inputs of one composite call.
///
/// A full-body payload suppresses the top and bottom payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRequest {
    /// Model image reference the garments are drawn onto
    pub base_image: String,
    pub full_body: Option<ImagePayload>,
    pub top: Option<ImagePayload>,
    pub bottom: Option<ImagePayload>,
    pub accessories: Vec<ImagePayload>,
}

impl CompositeRequest {
    pub fn new(
        base_image: impl Into<String>,
        full_body: Option<ImagePayload>,
        top: Option<ImagePayload>,
        bottom: Option<ImagePayload>,
        accessories: Vec<ImagePayload>,
    ) -> Self {
        let (top, bottom) = if full_body.is_some() {
            (None, None)
        } else {
            (top, bottom)
        };
        Self {
            base_image: base_image.into(),
            full_body,
            top,
            bottom,
            accessories,
        }
    }

    /// Number of garment images carried by the request.
    pub fn garment_count(&self) -> usize {
        [&self.full_body, &self.top, &self.bottom]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
            + self.accessories.len()
    }
}

/// The remote generative-image backend.
///
/// Every call returns the reference (data URL or remote URL) of the new image.
/// Implementations bound their own latency.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn composite(
        &self,
        request: CompositeRequest,
    ) -> std::result::Result<String, GenerationError>;

    async fn repose(
        &self,
        base_image: &str,
        instruction: &str,
    ) -> std::result::Result<String, GenerationError>;

    /// Turns a photo of the user into the model image garments are drawn onto.
    async fn generate_model(&self, photo: &str) -> std::result::Result<String, GenerationError>;
}
