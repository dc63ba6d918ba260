//! Turns the occupied slots of an outfit into image payloads.

use fitcheck_core::generation::{CompositeRequest, ImagePayload, ImageResolver};
use fitcheck_core::outfit::{OutfitSlot, OutfitState};
use futures::future::join_all;

/// A payload the user just provided, keyed by the garment it belongs to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FreshUpload<'a> {
    pub garment_id: &'a str,
    pub payload: &'a ImagePayload,
}

/// Resolves every occupied slot of `outfit` concurrently.
///
/// A slot whose garment matches `upload` uses that payload without fetching.
/// A failed fetch leaves its slot empty; the others are unaffected.
pub(crate) async fn resolve_outfit(
    resolver: &dyn ImageResolver,
    base_image: &str,
    outfit: &OutfitState,
    upload: Option<FreshUpload<'_>>,
) -> CompositeRequest {
    let fetches = outfit.occupied().into_iter().map(|(slot, garment)| async move {
        if let Some(upload) = upload.filter(|upload| upload.garment_id == garment.id) {
            tracing::debug!("Using uploaded payload for '{}'", garment.id);
            return (slot, Some(upload.payload.clone()));
        }
        match resolver.fetch(&garment.url).await {
            Ok(payload) => {
                tracing::debug!("Resolved '{}' ({} bytes)", garment.id, payload.len());
                (slot, Some(payload))
            }
            Err(e) => {
                tracing::warn!("Dropping slot of '{}' from request: {}", garment.id, e);
                (slot, None)
            }
        }
    });

    let mut full_body = None;
    let mut top = None;
    let mut bottom = None;
    let mut accessories = Vec::new();
    for (slot, payload) in join_all(fetches).await {
        let Some(payload) = payload else { continue };
        match slot {
            OutfitSlot::FullBody => full_body = Some(payload),
            OutfitSlot::Top => top = Some(payload),
            OutfitSlot::Bottom => bottom = Some(payload),
            OutfitSlot::Accessory(_) => accessories.push(payload),
        }
    }

    CompositeRequest::new(base_image, full_body, top, bottom, accessories)
}
