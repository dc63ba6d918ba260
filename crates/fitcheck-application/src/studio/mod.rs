//! The try-on studio: composition orchestration over the wardrobe, history
//! and session store.
//!
//! `FitCheckStudio` runs one operation at a time. Garment selection, garment
//! removal and pose changes go through the same phases:
//!
//! 1. guard: a model image must exist and nothing may be in flight
//! 2. `Resolving`: garment images are fetched concurrently, failures degrade
//!    their slot
//! 3. `Requesting`: the single generation call
//! 4. on success a history entry is appended and the snapshot persisted; on
//!    failure the state is left as it was and a friendly error is recorded
//!
//! Model creation turns an uploaded photo into the model image through the
//! same busy gate and replaces the session on success.
//!
//! The state lock is never held across a resolver or generator await. Every
//! operation records the session epoch it started in; `start_over` and a new
//! model advance the epoch, so a response that arrives afterwards
//! is dropped instead of being applied to the new session.

mod outcome;
mod resolution;
mod state;

pub use outcome::{CompositionOutcome, ImportedGarment, MountReport, RestoreSource, SkipReason};
pub use state::{Phase, StudioView};

use std::sync::Arc;

use fitcheck_core::error::GenerationError;
use fitcheck_core::garment::{Category, GarmentDescriptor};
use fitcheck_core::generation::{GenerationService, ImagePayload, ImageResolver};
use fitcheck_core::history::HistoryEntry;
use fitcheck_core::import::PendingImportSource;
use fitcheck_core::outfit::{OutfitSlot, OutfitState};
use fitcheck_core::pose::Pose;
use fitcheck_core::session::{SessionRepository, SessionSnapshot};
use fitcheck_core::wardrobe::WardrobeStore;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::messages;
use resolution::{FreshUpload, resolve_outfit};
use state::StudioState;

/// Orchestrates outfit composition for one user session.
pub struct FitCheckStudio {
    state: Mutex<StudioState>,
    wardrobe: Arc<WardrobeStore>,
    sessions: Arc<dyn SessionRepository>,
    generator: Arc<dyn GenerationService>,
    resolver: Arc<dyn ImageResolver>,
}

/// Work captured under the lock when an operation passes its guard.
struct Started {
    epoch: u64,
    model_image_url: String,
}

impl FitCheckStudio {
    pub fn new(
        wardrobe: Arc<WardrobeStore>,
        sessions: Arc<dyn SessionRepository>,
        generator: Arc<dyn GenerationService>,
        resolver: Arc<dyn ImageResolver>,
    ) -> Self {
        Self {
            state: Mutex::new(StudioState::default()),
            wardrobe,
            sessions,
            generator,
            resolver,
        }
    }

    pub fn wardrobe(&self) -> &Arc<WardrobeStore> {
        &self.wardrobe
    }

    /// Loads the wardrobe, restores the last session and consumes a pending
    /// catalog import, in that order.
    pub async fn mount(&self, imports: &dyn PendingImportSource) -> MountReport {
        let wardrobe_len = self.wardrobe.load().await.len();
        let restored = self.restore_session().await;
        let imported = self.import_pending(imports).await;

        MountReport {
            restored,
            imported,
            wardrobe_len,
        }
    }

    /// Restores the trimmed snapshot, falling back to the stored model image.
    pub async fn restore_session(&self) -> RestoreSource {
        match self.sessions.load_snapshot().await {
            Ok(Some(snapshot)) => {
                let (model_image_url, outfit, history, pose) = snapshot.into_parts();
                let mut state = self.state.lock().await;
                state.reset();
                state.model_image_url = Some(model_image_url);
                state.outfit = outfit;
                state.history = history;
                state.pose = pose;
                tracing::info!(
                    "Restored session snapshot ({} garments, pose {})",
                    state.outfit.garment_ids().len(),
                    state.pose
                );
                return RestoreSource::Snapshot;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to load session snapshot: {}", e),
        }

        let model_image_url = match self.sessions.load_model_image().await {
            Ok(Some(url)) => url,
            Ok(None) => return RestoreSource::Fresh,
            Err(e) => {
                tracing::warn!("Failed to load stored model image: {}", e);
                return RestoreSource::Fresh;
            }
        };

        let snapshot = self.state.lock().await.install_model(model_image_url);
        if let Some(snapshot) = snapshot {
            self.persist_snapshot(&snapshot).await;
        }
        tracing::info!("Restored model image without a session snapshot");
        RestoreSource::ModelImage
    }

    /// Consumes the one-shot catalog handoff, adding its garment to the wardrobe.
    pub async fn import_pending(&self, imports: &dyn PendingImportSource) -> Option<ImportedGarment> {
        let pending = match imports.take().await {
            Ok(Some(pending)) => pending,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Discarded unreadable pending import: {}", e);
                return None;
            }
        };

        let garment = pending.into_descriptor(now_millis());
        let added = self.wardrobe.add(garment.clone()).await;
        tracing::info!(
            "Imported '{}' as {} ({})",
            garment.name,
            garment.category,
            if added { "added" } else { "already in wardrobe" }
        );
        Some(ImportedGarment { garment, added })
    }

    /// Starts a new session on `model_image_url`.
    ///
    /// The outfit and history are reset to a single base entry; any operation
    /// still in flight is discarded when it completes.
    pub async fn establish_model(&self, model_image_url: impl Into<String>) {
        let model_image_url = model_image_url.into();
        let snapshot = self.state.lock().await.install_model(model_image_url.clone());
        self.store_model(&model_image_url, snapshot).await;
        tracing::info!("Model established");
    }

    /// Generates the model image from a photo of the user and starts a new
    /// session on it.
    ///
    /// The photo is stored first so that the model can be generated again
    /// with [`regenerate_model`](Self::regenerate_model). On failure the
    /// current session is kept and a friendly error is recorded.
    pub async fn create_model(&self, photo_url: &str) -> CompositionOutcome {
        let span = tracing::info_span!("create_model", request_id = %Uuid::new_v4());
        self.run_model_creation(photo_url).instrument(span).await
    }

    /// Generates the model again from the last uploaded photo.
    pub async fn regenerate_model(&self) -> CompositionOutcome {
        match self.sessions.load_uploaded_photo().await {
            Ok(Some(photo_url)) => self.create_model(&photo_url).await,
            Ok(None) => CompositionOutcome::Skipped(SkipReason::NoPhoto),
            Err(e) => {
                tracing::warn!("Failed to load uploaded photo: {}", e);
                CompositionOutcome::Skipped(SkipReason::NoPhoto)
            }
        }
    }

    /// Puts `garment` on the model.
    ///
    /// `upload` is the file the user just provided for this garment; it is
    /// used instead of fetching the garment url.
    pub async fn select_garment(
        &self,
        garment: GarmentDescriptor,
        upload: Option<ImagePayload>,
    ) -> CompositionOutcome {
        let span = tracing::info_span!(
            "select_garment",
            request_id = %Uuid::new_v4(),
            garment = %garment.id,
            category = %garment.category
        );
        self.run_selection(garment, upload).instrument(span).await
    }

    /// Tries on a file the user uploaded by hand.
    ///
    /// The garment is classified from `name` unless `category_hint` is given,
    /// and joins the wardrobe once the composite succeeds.
    pub async fn upload_garment(
        &self,
        name: &str,
        url: &str,
        category_hint: Option<Category>,
        payload: ImagePayload,
    ) -> (GarmentDescriptor, CompositionOutcome) {
        let garment = GarmentDescriptor::custom_upload(name, url, category_hint, now_millis());
        let outcome = self.select_garment(garment.clone(), Some(payload)).await;
        (garment, outcome)
    }

    /// Re-renders the displayed image in `pose`, keeping the outfit.
    pub async fn change_pose(&self, pose: Pose) -> CompositionOutcome {
        let span = tracing::info_span!("change_pose", request_id = %Uuid::new_v4(), pose = %pose);
        self.run_pose_change(pose).instrument(span).await
    }

    /// Takes one garment off and re-composites the remaining outfit.
    pub async fn remove_item(&self, slot: OutfitSlot) -> CompositionOutcome {
        let span = tracing::info_span!("remove_item", request_id = %Uuid::new_v4(), slot = ?slot);
        self.run_removal(slot).instrument(span).await
    }

    /// Moves back one history entry, restoring its outfit and pose.
    pub async fn undo(&self) -> CompositionOutcome {
        let snapshot = {
            let mut state = self.state.lock().await;
            if state.phase.is_busy() {
                return CompositionOutcome::Skipped(SkipReason::Busy);
            }
            let Some(entry) = state.history.undo().cloned() else {
                return CompositionOutcome::Skipped(SkipReason::NothingToUndo);
            };
            state.outfit = entry.outfit;
            state.pose = entry.pose;
            state.error = None;
            tracing::info!("Undo to entry {:?}", state.history.cursor());
            state.snapshot()
        };
        if let Some(snapshot) = snapshot {
            self.persist_snapshot(&snapshot).await;
        }
        CompositionOutcome::Applied
    }

    /// Clears the session and erases everything stored for it.
    pub async fn start_over(&self) {
        self.state.lock().await.reset();
        if let Err(e) = self.sessions.clear().await {
            tracing::warn!("Failed to clear stored session: {}", e);
        }
        tracing::info!("Session cleared");
    }

    pub async fn view(&self) -> StudioView {
        self.state.lock().await.view()
    }

    async fn run_model_creation(&self, photo_url: &str) -> CompositionOutcome {
        let epoch = {
            let mut state = self.state.lock().await;
            if state.phase.is_busy() {
                return CompositionOutcome::Skipped(SkipReason::Busy);
            }
            state.begin(Phase::Requesting, messages::CREATING_MODEL.to_string())
        };

        if let Err(e) = self.sessions.save_uploaded_photo(photo_url).await {
            tracing::warn!("Failed to store uploaded photo: {}", e);
        }
        let result = self.generator.generate_model(photo_url).await;

        let (model_image_url, snapshot) = {
            let mut state = self.state.lock().await;
            if state.epoch != epoch {
                tracing::info!("Dropping model for a cleared session");
                return CompositionOutcome::Discarded;
            }
            state.finish();
            match result {
                Ok(model_image_url) => {
                    let snapshot = state.install_model(model_image_url.clone());
                    (model_image_url, snapshot)
                }
                Err(err) => {
                    tracing::error!("Model generation failed: {}", err);
                    let message = messages::friendly_error_message(&err, messages::MODEL_FAILED);
                    state.error = Some(message.clone());
                    return CompositionOutcome::Failed { message };
                }
            }
        };

        self.store_model(&model_image_url, snapshot).await;
        tracing::info!("Model created from uploaded photo");
        CompositionOutcome::Applied
    }

    async fn run_selection(
        &self,
        garment: GarmentDescriptor,
        upload: Option<ImagePayload>,
    ) -> CompositionOutcome {
        let (started, candidate) = {
            let mut state = self.state.lock().await;
            let model_image_url = match guard(&state) {
                Ok(url) => url,
                Err(reason) => return CompositionOutcome::Skipped(reason),
            };
            let candidate = state.outfit.with_selection(&garment);
            if candidate.same_selection(&state.outfit) {
                tracing::debug!("Selection leaves the outfit unchanged");
                return CompositionOutcome::Skipped(SkipReason::NoChange);
            }
            let epoch = state.begin(Phase::Resolving, messages::trying_on(&candidate));
            (
                Started {
                    epoch,
                    model_image_url,
                },
                candidate,
            )
        };

        let upload = upload.as_ref().map(|payload| FreshUpload {
            garment_id: &garment.id,
            payload,
        });
        let outcome = self
            .composite(started, candidate, upload, messages::COMPOSE_FAILED)
            .await;

        if outcome.is_applied() {
            self.reconcile_wardrobe(garment).await;
        }
        outcome
    }

    async fn run_removal(&self, slot: OutfitSlot) -> CompositionOutcome {
        let (started, candidate) = {
            let mut state = self.state.lock().await;
            let model_image_url = match guard(&state) {
                Ok(url) => url,
                Err(reason) => return CompositionOutcome::Skipped(reason),
            };
            let candidate = state.outfit.without(&slot);
            if candidate.same_selection(&state.outfit) {
                tracing::debug!("Slot {:?} is already empty", slot);
                return CompositionOutcome::Skipped(SkipReason::NoChange);
            }

            // Nothing left to draw: the bare model image is the result
            if candidate.is_empty() {
                state.error = None;
                let cursor = state.history.push(HistoryEntry::base(model_image_url));
                state.outfit = candidate;
                state.pose = Pose::Standing;
                tracing::info!("Outfit emptied, entry {}", cursor);
                let snapshot = state.snapshot();
                drop(state);
                if let Some(snapshot) = snapshot {
                    self.persist_snapshot(&snapshot).await;
                }
                return CompositionOutcome::Applied;
            }

            let epoch = state.begin(Phase::Resolving, messages::UPDATING_OUTFIT.to_string());
            (
                Started {
                    epoch,
                    model_image_url,
                },
                candidate,
            )
        };

        self.composite(started, candidate, None, messages::REMOVE_FAILED)
            .await
    }

    async fn run_pose_change(&self, pose: Pose) -> CompositionOutcome {
        let (epoch, base_image, outfit) = {
            let mut state = self.state.lock().await;
            if let Err(reason) = guard(&state) {
                return CompositionOutcome::Skipped(reason);
            }
            if state.pose == pose {
                return CompositionOutcome::Skipped(SkipReason::NoChange);
            }
            let Some(base_image) = state.display_image().map(str::to_string) else {
                return CompositionOutcome::Skipped(SkipReason::NoModel);
            };
            let outfit = state.outfit.clone();
            let epoch = state.begin(Phase::Requesting, messages::changing_pose(pose));
            (epoch, base_image, outfit)
        };

        let result = self.generator.repose(&base_image, pose.instruction()).await;
        self.complete(epoch, result, outfit, pose, messages::POSE_FAILED)
            .await
    }

    /// Resolves `outfit` and composites it onto the model image.
    ///
    /// The result is always drawn in the standing pose of the model image.
    async fn composite(
        &self,
        started: Started,
        outfit: OutfitState,
        upload: Option<FreshUpload<'_>>,
        context: &str,
    ) -> CompositionOutcome {
        let request = resolve_outfit(
            self.resolver.as_ref(),
            &started.model_image_url,
            &outfit,
            upload,
        )
        .await;

        {
            let mut state = self.state.lock().await;
            if state.epoch != started.epoch {
                tracing::info!("Session changed while resolving, dropping request");
                return CompositionOutcome::Discarded;
            }
            state.phase = Phase::Requesting;
        }

        tracing::debug!("Compositing {} garment images", request.garment_count());
        let result = self.generator.composite(request).await;
        self.complete(started.epoch, result, outfit, Pose::Standing, context)
            .await
    }

    /// Applies a generation result if the session has not moved on.
    async fn complete(
        &self,
        epoch: u64,
        result: Result<String, GenerationError>,
        outfit: OutfitState,
        pose: Pose,
        context: &str,
    ) -> CompositionOutcome {
        let snapshot = {
            let mut state = self.state.lock().await;
            if state.epoch != epoch {
                tracing::info!("Dropping response for a cleared session");
                return CompositionOutcome::Discarded;
            }
            state.finish();

            match result {
                Ok(result_image) => {
                    let cursor = state
                        .history
                        .push(HistoryEntry::new(outfit.clone(), result_image, pose));
                    state.outfit = outfit;
                    state.pose = pose;
                    tracing::info!("Applied entry {} ({} entries)", cursor, state.history.len());
                    state.snapshot()
                }
                Err(err) => {
                    tracing::error!("Generation failed: {}", err);
                    let message = messages::friendly_error_message(&err, context);
                    state.error = Some(message.clone());
                    return CompositionOutcome::Failed { message };
                }
            }
        };

        if let Some(snapshot) = snapshot {
            self.persist_snapshot(&snapshot).await;
        }
        CompositionOutcome::Applied
    }

    /// Keeps the wardrobe in line with a garment that was just worn.
    async fn reconcile_wardrobe(&self, garment: GarmentDescriptor) {
        if self.wardrobe.find(&garment.id).await.is_some() {
            self.wardrobe
                .update_category(&garment.id, garment.category)
                .await;
        } else if self.wardrobe.add(garment).await {
            tracing::info!("Added worn garment to wardrobe");
        }
    }

    async fn store_model(&self, model_image_url: &str, snapshot: Option<SessionSnapshot>) {
        if let Err(e) = self.sessions.save_model_image(model_image_url).await {
            tracing::warn!("Failed to store model image: {}", e);
        }
        if let Some(snapshot) = snapshot {
            self.persist_snapshot(&snapshot).await;
        }
    }

    async fn persist_snapshot(&self, snapshot: &SessionSnapshot) {
        if let Err(e) = self.sessions.save_snapshot(snapshot).await {
            tracing::warn!("Failed to persist session snapshot: {}", e);
        }
    }
}

/// Returns the model image when a new operation may start.
fn guard(state: &StudioState) -> Result<String, SkipReason> {
    if state.phase.is_busy() {
        return Err(SkipReason::Busy);
    }
    state.model_image_url.clone().ok_or(SkipReason::NoModel)
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
