//! Mutable studio state and its read-only view.

use fitcheck_core::history::HistoryLog;
use fitcheck_core::outfit::OutfitState;
use fitcheck_core::pose::Pose;
use fitcheck_core::session::SessionSnapshot;

/// Progress of the single in-flight operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Garment images are being fetched
    Resolving,
    /// The generation call is pending
    Requesting,
}

impl Phase {
    pub fn is_busy(&self) -> bool {
        !matches!(self, Phase::Idle)
    }
}

#[derive(Debug, Default)]
pub(crate) struct StudioState {
    pub model_image_url: Option<String>,
    pub outfit: OutfitState,
    pub history: HistoryLog,
    pub pose: Pose,
    pub phase: Phase,
    pub loading_message: Option<String>,
    pub error: Option<String>,
    /// Bumped whenever the session is replaced; responses carrying an older
    /// epoch are dropped
    pub epoch: u64,
}

impl StudioState {
    /// Clears everything except the epoch, which moves forward.
    pub fn reset(&mut self) {
        let epoch = self.epoch + 1;
        *self = StudioState {
            epoch,
            ..StudioState::default()
        };
    }

    /// Starts a fresh session on `model_image_url` with a single base entry.
    pub fn install_model(&mut self, model_image_url: String) -> Option<SessionSnapshot> {
        self.reset();
        self.history = HistoryLog::with_base(model_image_url.clone());
        self.model_image_url = Some(model_image_url);
        self.snapshot()
    }

    /// Image currently shown: the entry under the cursor, else the model.
    pub fn display_image(&self) -> Option<&str> {
        self.history
            .current()
            .map(|entry| entry.result_image.as_str())
            .or(self.model_image_url.as_deref())
    }

    /// Snapshot to persist, or `None` while no model image exists.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.model_image_url.as_ref().map(|url| {
            SessionSnapshot::capture(url.clone(), self.outfit.clone(), &self.history, self.pose)
        })
    }

    /// Moves to `phase` for a new operation, clearing the previous error.
    pub fn begin(&mut self, phase: Phase, loading_message: String) -> u64 {
        self.phase = phase;
        self.loading_message = Some(loading_message);
        self.error = None;
        self.epoch
    }

    pub fn finish(&mut self) {
        self.phase = Phase::Idle;
        self.loading_message = None;
    }

    pub fn view(&self) -> StudioView {
        let active_garment_ids = self
            .history
            .current()
            .map(|entry| entry.outfit.garment_ids())
            .unwrap_or_default();

        StudioView {
            model_image_url: self.model_image_url.clone(),
            display_image: self.display_image().map(str::to_string),
            active_garment_ids,
            outfit: self.outfit.clone(),
            pose: self.pose,
            cursor: self.history.cursor(),
            history_len: self.history.len(),
            can_undo: self.history.can_undo(),
            busy: self.phase.is_busy(),
            phase: self.phase,
            loading_message: self.loading_message.clone(),
            error: self.error.clone(),
        }
    }
}

/// Read-only snapshot of the studio for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioView {
    pub model_image_url: Option<String>,
    pub display_image: Option<String>,
    /// Garments of the displayed history entry
    pub active_garment_ids: Vec<String>,
    pub outfit: OutfitState,
    pub pose: Pose,
    pub cursor: Option<usize>,
    pub history_len: usize,
    pub can_undo: bool,
    pub busy: bool,
    pub phase: Phase,
    pub loading_message: Option<String>,
    pub error: Option<String>,
}
