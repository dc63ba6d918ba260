//! Persisted projection of a try-on session.

use serde::{Deserialize, Serialize};

use crate::history::{HistoryEntry, HistoryLog};
use crate::outfit::OutfitState;
use crate::pose::Pose;

/// The trimmed session snapshot.
///
/// Holds only the history entry under the cursor, so the stored cursor is
/// always `Some(0)` (or `None` for an empty history).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub model_image_url: String,
    pub outfit: OutfitState,
    history: HistoryLog,
    pub pose: Pose,
}

impl SessionSnapshot {
    /// Captures the live session, trimming `history` to its current entry.
    pub fn capture(
        model_image_url: impl Into<String>,
        outfit: OutfitState,
        history: &HistoryLog,
        pose: Pose,
    ) -> Self {
        Self {
            model_image_url: model_image_url.into(),
            outfit,
            history: history.trimmed(),
            pose,
        }
    }

    /// Rebuilds a snapshot from stored fields.
    ///
    /// Only the entry under `cursor` survives; stored data may carry a longer
    /// history from before trimming was introduced.
    pub fn from_stored(
        model_image_url: impl Into<String>,
        outfit: OutfitState,
        entries: Vec<HistoryEntry>,
        cursor: Option<usize>,
        pose: Pose,
    ) -> Self {
        let history = HistoryLog::from_parts(entries, cursor);
        Self::capture(model_image_url, outfit, &history, pose)
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn cursor(&self) -> Option<usize> {
        self.history.cursor()
    }

    /// The single history entry, if any.
    pub fn current_entry(&self) -> Option<&HistoryEntry> {
        self.history.current()
    }

    /// Splits the snapshot into the parts the studio restores.
    pub fn into_parts(self) -> (String, OutfitState, HistoryLog, Pose) {
        (self.model_image_url, self.outfit, self.history, self.pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garment::{Category, GarmentDescriptor};

    #[test]
    fn test_capture_trims_to_current_entry() {
        let shirt = GarmentDescriptor::new("shirt", "Shirt", "shirt.png", Category::Top);
        let outfit = OutfitState::empty().with_selection(&shirt);

        let mut history = HistoryLog::with_base("model.png");
        history.push(HistoryEntry::new(outfit.clone(), "r1.png", Pose::Standing));
        history.push(HistoryEntry::new(outfit.clone(), "r2.png", Pose::Walking));

        let snapshot = SessionSnapshot::capture("model.png", outfit, &history, Pose::Walking);
        assert_eq!(snapshot.history().len(), 1);
        assert_eq!(snapshot.cursor(), Some(0));
        assert_eq!(snapshot.current_entry().unwrap().result_image, "r2.png");
    }

    #[test]
    fn test_from_stored_with_empty_history() {
        let snapshot = SessionSnapshot::from_stored(
            "model.png",
            OutfitState::empty(),
            Vec::new(),
            Some(3),
            Pose::Standing,
        );
        assert_eq!(snapshot.cursor(), None);
        assert!(snapshot.current_entry().is_none());
    }
}
