//! History of composited results with a linear undo cursor.

use serde::{Deserialize, Serialize};

use crate::outfit::OutfitState;
use crate::pose::Pose;

/// One composited result and the outfit/pose that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub outfit: OutfitState,
    /// Data URL or remote URL of the rendered image
    pub result_image: String,
    pub pose: Pose,
}

impl HistoryEntry {
    pub fn new(outfit: OutfitState, result_image: impl Into<String>, pose: Pose) -> Self {
        Self {
            outfit,
            result_image: result_image.into(),
            pose,
        }
    }

    /// The unmodified model photo, the first entry of every history.
    pub fn base(model_image_url: impl Into<String>) -> Self {
        Self::new(OutfitState::empty(), model_image_url, Pose::Standing)
    }
}

/// Append-only log of results with a cursor.
///
/// Appending discards everything after the cursor first, so undo followed by a
/// new action drops the old branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding only the base model entry, cursor on it.
    pub fn with_base(model_image_url: impl Into<String>) -> Self {
        Self {
            entries: vec![HistoryEntry::base(model_image_url)],
            cursor: Some(0),
        }
    }

    /// Rebuilds a log from stored entries.
    ///
    /// The cursor is clamped to the last entry; an empty log has no cursor.
    pub fn from_parts(entries: Vec<HistoryEntry>, cursor: Option<usize>) -> Self {
        let cursor = match (entries.len(), cursor) {
            (0, _) => None,
            (len, Some(index)) => Some(index.min(len - 1)),
            (_, None) => None,
        };
        Self { entries, cursor }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry under the cursor.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|index| self.entries.get(index))
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(index) if index > 0)
    }

    /// Truncates after the cursor, appends `entry`, and moves the cursor onto it.
    ///
    /// Returns the new cursor.
    pub fn push(&mut self, entry: HistoryEntry) -> usize {
        let keep = self.cursor.map(|index| index + 1).unwrap_or(0);
        self.entries.truncate(keep);
        self.entries.push(entry);
        let cursor = self.entries.len() - 1;
        self.cursor = Some(cursor);
        cursor
    }

    /// Moves the cursor back one entry.
    ///
    /// Returns the entry now under the cursor, or `None` when already at the
    /// first entry (or empty).
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        match self.cursor {
            Some(index) if index > 0 => {
                self.cursor = Some(index - 1);
                self.entries.get(index - 1)
            }
            _ => None,
        }
    }

    /// A copy holding only the current entry, used for persistence.
    pub fn trimmed(&self) -> HistoryLog {
        match self.current() {
            Some(entry) => HistoryLog {
                entries: vec![entry.clone()],
                cursor: Some(0),
            },
            None => HistoryLog::new(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garment::{Category, GarmentDescriptor};

    fn entry(tag: &str) -> HistoryEntry {
        let outfit = OutfitState::empty().with_selection(&GarmentDescriptor::new(
            tag,
            tag,
            format!("https://img.example/{tag}.png"),
            Category::Top,
        ));
        HistoryEntry::new(outfit, format!("data:image/png;base64,{tag}"), Pose::Standing)
    }

    fn log_of(tags: &[&str]) -> HistoryLog {
        let mut log = HistoryLog::with_base("model.png");
        for tag in tags {
            log.push(entry(tag));
        }
        log
    }

    #[test]
    fn test_with_base_starts_at_zero() {
        let log = HistoryLog::with_base("model.png");
        assert_eq!(log.cursor(), Some(0));
        assert_eq!(log.len(), 1);
        assert!(!log.can_undo());
        let base = log.current().unwrap();
        assert!(base.outfit.is_empty());
        assert_eq!(base.pose, Pose::Standing);
    }

    #[test]
    fn test_undo_restores_prior_entry() {
        let mut log = log_of(&["e1", "e2"]);
        assert_eq!(log.cursor(), Some(2));

        let prior = log.undo().cloned().unwrap();
        assert_eq!(log.cursor(), Some(1));
        assert_eq!(prior, log.entries()[1]);
        assert_eq!(prior.outfit.garment_ids(), vec!["e1".to_string()]);
    }

    #[test]
    fn test_undo_at_zero_is_noop() {
        let mut log = HistoryLog::with_base("model.png");
        assert!(log.undo().is_none());
        assert_eq!(log.cursor(), Some(0));

        let mut empty = HistoryLog::new();
        assert!(empty.undo().is_none());
        assert_eq!(empty.cursor(), None);
    }

    #[test]
    fn test_push_truncates_redo_branch() {
        // [e0, e1, e2] at cursor 1, new action yields [e0, e1, e3']
        let mut log = log_of(&["e1", "e2"]);
        log.undo();
        assert_eq!(log.cursor(), Some(1));

        let cursor = log.push(entry("e3"));
        assert_eq!(cursor, 2);
        assert_eq!(log.len(), 3);
        assert_eq!(log.current().unwrap().result_image, "data:image/png;base64,e3");
        assert!(log.entries().iter().all(|e| !e.result_image.ends_with("e2")));
    }

    #[test]
    fn test_trimmed_keeps_current_only() {
        let mut log = log_of(&["e1", "e2"]);
        log.undo();
        let trimmed = log.trimmed();
        assert_eq!(trimmed.len(), 1);
        assert_eq!(trimmed.cursor(), Some(0));
        assert_eq!(trimmed.current(), log.current());

        assert_eq!(HistoryLog::new().trimmed().cursor(), None);
    }

    #[test]
    fn test_from_parts_clamps_cursor() {
        let log = HistoryLog::from_parts(vec![entry("a")], Some(5));
        assert_eq!(log.cursor(), Some(0));
        let empty = HistoryLog::from_parts(Vec::new(), Some(0));
        assert_eq!(empty.cursor(), None);
    }
}
