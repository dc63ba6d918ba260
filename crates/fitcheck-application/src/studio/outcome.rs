//! Results of studio operations.

use fitcheck_core::garment::GarmentDescriptor;

/// Why an operation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No model image has been established yet
    NoModel,
    /// Another operation is in flight
    Busy,
    /// The requested outfit or pose is already the current one
    NoChange,
    /// The cursor is already on the first entry
    NothingToUndo,
    /// No uploaded photo is stored to create a model from
    NoPhoto,
}

/// The result of a studio operation.
///
/// Failures the user can act on are reported here rather than as `Err`;
/// the failure text is also kept in the studio error slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionOutcome {
    /// State changed (history appended or cursor moved)
    Applied,
    /// Nothing happened
    Skipped(SkipReason),
    /// The generation call failed; state is unchanged
    Failed { message: String },
    /// The response arrived after the session was reset and was dropped
    Discarded,
}

impl CompositionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

/// Where the session came from on mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    /// The trimmed snapshot
    Snapshot,
    /// Only the model image from the short-lived store
    ModelImage,
    /// Nothing stored
    Fresh,
}

/// A garment consumed from the catalog handoff.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedGarment {
    pub garment: GarmentDescriptor,
    /// `false` when the wardrobe already held its url
    pub added: bool,
}

/// What [`FitCheckStudio::mount`](super::FitCheckStudio::mount) found.
#[derive(Debug, Clone, PartialEq)]
pub struct MountReport {
    pub restored: RestoreSource,
    pub imported: Option<ImportedGarment>,
    pub wardrobe_len: usize,
}
