//! User-facing texts: loading messages and friendly error mapping.

use fitcheck_core::error::GenerationError;
use fitcheck_core::outfit::OutfitState;
use fitcheck_core::pose::Pose;

/// Error context of a failed garment selection.
pub const COMPOSE_FAILED: &str = "Outfit composition failed";
/// Error context of a failed pose change.
pub const POSE_FAILED: &str = "Pose change failed";
/// Error context of a failed garment removal.
pub const REMOVE_FAILED: &str = "Could not remove garment";
/// Error context of a failed model creation.
pub const MODEL_FAILED: &str = "Could not create your model";

pub const CREATING_MODEL: &str = "Creating your model...";

pub const UPDATING_OUTFIT: &str = "Updating outfit...";

/// `Trying on: a + b...`, full-body garment first.
pub fn trying_on(outfit: &OutfitState) -> String {
    format!("Trying on: {}...", outfit.garment_names().join(" + "))
}

pub fn changing_pose(pose: Pose) -> String {
    format!("Changing pose: {}...", pose)
}

/// Maps a generation failure to the text shown to the user.
pub fn friendly_error_message(err: &GenerationError, context: &str) -> String {
    match err {
        GenerationError::Unreachable(_) => {
            format!("{context}: cannot reach the image service. Please check your connection.")
        }
        GenerationError::Rejected {
            status: Some(429), ..
        } => format!("{context}: the image service is busy, please try again in a moment."),
        GenerationError::Rejected { message, .. } | GenerationError::InvalidInput(message) => {
            format!("{context}: {message}")
        }
        GenerationError::EmptyResult => {
            format!("{context}: the image service returned no image.")
        }
    }
}
