//! Model poses available for pose variations.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// A pose the model can be re-rendered in.
///
/// The string form (`standing`, `handsonhips`, ...) is what gets persisted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Pose {
    #[default]
    Standing,
    HandsOnHips,
    Turned,
    Side,
    Walking,
    Jumping,
    Leaning,
    Sitting,
}

impl Pose {
    /// The instruction sent to the generation backend.
    pub fn instruction(&self) -> &'static str {
        match self {
            Pose::Standing => "full body shot, standing straight, fashion model pose",
            Pose::HandsOnHips => "standing with hands on hips, confident fashion pose, full body",
            Pose::Turned => "standing slightly turned, 3/4 view, fashion model pose, full body",
            Pose::Side => "side profile view, fashion model pose, full body",
            Pose::Walking => "walking towards camera, fashion runway pose, full body",
            Pose::Jumping => "jumping in the air, dynamic fashion pose, full body",
            Pose::Leaning => "leaning against a wall, casual fashion pose, full body",
            Pose::Sitting => "sitting on a chair, fashion model pose, full body",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Pose::Standing => "Standing",
            Pose::HandsOnHips => "Hands on hips",
            Pose::Turned => "Turned 3/4",
            Pose::Side => "Side profile",
            Pose::Walking => "Walking",
            Pose::Jumping => "Jumping",
            Pose::Leaning => "Leaning",
            Pose::Sitting => "Sitting",
        }
    }

    /// Parses a stored pose id; unknown ids fall back to `standing`.
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::debug!("Unknown stored pose '{}', using standing", raw);
                Pose::Standing
            }),
            None => Pose::Standing,
        }
    }

    pub fn catalog() -> Vec<Pose> {
        Pose::iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_ids_round_trip() {
        assert_eq!(Pose::HandsOnHips.to_string(), "handsonhips");
        assert_eq!("handsonhips".parse::<Pose>().unwrap(), Pose::HandsOnHips);
        assert!("moonwalk".parse::<Pose>().is_err());
    }

    #[test]
    fn test_from_stored_falls_back() {
        assert_eq!(Pose::from_stored(Some("sitting")), Pose::Sitting);
        assert_eq!(Pose::from_stored(Some("moonwalk")), Pose::Standing);
        assert_eq!(Pose::from_stored(None), Pose::Standing);
    }

    #[test]
    fn test_catalog_has_eight_poses() {
        let catalog = Pose::catalog();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog[0], Pose::Standing);
        assert!(Pose::Standing.instruction().contains("standing straight"));
    }

    #[test]
    fn test_pose_serde() {
        assert_eq!(serde_json::to_string(&Pose::Turned).unwrap(), "\"turned\"");
    }
}
