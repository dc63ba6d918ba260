//! Outfit domain module.

mod model;

pub use model::{OutfitSlot, OutfitState};
