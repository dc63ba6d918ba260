//! Garment domain module.
//!
//! - `model`: `GarmentDescriptor` and the `Category` slot enum
//! - `classifier`: name-based category detection

mod classifier;
mod model;

pub use classifier::{classify, classify_with_hint};
pub use model::{Category, GarmentDescriptor};
