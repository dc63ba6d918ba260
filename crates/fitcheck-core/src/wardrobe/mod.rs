//! Wardrobe: the garments available for try-on.

mod catalog;
pub mod repository;
mod store;

pub use catalog::default_catalog;
pub use repository::{StoredGarment, WardrobeRepository};
pub use store::WardrobeStore;
