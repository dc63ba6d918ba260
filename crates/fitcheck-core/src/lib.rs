//! Domain layer of the FitCheck outfit composition engine.
//!
//! Holds the garment and outfit models, the category classifier, the undo
//! history, poses and the session snapshot, together with the traits the
//! outer layers implement: persistence ([`storage::KeyValueStore`], the
//! repositories) and the remote image services ([`generation`]).

pub mod config;
pub mod error;
pub mod garment;
pub mod generation;
pub mod history;
pub mod import;
pub mod outfit;
pub mod pose;
pub mod session;
pub mod storage;
pub mod wardrobe;

pub use error::{FitCheckError, GenerationError, Result};
