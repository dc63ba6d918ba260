//! Application layer of FitCheck.
//!
//! [`FitCheckStudio`] drives outfit composition on top of the domain types in
//! `fitcheck-core`; it only talks to storage and the image services through
//! the core traits, so any backend can be plugged in.

pub mod messages;
pub mod studio;

pub use studio::{
    CompositionOutcome, FitCheckStudio, ImportedGarment, MountReport, Phase, RestoreSource,
    SkipReason, StudioView,
};
