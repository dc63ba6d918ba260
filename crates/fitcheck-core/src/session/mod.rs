//! Session snapshot and its persistence contract.

pub mod model;
pub mod repository;

pub use model::SessionSnapshot;
pub use repository::SessionRepository;
