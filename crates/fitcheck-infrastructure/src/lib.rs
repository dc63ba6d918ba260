//! Infrastructure layer: versioned persistence, stores, paths and configuration.

pub mod config_service;
pub mod dto;
pub mod paths;
pub mod pending_import;
pub mod session_repository;
pub mod storage;
pub mod wardrobe_repository;

pub use config_service::{ConfigService, load_secret_config};
pub use paths::FitCheckPaths;
pub use pending_import::KvPendingImportSource;
pub use session_repository::KvSessionRepository;
pub use storage::{JsonFileKeyValueStore, MemoryKeyValueStore};
pub use wardrobe_repository::KvWardrobeRepository;
