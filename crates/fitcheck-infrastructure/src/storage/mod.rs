//! Key-value store implementations.

mod file_store;
mod memory_store;

pub use file_store::JsonFileKeyValueStore;
pub use memory_store::MemoryKeyValueStore;
