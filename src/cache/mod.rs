//! Key-value caching layer.
//!
//! This module provides a storage-agnostic cache that:
//! - Stores JSON-serialized values under string keys, without expiration
//! - Treats a stored `null` the same as a missing key
//! - Ships a SQLite backend, plus an in-memory backend for tests

mod layer;
#[cfg(test)]
mod memory;
mod storage;
mod traits;

pub use layer::CacheLayer;
#[cfg(test)]
pub use memory::MemoryStorage;
pub use storage::{CacheStorage, SqliteStorage};
pub use traits::{CacheResult, CacheSource};
