//! Typed cache access on top of a raw storage backend.

use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::storage::CacheStorage;
use super::traits::CacheResult;

/// Cache layer that (de)serializes values to and from the storage backend.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self::from_shared(Arc::new(storage))
  }

  /// Create a cache layer over a storage backend that is shared elsewhere.
  pub fn from_shared(storage: Arc<S>) -> Self {
    Self { storage }
  }

  /// Read the value under `key`.
  ///
  /// A missing key and a stored JSON `null` are both reported as `None`.
  /// An entry that fails to decode is an error, never a silent miss.
  pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<CacheResult<T>>> {
    let Some(entry) = self.storage.get_entry(key)? else {
      debug!(key, "Cache miss");
      return Ok(None);
    };

    let value: Option<T> = serde_json::from_slice(&entry.data)
      .map_err(|e| eyre!("Failed to decode cache entry {}: {}", key, e))?;

    Ok(value.map(|data| CacheResult::from_cache(data, entry.cached_at)))
  }

  /// Overwrite the value under `key`.
  pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
    let data =
      serde_json::to_vec(value).map_err(|e| eyre!("Failed to encode cache entry {}: {}", key, e))?;
    self.storage.put_entry(key, &data)?;
    debug!(key, bytes = data.len(), "Cache write");
    Ok(())
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}
