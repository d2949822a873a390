//! In-memory cache storage used by tests.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::storage::CacheStorage;
use super::traits::CachedEntry;

/// Storage that keeps entries in process memory and counts writes.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, CachedEntry>>,
  writes: AtomicUsize,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of `put_entry` calls so far
  pub fn write_count(&self) -> usize {
    self.writes.load(Ordering::SeqCst)
  }
}

impl CacheStorage for MemoryStorage {
  fn get_entry(&self, key: &str) -> Result<Option<CachedEntry>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(entries.get(key).cloned())
  }

  fn put_entry(&self, key: &str, data: &[u8]) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.insert(
      key.to_string(),
      CachedEntry {
        data: data.to_vec(),
        cached_at: Utc::now(),
      },
    );
    self.writes.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_counts_writes() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.write_count(), 0);
    storage.put_entry("jobs", b"[]").unwrap();
    assert_eq!(storage.write_count(), 1);
    assert_eq!(storage.get_entry("jobs").unwrap().unwrap().data, b"[]");
  }

  #[test]
  fn test_put_overwrites() {
    let storage = MemoryStorage::new();
    storage.put_entry("jobs", b"[1]").unwrap();
    storage.put_entry("jobs", b"[2]").unwrap();
    assert_eq!(storage.get_entry("jobs").unwrap().unwrap().data, b"[2]");
    assert_eq!(storage.write_count(), 2);
  }
}
