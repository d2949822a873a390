//! Cache storage trait and its SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

use super::traits::CachedEntry;
use crate::db::Database;

/// Trait for cache storage backends.
///
/// Entries never expire; a `put_entry` overwrites whatever the key held.
pub trait CacheStorage: Send + Sync {
  /// Get the raw entry stored under `key`.
  fn get_entry(&self, key: &str) -> Result<Option<CachedEntry>>;

  /// Store raw data under `key`.
  fn put_entry(&self, key: &str, data: &[u8]) -> Result<()>;
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  db: Arc<Database>,
}

impl SqliteStorage {
  pub fn new(db: Arc<Database>) -> Self {
    Self { db }
  }
}

impl CacheStorage for SqliteStorage {
  fn get_entry(&self, key: &str) -> Result<Option<CachedEntry>> {
    let conn = self.db.conn()?;

    let row: Option<(Vec<u8>, String)> = conn
      .query_row(
        "SELECT data, cached_at FROM cache_entries WHERE cache_key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache entry {}: {}", key, e))?;

    match row {
      Some((data, cached_at_str)) => Ok(Some(CachedEntry {
        data,
        cached_at: parse_datetime(&cached_at_str)?,
      })),
      None => Ok(None),
    }
  }

  fn put_entry(&self, key: &str, data: &[u8]) -> Result<()> {
    let conn = self.db.conn()?;

    conn
      .execute(
        "INSERT OR REPLACE INTO cache_entries (cache_key, data, cached_at)
         VALUES (?, ?, datetime('now'))",
        params![key, data],
      )
      .map_err(|e| eyre!("Failed to store cache entry {}: {}", key, e))?;

    Ok(())
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}
