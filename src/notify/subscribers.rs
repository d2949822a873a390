//! Persistent list of notification recipients.

use color_eyre::{eyre::eyre, Result};
use lettre::Address;
use rusqlite::params;
use std::sync::Arc;

use crate::db::Database;

/// Someone who receives change notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
  pub email: String,
  pub created_at: String,
}

impl Subscriber {
  pub fn email(&self) -> &str {
    &self.email
  }
}

/// Store of people to notify about job changes.
pub trait SubscriberStore: Send + Sync {
  /// All subscribers, oldest first.
  fn all(&self) -> Result<Vec<Subscriber>>;

  /// Add a subscriber. Returns `false` if the address was already subscribed.
  fn add(&self, email: &str) -> Result<bool>;

  /// Remove a subscriber. Returns `false` if the address was not subscribed.
  fn remove(&self, email: &str) -> Result<bool>;
}

/// Subscriber store backed by the `subscribers` table.
pub struct SqliteSubscriberStore {
  db: Arc<Database>,
}

impl SqliteSubscriberStore {
  pub fn new(db: Arc<Database>) -> Self {
    Self { db }
  }
}

impl SubscriberStore for SqliteSubscriberStore {
  fn all(&self) -> Result<Vec<Subscriber>> {
    let conn = self.db.conn()?;

    let mut stmt = conn
      .prepare("SELECT email, created_at FROM subscribers ORDER BY id")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let subscribers = stmt
      .query_map([], |row| {
        Ok(Subscriber {
          email: row.get(0)?,
          created_at: row.get(1)?,
        })
      })
      .map_err(|e| eyre!("Failed to query subscribers: {}", e))?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(|e| eyre!("Failed to read subscriber row: {}", e))?;

    Ok(subscribers)
  }

  fn add(&self, email: &str) -> Result<bool> {
    let email = normalize_email(email)?;
    let conn = self.db.conn()?;

    let inserted = conn
      .execute(
        "INSERT OR IGNORE INTO subscribers (email) VALUES (?)",
        params![email],
      )
      .map_err(|e| eyre!("Failed to add subscriber {}: {}", email, e))?;

    Ok(inserted > 0)
  }

  fn remove(&self, email: &str) -> Result<bool> {
    let conn = self.db.conn()?;

    let deleted = conn
      .execute(
        "DELETE FROM subscribers WHERE email = ?",
        params![email.trim()],
      )
      .map_err(|e| eyre!("Failed to remove subscriber {}: {}", email, e))?;

    Ok(deleted > 0)
  }
}

/// Validate that `email` is a deliverable mailbox address.
fn normalize_email(email: &str) -> Result<String> {
  let email = email.trim();
  email
    .parse::<Address>()
    .map_err(|e| eyre!("Invalid email address {:?}: {}", email, e))?;
  Ok(email.to_string())
}
