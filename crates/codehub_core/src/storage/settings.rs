//! Raw key/value settings for one account.
//!
//! # Invariants
//! - Reads and writes go through the account's single shared connection.
//! - A missing key or NULL value reads as `None` (`false` for booleans).

use super::store::AccountConnection;
use super::{StorageError, StorageResult};
use rusqlite::{params, OptionalExtension};

/// Borrowed settings view; obtain one from
/// [`AccountStore::settings`](super::AccountStore::settings).
pub struct AccountSettings<'conn> {
    conn: &'conn AccountConnection,
}

impl<'conn> AccountSettings<'conn> {
    pub(crate) fn new(conn: &'conn AccountConnection) -> Self {
        Self { conn }
    }

    pub fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self.conn.with(|conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key = ?1;",
                [key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()
        })?;
        Ok(value.flatten())
    }

    /// Inserts or replaces `key`.
    pub fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.with(|conn| {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![key, value],
            )
        })?;
        Ok(())
    }

    /// Returns whether a row was removed.
    pub fn remove(&self, key: &str) -> StorageResult<bool> {
        let changed = self
            .conn
            .with(|conn| conn.execute("DELETE FROM settings WHERE key = ?1;", [key]))?;
        Ok(changed > 0)
    }

    /// Reads a boolean flag. Absent or NULL reads as `false`.
    pub fn get_bool(&self, key: &str) -> StorageResult<bool> {
        match self.get(key)?.as_deref() {
            None | Some("0") | Some("false") => Ok(false),
            Some("1") | Some("true") => Ok(true),
            Some(other) => Err(StorageError::InvalidData(format!(
                "setting `{key}` holds non-boolean value `{other}`"
            ))),
        }
    }

    pub fn set_bool(&self, key: &str, value: bool) -> StorageResult<()> {
        self.set(key, if value { "1" } else { "0" })
    }

    /// All stored keys in ascending order.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        let keys = self.conn.with(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM settings ORDER BY key ASC;")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        })?;
        Ok(keys)
    }
}
