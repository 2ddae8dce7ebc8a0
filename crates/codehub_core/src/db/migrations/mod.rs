//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations per database kind in strictly increasing order.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic within one schema.
//! - Applied migration version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const REGISTRY_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("registry_0001_accounts.sql"),
}];

const ACCOUNT_SETTINGS_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("settings_0001_init.sql"),
}];

/// Database kinds owned by core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    /// Process-wide list of signed-in accounts (`accounts.db`).
    Registry,
    /// One account's private store (`<id>/settings.db`).
    AccountSettings,
}

impl Schema {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registry => "registry",
            Self::AccountSettings => "account_settings",
        }
    }

    fn migrations(self) -> &'static [Migration] {
        match self {
            Self::Registry => REGISTRY_MIGRATIONS,
            Self::AccountSettings => ACCOUNT_SETTINGS_MIGRATIONS,
        }
    }
}

/// Returns the latest migration version known by this binary for `schema`.
pub fn latest_version(schema: Schema) -> u32 {
    schema
        .migrations()
        .last()
        .map_or(0, |migration| migration.version)
}

/// Applies all pending migrations for `schema` on the provided connection.
pub fn apply_migrations(conn: &mut Connection, schema: Schema) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version(schema);

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            schema,
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in schema.migrations() {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}
