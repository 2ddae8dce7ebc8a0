//! Pinned repositories sub-store.
//!
//! # Responsibility
//! - Persist the repositories a user pinned for one account.
//!
//! # Invariants
//! - Shares the owning store's connection; never opens its own.
//! - At most one row per owner/slug pair, compared case-insensitively.
//! - Listing order is display name (case-insensitive), then insertion.

use super::store::AccountConnection;
use super::{StorageError, StorageResult};
use crate::model::pinned::PinnedRepository;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;

const PINNED_SELECT_SQL: &str = "SELECT id, owner, slug, name, image_uri FROM pinned_repositories";

/// Pinned repositories for one account.
///
/// Obtained from [`AccountStore::pinned_repositories`](super::AccountStore::pinned_repositories),
/// which caches a single instance per open store.
#[derive(Debug)]
pub struct PinnedRepositories {
    conn: Arc<AccountConnection>,
}

impl PinnedRepositories {
    pub(crate) fn new(conn: Arc<AccountConnection>) -> Self {
        Self { conn }
    }

    /// Pins a repository, or refreshes name/image when it is already pinned.
    pub fn pin(
        &self,
        owner: &str,
        slug: &str,
        name: &str,
        image_uri: Option<&str>,
    ) -> StorageResult<PinnedRepository> {
        let id = self.conn.with(|conn| {
            let tx = conn.transaction()?;
            let existing = find_row(&tx, owner, slug)?;
            let id = match existing {
                Some(repo) => {
                    tx.execute(
                        "UPDATE pinned_repositories SET name = ?1, image_uri = ?2 WHERE id = ?3;",
                        params![name, image_uri, repo.id],
                    )?;
                    repo.id
                }
                None => {
                    tx.execute(
                        "INSERT INTO pinned_repositories (owner, slug, name, image_uri)
                         VALUES (?1, ?2, ?3, ?4);",
                        params![owner, slug, name, image_uri],
                    )?;
                    tx.last_insert_rowid()
                }
            };
            tx.commit()?;
            Ok(id)
        })?;

        Ok(PinnedRepository {
            id,
            owner: owner.to_string(),
            slug: slug.to_string(),
            name: name.to_string(),
            image_uri: image_uri.map(str::to_string),
        })
    }

    /// Returns whether a pin was removed.
    pub fn unpin(&self, owner: &str, slug: &str) -> StorageResult<bool> {
        let changed = self.conn.with(|conn| {
            conn.execute(
                "DELETE FROM pinned_repositories
                 WHERE owner = ?1 COLLATE NOCASE AND slug = ?2 COLLATE NOCASE;",
                params![owner, slug],
            )
        })?;
        Ok(changed > 0)
    }

    /// Removes a pin by row id.
    pub fn remove(&self, id: i64) -> StorageResult<bool> {
        let changed = self.conn.with(|conn| {
            conn.execute("DELETE FROM pinned_repositories WHERE id = ?1;", [id])
        })?;
        Ok(changed > 0)
    }

    pub fn find(&self, owner: &str, slug: &str) -> StorageResult<Option<PinnedRepository>> {
        self.conn.with(|conn| find_row(conn, owner, slug))
    }

    pub fn is_pinned(&self, owner: &str, slug: &str) -> StorageResult<bool> {
        Ok(self.find(owner, slug)?.is_some())
    }

    pub fn list(&self) -> StorageResult<Vec<PinnedRepository>> {
        self.conn.with(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{PINNED_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"
            ))?;
            let rows = stmt.query_map([], parse_pinned_row)?;
            rows.collect()
        })
    }

    pub fn len(&self) -> StorageResult<usize> {
        let count = self.conn.with(|conn| {
            conn.query_row("SELECT COUNT(*) FROM pinned_repositories;", [], |row| {
                row.get::<_, i64>(0)
            })
        })?;
        row_count(count)
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Removes every pin and returns how many were removed.
    pub fn clear(&self) -> StorageResult<usize> {
        let changed = self
            .conn
            .with(|conn| conn.execute("DELETE FROM pinned_repositories;", []))?;
        Ok(changed)
    }
}

fn find_row(
    conn: &Connection,
    owner: &str,
    slug: &str,
) -> rusqlite::Result<Option<PinnedRepository>> {
    conn.query_row(
        &format!(
            "{PINNED_SELECT_SQL}
             WHERE owner = ?1 COLLATE NOCASE AND slug = ?2 COLLATE NOCASE;"
        ),
        params![owner, slug],
        parse_pinned_row,
    )
    .optional()
}

fn row_count(count: i64) -> StorageResult<usize> {
    usize::try_from(count).map_err(|_| {
        StorageError::InvalidData(format!("invalid pinned repository count `{count}`"))
    })
}

fn parse_pinned_row(row: &Row<'_>) -> rusqlite::Result<PinnedRepository> {
    Ok(PinnedRepository {
        id: row.get("id")?,
        owner: row.get("owner")?,
        slug: row.get("slug")?,
        name: row.get("name")?,
        image_uri: row.get("image_uri")?,
    })
}
