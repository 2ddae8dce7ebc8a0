//! Lazily opened per-account store handle.
//!
//! # Responsibility
//! - Open one account's `settings.db` on first use and share that single
//!   connection with every consumer of the account.
//! - Cache the pinned repositories sub-store built on the same connection.
//! - Release the connection on `dispose` and on drop.
//! - Refuse to dispose while a connection clone is held outside the store.
//!
//! # Invariants
//! - The connection cell is initialize-once: concurrent first callers block
//!   on one open and all observe the same [`AccountConnection`].
//! - A live connection is never reopened; only `dispose` clears it.
//! - The pinned cell is dropped before the connection cell.

use super::lifecycle::ensure_account_directory;
use super::pinned::PinnedRepositories;
use super::settings::AccountSettings;
use super::{StorageError, StorageResult};
use crate::db::{open_db, Schema};
use crate::model::account::AccountId;
use crate::paths::AccountPaths;
use log::{info, warn};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Open settings connection for one account.
///
/// SQLite access is serialized through an internal mutex, so the settings
/// rows and the pinned repositories see one write order.
#[derive(Debug)]
pub struct AccountConnection {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl AccountConnection {
    fn new(path: PathBuf, conn: Connection) -> Self {
        Self {
            path,
            conn: Mutex::new(conn),
        }
    }

    /// Location of the open settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Locks the connection for a multi-statement unit of work.
    pub fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::ConnectionPoisoned(self.path.clone()))
    }

    /// Runs `f` with exclusive access to the connection.
    pub fn with<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T>,
    {
        let mut guard = self.lock()?;
        Ok(f(&mut *guard)?)
    }

    fn close(self) -> Result<(), rusqlite::Error> {
        let conn = match self.conn.into_inner() {
            Ok(conn) => conn,
            Err(poisoned) => poisoned.into_inner(),
        };
        conn.close().map_err(|(_, err)| err)
    }
}

/// Store handle for one account's settings file.
///
/// Creating a handle is free; the directory check and file open happen on
/// the first [`connection`](Self::connection) call, which is blocking I/O.
pub struct AccountStore {
    paths: AccountPaths,
    account_id: AccountId,
    connection: OnceCell<Arc<AccountConnection>>,
    pinned: OnceCell<PinnedRepositories>,
}

impl AccountStore {
    pub fn new(paths: AccountPaths, account_id: AccountId) -> Self {
        Self {
            paths,
            account_id,
            connection: OnceCell::new(),
            pinned: OnceCell::new(),
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn paths(&self) -> &AccountPaths {
        &self.paths
    }

    /// Whether a connection is currently open.
    pub fn is_open(&self) -> bool {
        self.connection.get().is_some()
    }

    /// Returns the account's connection, opening it on first call.
    ///
    /// # Errors
    /// - [`StorageError::DirectoryCreationFailed`] when the account directory
    ///   is missing and cannot be created.
    /// - [`StorageError::ConnectionOpenFailed`] when `settings.db` cannot be
    ///   opened or migrated.
    pub fn connection(&self) -> StorageResult<&Arc<AccountConnection>> {
        self.connection.get_or_try_init(|| self.open_connection())
    }

    /// Raw key/value settings view over the shared connection.
    pub fn settings(&self) -> StorageResult<AccountSettings<'_>> {
        Ok(AccountSettings::new(self.connection()?))
    }

    /// Returns the cached pinned repositories collection, building it on
    /// first call against [`connection`](Self::connection).
    pub fn pinned_repositories(&self) -> StorageResult<&PinnedRepositories> {
        self.pinned.get_or_try_init(|| {
            let conn = Arc::clone(self.connection()?);
            Ok(PinnedRepositories::new(conn))
        })
    }

    /// Releases the open connection, if any. Safe to call repeatedly.
    ///
    /// Leaves the account directory in place; see
    /// [`lifecycle::destroy`](super::lifecycle::destroy).
    ///
    /// # Errors
    /// - [`StorageError::StoreInUse`] when a clone of the connection returned
    ///   by [`connection`](Self::connection) is still alive. The connection
    ///   stays in this store and the file stays open.
    pub fn dispose(&mut self) -> StorageResult<()> {
        drop(self.pinned.take());

        let Some(conn) = self.connection.take() else {
            return Ok(());
        };

        match Arc::try_unwrap(conn) {
            Ok(conn) => {
                match conn.close() {
                    Ok(()) => info!(
                        "event=account_store_dispose module=storage status=ok account_id={}",
                        self.account_id
                    ),
                    Err(err) => warn!(
                        "event=account_store_dispose module=storage status=error account_id={} error_code=db_close_failed error={}",
                        self.account_id, err
                    ),
                }
                Ok(())
            }
            Err(shared) => {
                warn!(
                    "event=account_store_dispose module=storage status=refused account_id={} outstanding_refs={}",
                    self.account_id,
                    Arc::strong_count(&shared) - 1
                );
                // Cell was emptied by `take` above.
                let _ = self.connection.set(shared);
                Err(StorageError::StoreInUse(self.account_id))
            }
        }
    }

    fn open_connection(&self) -> StorageResult<Arc<AccountConnection>> {
        let started_at = Instant::now();
        ensure_account_directory(&self.paths, self.account_id)?;

        let path = self.paths.settings_db_path(self.account_id);
        let conn = open_db(&path, Schema::AccountSettings).map_err(|source| {
            StorageError::ConnectionOpenFailed {
                path: path.clone(),
                source,
            }
        })?;

        info!(
            "event=account_store_open module=storage status=ok account_id={} duration_ms={}",
            self.account_id,
            started_at.elapsed().as_millis()
        );
        Ok(Arc::new(AccountConnection::new(path, conn)))
    }
}

impl Drop for AccountStore {
    fn drop(&mut self) {
        if self.dispose().is_err() {
            // Closed once the last outside clone drops.
            warn!(
                "event=account_store_drop module=storage status=deferred account_id={}",
                self.account_id
            );
        }
    }
}

impl std::fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStore")
            .field("account_id", &self.account_id)
            .field("accounts_root", &self.paths.accounts_root())
            .field("open", &self.is_open())
            .finish()
    }
}
