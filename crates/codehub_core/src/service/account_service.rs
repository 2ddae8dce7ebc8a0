//! Account use-case service.
//!
//! # Responsibility
//! - Orchestrate the add/remove account flows across the registry and the
//!   on-disk account directories.
//! - Keep one shared [`AccountStore`] per account id for the process.
//!
//! # Invariants
//! - `add_account` leaves a registry row and an initialized directory.
//! - `remove_account` disposes the store before deleting the directory and
//!   deletes nothing while the store or its connection is still shared.
//! - Store handles exist only for ids present in the registry.
//! - Service APIs never bypass repository contracts.

use crate::model::account::{Account, AccountId};
use crate::paths::AccountPaths;
use crate::repo::account_repo::{AccountRepository, RepoError};
use crate::storage::{lifecycle, AccountStore, StorageError, StorageResult};
use log::{info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Use-case service for signed-in accounts.
pub struct AccountService<R: AccountRepository> {
    repo: R,
    paths: AccountPaths,
    stores: Mutex<HashMap<AccountId, Arc<AccountStore>>>,
}

impl<R: AccountRepository> AccountService<R> {
    pub fn new(repo: R, paths: AccountPaths) -> Self {
        Self {
            repo,
            paths,
            stores: Mutex::new(HashMap::new()),
        }
    }

    pub fn paths(&self) -> &AccountPaths {
        &self.paths
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn list_accounts(&self) -> StorageResult<Vec<Account>> {
        Ok(self.repo.list_accounts()?)
    }

    pub fn get_account(&self, id: AccountId) -> StorageResult<Option<Account>> {
        Ok(self.repo.get_account(id)?)
    }

    pub fn find_by_username(&self, username: &str) -> StorageResult<Option<Account>> {
        Ok(self.repo.find_by_username(username)?)
    }

    /// Persists `account` and creates its directory.
    ///
    /// The registry row is rolled back when the directory cannot be created.
    pub fn add_account(&self, mut account: Account) -> StorageResult<Account> {
        let id = self.repo.insert_account(&mut account)?;

        if let Err(err) = account.initialize(&self.paths) {
            if let Err(rollback) = self.repo.delete_account(id) {
                warn!(
                    "event=account_add module=service status=error account_id={id} error_code=rollback_failed error={rollback}"
                );
            }
            return Err(err);
        }

        info!("event=account_add module=service status=ok account_id={id}");
        Ok(account)
    }

    /// Saves edited settings for an already persisted account.
    pub fn update_account(&self, account: &Account) -> StorageResult<()> {
        Ok(self.repo.update_account(account)?)
    }

    /// Removes an account: dispose store, delete directory, delete row.
    ///
    /// A directory left behind without a registry row is still cleaned up.
    ///
    /// # Errors
    /// - [`StorageError::StoreInUse`] when a store handle returned by
    ///   [`store`](Self::store), or a connection taken from it, is still held
    ///   elsewhere; nothing is deleted.
    /// - [`StorageError::DirectoryDeletionFailed`] from the directory delete;
    ///   the registry row is kept so the caller can retry.
    /// - [`RepoError::NotFound`] when neither a registry row nor a directory
    ///   exists for the id.
    pub fn remove_account(&self, account: &Account) -> StorageResult<()> {
        let id = account.id;
        let registered = self.repo.get_account(id)?.is_some();
        if !registered && !self.has_directory(id) {
            return Err(RepoError::NotFound(id).into());
        }

        self.release_store(id)?;
        account.destroy(&self.paths)?;

        if registered {
            self.repo.delete_account(id)?;
        }

        info!("event=account_remove module=service status=ok account_id={id}");
        Ok(())
    }

    /// Returns the process-wide store handle for a registered account,
    /// creating an unopened one on first request.
    ///
    /// # Errors
    /// - [`RepoError::NotFound`] when `id` is not in the registry; no
    ///   directory is created for it.
    pub fn store(&self, id: AccountId) -> StorageResult<Arc<AccountStore>> {
        let mut stores = self.lock_stores()?;
        if let Some(store) = stores.get(&id) {
            return Ok(Arc::clone(store));
        }

        if self.repo.get_account(id)?.is_none() {
            return Err(RepoError::NotFound(id).into());
        }

        let store = Arc::new(AccountStore::new(self.paths.clone(), id));
        stores.insert(id, Arc::clone(&store));
        Ok(store)
    }

    /// Disposes the cached store for `id`, keeping its data on disk.
    ///
    /// No-op when no store is cached. On [`StorageError::StoreInUse`] the
    /// store stays cached and open.
    pub fn release_store(&self, id: AccountId) -> StorageResult<()> {
        let mut stores = self.lock_stores()?;
        let Some(store) = stores.remove(&id) else {
            return Ok(());
        };

        let mut store = match Arc::try_unwrap(store) {
            Ok(store) => store,
            Err(shared) => {
                stores.insert(id, shared);
                return Err(StorageError::StoreInUse(id));
            }
        };

        if let Err(err) = store.dispose() {
            stores.insert(id, Arc::new(store));
            return Err(err);
        }
        Ok(())
    }

    /// Ids with a cached store handle, ascending.
    pub fn cached_store_ids(&self) -> StorageResult<Vec<AccountId>> {
        let stores = self.lock_stores()?;
        let mut ids = stores.keys().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        Ok(ids)
    }

    /// Whether the account's directory is present on disk.
    pub fn has_directory(&self, id: AccountId) -> bool {
        lifecycle::exists(&self.paths, id)
    }

    fn lock_stores(&self) -> StorageResult<MutexGuard<'_, HashMap<AccountId, Arc<AccountStore>>>> {
        self.stores
            .lock()
            .map_err(|_| StorageError::ConnectionPoisoned(self.paths.accounts_root().to_path_buf()))
    }
}
