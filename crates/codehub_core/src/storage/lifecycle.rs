//! Account directory lifecycle.
//!
//! # Responsibility
//! - Create an account's directory (`initialize`).
//! - Remove an account's directory tree (`destroy`).
//!
//! # Invariants
//! - Both operations are idempotent.
//! - [`ensure_account_directory`] is the only directory-creation routine;
//!   the store's lazy open path goes through it too.
//! - `destroy` must only run after the account's store has been disposed.
//!
//! State per account: `Absent -> initialize -> DirectoryExists -> first
//! connection -> ConnectionOpen -> dispose -> DirectoryExists -> destroy -> Absent`.
//! `destroy` may be called from any state the caller has disposed.

use super::{StorageError, StorageResult};
use crate::model::account::AccountId;
use crate::paths::AccountPaths;
use log::{debug, error, info};
use std::io::ErrorKind;
use std::path::PathBuf;

/// Ensures `<accounts_root>/<id>` exists and returns it.
pub fn ensure_account_directory(paths: &AccountPaths, id: AccountId) -> StorageResult<PathBuf> {
    let dir = paths.account_directory(id);
    if dir.is_dir() {
        return Ok(dir);
    }

    match std::fs::create_dir_all(&dir) {
        Ok(()) => {
            info!("event=account_dir_create module=storage status=ok account_id={id}");
            Ok(dir)
        }
        Err(source) => {
            error!(
                "event=account_dir_create module=storage status=error account_id={id} error_code=dir_create_failed error={source}"
            );
            Err(StorageError::DirectoryCreationFailed { path: dir, source })
        }
    }
}

/// Creates the account directory; succeeds silently when it already exists.
pub fn initialize(paths: &AccountPaths, id: AccountId) -> StorageResult<()> {
    ensure_account_directory(paths, id).map(|_| ())
}

/// Deletes the account directory and everything below it.
///
/// Missing directories are not an error. Callers must dispose the account's
/// [`AccountStore`](super::AccountStore) first: deleting an open settings file
/// fails or corrupts depending on the platform.
pub fn destroy(paths: &AccountPaths, id: AccountId) -> StorageResult<()> {
    let dir = paths.account_directory(id);
    match std::fs::remove_dir_all(&dir) {
        Ok(()) => {
            info!("event=account_dir_destroy module=storage status=ok account_id={id}");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("event=account_dir_destroy module=storage status=skipped account_id={id} reason=absent");
            Ok(())
        }
        Err(source) => {
            error!(
                "event=account_dir_destroy module=storage status=error account_id={id} error_code=dir_delete_failed error={source}"
            );
            Err(StorageError::DirectoryDeletionFailed { path: dir, source })
        }
    }
}

/// Whether the account directory is currently present on disk.
pub fn exists(paths: &AccountPaths, id: AccountId) -> bool {
    paths.account_directory(id).is_dir()
}
