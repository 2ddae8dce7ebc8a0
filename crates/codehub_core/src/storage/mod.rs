//! Per-account on-disk storage.
//!
//! # Responsibility
//! - Create and delete account directories.
//! - Own the lazily opened settings connection for one account and the
//!   sub-stores that share it.
//!
//! # Invariants
//! - An account directory exists before its settings file is opened.
//! - At most one live connection exists per [`AccountStore`].
//! - Errors are surfaced unchanged; nothing in this layer retries.

use crate::db::DbError;
use crate::model::account::AccountId;
use crate::repo::account_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod lifecycle;
mod pinned;
mod settings;
mod store;

pub use pinned::PinnedRepositories;
pub use settings::AccountSettings;
pub use store::{AccountConnection, AccountStore};

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer error for account directories and settings connections.
#[derive(Debug)]
pub enum StorageError {
    /// OS refused to create the account directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The settings file could not be opened or bootstrapped.
    ConnectionOpenFailed { path: PathBuf, source: DbError },
    /// Recursive delete failed; commonly a settings handle is still open.
    DirectoryDeletionFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Query failure on an already open connection.
    Db(DbError),
    /// A thread panicked while holding a storage lock.
    ConnectionPoisoned(PathBuf),
    /// The store handle is still shared and cannot be disposed.
    StoreInUse(AccountId),
    InvalidData(String),
    Repo(RepoError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => write!(
                f,
                "failed to create account directory `{}`: {source}",
                path.display()
            ),
            Self::ConnectionOpenFailed { path, source } => write!(
                f,
                "failed to open account settings `{}`: {source}",
                path.display()
            ),
            Self::DirectoryDeletionFailed { path, source } => write!(
                f,
                "failed to delete account directory `{}`: {source}",
                path.display()
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::ConnectionPoisoned(path) => write!(
                f,
                "storage lock for `{}` is poisoned",
                path.display()
            ),
            Self::StoreInUse(id) => write!(f, "account store {id} is still in use"),
            Self::InvalidData(message) => write!(f, "invalid account settings data: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DirectoryCreationFailed { source, .. } => Some(source),
            Self::ConnectionOpenFailed { source, .. } => Some(source),
            Self::DirectoryDeletionFailed { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::ConnectionPoisoned(_) | Self::StoreInUse(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RepoError> for StorageError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
