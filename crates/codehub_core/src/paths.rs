//! Account directory layout.
//!
//! # Responsibility
//! - Compute the root directory holding every account's data.
//! - Compute per-account directories and the files inside them.
//!
//! # Invariants
//! - Pure path arithmetic; nothing here touches disk.
//! - Account ids are rendered with integer `Display`, which never applies
//!   locale digit grouping, so a directory name doubles as a storage key.
//! - Distinct ids always map to distinct directories.

use crate::model::account::AccountId;
use std::path::{Path, PathBuf};

/// Fixed settings file name inside every account directory.
pub const SETTINGS_DB_FILE_NAME: &str = "settings.db";
/// Registry file listing all accounts, stored beside the account directories.
pub const REGISTRY_DB_FILE_NAME: &str = "accounts.db";

const DOCUMENTS_DIR_NAME: &str = "Documents";
const ACCOUNTS_DIR_NAME: &str = "accounts";

/// Resolved on-disk layout for account storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountPaths {
    accounts_root: PathBuf,
}

impl AccountPaths {
    /// Derives the layout from the platform user-data root:
    /// `<data_root>/Documents/accounts`.
    pub fn from_data_root(data_root: impl AsRef<Path>) -> Self {
        Self {
            accounts_root: data_root
                .as_ref()
                .join(DOCUMENTS_DIR_NAME)
                .join(ACCOUNTS_DIR_NAME),
        }
    }

    /// Uses `accounts_root` verbatim as the root directory.
    pub fn with_accounts_root(accounts_root: impl Into<PathBuf>) -> Self {
        Self {
            accounts_root: accounts_root.into(),
        }
    }

    pub fn accounts_root(&self) -> &Path {
        &self.accounts_root
    }

    /// `<accounts_root>/<id>`.
    pub fn account_directory(&self, id: AccountId) -> PathBuf {
        self.accounts_root.join(id.to_string())
    }

    /// `<accounts_root>/<id>/settings.db`.
    pub fn settings_db_path(&self, id: AccountId) -> PathBuf {
        self.account_directory(id).join(SETTINGS_DB_FILE_NAME)
    }

    /// `<accounts_root>/accounts.db`.
    pub fn registry_db_path(&self) -> PathBuf {
        self.accounts_root.join(REGISTRY_DB_FILE_NAME)
    }
}
