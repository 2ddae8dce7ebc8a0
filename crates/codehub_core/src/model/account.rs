//! Account record.
//!
//! # Responsibility
//! - Hold identity and user-editable settings for one signed-in account.
//! - Define identity semantics used by maps, sets and reload deduplication.
//!
//! # Invariants
//! - `id` is assigned by the registry on first insert and never changes after.
//! - Equality and hashing look at `id` only; every other field is ignored.
//! - `dont_remember` is `false` unless explicitly set.

use crate::paths::AccountPaths;
use crate::storage::{lifecycle, AccountStore, StorageResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Registry-assigned account identifier. `0` means "not persisted yet".
pub type AccountId = i64;

/// Id carried by records that have not been inserted into the registry.
pub const UNPERSISTED_ACCOUNT_ID: AccountId = 0;

/// Identity + settings for one signed-in account.
///
/// Two records with the same `id` are the same account even when their
/// other fields differ (e.g. a stale copy loaded before an avatar change).
/// Unpersisted records all carry id `0` and therefore compare equal and
/// collide in hash containers; persist before using them as keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    /// May be empty.
    pub avatar_url: String,
    /// Name of the view opened on launch; `None` uses the app default.
    pub default_startup_view: Option<String>,
    /// Negative on purpose: a missing value must read as "remember me".
    #[serde(default)]
    pub dont_remember: bool,
}

impl Account {
    /// Creates an unpersisted account for `username`.
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_id(UNPERSISTED_ACCOUNT_ID, username)
    }

    /// Creates a record for an id that already exists in the registry.
    pub fn with_id(id: AccountId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            avatar_url: String::new(),
            default_startup_view: None,
            dont_remember: false,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != UNPERSISTED_ACCOUNT_ID
    }

    /// Creates this account's directory if missing.
    pub fn initialize(&self, paths: &AccountPaths) -> StorageResult<()> {
        lifecycle::initialize(paths, self.id)
    }

    /// Deletes this account's directory recursively.
    ///
    /// Any [`AccountStore`] opened for this account must be disposed first.
    pub fn destroy(&self, paths: &AccountPaths) -> StorageResult<()> {
        lifecycle::destroy(paths, self.id)
    }

    /// Returns a fresh, unopened store handle for this account.
    pub fn open_store(&self, paths: &AccountPaths) -> AccountStore {
        AccountStore::new(paths.clone(), self.id)
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Account {}

impl Hash for Account {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for Account {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.username)
    }
}
