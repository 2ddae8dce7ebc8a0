//! Core account storage for the CodeHub mobile client.
//!
//! Each signed-in account gets an isolated directory with its own
//! `settings.db`, opened lazily and shared by every consumer of the account.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod paths;
pub mod repo;
pub mod service;
pub mod storage;

pub use config::{init_storage, storage_paths, storage_status};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{Account, AccountId, UNPERSISTED_ACCOUNT_ID};
pub use model::pinned::PinnedRepository;
pub use paths::AccountPaths;
pub use repo::account_repo::{AccountRepository, RepoError, RepoResult, SqliteAccountRepository};
pub use service::account_service::AccountService;
pub use storage::{
    AccountConnection, AccountSettings, AccountStore, PinnedRepositories, StorageError,
    StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
