//! Process-wide storage configuration.
//!
//! # Responsibility
//! - Fix the user-data root once per process.
//! - Resolve a platform default when the host never configures one.
//!
//! # Invariants
//! - Once resolved, the accounts root never changes for the process lifetime.
//! - Re-initialization with a different data root is rejected.

use crate::paths::AccountPaths;
use log::{info, warn};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

/// Environment override for the user-data root (desktop/dev builds).
pub const DATA_HOME_ENV: &str = "CODEHUB_DATA_HOME";
const APP_DIR_NAME: &str = "CodeHub";

static STORAGE_STATE: OnceCell<StorageState> = OnceCell::new();

#[derive(Debug)]
struct StorageState {
    data_root: PathBuf,
    paths: AccountPaths,
}

/// Configures the user-data root for this process.
///
/// Mobile hosts pass their sandboxed data directory here before touching
/// any account.
///
/// # Errors
/// - `data_root` is empty or not absolute.
/// - Storage was already configured (or defaulted) with a different root.
pub fn init_storage(data_root: &str) -> Result<AccountPaths, String> {
    let normalized = normalize_data_root(data_root)?;
    let state = STORAGE_STATE.get_or_init(|| build_state(normalized.clone(), "host"));

    if state.data_root != normalized {
        return Err(format!(
            "storage already initialized at `{}`; refusing to switch to `{}`",
            state.data_root.display(),
            normalized.display()
        ));
    }

    Ok(state.paths.clone())
}

/// Returns the active storage layout, resolving the platform default on
/// first use when [`init_storage`] was never called.
pub fn storage_paths() -> AccountPaths {
    STORAGE_STATE
        .get_or_init(|| {
            let (data_root, source) = default_data_root();
            build_state(data_root, source)
        })
        .paths
        .clone()
}

/// Returns the configured data root, if storage has been resolved.
pub fn storage_status() -> Option<PathBuf> {
    STORAGE_STATE.get().map(|state| state.data_root.clone())
}

fn build_state(data_root: PathBuf, source: &str) -> StorageState {
    let paths = AccountPaths::from_data_root(&data_root);
    info!(
        "event=storage_init module=config status=ok source={} accounts_root={}",
        source,
        paths.accounts_root().display()
    );
    StorageState { data_root, paths }
}

fn default_data_root() -> (PathBuf, &'static str) {
    if let Some(path) = std::env::var_os(DATA_HOME_ENV) {
        return (PathBuf::from(path), "env");
    }

    if let Some(dir) = dirs::data_dir() {
        return (dir.join(APP_DIR_NAME), "platform");
    }

    warn!("event=storage_init module=config status=fallback reason=no_platform_data_dir");
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    (cwd.join(format!(".{}", APP_DIR_NAME.to_ascii_lowercase())), "cwd")
}

fn normalize_data_root(data_root: &str) -> Result<PathBuf, String> {
    let trimmed = data_root.trim();
    if trimmed.is_empty() {
        return Err("data_root cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!(
            "data_root must be an absolute path, got `{trimmed}`"
        ));
    }
    Ok(path.to_path_buf())
}
