//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose account add/remove/list and pinned repository use-cases to Dart.
//! - Keep error semantics simple: envelopes with `ok` + `message`.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One process-wide `AccountService` owns every account store handle.

use codehub_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, init_storage,
    ping as ping_inner, Account, AccountId, AccountService, PinnedRepository,
    SqliteAccountRepository,
};
use log::warn;
use once_cell::sync::OnceCell;
use std::sync::Mutex;

type Service = AccountService<SqliteAccountRepository>;

static SERVICE: OnceCell<Mutex<Service>> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Fixes the app's data root and opens the account registry.
///
/// # FFI contract
/// - Sync call; performs file-system setup on first call.
/// - Repeating with the same `data_root` is a no-op.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(data_root: String) -> String {
    let paths = match init_storage(data_root.as_str()) {
        Ok(paths) => paths,
        Err(err) => return err,
    };

    match SERVICE.get_or_try_init(|| {
        SqliteAccountRepository::open(&paths)
            .map(|repo| Mutex::new(AccountService::new(repo, paths)))
    }) {
        Ok(_) => String::new(),
        Err(err) => format!("configure_storage failed: {err}"),
    }
}

/// Account row shown in the account switcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountItem {
    pub id: i64,
    pub username: String,
    pub avatar_url: String,
    pub default_startup_view: Option<String>,
    pub dont_remember: bool,
}

/// Pinned repository row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedItem {
    pub id: i64,
    pub owner: String,
    pub slug: String,
    pub name: String,
    pub image_uri: Option<String>,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected account id, when known.
    pub account_id: Option<i64>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl AccountActionResponse {
    fn success(message: impl Into<String>, account_id: AccountId) -> Self {
        Self {
            ok: true,
            account_id: Some(account_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            account_id: None,
            message: message.into(),
        }
    }
}

/// Account list envelope; `message` is empty on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountListResponse {
    pub items: Vec<AccountItem>,
    pub message: String,
}

/// Pinned repository list envelope; `message` is empty on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedListResponse {
    pub items: Vec<PinnedItem>,
    pub message: String,
}

/// Lists all signed-in accounts.
#[flutter_rust_bridge::frb(sync)]
pub fn account_list() -> AccountListResponse {
    match with_service(|service| service.list_accounts().map_err(|err| err.to_string())) {
        Ok(accounts) => AccountListResponse {
            items: accounts.into_iter().map(to_account_item).collect(),
            message: String::new(),
        },
        Err(err) => AccountListResponse {
            items: Vec::new(),
            message: format!("account_list failed: {err}"),
        },
    }
}

/// Registers a freshly authenticated account and creates its directory.
#[flutter_rust_bridge::frb(sync)]
pub fn account_add(username: String, avatar_url: String) -> AccountActionResponse {
    let username = username.trim().to_string();
    if username.is_empty() {
        return AccountActionResponse::failure("account_add failed: username cannot be empty");
    }

    let mut account = Account::new(username);
    account.avatar_url = avatar_url.trim().to_string();
    match with_service(|service| service.add_account(account).map_err(|err| err.to_string())) {
        Ok(account) => AccountActionResponse::success("Account added.", account.id),
        Err(err) => AccountActionResponse::failure(format!("account_add failed: {err}")),
    }
}

/// Saves user-editable settings for an account.
#[flutter_rust_bridge::frb(sync)]
pub fn account_update(
    account_id: i64,
    avatar_url: String,
    default_startup_view: Option<String>,
    dont_remember: bool,
) -> AccountActionResponse {
    let result = with_service(|service| {
        let mut account = service
            .get_account(account_id)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| format!("account not found: {account_id}"))?;
        account.avatar_url = avatar_url;
        account.default_startup_view = default_startup_view.filter(|view| !view.trim().is_empty());
        account.dont_remember = dont_remember;
        service.update_account(&account).map_err(|err| err.to_string())
    });

    match result {
        Ok(()) => AccountActionResponse::success("Account updated.", account_id),
        Err(err) => AccountActionResponse::failure(format!("account_update failed: {err}")),
    }
}

/// Removes an account together with its directory.
#[flutter_rust_bridge::frb(sync)]
pub fn account_remove(account_id: i64) -> AccountActionResponse {
    let result = with_service(|service| {
        let account = service
            .get_account(account_id)
            .map_err(|err| err.to_string())?
            .unwrap_or_else(|| Account::with_id(account_id, String::new()));
        service.remove_account(&account).map_err(|err| err.to_string())
    });

    match result {
        Ok(()) => AccountActionResponse::success("Account removed.", account_id),
        Err(err) => AccountActionResponse::failure(format!("account_remove failed: {err}")),
    }
}

/// Lists pinned repositories for an account.
#[flutter_rust_bridge::frb(sync)]
pub fn pinned_list(account_id: i64) -> PinnedListResponse {
    let result = with_service(|service| {
        let store = service.store(account_id).map_err(|err| err.to_string())?;
        let pinned = store.pinned_repositories().map_err(|err| err.to_string())?;
        pinned.list().map_err(|err| err.to_string())
    });

    match result {
        Ok(items) => PinnedListResponse {
            items: items.into_iter().map(to_pinned_item).collect(),
            message: String::new(),
        },
        Err(err) => PinnedListResponse {
            items: Vec::new(),
            message: format!("pinned_list failed: {err}"),
        },
    }
}

/// Pins a repository for an account.
#[flutter_rust_bridge::frb(sync)]
pub fn pinned_add(
    account_id: i64,
    owner: String,
    slug: String,
    name: String,
    image_uri: Option<String>,
) -> AccountActionResponse {
    let result = with_service(|service| {
        let store = service.store(account_id).map_err(|err| err.to_string())?;
        let pinned = store.pinned_repositories().map_err(|err| err.to_string())?;
        pinned
            .pin(owner.trim(), slug.trim(), name.as_str(), image_uri.as_deref())
            .map_err(|err| err.to_string())
    });

    match result {
        Ok(_) => AccountActionResponse::success("Repository pinned.", account_id),
        Err(err) => AccountActionResponse::failure(format!("pinned_add failed: {err}")),
    }
}

/// Unpins a repository for an account.
#[flutter_rust_bridge::frb(sync)]
pub fn pinned_remove(account_id: i64, owner: String, slug: String) -> AccountActionResponse {
    let result = with_service(|service| {
        let store = service.store(account_id).map_err(|err| err.to_string())?;
        let pinned = store.pinned_repositories().map_err(|err| err.to_string())?;
        pinned
            .unpin(owner.trim(), slug.trim())
            .map_err(|err| err.to_string())
    });

    match result {
        Ok(true) => AccountActionResponse::success("Repository unpinned.", account_id),
        Ok(false) => {
            AccountActionResponse::failure("pinned_remove failed: repository was not pinned")
        }
        Err(err) => AccountActionResponse::failure(format!("pinned_remove failed: {err}")),
    }
}

fn with_service<T, F>(f: F) -> Result<T, String>
where
    F: FnOnce(&Service) -> Result<T, String>,
{
    let Some(service) = SERVICE.get() else {
        return Err("storage is not configured; call configure_storage first".to_string());
    };
    let guard = match service.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("event=ffi_service_lock module=ffi status=recovered reason=poisoned");
            poisoned.into_inner()
        }
    };
    f(&guard)
}

fn to_account_item(account: Account) -> AccountItem {
    AccountItem {
        id: account.id,
        username: account.username,
        avatar_url: account.avatar_url,
        default_startup_view: account.default_startup_view,
        dont_remember: account.dont_remember,
    }
}

fn to_pinned_item(repo: PinnedRepository) -> PinnedItem {
    PinnedItem {
        id: repo.id,
        owner: repo.owner,
        slug: repo.slug,
        name: repo.name,
        image_uri: repo.image_uri,
    }
}
