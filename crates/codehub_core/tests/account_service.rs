use codehub_core::{
    Account, AccountPaths, AccountRepository, AccountService, RepoError, SqliteAccountRepository,
    StorageError,
};
use std::sync::Arc;

fn service() -> (tempfile::TempDir, AccountService<SqliteAccountRepository>) {
    let dir = tempfile::tempdir().unwrap();
    let paths = AccountPaths::from_data_root(dir.path());
    let repo = SqliteAccountRepository::open(&paths).unwrap();
    (dir, AccountService::new(repo, paths))
}

#[test]
fn add_account_persists_row_and_directory() {
    let (_dir, service) = service();

    let account = service.add_account(Account::new("octocat")).unwrap();

    assert!(account.is_persisted());
    assert!(service.has_directory(account.id));
    assert_eq!(service.list_accounts().unwrap(), vec![account]);
}

#[test]
fn store_is_cached_per_account() {
    let (_dir, service) = service();
    let account = service.add_account(Account::new("octocat")).unwrap();

    let first = service.store(account.id).unwrap();
    let second = service.store(account.id).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(service.cached_store_ids().unwrap(), vec![account.id]);
}

#[test]
fn remove_account_disposes_and_deletes_everything() {
    let (_dir, service) = service();
    let account = service.add_account(Account::new("octocat")).unwrap();
    {
        let store = service.store(account.id).unwrap();
        store
            .pinned_repositories()
            .unwrap()
            .pin("octocat", "hello-world", "Hello World", None)
            .unwrap();
    }

    service.remove_account(&account).unwrap();

    assert!(!service.has_directory(account.id));
    assert!(service.get_account(account.id).unwrap().is_none());
    assert!(service.cached_store_ids().unwrap().is_empty());
}

#[test]
fn remove_account_refuses_while_store_is_held() {
    let (_dir, service) = service();
    let account = service.add_account(Account::new("octocat")).unwrap();
    let held = service.store(account.id).unwrap();
    held.connection().unwrap();

    let err = service.remove_account(&account).unwrap_err();
    assert!(matches!(err, StorageError::StoreInUse(id) if id == account.id));
    assert!(service.has_directory(account.id));
    assert!(service.get_account(account.id).unwrap().is_some());

    drop(held);
    service.remove_account(&account).unwrap();
    assert!(!service.has_directory(account.id));
}

#[test]
fn release_store_keeps_data() {
    let (_dir, service) = service();
    let account = service.add_account(Account::new("octocat")).unwrap();
    service
        .store(account.id)
        .unwrap()
        .settings()
        .unwrap()
        .set("username", "octocat")
        .unwrap();

    service.release_store(account.id).unwrap();
    service.release_store(account.id).unwrap();

    let value = service
        .store(account.id)
        .unwrap()
        .settings()
        .unwrap()
        .get("username")
        .unwrap();
    assert_eq!(value.as_deref(), Some("octocat"));
}

#[test]
fn update_account_goes_through_repository() {
    let (_dir, service) = service();
    let mut account = service.add_account(Account::new("octocat")).unwrap();

    account.default_startup_view = Some("repositories".to_string());
    service.update_account(&account).unwrap();

    let loaded = service
        .repository()
        .get_account(account.id)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.default_startup_view.as_deref(), Some("repositories"));
    assert_eq!(
        service.find_by_username("OCTOCAT").unwrap().map(|a| a.id),
        Some(account.id)
    );
}

#[test]
fn add_account_rolls_back_row_when_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let paths = AccountPaths::from_data_root(dir.path());
    let repo = SqliteAccountRepository::open(&paths).unwrap();
    let service = AccountService::new(repo, paths.clone());

    // The next auto-increment id is 1; block its directory with a file.
    std::fs::write(paths.account_directory(1), b"blocker").unwrap();

    let err = service.add_account(Account::new("octocat")).unwrap_err();
    assert!(matches!(err, StorageError::DirectoryCreationFailed { .. }));
    assert!(service.list_accounts().unwrap().is_empty());
}

#[test]
fn remove_account_refuses_while_connection_clone_is_held() {
    let (_dir, service) = service();
    let account = service.add_account(Account::new("octocat")).unwrap();
    let store = service.store(account.id).unwrap();
    let escaped = Arc::clone(store.connection().unwrap());
    drop(store);

    let err = service.remove_account(&account).unwrap_err();
    assert!(matches!(err, StorageError::StoreInUse(id) if id == account.id));
    assert!(service.has_directory(account.id));
    assert!(service.get_account(account.id).unwrap().is_some());
    assert_eq!(service.cached_store_ids().unwrap(), vec![account.id]);

    let cached = service.store(account.id).unwrap();
    assert!(Arc::ptr_eq(cached.connection().unwrap(), &escaped));
    drop(cached);

    drop(escaped);
    service.remove_account(&account).unwrap();
    assert!(!service.has_directory(account.id));
    assert!(service.get_account(account.id).unwrap().is_none());
}

#[test]
fn store_rejects_unregistered_ids_without_touching_disk() {
    let (_dir, service) = service();

    for id in [999, 0, -5] {
        let err = service.store(id).unwrap_err();
        assert!(matches!(err, StorageError::Repo(RepoError::NotFound(missing)) if missing == id));
        assert!(!service.has_directory(id));
    }
    assert!(service.cached_store_ids().unwrap().is_empty());
}

#[test]
fn remove_unknown_account_reports_not_found() {
    let (_dir, service) = service();

    let err = service
        .remove_account(&Account::with_id(12345, String::new()))
        .unwrap_err();
    assert!(matches!(err, StorageError::Repo(RepoError::NotFound(12345))));
}

#[test]
fn remove_account_cleans_up_directory_without_row() {
    let (_dir, service) = service();
    std::fs::create_dir_all(service.paths().account_directory(42)).unwrap();

    service
        .remove_account(&Account::with_id(42, String::new()))
        .unwrap();
    assert!(!service.has_directory(42));
}
