use codehub_core::{
    Account, AccountPaths, AccountRepository, RepoError, SqliteAccountRepository,
};

#[test]
fn insert_assigns_increasing_ids() {
    let repo = SqliteAccountRepository::in_memory().unwrap();
    let mut first = Account::new("octocat");
    let mut second = Account::new("hubot");

    let first_id = repo.insert_account(&mut first).unwrap();
    let second_id = repo.insert_account(&mut second).unwrap();

    assert_eq!(first.id, first_id);
    assert!(first_id > 0);
    assert!(second_id > first_id);
}

#[test]
fn insert_rejects_persisted_record() {
    let repo = SqliteAccountRepository::in_memory().unwrap();
    let mut account = Account::with_id(3, "octocat");

    let err = repo.insert_account(&mut account).unwrap_err();
    assert!(matches!(err, RepoError::AlreadyPersisted(3)));
}

#[test]
fn get_roundtrip_preserves_fields_and_default_flag() {
    let repo = SqliteAccountRepository::in_memory().unwrap();
    let mut account = Account::new("octocat");
    account.avatar_url = "https://avatars.example/u/583231".to_string();
    account.default_startup_view = Some("news".to_string());
    repo.insert_account(&mut account).unwrap();

    let loaded = repo.get_account(account.id).unwrap().unwrap();
    assert_eq!(loaded.username, "octocat");
    assert_eq!(loaded.avatar_url, "https://avatars.example/u/583231");
    assert_eq!(loaded.default_startup_view.as_deref(), Some("news"));
    assert!(!loaded.dont_remember);
}

#[test]
fn null_dont_remember_reads_as_false() {
    let repo = SqliteAccountRepository::in_memory().unwrap();
    repo.connection()
        .execute(
            "INSERT INTO accounts (username, avatar_url) VALUES ('legacy', '');",
            [],
        )
        .unwrap();
    let id = repo.connection().last_insert_rowid();

    let loaded = repo.get_account(id).unwrap().unwrap();
    assert!(!loaded.dont_remember);
    assert!(loaded.default_startup_view.is_none());
}

#[test]
fn invalid_dont_remember_is_reported() {
    let repo = SqliteAccountRepository::in_memory().unwrap();
    repo.connection()
        .execute(
            "INSERT INTO accounts (username, dont_remember) VALUES ('odd', 7);",
            [],
        )
        .unwrap();

    let err = repo.list_accounts().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn update_and_delete() {
    let repo = SqliteAccountRepository::in_memory().unwrap();
    let mut account = Account::new("octocat");
    repo.insert_account(&mut account).unwrap();

    account.dont_remember = true;
    account.default_startup_view = None;
    repo.update_account(&account).unwrap();
    assert!(repo.get_account(account.id).unwrap().unwrap().dont_remember);

    repo.delete_account(account.id).unwrap();
    assert!(repo.get_account(account.id).unwrap().is_none());
}

#[test]
fn unknown_ids_are_not_found() {
    let repo = SqliteAccountRepository::in_memory().unwrap();

    let update = repo.update_account(&Account::with_id(99, "ghost")).unwrap_err();
    assert!(matches!(update, RepoError::NotFound(99)));
    let delete = repo.delete_account(99).unwrap_err();
    assert!(matches!(delete, RepoError::NotFound(99)));
}

#[test]
fn find_by_username_ignores_case() {
    let repo = SqliteAccountRepository::in_memory().unwrap();
    let mut account = Account::new("OctoCat");
    repo.insert_account(&mut account).unwrap();

    let found = repo.find_by_username("octocat").unwrap().unwrap();
    assert_eq!(found, account);
    assert!(repo.find_by_username("hubot").unwrap().is_none());
}

#[test]
fn list_is_ordered_by_id() {
    let repo = SqliteAccountRepository::in_memory().unwrap();
    for name in ["c", "a", "b"] {
        repo.insert_account(&mut Account::new(name)).unwrap();
    }

    let names = repo
        .list_accounts()
        .unwrap()
        .into_iter()
        .map(|account| account.username)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[test]
fn file_registry_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let paths = AccountPaths::from_data_root(dir.path());

    let mut account = Account::new("octocat");
    {
        let repo = SqliteAccountRepository::open(&paths).unwrap();
        repo.insert_account(&mut account).unwrap();
    }

    assert!(paths.registry_db_path().is_file());
    let repo = SqliteAccountRepository::open(&paths).unwrap();
    let accounts = repo.list_accounts().unwrap();
    assert_eq!(accounts, vec![account]);
    assert!(!accounts[0].dont_remember);
}

#[test]
fn ids_are_not_reused_after_delete() {
    let repo = SqliteAccountRepository::in_memory().unwrap();
    let mut first = Account::new("first");
    repo.insert_account(&mut first).unwrap();
    repo.delete_account(first.id).unwrap();

    let mut second = Account::new("second");
    repo.insert_account(&mut second).unwrap();
    assert!(second.id > first.id);
}
