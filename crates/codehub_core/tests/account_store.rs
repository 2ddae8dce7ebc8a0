use codehub_core::storage::lifecycle;
use codehub_core::{Account, AccountPaths, AccountStore, StorageError};
use std::sync::{Arc, Barrier};
use std::thread;

fn temp_paths() -> (tempfile::TempDir, AccountPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = AccountPaths::from_data_root(dir.path());
    (dir, paths)
}

#[test]
fn connection_is_opened_once_and_reused() {
    let (_dir, paths) = temp_paths();
    let store = AccountStore::new(paths, 1);

    let first = Arc::clone(store.connection().unwrap());
    let second = Arc::clone(store.connection().unwrap());

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn connection_opens_settings_file_inside_account_directory() {
    let (_dir, paths) = temp_paths();
    let account = Account::with_id(7, "octocat");
    account.initialize(&paths).unwrap();
    let store = account.open_store(&paths);

    let conn = store.connection().unwrap();

    assert_eq!(conn.path(), paths.settings_db_path(7));
    assert!(paths.settings_db_path(7).is_file());
}

#[test]
fn connection_creates_missing_directory() {
    let (_dir, paths) = temp_paths();
    let store = AccountStore::new(paths.clone(), 15);
    assert!(!lifecycle::exists(&paths, 15));

    store.connection().unwrap();

    assert!(lifecycle::exists(&paths, 15));
}

#[test]
fn concurrent_first_callers_share_one_connection() {
    let (_dir, paths) = temp_paths();
    let store = Arc::new(AccountStore::new(paths, 11));
    let workers = 8;
    let barrier = Arc::new(Barrier::new(workers));

    let handles = (0..workers)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                Arc::as_ptr(store.connection().unwrap()) as usize
            })
        })
        .collect::<Vec<_>>();

    let pointers = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect::<Vec<_>>();
    assert!(pointers.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(Arc::strong_count(store.connection().unwrap()), 1);
}

#[test]
fn settings_survive_dispose_and_new_handle() {
    let (_dir, paths) = temp_paths();
    let account = Account::with_id(7, "octocat");
    account.initialize(&paths).unwrap();

    let mut store = account.open_store(&paths);
    store.settings().unwrap().set("username", "octocat").unwrap();
    store.dispose().unwrap();
    assert!(!store.is_open());

    let reopened = AccountStore::new(paths, 7);
    let username = reopened.settings().unwrap().get("username").unwrap();
    assert_eq!(username.as_deref(), Some("octocat"));
}

#[test]
fn destroy_then_initialize_yields_empty_store() {
    let (_dir, paths) = temp_paths();
    lifecycle::initialize(&paths, 3).unwrap();

    let mut store = AccountStore::new(paths.clone(), 3);
    store.settings().unwrap().set("theme", "dark").unwrap();
    store
        .pinned_repositories()
        .unwrap()
        .pin("rust-lang", "rust", "rust", None)
        .unwrap();
    store.dispose().unwrap();

    lifecycle::destroy(&paths, 3).unwrap();
    assert!(!paths.account_directory(3).exists());

    lifecycle::initialize(&paths, 3).unwrap();
    let fresh = AccountStore::new(paths, 3);
    assert!(fresh.settings().unwrap().keys().unwrap().is_empty());
    assert!(fresh.pinned_repositories().unwrap().is_empty().unwrap());
}

#[test]
fn dispose_is_idempotent_and_keeps_directory() {
    let (_dir, paths) = temp_paths();
    let mut store = AccountStore::new(paths.clone(), 4);
    store.connection().unwrap();

    store.dispose().unwrap();
    store.dispose().unwrap();

    assert!(!store.is_open());
    assert!(paths.account_directory(4).is_dir());
}

#[test]
fn pinned_repositories_are_cached_on_the_shared_connection() {
    let (_dir, paths) = temp_paths();
    let store = AccountStore::new(paths, 2);

    let first = store.pinned_repositories().unwrap();
    let second = store.pinned_repositories().unwrap();
    assert!(std::ptr::eq(first, second));

    // store + pinned collection
    assert_eq!(Arc::strong_count(store.connection().unwrap()), 2);
}

#[test]
fn settings_and_pins_share_one_file() {
    let (_dir, paths) = temp_paths();
    let mut store = AccountStore::new(paths.clone(), 6);
    store.settings().unwrap().set("default_view", "news").unwrap();
    store
        .pinned_repositories()
        .unwrap()
        .pin("octocat", "hello-world", "Hello World", None)
        .unwrap();
    store.dispose().unwrap();

    let raw = rusqlite::Connection::open(paths.settings_db_path(6)).unwrap();
    let settings: i64 = raw
        .query_row("SELECT COUNT(*) FROM settings;", [], |row| row.get(0))
        .unwrap();
    let pins: i64 = raw
        .query_row("SELECT COUNT(*) FROM pinned_repositories;", [], |row| row.get(0))
        .unwrap();
    assert_eq!((settings, pins), (1, 1));
}

#[test]
fn missing_boolean_setting_reads_false() {
    let (_dir, paths) = temp_paths();
    let store = AccountStore::new(paths, 9);
    let settings = store.settings().unwrap();

    assert!(!settings.get_bool("dont_remember").unwrap());
    settings.set_bool("dont_remember", true).unwrap();
    assert!(settings.get_bool("dont_remember").unwrap());
    assert!(settings.remove("dont_remember").unwrap());
    assert!(!settings.get_bool("dont_remember").unwrap());
}

#[test]
fn corrupt_settings_file_fails_to_open() {
    let (_dir, paths) = temp_paths();
    lifecycle::initialize(&paths, 13).unwrap();
    std::fs::write(paths.settings_db_path(13), vec![b'x'; 4096]).unwrap();

    let store = AccountStore::new(paths.clone(), 13);
    let err = store.connection().unwrap_err();

    match err {
        StorageError::ConnectionOpenFailed { path, .. } => {
            assert_eq!(path, paths.settings_db_path(13));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!store.is_open());
}
