//! Account registry contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/insert/update/delete over the `accounts` registry.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Ids are assigned by SQLite `AUTOINCREMENT` and never reused.
//! - A NULL `dont_remember` column reads as `false`.
//! - Unknown ids yield `NotFound` instead of silently succeeding.

use crate::db::{open_db, open_db_in_memory, DbError, Schema};
use crate::model::account::{Account, AccountId};
use crate::paths::AccountPaths;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

const ACCOUNT_SELECT_SQL: &str = "SELECT
    id,
    username,
    avatar_url,
    default_startup_view,
    dont_remember
FROM accounts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for account registry operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Registry directory could not be prepared.
    Io(io::Error),
    NotFound(AccountId),
    /// Insert was called with a record that already carries an id.
    AlreadyPersisted(AccountId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "account registry io error: {err}"),
            Self::NotFound(id) => write!(f, "account not found: {id}"),
            Self::AlreadyPersisted(id) => write!(f, "account {id} is already persisted"),
            Self::InvalidData(message) => write!(f, "invalid persisted account data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::NotFound(_) | Self::AlreadyPersisted(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Registry of signed-in accounts.
pub trait AccountRepository {
    /// All accounts ordered by id.
    fn list_accounts(&self) -> RepoResult<Vec<Account>>;
    fn get_account(&self, id: AccountId) -> RepoResult<Option<Account>>;
    /// Case-insensitive username lookup.
    fn find_by_username(&self, username: &str) -> RepoResult<Option<Account>>;
    /// Persists a new record and writes the assigned id back into it.
    fn insert_account(&self, account: &mut Account) -> RepoResult<AccountId>;
    fn update_account(&self, account: &Account) -> RepoResult<()>;
    fn delete_account(&self, id: AccountId) -> RepoResult<()>;
}

/// SQLite-backed registry owning its own connection to `accounts.db`.
pub struct SqliteAccountRepository {
    conn: Connection,
}

impl SqliteAccountRepository {
    /// Opens `<accounts_root>/accounts.db`, creating the root if needed.
    pub fn open(paths: &AccountPaths) -> RepoResult<Self> {
        std::fs::create_dir_all(paths.accounts_root()).map_err(RepoError::Io)?;
        let conn = open_db(paths.registry_db_path(), Schema::Registry)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> RepoResult<Self> {
        Ok(Self {
            conn: open_db_in_memory(Schema::Registry)?,
        })
    }

    /// Wraps a connection that already has the registry schema applied.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl AccountRepository for SqliteAccountRepository {
    fn list_accounts(&self) -> RepoResult<Vec<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut accounts = Vec::new();

        while let Some(row) = rows.next()? {
            accounts.push(parse_account_row(row)?);
        }

        Ok(accounts)
    }

    fn get_account(&self, id: AccountId) -> RepoResult<Option<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_account_row(row)?));
        }

        Ok(None)
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<Account>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM accounts WHERE username = ?1 COLLATE NOCASE ORDER BY id ASC LIMIT 1;",
                [username],
                |row| row.get::<_, AccountId>(0),
            )
            .optional()?;

        match id {
            Some(id) => self.get_account(id),
            None => Ok(None),
        }
    }

    fn insert_account(&self, account: &mut Account) -> RepoResult<AccountId> {
        if account.is_persisted() {
            return Err(RepoError::AlreadyPersisted(account.id));
        }

        self.conn.execute(
            "INSERT INTO accounts (
                username,
                avatar_url,
                default_startup_view,
                dont_remember
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                account.username.as_str(),
                account.avatar_url.as_str(),
                account.default_startup_view.as_deref(),
                bool_to_int(account.dont_remember),
            ],
        )?;

        account.id = self.conn.last_insert_rowid();
        Ok(account.id)
    }

    fn update_account(&self, account: &Account) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE accounts
             SET
                username = ?1,
                avatar_url = ?2,
                default_startup_view = ?3,
                dont_remember = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?5;",
            params![
                account.username.as_str(),
                account.avatar_url.as_str(),
                account.default_startup_view.as_deref(),
                bool_to_int(account.dont_remember),
                account.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(account.id));
        }

        Ok(())
    }

    fn delete_account(&self, id: AccountId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM accounts WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_account_row(row: &Row<'_>) -> RepoResult<Account> {
    // NULL means the flag was never written; "don't remember" must then be off.
    let dont_remember = match row.get::<_, Option<i64>>("dont_remember")? {
        None | Some(0) => false,
        Some(1) => true,
        Some(other) => {
            return Err(RepoError::InvalidData(format!(
                "invalid dont_remember value `{other}` in accounts.dont_remember"
            )));
        }
    };

    Ok(Account {
        id: row.get("id")?,
        username: row.get("username")?,
        avatar_url: row
            .get::<_, Option<String>>("avatar_url")?
            .unwrap_or_default(),
        default_startup_view: row.get("default_startup_view")?,
        dont_remember,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
