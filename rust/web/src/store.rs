//! Record store for accounts, rounds and round history.
//!
//! Every round action ends in exactly one [`Storage::commit`], which writes
//! the new bankroll, the round document and (once resolved) the history
//! entry together. Rounds are stored as opaque JSON documents.

use crate::accounts::{Account, AccountId};
use chrono::{SecondsFormat, Utc};
use hitstand_engine::logger::RoundRecord;
use hitstand_engine::round::{PlayerAction, Round, RoundPhase};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;

pub type RoundId = String;

/// A round as persisted: the engine state plus ownership and the action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRound {
    pub id: RoundId,
    pub account_id: AccountId,
    pub round: Round,
    #[serde(default)]
    pub actions: Vec<PlayerAction>,
    pub created_at: String,
    pub updated_at: String,
}

impl StoredRound {
    pub fn is_open(&self) -> bool {
        self.round.phase() == RoundPhase::InPlay
    }
}

/// Everything one round action changes, written atomically.
#[derive(Debug, Clone)]
pub struct Commit {
    pub account_id: AccountId,
    pub bankroll: u32,
    pub round: StoredRound,
    pub history: Option<RoundRecord>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username already registered: {0}")]
    Conflict(String),
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),
    #[error("Storage lock poisoned")]
    Poisoned,
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Stored document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Cannot open database: {0}")]
    Io(#[from] std::io::Error),
}

impl crate::errors::IntoErrorResponse for StoreError {
    fn status_code(&self) -> warp::http::StatusCode {
        use warp::http::StatusCode;
        match self {
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            StoreError::Conflict(_) => "username_taken",
            StoreError::AccountNotFound(_) => "account_not_found",
            StoreError::Poisoned => "storage_poisoned",
            StoreError::Database(_) | StoreError::Io(_) => "storage_error",
            StoreError::Corrupt(_) => "storage_corrupt",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> crate::errors::ErrorSeverity {
        use crate::errors::ErrorSeverity;
        match self {
            StoreError::Conflict(_) | StoreError::AccountNotFound(_) => ErrorSeverity::Client,
            StoreError::Poisoned | StoreError::Corrupt(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Server,
        }
    }
}

/// Persistence collaborator for the web service.
pub trait Storage: Send + Sync + fmt::Debug {
    /// Fails with [`StoreError::Conflict`] when the username is taken.
    fn insert_account(&self, account: &Account) -> Result<(), StoreError>;

    fn account(&self, id: &str) -> Result<Option<Account>, StoreError>;

    fn account_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    fn round(&self, id: &str) -> Result<Option<StoredRound>, StoreError>;

    /// The account's in-play round, if any.
    fn open_round(&self, account_id: &str) -> Result<Option<StoredRound>, StoreError>;

    /// Writes bankroll, round and history entry as one unit.
    fn commit(&self, commit: Commit) -> Result<(), StoreError>;

    /// Resolved rounds, most recent first.
    fn history(&self, account_id: &str, limit: usize) -> Result<Vec<RoundRecord>, StoreError>;
}

/// Opens SQLite at `database`, or an in-memory store when `None`.
pub fn open_storage(database: Option<&Path>) -> Result<Arc<dyn Storage>, StoreError> {
    match database {
        Some(path) => {
            tracing::info!(path = %path.display(), "opening sqlite storage");
            Ok(Arc::new(SqliteStore::open(path)?))
        }
        None => {
            tracing::info!("using in-memory storage");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<AccountId, Account>,
    usernames: HashMap<String, AccountId>,
    rounds: HashMap<RoundId, StoredRound>,
    /// Account to its unresolved round
    open_rounds: HashMap<AccountId, RoundId>,
    history: HashMap<AccountId, Vec<RoundRecord>>,
}

/// Everything behind one lock, so a commit is trivially atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStore {
    fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        if state.usernames.contains_key(&account.username) {
            return Err(StoreError::Conflict(account.username.clone()));
        }
        state
            .usernames
            .insert(account.username.clone(), account.id.clone());
        state.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    fn account(&self, id: &str) -> Result<Option<Account>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.accounts.get(id).cloned())
    }

    fn account_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state
            .usernames
            .get(username)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    fn round(&self, id: &str) -> Result<Option<StoredRound>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.rounds.get(id).cloned())
    }

    fn open_round(&self, account_id: &str) -> Result<Option<StoredRound>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state
            .open_rounds
            .get(account_id)
            .and_then(|id| state.rounds.get(id))
            .cloned())
    }

    fn commit(&self, commit: Commit) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        let account = state
            .accounts
            .get_mut(&commit.account_id)
            .ok_or_else(|| StoreError::AccountNotFound(commit.account_id.clone()))?;
        account.bankroll = commit.bankroll;
        if let Some(record) = commit.history {
            state
                .history
                .entry(commit.account_id.clone())
                .or_default()
                .push(record);
        }
        let owner = commit.round.account_id.clone();
        if commit.round.is_open() {
            state.open_rounds.insert(owner, commit.round.id.clone());
        } else if state.open_rounds.get(&owner) == Some(&commit.round.id) {
            state.open_rounds.remove(&owner);
        }
        state.rounds.insert(commit.round.id.clone(), commit.round);
        Ok(())
    }

    fn history(&self, account_id: &str, limit: usize) -> Result<Vec<RoundRecord>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state
            .history
            .get(account_id)
            .map(|list| list.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id TEXT NOT NULL PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    bankroll INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS rounds (
    id TEXT NOT NULL PRIMARY KEY,
    account_id TEXT NOT NULL REFERENCES accounts(id),
    phase TEXT NOT NULL,
    document TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS rounds_account_phase ON rounds(account_id, phase);
CREATE TABLE IF NOT EXISTS history (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    round_id TEXT NOT NULL UNIQUE,
    account_id TEXT NOT NULL REFERENCES accounts(id),
    record TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS history_account ON history(account_id, seq);
";

/// SQLite-backed store; one connection behind a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn account_where(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<Account>, StoreError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT id, username, password_hash, bankroll, created_at FROM accounts WHERE {} = ?1",
            column
        );
        let account = conn
            .query_row(&sql, params![value], |row| {
                Ok(Account {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                    bankroll: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .optional()?;
        Ok(account)
    }

    fn round_where(&self, sql: &str, value: &str) -> Result<Option<StoredRound>, StoreError> {
        let conn = self.lock()?;
        let document: Option<String> = conn
            .query_row(sql, params![value], |row| row.get(0))
            .optional()?;
        match document {
            Some(doc) => Ok(Some(serde_json::from_str(&doc)?)),
            None => Ok(None),
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(info, _)
            if info.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Storage for SqliteStore {
    fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO accounts (id, username, password_hash, bankroll, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.id,
                account.username,
                account.password_hash,
                account.bankroll,
                account.created_at
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict(account.username.clone())
            } else {
                StoreError::Database(e)
            }
        })?;
        Ok(())
    }

    fn account(&self, id: &str) -> Result<Option<Account>, StoreError> {
        self.account_where("id", id)
    }

    fn account_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        self.account_where("username", username)
    }

    fn round(&self, id: &str) -> Result<Option<StoredRound>, StoreError> {
        self.round_where("SELECT document FROM rounds WHERE id = ?1", id)
    }

    fn open_round(&self, account_id: &str) -> Result<Option<StoredRound>, StoreError> {
        self.round_where(
            "SELECT document FROM rounds WHERE account_id = ?1 AND phase = 'in_play' LIMIT 1",
            account_id,
        )
    }

    fn commit(&self, commit: Commit) -> Result<(), StoreError> {
        let document = serde_json::to_string(&commit.round)?;
        let record = commit
            .history
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let updated = tx.execute(
            "UPDATE accounts SET bankroll = ?1 WHERE id = ?2",
            params![commit.bankroll, commit.account_id],
        )?;
        if updated != 1 {
            return Err(StoreError::AccountNotFound(commit.account_id));
        }
        tx.execute(
            "INSERT INTO rounds (id, account_id, phase, document, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                phase = excluded.phase,
                document = excluded.document,
                updated_at = excluded.updated_at",
            params![
                commit.round.id,
                commit.account_id,
                commit.round.round.phase().as_str(),
                document,
                commit.round.created_at,
                commit.round.updated_at
            ],
        )?;
        if let (Some(record), Some(history)) = (record, commit.history.as_ref()) {
            tx.execute(
                "INSERT INTO history (round_id, account_id, record) VALUES (?1, ?2, ?3)",
                params![history.round_id, commit.account_id, record],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn history(&self, account_id: &str, limit: usize) -> Result<Vec<RoundRecord>, StoreError> {
        let conn = self.lock()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(
            "SELECT record FROM history WHERE account_id = ?1 ORDER BY seq DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![account_id, limit], |row| row.get::<_, String>(0))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_str(&row?)?);
        }
        Ok(records)
    }
}
