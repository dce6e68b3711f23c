//! Player accounts and bearer-token sessions.

use crate::errors::{ErrorSeverity, IntoErrorResponse};
use crate::store::{now_rfc3339, StoreError, Storage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;
use warp::http::StatusCode;

pub type AccountId = String;

pub const MAX_USERNAME_LEN: usize = 50;
/// bcrypt work-factor bounds
pub const MIN_PASSWORD_COST: u32 = 4;
pub const MAX_PASSWORD_COST: u32 = 31;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    /// bcrypt hash (`$2b$...`), salt included
    pub password_hash: String,
    pub bankroll: u32,
    pub created_at: String,
}

impl Account {
    pub fn view(&self) -> AccountView {
        AccountView {
            id: self.id.clone(),
            username: self.username.clone(),
            bankroll: self.bankroll,
            created_at: self.created_at.clone(),
        }
    }
}

/// What clients get to see of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: AccountId,
    pub username: String,
    pub bankroll: u32,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSession {
    pub token: String,
    pub expires_in_seconds: u64,
    pub account: AccountView,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username and password are required")]
    MissingCredentials,
    #[error("Username must be at most {MAX_USERNAME_LEN} characters")]
    UsernameTooLong,
    #[error("Username already exists: {0}")]
    UsernameTaken(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Missing or invalid bearer token")]
    Unauthorized,
    #[error("Session expired, log in again")]
    SessionExpired,
    #[error("Token table lock poisoned")]
    StoragePoisoned,
    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(username) => AuthError::UsernameTaken(username),
            other => AuthError::Store(other),
        }
    }
}

impl IntoErrorResponse for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials | AuthError::UsernameTooLong => StatusCode::BAD_REQUEST,
            AuthError::UsernameTaken(_) => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::Unauthorized | AuthError::SessionExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::StoragePoisoned | AuthError::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthError::Store(err) => err.status_code(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::UsernameTooLong => "invalid_username",
            AuthError::UsernameTaken(_) => "username_taken",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Unauthorized => "unauthorized",
            AuthError::SessionExpired => "session_expired",
            AuthError::StoragePoisoned => "storage_poisoned",
            AuthError::PasswordHash(_) => "password_hash_failed",
            AuthError::Store(err) => err.error_code(),
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            AuthError::StoragePoisoned => ErrorSeverity::Critical,
            AuthError::PasswordHash(_) => ErrorSeverity::Server,
            AuthError::Store(err) => err.severity(),
            _ => ErrorSeverity::Client,
        }
    }
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// A stored value that is not a bcrypt hash never matches.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match bcrypt::verify(password, stored) {
        Ok(matches) => matches,
        Err(err) => {
            tracing::warn!(error = %err, "stored password hash is unreadable");
            false
        }
    }
}

#[derive(Debug, Clone)]
struct TokenEntry {
    account_id: AccountId,
    last_active: Instant,
}

/// Registration, login and token checks over a [`Storage`].
///
/// Tokens live in memory only; a restart logs everybody out.
#[derive(Debug)]
pub struct AuthService {
    store: Arc<dyn Storage>,
    tokens: RwLock<HashMap<String, TokenEntry>>,
    ttl: Duration,
    starting_bankroll: u32,
    password_cost: u32,
}

impl AuthService {
    pub fn new(store: Arc<dyn Storage>, starting_bankroll: u32, ttl: Duration) -> Self {
        Self {
            store,
            tokens: RwLock::new(HashMap::new()),
            ttl,
            starting_bankroll,
            password_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost.clamp(MIN_PASSWORD_COST, MAX_PASSWORD_COST);
        self
    }

    pub fn register(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(AuthError::UsernameTooLong);
        }

        let account = Account {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: hash_password(password, self.password_cost)?,
            bankroll: self.starting_bankroll,
            created_at: now_rfc3339(),
        };
        self.store.insert_account(&account)?;
        tracing::info!(account_id = %account.id, username = %account.username, "account registered");
        Ok(account)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginSession, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        let account = self
            .store
            .account_by_username(username)?
            .filter(|account| verify_password(password, &account.password_hash))
            .ok_or_else(|| {
                tracing::debug!(username = %username, "login rejected");
                AuthError::InvalidCredentials
            })?;

        let token = Uuid::new_v4().to_string();
        self.tokens
            .write()
            .map_err(|_| AuthError::StoragePoisoned)?
            .insert(
                token.clone(),
                TokenEntry {
                    account_id: account.id.clone(),
                    last_active: Instant::now(),
                },
            );
        tracing::info!(account_id = %account.id, "logged in");
        Ok(LoginSession {
            token,
            expires_in_seconds: self.ttl.as_secs(),
            account: account.view(),
        })
    }

    /// Revokes the token; revoking an unknown token is unauthorized.
    pub fn logout(&self, header: Option<&str>) -> Result<(), AuthError> {
        let token = bearer_token(header).ok_or(AuthError::Unauthorized)?;
        let removed = self
            .tokens
            .write()
            .map_err(|_| AuthError::StoragePoisoned)?
            .remove(token);
        match removed {
            Some(entry) => {
                tracing::info!(account_id = %entry.account_id, "logged out");
                Ok(())
            }
            None => Err(AuthError::Unauthorized),
        }
    }

    /// Resolves an `Authorization` header value to its account and refreshes
    /// the token's inactivity clock.
    pub fn authenticate(&self, header: Option<&str>) -> Result<Account, AuthError> {
        let token = bearer_token(header).ok_or(AuthError::Unauthorized)?;
        self.authenticate_token(token)
    }

    pub fn authenticate_token(&self, token: &str) -> Result<Account, AuthError> {
        let account_id = {
            let mut tokens = self.tokens.write().map_err(|_| AuthError::StoragePoisoned)?;
            let entry = tokens.get_mut(token).ok_or(AuthError::Unauthorized)?;
            if entry.last_active.elapsed() > self.ttl {
                tokens.remove(token);
                return Err(AuthError::SessionExpired);
            }
            entry.last_active = Instant::now();
            entry.account_id.clone()
        };
        self.store
            .account(&account_id)?
            .ok_or(AuthError::Unauthorized)
    }

    /// Drops every token idle for longer than the TTL.
    pub fn cleanup_expired(&self) -> Result<usize, AuthError> {
        let mut tokens = self.tokens.write().map_err(|_| AuthError::StoragePoisoned)?;
        let before = tokens.len();
        tokens.retain(|_, entry| entry.last_active.elapsed() <= self.ttl);
        let removed = before - tokens.len();
        if removed > 0 {
            tracing::debug!(removed, "expired tokens dropped");
        }
        Ok(removed)
    }

    pub fn active_tokens(&self) -> usize {
        self.tokens.read().map(|tokens| tokens.len()).unwrap_or(0)
    }

    pub fn store(&self) -> Arc<dyn Storage> {
        Arc::clone(&self.store)
    }
}

/// Accepts `Bearer <token>` or a bare token.
fn bearer_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service(ttl: Duration) -> AuthService {
        AuthService::new(Arc::new(MemoryStore::new()), 1000, ttl)
            .with_password_cost(MIN_PASSWORD_COST)
    }

    #[test]
    fn password_hash_round_trip() {
        let stored = hash_password("hunter2", MIN_PASSWORD_COST).unwrap();
        assert!(stored.starts_with("$2"), "bcrypt format: {stored}");
        assert!(!stored.contains("hunter2"));
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
        assert!(!verify_password("hunter2", "garbage"));
        assert_ne!(
            stored,
            hash_password("hunter2", MIN_PASSWORD_COST).unwrap(),
            "salt must differ"
        );
    }

    #[test]
    fn registered_accounts_store_bcrypt_hashes() {
        let auth = service(Duration::from_secs(60));
        let account = auth.register("carol", "s3cret").unwrap();
        assert!(account.password_hash.starts_with("$2b$04$"));
        assert!(verify_password("s3cret", &account.password_hash));
        assert!(auth.login("carol", "s3cret").is_ok());
        assert!(matches!(
            auth.login("carol", "S3cret"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn cost_is_kept_within_bcrypt_bounds() {
        let auth = service(Duration::from_secs(60)).with_password_cost(99);
        assert_eq!(auth.password_cost, MAX_PASSWORD_COST);
        let auth = auth.with_password_cost(1);
        assert_eq!(auth.password_cost, MIN_PASSWORD_COST);
    }

    #[test]
    fn register_requires_both_fields() {
        let auth = service(Duration::from_secs(60));
        assert!(matches!(
            auth.register("", "pw"),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            auth.register("bob", ""),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            auth.register(&"x".repeat(51), "pw"),
            Err(AuthError::UsernameTooLong)
        ));
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let auth = service(Duration::from_secs(60));
        let account = auth.register("alice", "pw").unwrap();
        assert_eq!(account.bankroll, 1000);
        let err = auth.register("alice", "other").unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken(_)));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn login_authenticate_logout() {
        let auth = service(Duration::from_secs(60));
        auth.register("alice", "pw").unwrap();
        assert!(matches!(
            auth.login("alice", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody", "pw"),
            Err(AuthError::InvalidCredentials)
        ));

        let session = auth.login("alice", "pw").unwrap();
        assert_eq!(session.expires_in_seconds, 60);
        let header = format!("Bearer {}", session.token);
        let account = auth.authenticate(Some(&header)).unwrap();
        assert_eq!(account.username, "alice");
        assert_eq!(auth.authenticate_token(&session.token).unwrap().id, account.id);

        auth.logout(Some(&header)).unwrap();
        assert!(matches!(
            auth.authenticate(Some(&header)),
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(auth.logout(Some(&header)), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let auth = service(Duration::from_secs(60));
        assert!(matches!(auth.authenticate(None), Err(AuthError::Unauthorized)));
        assert!(matches!(
            auth.authenticate(Some("Bearer ")),
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn idle_tokens_expire() {
        let auth = service(Duration::ZERO);
        auth.register("alice", "pw").unwrap();
        let session = auth.login("alice", "pw").unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert!(matches!(
            auth.authenticate_token(&session.token),
            Err(AuthError::SessionExpired)
        ));
        assert_eq!(auth.active_tokens(), 0);
    }

    #[test]
    fn cleanup_drops_expired_tokens() {
        let auth = service(Duration::ZERO);
        auth.register("alice", "pw").unwrap();
        auth.login("alice", "pw").unwrap();
        auth.login("alice", "pw").unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(auth.cleanup_expired().unwrap(), 2);
        assert_eq!(auth.active_tokens(), 0);
    }
}
