//! # hitstand_web
//!
//! HTTP service for the hitstand blackjack engine: accounts with bearer
//! tokens, one round in play per account, persisted round history and
//! server-sent round events. Built on `warp`; storage is in-memory or SQLite.

pub mod accounts;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod history;
pub mod logging;
pub mod middleware;
pub mod rounds;
pub mod server;
pub mod settings;
pub mod store;

pub use accounts::{Account, AccountView, AuthError, AuthService, LoginSession};
pub use errors::{handle_rejection, ErrorResponse, ErrorSeverity, IntoErrorResponse};
pub use events::{EventBus, EventSubscription, RoundEvent};
pub use history::{HistoryError, HistoryService};
pub use logging::{init_logging, init_test_logging, LogEntry, TestLogSubscriber};
pub use middleware::{log_response, request_log};
pub use rounds::{DeckSource, RoundError, RoundManager, RoundView};
pub use server::{routes, AppContext, ServerConfig, ServerError, ServerHandle, WebServer};
pub use settings::{AppSettings, SettingsError};
pub use store::{open_storage, MemoryStore, SqliteStore, StoreError, Storage, StoredRound};
