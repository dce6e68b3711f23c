//! Request handlers. Each takes the services it needs and returns a
//! finished response; errors are rendered through
//! [`IntoErrorResponse`](crate::errors::IntoErrorResponse).

pub mod auth;
pub mod game;
pub mod health;
pub mod history;
pub mod settings;
pub mod sse;

use crate::accounts::{Account, AuthService};
use crate::errors::IntoErrorResponse;
use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

pub use auth::{account, login, logout, register, Credentials};
pub use game::{current_round, get_round, start_round, submit_action, ActionRequest, BetRequest};
pub use health::health;
pub use history::{get_history, get_statistics, HistoryQuery};
pub use settings::get_settings;
pub use sse::{stream_events, EventsQuery};

pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    reply::with_status(reply::json(body), status).into_response()
}

/// The caller's account, or the 401 response to send instead.
pub(crate) fn require_account(
    auth: &AuthService,
    header: Option<&str>,
) -> Result<Account, Response> {
    auth.authenticate(header)
        .map_err(|err| err.into_http_response())
}
