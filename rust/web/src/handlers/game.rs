use super::{json_response, require_account};
use crate::accounts::AuthService;
use crate::errors::IntoErrorResponse;
use crate::rounds::RoundManager;
use hitstand_engine::round::PlayerAction;
use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;

#[derive(Debug, Deserialize)]
pub struct BetRequest {
    pub bet: u32,
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: PlayerAction,
}

/// Places a bet and deals a new round.
///
/// - **Method**: POST
/// - **Path**: `/api/rounds`
/// - **Body**: `{"bet": 50}`
///
/// Responds 201 with the round view. The dealer's hole card is hidden
/// until the round resolves. Errors:
/// - `invalid_amount` (400): bet outside the table limits
/// - `insufficient_funds` (400): bet exceeds the bankroll
/// - `invalid_state` (409): the account already has a round in play
pub async fn start_round(
    auth: Arc<AuthService>,
    rounds: Arc<RoundManager>,
    authorization: Option<String>,
    request: BetRequest,
) -> Response {
    let account = match require_account(&auth, authorization.as_deref()) {
        Ok(account) => account,
        Err(response) => return response,
    };
    match rounds.start_round(&account.id, request.bet) {
        Ok(view) => json_response(StatusCode::CREATED, &view),
        Err(err) => err.into_http_response(),
    }
}

/// `GET /api/rounds/current`: the round in play, or 404 `no_open_round`.
pub async fn current_round(
    auth: Arc<AuthService>,
    rounds: Arc<RoundManager>,
    authorization: Option<String>,
) -> Response {
    let account = match require_account(&auth, authorization.as_deref()) {
        Ok(account) => account,
        Err(response) => return response,
    };
    match rounds.current_round(&account.id) {
        Ok(view) => json_response(StatusCode::OK, &view),
        Err(err) => err.into_http_response(),
    }
}

pub async fn get_round(
    round_id: String,
    auth: Arc<AuthService>,
    rounds: Arc<RoundManager>,
    authorization: Option<String>,
) -> Response {
    let account = match require_account(&auth, authorization.as_deref()) {
        Ok(account) => account,
        Err(response) => return response,
    };
    match rounds.round(&account.id, &round_id) {
        Ok(view) => json_response(StatusCode::OK, &view),
        Err(err) => err.into_http_response(),
    }
}

/// Applies `hit`, `stand`, `double_down` or `split` to the active hand.
///
/// - **Method**: POST
/// - **Path**: `/api/rounds/{round_id}/actions`
/// - **Body**: `{"action": "hit"}`
///
/// A rejected action changes neither the round nor the bankroll.
pub async fn submit_action(
    round_id: String,
    auth: Arc<AuthService>,
    rounds: Arc<RoundManager>,
    authorization: Option<String>,
    request: ActionRequest,
) -> Response {
    let account = match require_account(&auth, authorization.as_deref()) {
        Ok(account) => account,
        Err(response) => return response,
    };
    match rounds.apply_action(&account.id, &round_id, request.action) {
        Ok(view) => json_response(StatusCode::OK, &view),
        Err(err) => err.into_http_response(),
    }
}
