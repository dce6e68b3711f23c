use super::{json_response, require_account};
use crate::accounts::AuthService;
use crate::errors::IntoErrorResponse;
use crate::history::HistoryService;
use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// `GET /api/history?limit=N`: resolved rounds, most recent first.
pub async fn get_history(
    query: HistoryQuery,
    auth: Arc<AuthService>,
    history: Arc<HistoryService>,
    authorization: Option<String>,
) -> Response {
    let account = match require_account(&auth, authorization.as_deref()) {
        Ok(account) => account,
        Err(response) => return response,
    };
    match history.recent(&account.id, query.limit) {
        Ok(records) => json_response(StatusCode::OK, &records),
        Err(err) => err.into_http_response(),
    }
}

/// `GET /api/history/stats`
pub async fn get_statistics(
    auth: Arc<AuthService>,
    history: Arc<HistoryService>,
    authorization: Option<String>,
) -> Response {
    let account = match require_account(&auth, authorization.as_deref()) {
        Ok(account) => account,
        Err(response) => return response,
    };
    match history.stats(&account.id) {
        Ok(stats) => json_response(StatusCode::OK, &stats),
        Err(err) => err.into_http_response(),
    }
}
