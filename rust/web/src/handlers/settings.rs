use super::json_response;
use crate::settings::AppSettings;
use hitstand_engine::rules::SplitPolicy;
use serde::Serialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;

/// The public part of the settings; storage paths and seeds stay private.
#[derive(Debug, Serialize)]
struct TableSettings {
    min_bet: u32,
    max_bet: u32,
    split_policy: SplitPolicy,
    starting_bankroll: u32,
    session_timeout_minutes: u64,
}

/// `GET /api/settings`
pub async fn get_settings(settings: Arc<AppSettings>) -> Response {
    json_response(
        StatusCode::OK,
        &TableSettings {
            min_bet: settings.min_bet,
            max_bet: settings.max_bet,
            split_policy: settings.split_policy,
            starting_bankroll: settings.starting_bankroll,
            session_timeout_minutes: settings.session_timeout_minutes,
        },
    )
}
