use super::{json_response, require_account};
use crate::accounts::AuthService;
use crate::errors::IntoErrorResponse;
use serde::Deserialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

/// Register and login body. Missing fields read as empty and are rejected
/// by the service.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /api/auth/register` → 201 with the new account.
pub async fn register(auth: Arc<AuthService>, body: Credentials) -> Response {
    match auth.register(&body.username, &body.password) {
        Ok(account) => json_response(StatusCode::CREATED, &account.view()),
        Err(err) => err.into_http_response(),
    }
}

/// `POST /api/auth/login` → bearer token plus account.
pub async fn login(auth: Arc<AuthService>, body: Credentials) -> Response {
    match auth.login(&body.username, &body.password) {
        Ok(session) => json_response(StatusCode::OK, &session),
        Err(err) => err.into_http_response(),
    }
}

/// `POST /api/auth/logout` → 204.
pub async fn logout(auth: Arc<AuthService>, authorization: Option<String>) -> Response {
    match auth.logout(authorization.as_deref()) {
        Ok(()) => reply::with_status(warp::reply(), StatusCode::NO_CONTENT).into_response(),
        Err(err) => err.into_http_response(),
    }
}

pub async fn account(auth: Arc<AuthService>, authorization: Option<String>) -> Response {
    match require_account(&auth, authorization.as_deref()) {
        Ok(account) => json_response(StatusCode::OK, &account.view()),
        Err(response) => response,
    }
}
