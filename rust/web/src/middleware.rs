use warp::http::StatusCode;
use warp::log::Info;

/// Request log hook for `.with(request_log())`: one event per response,
/// leveled by status class.
pub fn request_log() -> warp::log::Log<impl Fn(Info<'_>) + Copy + Send + Sync> {
    warp::log::custom(|info: Info<'_>| {
        log_response(
            info.status(),
            info.path(),
            info.method().as_str(),
            info.elapsed().as_millis(),
        );
    })
}

/// Emits the per-request event: info for 1xx-3xx, warn for 4xx, error for 5xx.
pub fn log_response(status: StatusCode, path: &str, method: &str, duration_ms: u128) {
    let status = status.as_u16();
    match status {
        400..=499 => tracing::warn!(status, path, method, duration_ms, "client error"),
        500..=599 => tracing::error!(status, path, method, duration_ms, "server error"),
        _ => tracing::info!(status, path, method, duration_ms, "response sent"),
    }
}
