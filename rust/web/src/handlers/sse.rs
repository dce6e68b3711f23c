use crate::accounts::AuthService;
use crate::errors::IntoErrorResponse;
use crate::events::{EventBus, EventSubscription, RoundEvent};
use crate::rounds::RoundManager;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use warp::http;
use warp::reply::{self, Response};
use warp::sse;
use warp::Reply;

/// `EventSource` cannot set headers, so the token may ride in the query.
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub token: Option<String>,
}

/// `GET /api/rounds/{round_id}/events`: server-sent events for one round.
pub async fn stream_events(
    round_id: String,
    query: EventsQuery,
    auth: Arc<AuthService>,
    rounds: Arc<RoundManager>,
    event_bus: Arc<EventBus>,
    authorization: Option<String>,
) -> Response {
    let account = match authorization
        .as_deref()
        .or(query.token.as_deref())
        .map(|credential| auth.authenticate(Some(credential)))
    {
        Some(Ok(account)) => account,
        Some(Err(err)) => return err.into_http_response(),
        None => return crate::accounts::AuthError::Unauthorized.into_http_response(),
    };
    if let Err(err) = rounds.ensure_owned(&account.id, &round_id) {
        return err.into_http_response();
    }

    let stream = subscription_stream(event_bus.subscribe(round_id));
    let keep_alive = sse::keep_alive()
        .interval(Duration::from_secs(15))
        .text(":keep-alive\n");

    let reply = sse::reply(keep_alive.stream(stream));
    reply::with_header(reply, http::header::CACHE_CONTROL, "no-cache").into_response()
}

fn subscription_stream(
    subscription: EventSubscription,
) -> impl tokio_stream::Stream<Item = Result<sse::Event, Infallible>> + Send + 'static {
    subscription
        .until_resolved()
        .map(|event| Ok(render_event(&event)))
}

fn render_event(event: &RoundEvent) -> sse::Event {
    let data = serde_json::to_string(event).unwrap_or_else(|err| {
        serde_json::json!({
            "type": "error",
            "message": format!("failed to serialize round event: {err}")
        })
        .to_string()
    });
    sse::Event::default().event(event.name()).data(data)
}
