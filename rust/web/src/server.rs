use crate::accounts::{AuthService, MIN_PASSWORD_COST};
use crate::errors::handle_rejection;
use crate::events::EventBus;
use crate::handlers;
use crate::history::HistoryService;
use crate::middleware::request_log;
use crate::rounds::{DeckSource, RoundManager};
use crate::settings::{AppSettings, SettingsError};
use crate::store::{open_storage, MemoryStore, StoreError, Storage};
use hitstand_engine::cards::Rank;
use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::filters::BoxedFilter;
use warp::http::Method;
use warp::reply::Response;
use warp::{Filter, Reply};

const MAX_BODY_BYTES: u64 = 16 * 1024;
const TOKEN_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn for_tests() -> Self {
        Self::new("127.0.0.1", 0)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Shared services handed to every route.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: ServerConfig,
    settings: Arc<AppSettings>,
    store: Arc<dyn Storage>,
    event_bus: Arc<EventBus>,
    auth: Arc<AuthService>,
    rounds: Arc<RoundManager>,
    history: Arc<HistoryService>,
}

impl AppContext {
    /// Opens the configured storage and seeds the deck source from the settings.
    pub fn new(config: ServerConfig, settings: AppSettings) -> Result<Self, ServerError> {
        settings.validate()?;
        let store = open_storage(settings.database.as_deref())?;
        let decks = DeckSource::from_seed(settings.deck_seed);
        Ok(Self::new_with_dependencies(config, settings, store, decks))
    }

    pub fn new_with_dependencies(
        config: ServerConfig,
        settings: AppSettings,
        store: Arc<dyn Storage>,
        decks: DeckSource,
    ) -> Self {
        let event_bus = Arc::new(EventBus::new());
        let auth = Arc::new(AuthService::new(
            Arc::clone(&store),
            settings.starting_bankroll,
            settings.session_ttl(),
        )
        .with_password_cost(settings.password_cost));
        let rounds = Arc::new(RoundManager::new(
            Arc::clone(&store),
            Arc::clone(&event_bus),
            settings.table_rules(),
            decks,
        ));
        let history = Arc::new(HistoryService::new(Arc::clone(&store)));

        Self {
            config,
            settings: Arc::new(settings),
            store,
            event_bus,
            auth,
            rounds,
            history,
        }
    }

    /// In-memory storage, default settings and the cheapest password hashing.
    pub fn new_for_tests() -> Self {
        Self::with_stacked_decks(Vec::new())
    }

    /// Like [`AppContext::new_for_tests`], dealing the given decks first.
    pub fn with_stacked_decks(decks: Vec<Vec<Rank>>) -> Self {
        Self::new_with_dependencies(
            ServerConfig::for_tests(),
            AppSettings {
                password_cost: MIN_PASSWORD_COST,
                ..AppSettings::default()
            },
            Arc::new(MemoryStore::new()),
            DeckSource::stacked(decks),
        )
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn settings(&self) -> Arc<AppSettings> {
        Arc::clone(&self.settings)
    }

    pub fn store(&self) -> Arc<dyn Storage> {
        Arc::clone(&self.store)
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    pub fn rounds(&self) -> Arc<RoundManager> {
        Arc::clone(&self.rounds)
    }

    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Every endpoint, wrapped with CORS, rejection recovery and request logging.
pub fn routes(
    context: &AppContext,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone + Send + Sync + 'static {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(vec!["content-type", "authorization"]);

    health_route()
        .or(auth_routes(context))
        .unify()
        .or(settings_route(context))
        .unify()
        .or(round_routes(context))
        .unify()
        .or(history_routes(context))
        .unify()
        .or(sse_route(context))
        .unify()
        .with(cors)
        .recover(handle_rejection)
        .with(request_log())
}

fn health_route() -> BoxedFilter<(Response,)> {
    warp::path("health")
        .and(warp::get())
        .and(warp::path::end())
        .map(|| handlers::health().into_response())
        .boxed()
}

fn auth_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
    let auth = context.auth();

    let register = warp::path!("api" / "auth" / "register")
        .and(warp::post())
        .and(with_auth(auth.clone()))
        .and(json_body())
        .then(handlers::register);

    let login = warp::path!("api" / "auth" / "login")
        .and(warp::post())
        .and(with_auth(auth.clone()))
        .and(json_body())
        .then(handlers::login);

    let logout = warp::path!("api" / "auth" / "logout")
        .and(warp::post())
        .and(with_auth(auth.clone()))
        .and(authorization())
        .then(handlers::logout);

    let account = warp::path!("api" / "account")
        .and(warp::get())
        .and(with_auth(auth))
        .and(authorization())
        .then(handlers::account);

    register
        .or(login)
        .unify()
        .or(logout)
        .unify()
        .or(account)
        .unify()
        .boxed()
}

fn settings_route(context: &AppContext) -> BoxedFilter<(Response,)> {
    let settings = context.settings();
    warp::path!("api" / "settings")
        .and(warp::get())
        .and(warp::any().map(move || Arc::clone(&settings)))
        .then(handlers::get_settings)
        .boxed()
}

fn round_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
    let auth = context.auth();
    let rounds = context.rounds();

    let start = warp::path!("api" / "rounds")
        .and(warp::post())
        .and(with_auth(auth.clone()))
        .and(with_rounds(rounds.clone()))
        .and(authorization())
        .and(json_body())
        .then(handlers::start_round);

    // before `/api/rounds/{id}` so "current" is not taken for an id
    let current = warp::path!("api" / "rounds" / "current")
        .and(warp::get())
        .and(with_auth(auth.clone()))
        .and(with_rounds(rounds.clone()))
        .and(authorization())
        .then(handlers::current_round);

    let by_id = warp::path!("api" / "rounds" / String)
        .and(warp::get())
        .and(with_auth(auth.clone()))
        .and(with_rounds(rounds.clone()))
        .and(authorization())
        .then(handlers::get_round);

    let action = warp::path!("api" / "rounds" / String / "actions")
        .and(warp::post())
        .and(with_auth(auth))
        .and(with_rounds(rounds))
        .and(authorization())
        .and(json_body())
        .then(handlers::submit_action);

    start
        .or(current)
        .unify()
        .or(by_id)
        .unify()
        .or(action)
        .unify()
        .boxed()
}

fn history_routes(context: &AppContext) -> BoxedFilter<(Response,)> {
    let auth = context.auth();
    let history = context.history();

    let stats = warp::path!("api" / "history" / "stats")
        .and(warp::get())
        .and(with_auth(auth.clone()))
        .and(with_history(history.clone()))
        .and(authorization())
        .then(handlers::get_statistics);

    let recent = warp::path!("api" / "history")
        .and(warp::get())
        .and(warp::query::<handlers::HistoryQuery>())
        .and(with_auth(auth))
        .and(with_history(history))
        .and(authorization())
        .then(handlers::get_history);

    stats.or(recent).unify().boxed()
}

fn sse_route(context: &AppContext) -> BoxedFilter<(Response,)> {
    let auth = context.auth();
    let rounds = context.rounds();
    let event_bus = context.event_bus();

    warp::path!("api" / "rounds" / String / "events")
        .and(warp::get())
        .and(warp::query::<handlers::EventsQuery>())
        .and(with_auth(auth))
        .and(with_rounds(rounds))
        .and(warp::any().map(move || Arc::clone(&event_bus)))
        .and(authorization())
        .then(handlers::stream_events)
        .boxed()
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn authorization() -> impl Filter<Extract = (Option<String>,), Error = Infallible> + Clone {
    warp::header::optional::<String>("authorization").or_else(|_| async {
        Ok::<_, Infallible>((None,))
    })
}

fn with_auth(
    auth: Arc<AuthService>,
) -> impl Filter<Extract = (Arc<AuthService>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&auth))
}

fn with_rounds(
    rounds: Arc<RoundManager>,
) -> impl Filter<Extract = (Arc<RoundManager>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&rounds))
}

fn with_history(
    history: Arc<HistoryService>,
) -> impl Filter<Extract = (Arc<HistoryService>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&history))
}

#[derive(Debug, Clone)]
pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(config: ServerConfig, settings: AppSettings) -> Result<Self, ServerError> {
        let context = AppContext::new(config, settings)?;
        Ok(Self { context })
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let bind_addr = Self::bind_addr(context.config())?;

        // surface "address in use" as an io error before warp wraps it
        if bind_addr.port() != 0 {
            drop(std::net::TcpListener::bind(bind_addr)?);
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(routes(&context))
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        tracing::info!(address = %addr, "web server listening");

        let auth = context.auth();
        let task = tokio::spawn(async move {
            let mut sweep = tokio::time::interval(TOKEN_SWEEP_INTERVAL);
            tokio::pin!(server_future);
            loop {
                tokio::select! {
                    () = &mut server_future => break,
                    _ = sweep.tick() => {
                        if let Err(err) = auth.cleanup_expired() {
                            tracing::error!(error = %err, "token sweep failed");
                        }
                    }
                }
            }
            Ok::<(), ServerError>(())
        });

        Ok(ServerHandle::new(addr, shutdown_tx, task, context))
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        let host = config.host();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }

        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }

        let candidate = format!("{}:{}", host, config.port());
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;

        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        if let Some(io_err) = err
            .source()
            .and_then(|source| source.downcast_ref::<std::io::Error>())
        {
            return ServerError::BindError(std::io::Error::new(io_err.kind(), io_err.to_string()));
        }

        ServerError::ConfigError(err.to_string())
    }
}

#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
    context: AppContext,
}

impl ServerHandle {
    fn new(
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<Result<(), ServerError>>,
        context: AppContext,
    ) -> Self {
        Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
            context,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            match task.await {
                Ok(result) => result?,
                Err(err) => {
                    return Err(ServerError::ConfigError(format!(
                        "server task join error: {err}"
                    )))
                }
            }
        }

        tracing::info!(address = %self.addr, "web server stopped");
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_shares_one_store() {
        let ctx = AppContext::new_for_tests();
        let account = ctx.auth().register("alice", "pw").unwrap();
        assert!(ctx.store().account(&account.id).unwrap().is_some());
        assert_eq!(ctx.event_bus().subscriber_count(), 0);
    }

    #[test]
    fn invalid_settings_are_refused() {
        let settings = AppSettings {
            min_bet: 0,
            ..AppSettings::default()
        };
        assert!(matches!(
            AppContext::new(ServerConfig::for_tests(), settings),
            Err(ServerError::Settings(_))
        ));
    }

    #[test]
    fn bind_addr_accepts_host_and_port() {
        let addr = WebServer::bind_addr(&ServerConfig::new("127.0.0.1", 8080)).unwrap();
        assert_eq!(addr.port(), 8080);
        let addr = WebServer::bind_addr(&ServerConfig::new("127.0.0.1:9000", 1)).unwrap();
        assert_eq!(addr.port(), 9000);
    }

    #[tokio::test]
    async fn preflight_allows_any_origin() {
        let ctx = AppContext::new_for_tests();
        let response = warp::test::request()
            .method("OPTIONS")
            .path("/api/rounds")
            .header("origin", "http://example.com")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type, authorization")
            .reply(&routes(&ctx))
            .await;
        assert_eq!(response.status(), warp::http::StatusCode::OK);
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
