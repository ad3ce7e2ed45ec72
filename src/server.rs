use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::SharedStore;
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::services::{CredentialService, RecipeService};

/// Shared per-request context. Cheap to clone; holds no mutable state of its own.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: SharedStore,
    pub credentials: CredentialService,
    pub recipes: RecipeService,
}

impl AppState {
    pub fn new(config: AppConfig, store: SharedStore) -> Self {
        let tokens = TokenIssuer::from_config(&config.security);

        Self {
            credentials: CredentialService::new(store.clone(), tokens),
            recipes: RecipeService::new(store.clone()),
            store,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config)?;

    Ok(Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes(state.clone()))
        .fallback(handlers::not_found)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state))
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/users", post(auth::register_post))
        .route("/auth/login", post(auth::login_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{auth, recipes};

    Router::new()
        .route("/auth/refresh", post(auth::refresh_post))
        .route(
            "/users/me",
            get(auth::account_get)
                .put(auth::account_put)
                .delete(auth::account_delete),
        )
        .route("/users/me/password", put(auth::password_put))
        .route(
            "/recipes",
            get(recipes::recipes_get).post(recipes::recipes_post),
        )
        .route(
            "/recipes/:id",
            get(recipes::recipe_get)
                .put(recipes::recipe_put)
                .delete(recipes::recipe_delete),
        )
        // route_layer: unmatched paths still fall through to the 404 fallback
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    let origins = config
        .security
        .cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin {origin:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

/// A running server. Returned by [`start`], consumed by [`ServerHandle::stop`].
pub struct ServerHandle {
    addr: SocketAddr,
    store: SharedStore,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections, drain in-flight requests, then close the store.
    pub async fn stop(self) -> anyhow::Result<()> {
        info!("Closing server");
        // The receiver is gone only if the server already exited
        let _ = self.shutdown.send(());

        let served = self.task.await.context("server task panicked");
        self.store.close().await;
        served?.context("server error")
    }
}

/// Prepare the store, bind the configured address and serve in the background.
pub async fn start(config: AppConfig, store: SharedStore) -> anyhow::Result<ServerHandle> {
    config.validate()?;

    let bind_addr = config.bind_address();
    let state = AppState::new(config, store.clone());
    state
        .credentials
        .prepare()
        .await
        .context("failed to prepare user collection")?;

    let router = app(state)?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    let addr = listener.local_addr()?;

    let (shutdown, signal) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = signal.await;
            })
            .await
    });

    info!("Recipe API listening on http://{}", addr);
    Ok(ServerHandle {
        addr,
        store,
        shutdown,
        task,
    })
}
