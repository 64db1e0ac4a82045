//! # assetgate: session-gated storage for per-user binary assets
//!
//! Users log in with a login and password and receive an opaque session token. With that
//! token they can upload named binary assets and download them again. Assets are private to
//! their owner, and only a user's most recent session is valid: every login silently ends the
//! sessions that came before it.
//!
//! ## Architecture
//!
//! ```text
//!   HTTP (axum)
//!     │
//!     ├── POST /api/auth ────────────────▶ Authenticator ──┐
//!     │                                                     │   hash ─▶ CredentialHasher
//!     ├── POST /api/upload-asset/{name} ─▶ SessionValidator ├─▶ UserDirectory
//!     └── GET  /api/asset/{name} ────────▶       │          │   SessionStore
//!                                                 └─────────┴─▶ AssetStore
//!                                                               (PostgreSQL or in-memory)
//! ```
//!
//! - [`auth`]: hashing, login and token validation
//! - [`db`]: storage traits and their PostgreSQL and in-memory backends
//! - [`api`]: HTTP handlers and request/response models
//! - [`config`]: YAML + environment configuration
//! - [`telemetry`]: tracing and optional OTLP export
//!
//! ## Running
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/assetgate assetgate -f config.yaml
//! ```
//!
//! Migrations in `migrations/` run on startup.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod request_timeout;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::{
    api::handlers::{assets as asset_handlers, auth as auth_handlers},
    auth::{
        authenticator::Authenticator,
        password::{CredentialHasher, hash_off_runtime, hasher_from_config},
        session::SessionValidator,
    },
    config::{Config, InitialUser},
    db::{
        Database,
        store::{AssetStore, UserProvisioner},
    },
    errors::Error,
    openapi::ApiDoc,
    request_timeout::with_request_timeout,
};
use axum::{
    Json, Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info, info_span, instrument};
use utoipa::OpenApi;
use uuid::Uuid;

pub use types::{SessionToken, UserId};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .authenticator(authenticator)
///     .validator(validator)
///     .assets(stores.assets.clone())
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub authenticator: Authenticator,
    pub validator: SessionValidator,
    pub assets: Arc<dyn AssetStore>,
}

/// Get the assetgate database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the configured initial user, or reset its password if it already exists.
///
/// Idempotent; called on every startup when `initial_user` is set.
#[instrument(skip_all, fields(login = %user.login), err)]
pub async fn ensure_initial_user(
    user: &InitialUser,
    hasher: Arc<dyn CredentialHasher>,
    provisioner: &dyn UserProvisioner,
) -> anyhow::Result<UserId> {
    let password_hash = hash_off_runtime(hasher, user.password.clone()).await?;
    let id = provisioner.upsert_user(&user.login, &password_hash).await?;
    info!(user_id = id, "Initial user ready");
    Ok(id)
}

async fn method_not_allowed() -> Error {
    Error::BadRequest {
        message: "invalid request method".to_string(),
    }
}

/// Build the application router with every route and middleware layer attached.
pub fn build_router(state: AppState) -> Router {
    let max_asset_size = state.config.max_asset_size;
    let request_timeout = state.config.request_timeout;
    let enable_metrics = state.config.enable_metrics;

    let upload = post(asset_handlers::upload_asset).layer(DefaultBodyLimit::max(max_asset_size));
    let download = get(asset_handlers::get_asset);

    // Asset routes capture everything after the prefix; `AssetName` rejects the wrong shapes
    let api_routes = Router::new()
        .route("/api/auth", post(auth_handlers::login))
        .route("/api/upload-asset", upload.clone())
        .route("/api/upload-asset/", upload.clone())
        .route("/api/upload-asset/{*name}", upload)
        .route("/api/asset", download.clone())
        .route("/api/asset/", download.clone())
        .route("/api/asset/{*name}", download)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state);

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(api_routes);

    if enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    with_request_timeout(router, request_timeout).layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<Body>| {
                info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            })
            .on_request(DefaultOnRequest::new().level(Level::DEBUG))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// The assembled service.
///
/// 1. **Create**: [`Application::new`] opens storage (running migrations for PostgreSQL),
///    provisions the initial user and builds the router
/// 2. **Serve**: [`Application::serve`] binds the TCP listener and handles requests
/// 3. **Shutdown**: once the shutdown future resolves, in-flight requests finish, then
///    storage and telemetry are closed
pub struct Application {
    router: Router,
    config: Config,
    database: Database,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting assetgate with configuration: {:#?}", config);

        let database = Database::open(&config.database).await?;
        Self::with_database(config, database).await
    }

    /// Build on storage that is already open (and migrated).
    pub async fn with_database(config: Config, database: Database) -> anyhow::Result<Self> {
        let hasher = hasher_from_config(&config.auth)?;
        let stores = database.stores().clone();

        if let Some(user) = &config.initial_user {
            ensure_initial_user(user, hasher.clone(), stores.provisioner.as_ref()).await?;
        }

        let state = AppState::builder()
            .config(config.clone())
            .authenticator(Authenticator::new(hasher, stores.users.clone(), stores.sessions.clone()))
            .validator(SessionValidator::new(stores.sessions.clone()))
            .assets(stores.assets.clone())
            .build();

        Ok(Self {
            router: build_router(state),
            config,
            database,
        })
    }

    /// Convert application into a test server, keeping handles to its storage
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> (axum_test::TestServer, db::store::Stores) {
        let stores = self.database.stores().clone();
        let server = axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server");
        (server, stores)
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("assetgate listening on http://{}", bind_addr);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        self.database.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
