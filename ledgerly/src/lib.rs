//! Ledgerly: a personal finance tracking API.
//!
//! Users record money movements (transfers) against wallets and
//! income/expense categories, and read them back as filtered lists or an
//! aggregated dashboard. Accounts authenticate with JWT access tokens and
//! rotating refresh tokens; a background job mails every user a summary of
//! each finished month.
//!
//! # Architecture
//!
//! - **[`api`]**: HTTP layer (axum handlers + request/response models)
//! - **[`db`]**: repositories and row models over PostgreSQL (sqlx)
//! - **[`auth`]**: password hashing, JWT sessions, request extraction
//! - **[`dashboard`]**: pure aggregation over a user's transfers
//! - **[`reports`]**: monthly report background job
//! - **[`email`]** / **[`sms`]**: outbound notifications
//!
//! # Lifecycle
//!
//! 1. [`Application::new`] connects to PostgreSQL, runs migrations and
//!    starts background services
//! 2. [`Application::serve`] binds a TCP port and handles requests until the
//!    shutdown future resolves
//! 3. Background services drain on shutdown via a shared cancellation token

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod email;
pub mod errors;
pub mod openapi;
pub mod reports;
pub mod sms;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{
    Router,
    middleware,
    routing::{delete, get, post, put},
};
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
use email::EmailService;
use openapi::ApiDoc;
use sms::SmsService;

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub email: Arc<EmailService>,
}

/// Get the database migrator.
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors_origins {
        origins.push(origin.parse::<axum::http::HeaderValue>()?);
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE])
        .expose_headers(vec![
            axum::http::header::LOCATION,
            api::models::pagination::X_PAGINATION.clone(),
            api::handlers::X_OPTIONS.clone(),
        ]))
}

/// Build the main application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/register", post(api::handlers::auth::register))
        .route("/auth/refresh-token", post(api::handlers::auth::refresh))
        .route("/auth/confirm-email", post(api::handlers::auth::confirm_email))
        .route("/auth/reset-password", post(api::handlers::auth::reset_password))
        .route(
            "/auth/confirm-reset-password",
            post(api::handlers::auth::confirm_reset_password),
        );

    let api_routes = Router::new()
        .route("/categories", get(api::handlers::categories::list_categories))
        .route("/categories", post(api::handlers::categories::create_category))
        .route("/categories/{id}", get(api::handlers::categories::get_category))
        .route("/categories/{id}", put(api::handlers::categories::update_category))
        .route("/categories/{id}", delete(api::handlers::categories::delete_category))
        .route(
            "/categories/{id}/transfers",
            get(api::handlers::categories::list_category_transfers),
        )
        .route("/wallets", get(api::handlers::wallets::list_wallets))
        .route("/wallets", post(api::handlers::wallets::create_wallet))
        .route("/wallets/{id}", get(api::handlers::wallets::get_wallet))
        .route("/wallets/{id}", put(api::handlers::wallets::update_wallet))
        .route("/wallets/{id}", delete(api::handlers::wallets::delete_wallet))
        .route("/transfers", get(api::handlers::transfers::list_transfers))
        .route("/transfers", post(api::handlers::transfers::create_transfer))
        .route("/transfers/{id}", get(api::handlers::transfers::get_transfer))
        .route("/transfers/{id}", put(api::handlers::transfers::update_transfer))
        .route("/transfers/{id}", delete(api::handlers::transfers::delete_transfer))
        .route("/dashboard", get(api::handlers::dashboard::get_dashboard));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", auth_routes.merge(api_routes))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(ApiDoc::openapi()) }),
        )
        .with_state(state)
        .layer(cors_layer)
        // Outside the CORS layer, which answers OPTIONS itself.
        .layer(middleware::from_fn(api::handlers::method_discovery))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Container for background services and their lifecycle management.
///
/// Holds the monthly report job. Dropping the guard cancels the shutdown
/// token, so tests that discard this struct still stop their tasks.
pub struct BackgroundServices {
    background_tasks: Vec<tokio::task::JoinHandle<()>>,
    shutdown_token: tokio_util::sync::CancellationToken,
    pub drop_guard: Option<tokio_util::sync::DropGuard>,
}

impl BackgroundServices {
    /// Gracefully shut down all background tasks.
    pub async fn shutdown(self) {
        self.shutdown_token.cancel();

        for handle in self.background_tasks {
            let _ = handle.await;
        }
    }
}

fn setup_background_services(
    pool: PgPool,
    config: Config,
    email: Arc<EmailService>,
    shutdown_token: tokio_util::sync::CancellationToken,
) -> anyhow::Result<BackgroundServices> {
    let drop_guard = shutdown_token.clone().drop_guard();
    let mut background_tasks = Vec::new();

    if config.reports.enabled {
        let sms = match &config.sms {
            Some(sms_config) => Some(Arc::new(SmsService::new(sms_config.clone()).map_err(|e| anyhow::anyhow!("{e}"))?)),
            None => None,
        };

        let reporter_shutdown = shutdown_token.clone();
        let handle = tokio::spawn(reports::run_monthly_reporter(
            config,
            pool,
            email,
            sms,
            reporter_shutdown,
        ));
        background_tasks.push(handle);
    } else {
        info!("Monthly report job disabled by configuration");
    }

    Ok(BackgroundServices {
        background_tasks,
        shutdown_token,
        drop_guard: Some(drop_guard),
    })
}

/// Main application struct that owns all resources and lifecycle.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
    bg_services: BackgroundServices,
}

impl Application {
    /// Create a new application instance with all resources initialized.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;

        Self::new_with_pool(config, pool).await
    }

    /// Create an application on an existing pool (used by tests).
    pub async fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        migrator().run(&pool).await?;

        let email = Arc::new(EmailService::new(&config).map_err(|e| anyhow::anyhow!("{e}"))?);

        let shutdown_token = tokio_util::sync::CancellationToken::new();
        let bg_services = setup_background_services(pool.clone(), config.clone(), email.clone(), shutdown_token)?;

        let state = AppState::builder().db(pool.clone()).config(config.clone()).email(email).build();

        let router = build_router(state)?;

        Ok(Self {
            router,
            config,
            pool,
            bg_services,
        })
    }

    /// Start serving the application until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Ledgerly listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        self.bg_services.shutdown().await;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;

    use super::*;
    use crate::test_utils::create_test_config;

    /// Router wired to a lazy pool: request paths that never touch the
    /// database can be exercised with no PostgreSQL behind them.
    fn offline_server() -> axum_test::TestServer {
        let config = create_test_config();
        let pool = PgPool::connect_lazy("postgresql://localhost/ledgerly-offline").expect("lazy pool");
        let email = Arc::new(EmailService::new(&config).expect("email service"));

        let state = AppState::builder().db(pool).config(config).email(email).build();
        let router = build_router(state).expect("router");
        axum_test::TestServer::new(router).expect("test server")
    }

    #[tokio::test]
    async fn test_healthz() {
        let server = offline_server();
        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_protected_route_without_token_is_401() {
        let server = offline_server();
        let response = server.get("/api/transfers").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_route_with_garbage_token_is_401() {
        let server = offline_server();
        let response = server
            .get("/api/dashboard")
            .add_header("authorization", "Bearer not-a-jwt")
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_options_reports_supported_methods() {
        let server = offline_server();
        let response = server.method(axum::http::Method::OPTIONS, "/api/transfers").await;
        response.assert_status_ok();
        assert_eq!(
            response.headers().get("x-options").and_then(|v| v.to_str().ok()),
            Some("GET,POST,PUT,DELETE,OPTIONS")
        );
    }

    #[tokio::test]
    async fn test_options_on_every_collection_resource() {
        let server = offline_server();
        for path in ["/api/categories", "/api/wallets", "/api/transfers"] {
            let response = server.method(axum::http::Method::OPTIONS, path).await;
            response.assert_status_ok();
            assert_eq!(
                response.headers().get("x-options").and_then(|v| v.to_str().ok()),
                Some("GET,POST,PUT,DELETE,OPTIONS"),
                "missing X-Options for {path}"
            );
        }
    }

    #[tokio::test]
    async fn test_cors_preflight_is_not_a_discovery_request() {
        // A real preflight carries Access-Control-Request-Method and belongs
        // to the CORS layer; it must not get the X-Options treatment.
        let server = offline_server();
        let response = server
            .method(axum::http::Method::OPTIONS, "/api/transfers")
            .add_header("origin", "http://localhost:5173")
            .add_header("access-control-request-method", "POST")
            .await;
        response.assert_status_ok();
        assert!(response.headers().get("x-options").is_none());
    }

    #[tokio::test]
    async fn test_openapi_spec_is_served() {
        let server = offline_server();
        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status_ok();
        let spec: serde_json::Value = response.json();
        assert!(spec["paths"].get("/transfers").is_some());
    }
}
