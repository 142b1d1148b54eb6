//! # atelier: backend for the Atelier browser code editor
//!
//! `atelier` is a thin HTTP server backing a browser-based code editor with
//! live HTML/CSS/JS preview. It provides two services behind one process:
//!
//! - a **file store** exposing upload, download, read, write, and list
//!   operations against a single flat storage directory, with filename
//!   sanitization and path-traversal containment, and
//! - an **AI gateway** that accepts a normalized
//!   `{service, apiKey, prompt, model?}` request, dispatches to one of
//!   several third-party chat-completion APIs, and returns the extracted
//!   text reply in a normalized envelope.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum)
//! for the HTTP layer. There is no database: the storage directory on
//! local disk is the entire persisted state surface. Every incoming
//! request is handled independently - the file store and the gateway
//! share nothing beyond being served by the same process, and concurrent
//! writes to the same name race at the filesystem level with
//! last-write-wins semantics.
//!
//! ### Request Flow
//!
//! File requests (`/api/upload`, `/api/download/{filename}`,
//! `/api/read/{filename}`, `/api/write`, `/api/files`) pass the supplied
//! name through the [`storage`] module's two-layer containment check
//! (lexical escape rejection, then a prefix re-check after joining the
//! sanitized basename under the root) before any filesystem access.
//!
//! Gateway requests (`/api/gateway`) parse the `service` tag into the
//! closed [`gateway::Provider`] enum, issue exactly one outbound POST to
//! the matching upstream with a bounded timeout, and fold every failure
//! (unknown service, upstream status, malformed reply shape) into the
//! uniform `{"success": false, "error": ...}` envelope. No caching, no
//! retry, no streaming.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use atelier::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = atelier::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     atelier::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config)?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod errors;
pub mod gateway;
mod openapi;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

use crate::config::CorsOrigin;
use crate::gateway::GatewayClient;
use crate::openapi::ApiDoc;
use crate::storage::FileStore;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use bon::Builder;
pub use config::Config;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, Level};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// Everything in here is cheap to clone: the file store holds only the
/// root path and the gateway client wraps a shared `reqwest` client.
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub store: FileStore,
    pub gateway: GatewayClient,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let wildcard = config.cors.allowed_origins.iter().any(|o| *o == CorsOrigin::Wildcard);

    let cors = if wildcard {
        CorsLayer::new().allow_origin(Any)
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        CorsLayer::new().allow_origin(origins)
    };

    Ok(cors.allow_methods(Any).allow_headers(Any))
}

/// Build the main application router with all endpoints and middleware.
///
/// This constructs the complete Axum router with:
/// - File store routes (upload with its own body limit, download, read,
///   write, list)
/// - The AI gateway route
/// - API documentation at `/docs`
/// - CORS configuration
/// - Tracing middleware
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // File upload route with custom body limit (other routes use default)
    let upload_limit = state.config.storage.max_upload_size as usize;
    let upload_router = Router::new()
        .route("/upload", post(api::handlers::files::upload_file))
        .layer(DefaultBodyLimit::max(upload_limit));

    let api_routes = Router::new()
        .merge(upload_router)
        .route("/download/{filename}", get(api::handlers::files::download_file))
        .route("/read/{filename}", get(api::handlers::files::read_file))
        .route("/write", post(api::handlers::files::write_file))
        .route("/files", get(api::handlers::files::list_files))
        .route("/gateway", post(api::handlers::gateway::complete))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns the router and configuration.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] builds the state and router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance.
    ///
    /// The storage root is not created here; the file store creates it on
    /// first write or upload, and an absent root lists as empty.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting atelier with configuration: {:#?}", config);

        let store = FileStore::new(config.storage.root.clone());
        let gateway = GatewayClient::new(config.gateway.clone())?;

        let state = AppState::builder().config(config.clone()).store(store).gateway(gateway).build();

        let router = build_router(state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Atelier listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutdown complete");
        Ok(())
    }
}
