//! HTTP API for the navigation tree
//!
//! # Architecture
//!
//! Endpoint modules each expose `routes(state)` and are merged here:
//! - `admin_endpoints`: tree management for administrators
//! - `navigation_endpoints`: health check and the end-user view
//!
//! Shared services live in [`AppState`] as `Arc<dyn Trait>` so tests can
//! swap in in-memory backends.
//!
//! # Security
//!
//! - Bearer sessions resolved through [`SessionVerifier`]
//! - Admin routes additionally require the directory's admin role
//! - CORS restricted to configured origins

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use navtree_core::access::{AccessDirectory, AccessFile, SessionVerifier, StaticAccessDirectory};
use navtree_core::db::{DatabaseService, TursoStore};
use navtree_core::services::NavigationService;

use crate::config::ServerConfig;

mod admin_endpoints;
pub mod auth;
mod http_error;
mod navigation_endpoints;

pub use http_error::{ApiError, ApiJson, Envelope, PERSISTENCE_MESSAGE};

/// Application state shared across all endpoints
#[derive(Clone)]
pub struct AppState {
    pub navigation: NavigationService,
    pub sessions: Arc<dyn SessionVerifier>,
    pub directory: Arc<dyn AccessDirectory>,
}

impl AppState {
    /// State where one directory answers both session and grant lookups
    pub fn new(navigation: NavigationService, directory: Arc<StaticAccessDirectory>) -> Self {
        Self {
            navigation,
            sessions: directory.clone(),
            directory,
        }
    }
}

/// Create the application router with all endpoint modules
///
/// CORS is applied by [`start_server`] so tests can drive the router
/// without an `Origin` header.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(navigation_endpoints::routes(state.clone()))
        .merge(admin_endpoints::routes(state))
        .layer(TraceLayer::new_for_http())
}

/// CORS layer for the configured browser origins
///
/// Origins that are not valid header values are skipped with a warning.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(false)
}

/// Build services from configuration
pub async fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let db = Arc::new(DatabaseService::new(config.db_path.clone()).await?);
    let store = Arc::new(TursoStore::new(db));
    let navigation = NavigationService::new(store).with_role_gate(config.role_gate);

    let access = AccessFile::load(&config.access_file).await?;
    let directory = Arc::new(StaticAccessDirectory::new(access));

    Ok(AppState::new(navigation, directory))
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns error if the database cannot be opened, the access file cannot be
/// parsed, or the listener fails to bind.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = build_state(&config).await?;
    let app = create_router(state).layer(cors_layer(&config.cors_origins));

    let addr = config.bind_address();
    tracing::info!("Navtree server starting on http://{}", addr);
    tracing::info!("CORS origins: {}", config.cors_origins.join(", "));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
