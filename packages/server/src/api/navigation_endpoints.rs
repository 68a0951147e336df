//! End-user navigation and health endpoints
//!
//! # Endpoints
//!
//! - `GET /api/health` - Health check (no session)
//! - `GET /api/navigation` - Active nodes the caller may see, flat

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use navtree_core::models::NavigationNode;

use crate::api::auth::UserSession;
use crate::api::{ApiError, AppState, Envelope};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub time: DateTime<Utc>,
}

/// Health check endpoint
///
/// # Example
///
/// ```bash
/// curl http://localhost:3001/api/health
/// ```
async fn health_check() -> Json<Envelope<HealthStatus>> {
    Json(Envelope::ok(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        time: Utc::now(),
    }))
}

/// Navigation entries visible to the caller
///
/// Inactive entries are never returned. Tool-gated entries are returned
/// only when the caller's roles grant the tool; the check is per entry, so a
/// permitted child of a hidden section is still listed.
///
/// # Example
///
/// ```bash
/// curl -H "Authorization: Bearer $TOKEN" http://localhost:3001/api/navigation
/// ```
async fn visible_navigation(
    State(state): State<AppState>,
    user: UserSession,
) -> Result<Envelope<Vec<NavigationNode>>, ApiError> {
    let nodes = state.navigation.visible_nodes(&user.access).await?;
    tracing::debug!(
        "Serving {} navigation item(s) to {}",
        nodes.len(),
        user.access.user_id
    );
    Ok(Envelope::ok(nodes))
}

/// Create router with end-user endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/navigation", get(visible_navigation))
        .with_state(state)
}
