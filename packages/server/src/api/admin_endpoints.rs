//! Admin endpoints for managing the navigation tree
//!
//! All routes require an [`AdminSession`].
//!
//! # Endpoints
//!
//! - `GET /api/admin/navigation` - All nodes, flat
//! - `GET /api/admin/navigation/tree` - All nodes in pre-order with `level`
//! - `GET /api/admin/navigation/parents?type=&exclude=` - Candidate parents
//! - `POST /api/admin/navigation` - Create-or-update by probe
//! - `PATCH /api/admin/navigation/position` - Position-only patch
//! - `DELETE /api/admin/navigation/:id` - Delete a node and its subtree

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, patch},
    Router,
};
use serde::{Deserialize, Serialize};

use navtree_core::models::{NavigationNode, NodeType, UpsertNode};
use navtree_core::tree::FlatNode;

use crate::api::auth::AdminSession;
use crate::api::{ApiError, ApiJson, AppState, Envelope};

/// Query parameters for candidate parent lookup
#[derive(Debug, Deserialize)]
pub struct ParentsQuery {
    /// Node type the parent is being chosen for
    #[serde(rename = "type")]
    node_type: String,
    /// Node being edited; it and its descendants are left out
    exclude: Option<i64>,
}

/// Body of a position-only patch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionPatch {
    pub id: i64,
    pub position: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_ids: Vec<i64>,
}

/// List every node, active and inactive
///
/// # Example
///
/// ```bash
/// curl -H "Authorization: Bearer $TOKEN" http://localhost:3001/api/admin/navigation
/// ```
async fn list_nodes(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Envelope<Vec<NavigationNode>>, ApiError> {
    Ok(Envelope::ok(state.navigation.list_all().await?))
}

/// Pre-order list with indentation levels for the admin tree view
async fn tree(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Envelope<Vec<FlatNode>>, ApiError> {
    Ok(Envelope::ok(state.navigation.admin_tree().await?))
}

/// Nodes that may be chosen as parent for a node of the given type
///
/// # Example
///
/// ```bash
/// curl -H "Authorization: Bearer $TOKEN" \
///   "http://localhost:3001/api/admin/navigation/parents?type=page&exclude=12"
/// ```
async fn candidate_parents(
    State(state): State<AppState>,
    _admin: AdminSession,
    query: Result<Query<ParentsQuery>, QueryRejection>,
) -> Result<Envelope<Vec<NavigationNode>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    let node_type: NodeType = query
        .node_type
        .parse()
        .map_err(|e: navtree_core::ValidationError| ApiError::validation(e.to_string()))?;

    Ok(Envelope::ok(
        state
            .navigation
            .candidate_parents(node_type, query.exclude)
            .await?,
    ))
}

/// Create-or-update by probe
///
/// An `id` that resolves updates that node; an unknown or missing `id`
/// creates a new node with a store-assigned id.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3001/api/admin/navigation \
///   -H "Authorization: Bearer $TOKEN" -H "Content-Type: application/json" \
///   -d '{"label":"My Cool Page!","icon":"IconFile","type":"page","parentId":1}'
/// ```
async fn upsert_node(
    State(state): State<AppState>,
    admin: AdminSession,
    ApiJson(input): ApiJson<UpsertNode>,
) -> Result<Envelope<NavigationNode>, ApiError> {
    let outcome = state.navigation.upsert(input).await?;
    let message = if outcome.created {
        "Navigation item created"
    } else {
        "Navigation item updated"
    };
    tracing::info!(
        "{} {} ({}) by {}",
        message,
        outcome.node.id,
        outcome.node.label,
        admin.session.user_id
    );
    Ok(Envelope::ok_with_message(message, outcome.node))
}

/// Update only `position`
///
/// # Example
///
/// ```bash
/// curl -X PATCH http://localhost:3001/api/admin/navigation/position \
///   -H "Authorization: Bearer $TOKEN" -H "Content-Type: application/json" \
///   -d '{"id":7,"position":20}'
/// ```
async fn patch_position(
    State(state): State<AppState>,
    _admin: AdminSession,
    ApiJson(body): ApiJson<PositionPatch>,
) -> Result<Envelope<NavigationNode>, ApiError> {
    let node = state
        .navigation
        .update_position(body.id, body.position)
        .await?;
    Ok(Envelope::ok(node))
}

/// Delete a node together with its subtree
///
/// # Example
///
/// ```bash
/// curl -X DELETE -H "Authorization: Bearer $TOKEN" \
///   http://localhost:3001/api/admin/navigation/7
/// ```
async fn delete_node(
    State(state): State<AppState>,
    admin: AdminSession,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Envelope<DeleteResult>, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::validation(e.body_text()))?;
    let deleted_ids = state.navigation.delete(id).await?;
    tracing::info!(
        "Deleted navigation item {} and {} descendant(s) by {}",
        id,
        deleted_ids.len() - 1,
        admin.session.user_id
    );
    Ok(Envelope::ok_with_message(
        "Navigation item deleted",
        DeleteResult { deleted_ids },
    ))
}

/// Create router with admin endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/navigation", get(list_nodes).post(upsert_node))
        .route("/api/admin/navigation/tree", get(tree))
        .route("/api/admin/navigation/parents", get(candidate_parents))
        .route("/api/admin/navigation/position", patch(patch_position))
        .route("/api/admin/navigation/:id", delete(delete_node))
        .with_state(state)
}
