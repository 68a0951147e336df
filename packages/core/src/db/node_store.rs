//! NavigationStore Trait - Persistence Abstraction
//!
//! The tree store is an external collaborator: it keeps flat navigation rows
//! and knows nothing about tree shape, type rules or permissions. All of that
//! lives in [`crate::services::NavigationService`].
//!
//! # Design Decisions
//!
//! 1. **Async-First**: Methods are async so embedded and networked backends
//!    share one interface
//! 2. **Single-row atomicity**: Each call is atomic on its own; there is no
//!    cross-call transaction (reorder batches are last-writer-wins)
//! 3. **Error Handling**: `anyhow::Result` with context; the service maps
//!    failures to a persistence error
//! 4. **Ordering**: `list_nodes` returns rows by ascending `id`, which the
//!    tree builder uses to break position ties
//!
//! # Examples
//!
//! ```rust,no_run
//! use navtree_core::db::{MemoryStore, NavigationStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn NavigationStore> = Arc::new(MemoryStore::new());
//!     let nodes = store.list_nodes().await?;
//!     assert!(nodes.is_empty());
//!     Ok(())
//! }
//! ```

use crate::models::{NavigationNode, NewNavigationNode, NodeChanges};
use anyhow::Result;
use async_trait::async_trait;

/// Persistence operations for navigation rows
///
/// Implementations must be `Send + Sync` so they can be shared through
/// `Arc<dyn NavigationStore>` across request handlers.
#[async_trait]
pub trait NavigationStore: Send + Sync {
    /// All rows, active and inactive, ordered by ascending `id`
    async fn list_nodes(&self) -> Result<Vec<NavigationNode>>;

    /// Get a row by id
    ///
    /// - `Ok(Some(node))` if the row exists
    /// - `Ok(None)` if it doesn't (not an error)
    async fn get_node(&self, id: i64) -> Result<Option<NavigationNode>>;

    /// Rows sharing `parent_id`, ordered by ascending `id`
    async fn get_children(&self, parent_id: Option<i64>) -> Result<Vec<NavigationNode>>;

    /// Insert a row; the store assigns a fresh `id`
    async fn create_node(&self, node: NewNavigationNode) -> Result<NavigationNode>;

    /// Replace every mutable column of row `id`
    ///
    /// Returns `Ok(None)` when the row does not exist.
    async fn update_node(&self, id: i64, changes: NodeChanges) -> Result<Option<NavigationNode>>;

    /// Update only the `position` column of row `id`
    ///
    /// Returns `Ok(None)` when the row does not exist.
    async fn set_position(&self, id: i64, position: i64) -> Result<Option<NavigationNode>>;

    /// Hard-delete the given rows, returning how many were removed
    ///
    /// Backends that support it remove the whole set atomically.
    async fn delete_nodes(&self, ids: &[i64]) -> Result<u64>;
}
