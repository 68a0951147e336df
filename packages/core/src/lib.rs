//! Navtree Core
//!
//! Storage, policy and client protocols for a hierarchical navigation tree:
//! sections, pages and links arranged by administrators and shown to end
//! users filtered by their tool grants.
//!
//! # Architecture
//!
//! - **Flat rows, derived tree**: nodes are stored flat with a `parent_id`;
//!   nesting is rebuilt on read by [`tree::build_tree`]
//! - **Rules before writes**: [`services::NavigationService`] validates type
//!   parentage, cycles and page links before touching a store
//! - **libsql/Turso**: embedded SQLite-compatible storage ([`db::TursoStore`])
//! - **Optimistic reorder**: [`reorder::ReorderController`] moves locally,
//!   patches concurrently and reconciles by re-fetching
//!
//! # Modules
//!
//! - [`models`] - `NavigationNode`, closed enums, slug/type policy
//! - [`tree`] - Arena-based tree builder and pre-order flattener
//! - [`db`] - `NavigationStore` trait with libsql and in-memory backends
//! - [`services`] - `NavigationService` (admin operations, end-user view)
//! - [`access`] - Permission filter and session/grant collaborators
//! - [`reorder`] - Drag-and-drop reorder protocol and navigation feed

pub mod access;
pub mod db;
pub mod models;
pub mod reorder;
pub mod services;
pub mod tree;

// Re-export commonly used types
pub use access::{AccessContext, RoleGate};
pub use models::*;
pub use services::*;
pub use tree::{build_tree, flatten_tree, FlatNode, TreeNode};
