//! Database Layer
//!
//! Persistence for flat navigation rows:
//!
//! - [`NavigationStore`] - async store trait used by the service layer
//! - [`TursoStore`] - libsql/SQLite backend ([`DatabaseService`] owns the
//!   connection and schema)
//! - [`MemoryStore`] - in-process backend for tests and embedding
//!
//! Stores know nothing about tree shape or type rules; those are enforced in
//! [`crate::services::NavigationService`].

mod database;
mod error;
mod memory_store;
mod node_store;
mod turso_store;

pub use database::DatabaseService;
pub use error::DatabaseError;
pub use memory_store::MemoryStore;
pub use node_store::NavigationStore;
pub use turso_store::TursoStore;
