//! Business Services
//!
//! - `NavigationService` - Create-or-update, position patch, cascade delete
//!   and the permission-filtered end-user view
//!
//! Services sit between the HTTP layer and the [`crate::db::NavigationStore`]
//! backends and enforce the tree rules before anything is written.

pub mod error;
mod navigation_service;

pub use error::NavigationError;
pub use navigation_service::{NavigationService, UpsertOutcome};
