//! Service Layer Error Types
//!
//! Errors raised by [`crate::services::NavigationService`]. Validation and
//! not-found conditions are detected before or instead of a store write;
//! persistence failures wrap the store's `anyhow` error with its context.

use crate::models::ValidationError;
use thiserror::Error;

/// Navigation service errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Missing or malformed input, or a violated tree rule
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The addressed node does not exist
    #[error("Navigation node not found: {id}")]
    NotFound { id: i64 },

    /// The underlying store failed
    #[error("Persistence failure: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl NavigationError {
    /// Create a not found error
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// Create an invalid parent validation error
    pub fn invalid_parent(msg: impl Into<String>) -> Self {
        Self::Validation(ValidationError::InvalidParent(msg.into()))
    }

    /// Create a missing field validation error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::Validation(ValidationError::MissingField(field.into()))
    }
}
