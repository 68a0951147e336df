//! Error types for the client-side reorder protocol

use thiserror::Error;

/// Errors reported by [`crate::reorder::ReorderController`]
///
/// Individual patch failures are never surfaced one by one; a batch with any
/// failed patch collapses into a single [`ReorderError::PositionsNotSaved`].
#[derive(Error, Debug)]
pub enum ReorderError {
    /// One or more position patches of a batch failed
    #[error("Failed to update positions")]
    PositionsNotSaved { failed: usize, total: usize },

    /// The id is not present in the local list
    #[error("Navigation node {id} is not in the local list")]
    UnknownNode { id: i64 },

    /// `drop_on` without a preceding `drag_start`
    #[error("No drag in progress")]
    NotDragging,

    /// A previous move is still being persisted
    #[error("A reorder is still being saved")]
    ReconcileInProgress,

    /// `persist` without a pending optimistic move
    #[error("No reorder awaiting persistence")]
    NothingToPersist,

    /// The initial list could not be fetched
    #[error("Failed to load navigation: {0:#}")]
    Load(#[source] anyhow::Error),
}

impl ReorderError {
    pub fn unknown_node(id: i64) -> Self {
        Self::UnknownNode { id }
    }
}
