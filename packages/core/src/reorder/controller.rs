//! Drag-and-drop reorder state machine
//!
//! ```text
//! Idle -> Dragging{node_id} -> Reconciling(Optimistic) -> Reconciling(Success | Failed) -> Idle
//! ```
//!
//! A drop only reorders within one sibling group. The move is applied to the
//! local list immediately, then every sibling is patched to
//! `index * POSITION_STEP` concurrently and the list is re-fetched from the
//! server once all patches settle. The re-fetch is the only consistency
//! mechanism: patches are not transactional and a failed batch may leave a
//! partial commit on the server, which the fresh list then shows.

use futures::future::join_all;
use std::sync::Arc;

use crate::models::policy::POSITION_STEP;
use crate::models::NavigationNode;
use crate::reorder::{NavigationApi, ReorderError};
use crate::tree::{build_tree, flatten_tree, sibling_order, FlatNode};

/// Sub-state of a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePhase {
    /// Local list already shows the move; patches not yet settled
    Optimistic,
    /// Every patch succeeded
    Success,
    /// At least one patch failed; the local list was reverted
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReorderState {
    #[default]
    Idle,
    Dragging {
        node_id: i64,
    },
    Reconciling(ReconcilePhase),
}

/// What a drop did to the local list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropEffect {
    /// Dropped on itself or on a node of another sibling group
    NoOp,
    /// The sibling group of `parent_id`, in its new order
    Moved {
        parent_id: Option<i64>,
        order: Vec<i64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    NoOp,
    Saved { patched: usize },
}

/// Client-side owner of the admin's navigation list
pub struct ReorderController<A> {
    api: Arc<A>,
    nodes: Vec<NavigationNode>,
    snapshot: Option<Vec<NavigationNode>>,
    pending: Vec<(i64, i64)>,
    state: ReorderState,
}

impl<A: NavigationApi> ReorderController<A> {
    /// Fetch the full list and start Idle
    pub async fn load(api: Arc<A>) -> Result<Self, ReorderError> {
        let nodes = api.list_all().await.map_err(ReorderError::Load)?;
        Ok(Self::with_nodes(api, nodes))
    }

    pub fn with_nodes(api: Arc<A>, nodes: Vec<NavigationNode>) -> Self {
        Self {
            api,
            nodes,
            snapshot: None,
            pending: Vec::new(),
            state: ReorderState::Idle,
        }
    }

    pub fn state(&self) -> ReorderState {
        self.state
    }

    /// Local rows as last fetched or optimistically moved
    pub fn nodes(&self) -> &[NavigationNode] {
        &self.nodes
    }

    /// Local rows in pre-order with indentation levels
    pub fn flattened(&self) -> Vec<FlatNode> {
        flatten_tree(&build_tree(&self.nodes))
    }

    /// Re-fetch the list outside of a reorder
    pub async fn reload(&mut self) -> Result<(), ReorderError> {
        if self.state == ReorderState::Reconciling(ReconcilePhase::Optimistic) {
            return Err(ReorderError::ReconcileInProgress);
        }
        self.nodes = self.api.list_all().await.map_err(ReorderError::Load)?;
        self.state = ReorderState::Idle;
        Ok(())
    }

    pub fn drag_start(&mut self, node_id: i64) -> Result<(), ReorderError> {
        match self.state {
            ReorderState::Reconciling(ReconcilePhase::Optimistic) => {
                return Err(ReorderError::ReconcileInProgress)
            }
            // A settled reconciliation counts as Idle
            _ => self.state = ReorderState::Idle,
        }

        if !self.nodes.iter().any(|n| n.id == node_id) {
            return Err(ReorderError::unknown_node(node_id));
        }

        self.state = ReorderState::Dragging { node_id };
        Ok(())
    }

    pub fn cancel_drag(&mut self) {
        if let ReorderState::Dragging { .. } = self.state {
            self.state = ReorderState::Idle;
        }
    }

    /// Dismiss a settled reconciliation
    pub fn acknowledge(&mut self) {
        if let ReorderState::Reconciling(ReconcilePhase::Success | ReconcilePhase::Failed) =
            self.state
        {
            self.state = ReorderState::Idle;
        }
    }

    /// Drop the dragged node onto `target_id`
    ///
    /// Within one sibling group this is an array move: the dragged node is
    /// removed at its index and inserted at the target's index. The new
    /// positions are applied locally and queued for [`Self::persist`].
    pub fn drop_on(&mut self, target_id: i64) -> Result<DropEffect, ReorderError> {
        let ReorderState::Dragging { node_id } = self.state else {
            return Err(ReorderError::NotDragging);
        };
        self.state = ReorderState::Idle;

        let dragged_parent = self.parent_of(node_id)?;
        let target_parent = self.parent_of(target_id)?;

        if target_id == node_id || target_parent != dragged_parent {
            tracing::debug!(
                "Drop of {} on {} ignored (different sibling group or same node)",
                node_id,
                target_id
            );
            return Ok(DropEffect::NoOp);
        }

        let mut order = sibling_order(&self.nodes, dragged_parent);
        let from = order.iter().position(|&id| id == node_id);
        let to = order.iter().position(|&id| id == target_id);
        let (Some(from), Some(to)) = (from, to) else {
            return Ok(DropEffect::NoOp);
        };
        let moved = order.remove(from);
        order.insert(to, moved);

        self.snapshot = Some(self.nodes.clone());
        self.pending = order
            .iter()
            .enumerate()
            .map(|(index, &id)| (id, index as i64 * POSITION_STEP))
            .collect();

        for &(id, position) in &self.pending {
            if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
                node.position = position;
            }
        }

        self.state = ReorderState::Reconciling(ReconcilePhase::Optimistic);
        Ok(DropEffect::Moved {
            parent_id: dragged_parent,
            order,
        })
    }

    /// Send the queued position patches and reconcile with the server
    ///
    /// On failure the local list becomes the server state fetched after the
    /// batch; only if that fetch fails too is the pre-drag list restored.
    pub async fn persist(&mut self) -> Result<ReorderOutcome, ReorderError> {
        if self.state != ReorderState::Reconciling(ReconcilePhase::Optimistic) {
            return Err(ReorderError::NothingToPersist);
        }

        let patches = std::mem::take(&mut self.pending);
        let total = patches.len();

        let api = &self.api;
        let results = join_all(
            patches
                .iter()
                .map(|&(id, position)| async move { (id, api.patch_position(id, position).await) }),
        )
        .await;

        let mut failed = 0;
        for (id, result) in results {
            if let Err(e) = result {
                failed += 1;
                tracing::warn!("Position patch for navigation node {} failed: {:#}", id, e);
            }
        }

        let snapshot = self.snapshot.take();
        match self.api.list_all().await {
            Ok(fresh) => self.nodes = fresh,
            Err(e) if failed > 0 => {
                tracing::warn!(
                    "Re-fetch after failed reorder failed, restoring pre-drag list: {:#}",
                    e
                );
                if let Some(snapshot) = snapshot {
                    self.nodes = snapshot;
                }
            }
            Err(e) => {
                tracing::warn!("Re-fetch after reorder failed, keeping local order: {:#}", e);
            }
        }

        if failed > 0 {
            self.state = ReorderState::Reconciling(ReconcilePhase::Failed);
            return Err(ReorderError::PositionsNotSaved { failed, total });
        }

        tracing::debug!("Reorder saved ({} positions)", total);
        self.state = ReorderState::Reconciling(ReconcilePhase::Success);
        Ok(ReorderOutcome::Saved { patched: total })
    }

    /// [`Self::drop_on`] followed by [`Self::persist`] when something moved
    pub async fn drop_and_persist(
        &mut self,
        target_id: i64,
    ) -> Result<ReorderOutcome, ReorderError> {
        match self.drop_on(target_id)? {
            DropEffect::NoOp => Ok(ReorderOutcome::NoOp),
            DropEffect::Moved { .. } => self.persist().await,
        }
    }

    fn parent_of(&self, id: i64) -> Result<Option<i64>, ReorderError> {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.parent_id)
            .ok_or_else(|| ReorderError::unknown_node(id))
    }
}
