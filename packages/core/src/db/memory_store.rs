//! MemoryStore - in-process NavigationStore
//!
//! Keeps rows in a `BTreeMap` behind a Tokio `RwLock`. Ids come from a
//! monotonically increasing counter and are never reused, matching the
//! AUTOINCREMENT behavior of [`crate::db::TursoStore`].

use crate::db::node_store::NavigationStore;
use crate::models::{NavigationNode, NewNavigationNode, NodeChanges};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    nodes: BTreeMap<i64, NavigationNode>,
}

/// In-memory navigation store
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing rows, keeping their ids
    pub fn with_nodes(nodes: impl IntoIterator<Item = NavigationNode>) -> Self {
        let nodes: BTreeMap<i64, NavigationNode> = nodes.into_iter().map(|n| (n.id, n)).collect();
        let last_id = nodes.keys().next_back().copied().unwrap_or(0);
        Self {
            state: RwLock::new(MemoryState { last_id, nodes }),
        }
    }
}

#[async_trait]
impl NavigationStore for MemoryStore {
    async fn list_nodes(&self) -> Result<Vec<NavigationNode>> {
        Ok(self.state.read().await.nodes.values().cloned().collect())
    }

    async fn get_node(&self, id: i64) -> Result<Option<NavigationNode>> {
        Ok(self.state.read().await.nodes.get(&id).cloned())
    }

    async fn get_children(&self, parent_id: Option<i64>) -> Result<Vec<NavigationNode>> {
        Ok(self
            .state
            .read()
            .await
            .nodes
            .values()
            .filter(|n| n.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn create_node(&self, node: NewNavigationNode) -> Result<NavigationNode> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let created = node.into_node(state.last_id);
        state.nodes.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_node(&self, id: i64, changes: NodeChanges) -> Result<Option<NavigationNode>> {
        let mut state = self.state.write().await;
        Ok(state.nodes.get_mut(&id).map(|current| {
            *current = changes.apply_to(current);
            current.clone()
        }))
    }

    async fn set_position(&self, id: i64, position: i64) -> Result<Option<NavigationNode>> {
        let mut state = self.state.write().await;
        Ok(state.nodes.get_mut(&id).map(|current| {
            current.position = position;
            current.clone()
        }))
    }

    async fn delete_nodes(&self, ids: &[i64]) -> Result<u64> {
        let mut state = self.state.write().await;
        Ok(ids
            .iter()
            .filter(|&&id| state.nodes.remove(&id).is_some())
            .count() as u64)
    }
}
