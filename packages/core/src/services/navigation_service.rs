//! NavigationService - admin and end-user operations over the tree store
//!
//! # Responsibilities
//!
//! - **Probe-based upsert**: an `id` that resolves updates; anything else creates
//! - **Tree rules**: type-dependent parentage, no cycles, children stay valid
//!   when their parent changes type
//! - **Page links**: always re-derived from the label
//! - **Position patch**: single-column update used by the reorder protocol
//! - **Cascade delete**: a node is removed together with its subtree
//! - **End-user view**: active nodes passing the permission filter
//!
//! Validation happens before any write. Store failures surface as
//! [`NavigationError::Persistence`].

use chrono::Utc;
use std::sync::Arc;

use crate::access::{filter_visible, AccessContext, RoleGate};
use crate::db::NavigationStore;
use crate::models::policy::{self, POSITION_STEP};
use crate::models::{
    NavIcon, NavigationNode, NewNavigationNode, NodeChanges, NodeType, UpsertNode,
    ValidationError,
};
use crate::services::error::NavigationError;
use crate::tree::{build_tree, flatten_tree, orphans, FlatNode};

/// Result of a create-or-update call
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    pub node: NavigationNode,
    /// `true` when the create path was taken
    pub created: bool,
}

/// Required fields of an [`UpsertNode`], parsed and validated
struct RequiredFields {
    label: String,
    icon: NavIcon,
    node_type: NodeType,
}

impl RequiredFields {
    fn parse(input: &UpsertNode) -> Result<Self, NavigationError> {
        let label = input
            .label
            .as_deref()
            .ok_or_else(|| NavigationError::missing_field("label"))?;
        let icon = input
            .icon
            .as_deref()
            .ok_or_else(|| NavigationError::missing_field("icon"))?;
        let node_type = input
            .node_type
            .as_deref()
            .ok_or_else(|| NavigationError::missing_field("type"))?;

        Ok(Self {
            label: policy::validate_label(label)?,
            icon: icon.parse()?,
            node_type: node_type.parse()?,
        })
    }
}

/// Trim optional free text; blank becomes `None`
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Service coordinating the navigation store and tree policy
#[derive(Clone)]
pub struct NavigationService {
    store: Arc<dyn NavigationStore>,
    role_gate: RoleGate,
}

impl NavigationService {
    pub fn new(store: Arc<dyn NavigationStore>) -> Self {
        Self {
            store,
            role_gate: RoleGate::default(),
        }
    }

    /// Choose how `requiresRole` combines with tool gating on the end-user path
    pub fn with_role_gate(mut self, role_gate: RoleGate) -> Self {
        self.role_gate = role_gate;
        self
    }

    pub fn role_gate(&self) -> RoleGate {
        self.role_gate
    }

    /// Every node, active and inactive, flat and unfiltered
    pub async fn list_all(&self) -> Result<Vec<NavigationNode>, NavigationError> {
        Ok(self.store.list_nodes().await?)
    }

    /// Every node as a pre-order list with indentation levels
    pub async fn admin_tree(&self) -> Result<Vec<FlatNode>, NavigationError> {
        let nodes = self.store.list_nodes().await?;
        let unreachable = orphans(&nodes);
        if !unreachable.is_empty() {
            tracing::warn!(
                "{} navigation nodes are unreachable from the top level: {:?}",
                unreachable.len(),
                unreachable.iter().map(|n| n.id).collect::<Vec<_>>()
            );
        }
        Ok(flatten_tree(&build_tree(&nodes)))
    }

    pub async fn get_node(&self, id: i64) -> Result<NavigationNode, NavigationError> {
        self.store
            .get_node(id)
            .await?
            .ok_or_else(|| NavigationError::not_found(id))
    }

    /// Nodes that may be offered as parent for a `node_type` entry
    ///
    /// `exclude` removes a node being edited and its descendants.
    pub async fn candidate_parents(
        &self,
        node_type: NodeType,
        exclude: Option<i64>,
    ) -> Result<Vec<NavigationNode>, NavigationError> {
        let nodes = self.store.list_nodes().await?;
        Ok(policy::candidate_parents(&nodes, node_type, exclude)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Create-or-update by probe
    ///
    /// 1. `label`, `icon` and `type` are required on both paths
    /// 2. If `id` is set and resolves, the payload is merged over the row
    /// 3. Otherwise a new row is created; a supplied `id` is discarded
    pub async fn upsert(&self, input: UpsertNode) -> Result<UpsertOutcome, NavigationError> {
        let required = RequiredFields::parse(&input)?;

        let existing = match input.id {
            Some(id) => self.store.get_node(id).await?,
            None => None,
        };

        match existing {
            Some(current) => {
                let node = self.update_existing(current, required, input).await?;
                Ok(UpsertOutcome {
                    node,
                    created: false,
                })
            }
            None => {
                if let Some(id) = input.id {
                    tracing::debug!("Probe id {} not found; creating a new navigation node", id);
                }
                let node = self.create_new(required, input).await?;
                Ok(UpsertOutcome {
                    node,
                    created: true,
                })
            }
        }
    }

    async fn create_new(
        &self,
        required: RequiredFields,
        input: UpsertNode,
    ) -> Result<NavigationNode, NavigationError> {
        let parent_id = input.parent_id.flatten();
        let link = policy::resolve_link(
            required.node_type,
            &required.label,
            input.link.flatten().as_deref(),
        )?;

        if let Some(parent_id) = parent_id {
            let parent = self.store.get_node(parent_id).await?.ok_or_else(|| {
                NavigationError::invalid_parent(format!("parent {} does not exist", parent_id))
            })?;
            policy::check_parent(required.node_type, Some(&parent))?;
        }

        let position = match input.position {
            Some(position) => position,
            None => self.next_position(parent_id).await?,
        };

        let node = NewNavigationNode {
            label: required.label,
            icon: required.icon,
            link,
            description: non_blank(input.description.flatten()),
            node_type: required.node_type,
            parent_id,
            tool_id: non_blank(input.tool_id.flatten()),
            requires_role: non_blank(input.requires_role.flatten()),
            position,
            is_active: input.is_active.unwrap_or(true),
            created_at: Utc::now(),
        };

        let created = self.store.create_node(node).await?;
        tracing::debug!(
            "Created navigation node {} ({} '{}')",
            created.id,
            created.node_type,
            created.label
        );
        Ok(created)
    }

    async fn update_existing(
        &self,
        current: NavigationNode,
        required: RequiredFields,
        input: UpsertNode,
    ) -> Result<NavigationNode, NavigationError> {
        let parent_id = input.parent_id.unwrap_or(current.parent_id);
        let link_input = input.link.unwrap_or_else(|| current.link.clone());
        let link =
            policy::resolve_link(required.node_type, &required.label, link_input.as_deref())?;

        let nodes = self.store.list_nodes().await?;
        self.check_placement(&nodes, &current, required.node_type, parent_id)?;

        let changes = NodeChanges {
            label: required.label,
            icon: required.icon,
            link,
            description: non_blank(input.description.unwrap_or(current.description)),
            node_type: required.node_type,
            parent_id,
            tool_id: non_blank(input.tool_id.unwrap_or(current.tool_id)),
            requires_role: non_blank(input.requires_role.unwrap_or(current.requires_role)),
            position: input.position.unwrap_or(current.position),
            is_active: input.is_active.unwrap_or(current.is_active),
        };

        let updated = self
            .store
            .update_node(current.id, changes)
            .await?
            .ok_or_else(|| NavigationError::not_found(current.id))?;

        tracing::debug!("Updated navigation node {}", updated.id);
        Ok(updated)
    }

    /// Tree rules for moving/retyping an existing node
    fn check_placement(
        &self,
        nodes: &[NavigationNode],
        current: &NavigationNode,
        node_type: NodeType,
        parent_id: Option<i64>,
    ) -> Result<(), NavigationError> {
        if let Some(parent_id) = parent_id {
            if parent_id == current.id {
                return Err(NavigationError::invalid_parent(format!(
                    "node {} cannot be its own parent",
                    current.id
                )));
            }
            if policy::subtree_ids(nodes, current.id).contains(&parent_id) {
                return Err(NavigationError::invalid_parent(format!(
                    "moving node {} under its descendant {} would create a cycle",
                    current.id, parent_id
                )));
            }
            let parent = nodes.iter().find(|n| n.id == parent_id).ok_or_else(|| {
                NavigationError::invalid_parent(format!("parent {} does not exist", parent_id))
            })?;
            policy::check_parent(node_type, Some(parent))?;
        } else {
            policy::check_parent(node_type, None)?;
        }

        if let Some(child) = nodes
            .iter()
            .filter(|n| n.parent_id == Some(current.id))
            .find(|child| !policy::allows_parent(child.node_type, node_type))
        {
            return Err(NavigationError::invalid_parent(format!(
                "node {} has a {} child ({}) that cannot sit under a {}",
                current.id, child.node_type, child.id, node_type
            )));
        }

        Ok(())
    }

    /// Next sparse slot after the last sibling under `parent_id`
    async fn next_position(&self, parent_id: Option<i64>) -> Result<i64, NavigationError> {
        let siblings = self.store.get_children(parent_id).await?;
        let Some(max) = siblings.iter().map(|n| n.position).max() else {
            return Ok(0);
        };

        max.checked_add(POSITION_STEP).ok_or_else(|| {
            ValidationError::InvalidField {
                field: "position".to_string(),
                reason: format!(
                    "no position left after sibling at {}; pass an explicit position",
                    max
                ),
            }
            .into()
        })
    }

    /// Position-only patch
    pub async fn update_position(
        &self,
        id: i64,
        position: i64,
    ) -> Result<NavigationNode, NavigationError> {
        let updated = self
            .store
            .set_position(id, position)
            .await?
            .ok_or_else(|| NavigationError::not_found(id))?;

        tracing::debug!("Navigation node {} moved to position {}", id, position);
        Ok(updated)
    }

    /// Hard-delete `id` and its whole subtree
    ///
    /// Returns the removed ids, deepest first.
    pub async fn delete(&self, id: i64) -> Result<Vec<i64>, NavigationError> {
        let nodes = self.store.list_nodes().await?;
        if !nodes.iter().any(|n| n.id == id) {
            return Err(NavigationError::not_found(id));
        }

        let mut ids = policy::subtree_ids(&nodes, id);
        ids.reverse();

        let deleted = self.store.delete_nodes(&ids).await?;
        if deleted as usize != ids.len() {
            tracing::warn!(
                "Deleted {} of {} navigation nodes in subtree of {}",
                deleted,
                ids.len(),
                id
            );
        } else {
            tracing::debug!("Deleted navigation node {} with {} descendants", id, ids.len() - 1);
        }

        Ok(ids)
    }

    /// Active nodes the caller may see, flat, in store order
    pub async fn visible_nodes(
        &self,
        access: &AccessContext,
    ) -> Result<Vec<NavigationNode>, NavigationError> {
        let nodes = self.store.list_nodes().await?;
        Ok(filter_visible(nodes, access, self.role_gate))
    }
}
