//! Permission filtering for the end-user navigation view
//!
//! A node is visible when it is active and either has no `tool_id` or its
//! `tool_id` is among the caller's tool grants. The check is per node: a
//! child whose parent was filtered out stays visible if it passes on its own.
//!
//! How `requires_role` participates is a deployment choice ([`RoleGate`]).

mod directory;

pub use directory::{
    AccessDirectory, AccessFile, SessionRecord, SessionVerifier, StaticAccessDirectory,
};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use crate::models::NavigationNode;

/// How `requires_role` combines with tool gating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleGate {
    /// `requires_role` is stored but not enforced
    #[default]
    Ignore,
    /// A node with `requires_role` also needs the caller to hold that role
    RequireRole,
}

impl FromStr for RoleGate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(RoleGate::Ignore),
            "require-role" => Ok(RoleGate::RequireRole),
            other => Err(format!(
                "unknown role gate '{}' (expected 'ignore' or 'require-role')",
                other
            )),
        }
    }
}

/// Caller identity as seen by the permission filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessContext {
    pub user_id: String,
    pub roles: HashSet<String>,
    pub grants: HashSet<String>,
}

impl AccessContext {
    pub fn new(
        user_id: impl Into<String>,
        roles: impl IntoIterator<Item = impl Into<String>>,
        grants: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
            grants: grants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Whether a single node passes the grant (and optional role) check
///
/// Ignores `is_active`; see [`filter_visible`].
pub fn is_permitted(node: &NavigationNode, access: &AccessContext, gate: RoleGate) -> bool {
    let tool_ok = match node.tool_id.as_deref() {
        None => true,
        Some(tool) => access.grants.contains(tool),
    };

    let role_ok = match (gate, node.requires_role.as_deref()) {
        (RoleGate::RequireRole, Some(role)) => access.has_role(role),
        _ => true,
    };

    tool_ok && role_ok
}

/// Active nodes that pass [`is_permitted`], preserving input order
pub fn filter_visible(
    nodes: Vec<NavigationNode>,
    access: &AccessContext,
    gate: RoleGate,
) -> Vec<NavigationNode> {
    nodes
        .into_iter()
        .filter(|n| n.is_active && is_permitted(n, access, gate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NavIcon, NodeType};
    use chrono::Utc;

    fn node(id: i64, parent_id: Option<i64>, tool_id: Option<&str>) -> NavigationNode {
        NavigationNode {
            id,
            label: format!("Node {}", id),
            icon: NavIcon::Tool,
            link: Some(format!("/tools/{}", id)),
            description: None,
            node_type: if parent_id.is_none() {
                NodeType::Section
            } else {
                NodeType::Link
            },
            parent_id,
            tool_id: tool_id.map(str::to_string),
            requires_role: None,
            position: 0,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn caller(grants: &[&str]) -> AccessContext {
        AccessContext::new("u-1", ["staff"], grants.iter().copied())
    }

    #[test]
    fn test_tool_gated_node_requires_grant() {
        let gated = node(1, None, Some("X"));
        assert!(!is_permitted(&gated, &caller(&["Y"]), RoleGate::Ignore));
        assert!(is_permitted(&gated, &caller(&["X"]), RoleGate::Ignore));
    }

    #[test]
    fn test_ungated_node_visible_to_everyone() {
        let open = node(1, None, None);
        assert!(is_permitted(&open, &caller(&[]), RoleGate::Ignore));
    }

    #[test]
    fn test_filter_is_per_node_not_cascaded() {
        let nodes = vec![node(1, None, Some("X")), node(2, Some(1), None)];
        let visible = filter_visible(nodes, &caller(&["Y"]), RoleGate::Ignore);
        assert_eq!(visible.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_inactive_nodes_hidden() {
        let mut inactive = node(1, None, None);
        inactive.is_active = false;
        assert!(filter_visible(vec![inactive], &caller(&[]), RoleGate::Ignore).is_empty());
    }

    #[test]
    fn test_role_gate_modes() {
        let mut admin_only = node(1, None, None);
        admin_only.requires_role = Some("admin".to_string());

        assert!(is_permitted(&admin_only, &caller(&[]), RoleGate::Ignore));
        assert!(!is_permitted(&admin_only, &caller(&[]), RoleGate::RequireRole));

        let admin = AccessContext::new("u-2", ["admin"], Vec::<String>::new());
        assert!(is_permitted(&admin_only, &admin, RoleGate::RequireRole));
    }

    #[test]
    fn test_role_gate_parse() {
        assert_eq!("require-role".parse::<RoleGate>().unwrap(), RoleGate::RequireRole);
        assert!("strict".parse::<RoleGate>().is_err());
    }
}
