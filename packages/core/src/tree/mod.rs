//! Tree building and flattening over flat navigation rows
//!
//! Rows are grouped into an arena keyed by `parent_id` holding indices into
//! the input slice, so building never clones or re-identifies nodes until the
//! final [`TreeNode`] is emitted.
//!
//! - [`build_tree`] nests rows under their parents, siblings ordered by
//!   `position` (stable: ties keep input order, which stores deliver by id)
//! - [`flatten_tree`] linearizes the nested tree pre-order for list rendering

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::models::NavigationNode;

/// A navigation node with its ordered children and depth (root = 0)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    #[serde(flatten)]
    pub node: NavigationNode,
    pub level: usize,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of nodes in this subtree, including `self`
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }
}

/// A node in pre-order position, keeping its depth for indentation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatNode {
    #[serde(flatten)]
    pub node: NavigationNode,
    pub level: usize,
}

/// Sibling groups: parent id → indices into the source slice, position-sorted
struct Arena<'a> {
    nodes: &'a [NavigationNode],
    groups: HashMap<Option<i64>, Vec<usize>>,
}

impl<'a> Arena<'a> {
    fn new(nodes: &'a [NavigationNode]) -> Self {
        let mut groups: HashMap<Option<i64>, Vec<usize>> = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            groups.entry(node.parent_id).or_default().push(index);
        }
        for indices in groups.values_mut() {
            indices.sort_by_key(|&i| nodes[i].position);
        }
        Self { nodes, groups }
    }

    fn build(
        &self,
        parent_id: Option<i64>,
        level: usize,
        visited: &mut HashSet<i64>,
    ) -> Vec<TreeNode> {
        let Some(indices) = self.groups.get(&parent_id) else {
            return Vec::new();
        };

        indices
            .iter()
            .filter_map(|&index| {
                let node = &self.nodes[index];
                // Duplicate ids would otherwise recurse into the same group twice
                if !visited.insert(node.id) {
                    return None;
                }
                Some(TreeNode {
                    node: node.clone(),
                    level,
                    children: self.build(Some(node.id), level + 1, visited),
                })
            })
            .collect()
    }
}

/// Nest flat rows into a forest rooted at `parent_id = None`
///
/// Every reachable node appears exactly once. Rows whose parent is missing
/// from `nodes` (and rows on a parent cycle) are unreachable and omitted;
/// see [`orphans`].
pub fn build_tree(nodes: &[NavigationNode]) -> Vec<TreeNode> {
    let arena = Arena::new(nodes);
    let mut visited = HashSet::with_capacity(nodes.len());
    arena.build(None, 0, &mut visited)
}

/// Pre-order linearization: each node, then its flattened children
pub fn flatten_tree(tree: &[TreeNode]) -> Vec<FlatNode> {
    fn walk(nodes: &[TreeNode], out: &mut Vec<FlatNode>) {
        for tree_node in nodes {
            out.push(FlatNode {
                node: tree_node.node.clone(),
                level: tree_node.level,
            });
            walk(&tree_node.children, out);
        }
    }

    let mut flat = Vec::with_capacity(tree.iter().map(TreeNode::size).sum());
    walk(tree, &mut flat);
    flat
}

/// Rows that [`build_tree`] cannot reach from the top level
pub fn orphans(nodes: &[NavigationNode]) -> Vec<&NavigationNode> {
    let reachable: HashSet<i64> = flatten_tree(&build_tree(nodes))
        .into_iter()
        .map(|flat| flat.node.id)
        .collect();

    nodes.iter().filter(|n| !reachable.contains(&n.id)).collect()
}

/// Ids of `parent_id`'s children in display order
pub fn sibling_order(nodes: &[NavigationNode], parent_id: Option<i64>) -> Vec<i64> {
    let mut siblings: Vec<&NavigationNode> =
        nodes.iter().filter(|n| n.parent_id == parent_id).collect();
    siblings.sort_by_key(|n| n.position);
    siblings.into_iter().map(|n| n.id).collect()
}
