//! Type and slug policy for navigation entries
//!
//! Parentage rules by node type:
//!
//! | type      | allowed parent            |
//! |-----------|---------------------------|
//! | `section` | none (top level only)     |
//! | `page`    | none or a `section`       |
//! | `link`    | none, a `section` or `page` |
//!
//! Pages never keep a caller-supplied link; their link is always
//! `/page/{slug}` derived from the label.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::models::{NavigationNode, NodeType, ValidationError};

/// Minimum label length, counted in characters after trimming
pub const MIN_LABEL_CHARS: usize = 2;

/// Prefix of every derived page link
pub const PAGE_LINK_PREFIX: &str = "/page/";

/// Gap between consecutive sibling positions after a renumber
pub const POSITION_STEP: i64 = 10;

const NON_ALPHANUMERIC_PATTERN: &str = r"[^a-z0-9]+";

/// Lowercase `label`, collapse every run of non `[a-z0-9]` characters into a
/// single hyphen and strip leading/trailing hyphens.
///
/// ```rust
/// use navtree_core::models::policy::slugify;
///
/// assert_eq!(slugify("My Cool Page!"), "my-cool-page");
/// assert_eq!(slugify("  --Intervention  Plans--  "), "intervention-plans");
/// ```
pub fn slugify(label: &str) -> String {
    static NON_ALPHANUMERIC: OnceLock<Regex> = OnceLock::new();
    let non_alphanumeric =
        NON_ALPHANUMERIC.get_or_init(|| Regex::new(NON_ALPHANUMERIC_PATTERN).unwrap());

    let lowered = label.to_lowercase();
    non_alphanumeric
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Canonical link of a page with the given label
pub fn page_link(label: &str) -> Result<String, ValidationError> {
    let slug = slugify(label);
    if slug.is_empty() {
        return Err(ValidationError::EmptySlug(label.to_string()));
    }
    Ok(format!("{}{}", PAGE_LINK_PREFIX, slug))
}

/// Trim and check the label length
pub fn validate_label(label: &str) -> Result<String, ValidationError> {
    let trimmed = label.trim();
    if trimmed.chars().count() < MIN_LABEL_CHARS {
        return Err(ValidationError::LabelTooShort {
            min: MIN_LABEL_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// Resolve the stored link for a node of `node_type`
///
/// - `page`: derived from the label, input ignored
/// - `link`: input required, trimmed, non-empty
/// - `section`: always cleared
pub fn resolve_link(
    node_type: NodeType,
    label: &str,
    link: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    match node_type {
        NodeType::Page => page_link(label).map(Some),
        NodeType::Link => match link.map(str::trim) {
            Some(link) if !link.is_empty() => Ok(Some(link.to_string())),
            _ => Err(ValidationError::MissingLink),
        },
        NodeType::Section => Ok(None),
    }
}

/// Whether a node of `child` type may sit under a node of `parent` type
pub fn allows_parent(child: NodeType, parent: NodeType) -> bool {
    match child {
        NodeType::Section => false,
        NodeType::Page => parent == NodeType::Section,
        NodeType::Link => matches!(parent, NodeType::Section | NodeType::Page),
    }
}

/// Check `child` type against its (already resolved) parent row
pub fn check_parent(
    child: NodeType,
    parent: Option<&NavigationNode>,
) -> Result<(), ValidationError> {
    let Some(parent) = parent else {
        return Ok(());
    };

    if allows_parent(child, parent.node_type) {
        Ok(())
    } else if child == NodeType::Section {
        Err(ValidationError::InvalidParent(
            "sections are top-level only".to_string(),
        ))
    } else {
        Err(ValidationError::InvalidParent(format!(
            "a {} cannot be placed under {} {}",
            child, parent.node_type, parent.id
        )))
    }
}

/// Ids of `root` and every node below it in `nodes`
///
/// Walks `parent_id` edges breadth-first; safe on cyclic input.
pub fn subtree_ids(nodes: &[NavigationNode], root: i64) -> Vec<i64> {
    let mut seen = HashSet::from([root]);
    let mut ordered = vec![root];
    let mut cursor = 0;

    while cursor < ordered.len() {
        let current = ordered[cursor];
        cursor += 1;
        for node in nodes.iter().filter(|n| n.parent_id == Some(current)) {
            if seen.insert(node.id) {
                ordered.push(node.id);
            }
        }
    }

    ordered
}

/// Nodes the admin UI may offer as parent for a node of `node_type`
///
/// When `exclude` names an existing node, that node and its descendants are
/// left out so a move can never close a cycle.
pub fn candidate_parents<'a>(
    nodes: &'a [NavigationNode],
    node_type: NodeType,
    exclude: Option<i64>,
) -> Vec<&'a NavigationNode> {
    let excluded: HashSet<i64> = exclude
        .map(|id| subtree_ids(nodes, id).into_iter().collect())
        .unwrap_or_default();

    nodes
        .iter()
        .filter(|n| !excluded.contains(&n.id))
        .filter(|n| allows_parent(node_type, n.node_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NavIcon;
    use chrono::Utc;

    fn node(id: i64, node_type: NodeType, parent_id: Option<i64>) -> NavigationNode {
        NavigationNode {
            id,
            label: format!("Node {}", id),
            icon: NavIcon::Folder,
            link: None,
            description: None,
            node_type,
            parent_id,
            tool_id: None,
            requires_role: None,
            position: 0,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_slugify_collapses_runs_and_trims() {
        assert_eq!(slugify("My Cool Page!"), "my-cool-page");
        assert_eq!(slugify("Grades & Reports (2024)"), "grades-reports-2024");
        assert_eq!(slugify("already-slugged"), "already-slugged");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_page_link_rejects_empty_slug() {
        assert_eq!(page_link("My Cool Page!").unwrap(), "/page/my-cool-page");
        assert!(matches!(page_link("?!"), Err(ValidationError::EmptySlug(_))));
    }

    #[test]
    fn test_validate_label_counts_trimmed_chars() {
        assert!(validate_label(" A ").is_err());
        assert_eq!(validate_label(" Ab ").unwrap(), "Ab");
    }

    #[test]
    fn test_resolve_link_per_type() {
        assert_eq!(
            resolve_link(NodeType::Page, "About Us", Some("/custom")).unwrap(),
            Some("/page/about-us".to_string())
        );
        assert_eq!(
            resolve_link(NodeType::Link, "Docs", Some(" /docs ")).unwrap(),
            Some("/docs".to_string())
        );
        assert_eq!(
            resolve_link(NodeType::Link, "Docs", Some("   ")),
            Err(ValidationError::MissingLink)
        );
        assert_eq!(
            resolve_link(NodeType::Section, "Admin", Some("/ignored")).unwrap(),
            None
        );
    }

    #[test]
    fn test_parent_rules() {
        let section = node(1, NodeType::Section, None);
        let page = node(2, NodeType::Page, Some(1));
        let link = node(3, NodeType::Link, Some(2));

        assert!(check_parent(NodeType::Section, None).is_ok());
        assert!(check_parent(NodeType::Section, Some(&section)).is_err());
        assert!(check_parent(NodeType::Page, Some(&section)).is_ok());
        assert!(check_parent(NodeType::Page, Some(&page)).is_err());
        assert!(check_parent(NodeType::Link, Some(&section)).is_ok());
        assert!(check_parent(NodeType::Link, Some(&page)).is_ok());
        assert!(check_parent(NodeType::Link, Some(&link)).is_err());
    }

    #[test]
    fn test_candidate_parents_excludes_own_subtree() {
        let nodes = vec![
            node(1, NodeType::Section, None),
            node(2, NodeType::Page, Some(1)),
            node(3, NodeType::Page, None),
            node(4, NodeType::Link, Some(2)),
        ];

        let for_link: Vec<i64> = candidate_parents(&nodes, NodeType::Link, None)
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(for_link, vec![1, 2, 3]);

        let for_page: Vec<i64> = candidate_parents(&nodes, NodeType::Page, None)
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(for_page, vec![1]);

        let excluding_section: Vec<i64> = candidate_parents(&nodes, NodeType::Link, Some(1))
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(excluding_section, vec![3]);

        assert!(candidate_parents(&nodes, NodeType::Section, None).is_empty());
    }

    #[test]
    fn test_subtree_ids_terminates_on_cycle() {
        let nodes = vec![node(1, NodeType::Page, Some(2)), node(2, NodeType::Page, Some(1))];
        let mut ids = subtree_ids(&nodes, 1);
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }
}
