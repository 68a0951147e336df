//! Data Models
//!
//! This module contains the navigation data structures and the policy that
//! constrains them:
//!
//! - `NavigationNode` - Persisted navigation entry (section, page or link)
//! - `UpsertNode` - Create-or-update payload accepted from administrators
//! - `policy` - Type-dependent parentage rules and page slug derivation

mod node;
pub mod policy;

pub use node::{
    NavIcon, NavigationNode, NewNavigationNode, NodeChanges, NodeType, UpsertNode,
    ValidationError,
};
