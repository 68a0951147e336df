//! Navigation Node Data Structures
//!
//! This module defines the `NavigationNode` row stored by every backend and
//! the closed enumerations (`NodeType`, `NavIcon`) that describe it.
//!
//! # Architecture
//!
//! - **Flat rows**: Nodes are persisted flat; hierarchy is `parent_id` only
//! - **Sparse ordering**: `position` orders siblings, renumbered in steps of 10
//! - **Closed vocabularies**: Types and icons are enums validated at the edge
//!
//! # Examples
//!
//! ```rust
//! use navtree_core::models::{NavIcon, NodeType};
//!
//! let icon: NavIcon = "IconHome".parse().unwrap();
//! assert_eq!(icon, NavIcon::Home);
//! assert_eq!("page".parse::<NodeType>().unwrap(), NodeType::Page);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Validation errors for navigation node input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid node type: {0}")]
    InvalidNodeType(String),

    #[error("Invalid icon: {0}")]
    InvalidIcon(String),

    #[error("Label must be at least {min} characters")]
    LabelTooShort { min: usize },

    #[error("A link entry requires a non-empty link")]
    MissingLink,

    #[error("Label '{0}' does not produce a usable page slug")]
    EmptySlug(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

/// Kind of navigation entry
///
/// Determines which parents a node may have (see [`crate::models::policy`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Outbound or in-app link; leaf entry
    Link,
    /// Top-level grouping header
    Section,
    /// Content page with a derived `/page/{slug}` link
    Page,
}

impl NodeType {
    pub const ALL: [NodeType; 3] = [NodeType::Link, NodeType::Section, NodeType::Page];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Link => "link",
            NodeType::Section => "section",
            NodeType::Page => "page",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidNodeType(s.to_string()))
    }
}

/// Icon set available to navigation entries
///
/// Wire names follow the frontend icon component names (`IconHome`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavIcon {
    #[serde(rename = "IconHome")]
    Home,
    #[serde(rename = "IconDashboard")]
    Dashboard,
    #[serde(rename = "IconUsers")]
    Users,
    #[serde(rename = "IconUser")]
    User,
    #[serde(rename = "IconSchool")]
    School,
    #[serde(rename = "IconBook")]
    Book,
    #[serde(rename = "IconNotebook")]
    Notebook,
    #[serde(rename = "IconClipboardList")]
    ClipboardList,
    #[serde(rename = "IconReport")]
    Report,
    #[serde(rename = "IconChartBar")]
    ChartBar,
    #[serde(rename = "IconCalendar")]
    Calendar,
    #[serde(rename = "IconFile")]
    File,
    #[serde(rename = "IconFiles")]
    Files,
    #[serde(rename = "IconFolder")]
    Folder,
    #[serde(rename = "IconUpload")]
    Upload,
    #[serde(rename = "IconSettings")]
    Settings,
    #[serde(rename = "IconTool")]
    Tool,
    #[serde(rename = "IconLink")]
    Link,
    #[serde(rename = "IconExternalLink")]
    ExternalLink,
    #[serde(rename = "IconBell")]
    Bell,
    #[serde(rename = "IconHelp")]
    Help,
    #[serde(rename = "IconLock")]
    Lock,
}

impl NavIcon {
    pub const ALL: [NavIcon; 22] = [
        NavIcon::Home,
        NavIcon::Dashboard,
        NavIcon::Users,
        NavIcon::User,
        NavIcon::School,
        NavIcon::Book,
        NavIcon::Notebook,
        NavIcon::ClipboardList,
        NavIcon::Report,
        NavIcon::ChartBar,
        NavIcon::Calendar,
        NavIcon::File,
        NavIcon::Files,
        NavIcon::Folder,
        NavIcon::Upload,
        NavIcon::Settings,
        NavIcon::Tool,
        NavIcon::Link,
        NavIcon::ExternalLink,
        NavIcon::Bell,
        NavIcon::Help,
        NavIcon::Lock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NavIcon::Home => "IconHome",
            NavIcon::Dashboard => "IconDashboard",
            NavIcon::Users => "IconUsers",
            NavIcon::User => "IconUser",
            NavIcon::School => "IconSchool",
            NavIcon::Book => "IconBook",
            NavIcon::Notebook => "IconNotebook",
            NavIcon::ClipboardList => "IconClipboardList",
            NavIcon::Report => "IconReport",
            NavIcon::ChartBar => "IconChartBar",
            NavIcon::Calendar => "IconCalendar",
            NavIcon::File => "IconFile",
            NavIcon::Files => "IconFiles",
            NavIcon::Folder => "IconFolder",
            NavIcon::Upload => "IconUpload",
            NavIcon::Settings => "IconSettings",
            NavIcon::Tool => "IconTool",
            NavIcon::Link => "IconLink",
            NavIcon::ExternalLink => "IconExternalLink",
            NavIcon::Bell => "IconBell",
            NavIcon::Help => "IconHelp",
            NavIcon::Lock => "IconLock",
        }
    }
}

impl fmt::Display for NavIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavIcon {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NavIcon::ALL
            .into_iter()
            .find(|icon| icon.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidIcon(s.to_string()))
    }
}

/// A single entry in the navigation tree, as persisted.
///
/// # Fields
///
/// - `id`: Store-assigned identifier
/// - `label`: Display text (at least 2 characters)
/// - `icon`: Member of the closed [`NavIcon`] set
/// - `link`: Target URL; derived for pages, required for links, null for sections
/// - `description`: Optional text shown for pages
/// - `node_type`: `link`, `section` or `page` (serialized as `type`)
/// - `parent_id`: Optional self-reference
/// - `tool_id`: Optional capability that gates visibility
/// - `requires_role`: Optional role name (secondary gate)
/// - `position`: Order within the sibling group
/// - `is_active`: Hidden from end users when false
/// - `created_at`: Creation timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationNode {
    pub id: i64,
    pub label: String,
    pub icon: NavIcon,
    pub link: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub parent_id: Option<i64>,
    pub tool_id: Option<String>,
    pub requires_role: Option<String>,
    pub position: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fully validated node ready for insertion (store assigns `id`)
#[derive(Debug, Clone, PartialEq)]
pub struct NewNavigationNode {
    pub label: String,
    pub icon: NavIcon,
    pub link: Option<String>,
    pub description: Option<String>,
    pub node_type: NodeType,
    pub parent_id: Option<i64>,
    pub tool_id: Option<String>,
    pub requires_role: Option<String>,
    pub position: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl NewNavigationNode {
    /// Materialize the row a store writes for this node under `id`
    pub fn into_node(self, id: i64) -> NavigationNode {
        NavigationNode {
            id,
            label: self.label,
            icon: self.icon,
            link: self.link,
            description: self.description,
            node_type: self.node_type,
            parent_id: self.parent_id,
            tool_id: self.tool_id,
            requires_role: self.requires_role,
            position: self.position,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

/// Custom deserializer for optional fields that accepts both plain values and null
///
/// Maps three input formats to the double-Option pattern:
/// - Missing field → None (keep current value)
/// - null → Some(None) (set to NULL)
/// - value → Some(Some(value)) (set to value)
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Create-or-update payload accepted by the admin API
///
/// Required fields (`label`, `icon`, `type`) are modeled as `Option` so their
/// absence surfaces as a [`ValidationError`] instead of a deserialization
/// failure. `icon` and `type` stay strings until validated against the
/// closed enumerations.
///
/// Nullable columns use the double-Option pattern so that an update can tell
/// "leave unchanged" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub link: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub description: Option<Option<String>>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent_id: Option<Option<i64>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub tool_id: Option<Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub requires_role: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpsertNode {
    /// Minimal payload with the three required fields set
    pub fn new(label: impl Into<String>, icon: NavIcon, node_type: NodeType) -> Self {
        Self {
            label: Some(label.into()),
            icon: Some(icon.as_str().to_string()),
            node_type: Some(node_type.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_parent(mut self, parent_id: Option<i64>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(Some(link.into()));
        self
    }

    pub fn with_tool(mut self, tool_id: impl Into<String>) -> Self {
        self.tool_id = Some(Some(tool_id.into()));
        self
    }

    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = Some(false);
        self
    }
}

/// Full replacement row for an existing node
///
/// Produced by the service after merging an [`UpsertNode`] over the stored
/// row and re-applying type policy. `id` and `created_at` never change.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeChanges {
    pub label: String,
    pub icon: NavIcon,
    pub link: Option<String>,
    pub description: Option<String>,
    pub node_type: NodeType,
    pub parent_id: Option<i64>,
    pub tool_id: Option<String>,
    pub requires_role: Option<String>,
    pub position: i64,
    pub is_active: bool,
}

impl NodeChanges {
    /// Apply these changes to `node`, keeping identity fields
    pub fn apply_to(self, node: &NavigationNode) -> NavigationNode {
        NavigationNode {
            id: node.id,
            label: self.label,
            icon: self.icon,
            link: self.link,
            description: self.description,
            node_type: self.node_type,
            parent_id: self.parent_id,
            tool_id: self.tool_id,
            requires_role: self.requires_role,
            position: self.position,
            is_active: self.is_active,
            created_at: node.created_at,
        }
    }
}
