//! TursoStore - NavigationStore Implementation for Turso/libsql Backend
//!
//! Thin SQL layer over [`DatabaseService`]: every method opens a connection
//! with busy timeout, runs one statement (or one transaction for bulk
//! deletes) and converts rows to [`NavigationNode`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use navtree_core::db::{DatabaseService, NavigationStore, TursoStore};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/navtree.db")).await?);
//!     let store: Arc<dyn NavigationStore> = Arc::new(TursoStore::new(db));
//!     let node = store.get_node(1).await?;
//!     Ok(())
//! }
//! ```

use crate::db::node_store::NavigationStore;
use crate::db::DatabaseService;
use crate::models::{NavIcon, NavigationNode, NewNavigationNode, NodeChanges, NodeType};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::{params, Row};
use std::sync::Arc;

const SELECT_COLUMNS: &str = "SELECT id, label, icon, link, description, node_type, parent_id,
        tool_id, requires_role, position, is_active, created_at
     FROM navigation_nodes";

/// TursoStore implements NavigationStore for the libsql backend
pub struct TursoStore {
    db: Arc<DatabaseService>,
}

impl TursoStore {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    async fn connection(&self) -> Result<libsql::Connection> {
        self.db
            .connect_with_timeout()
            .await
            .context("Failed to open database connection")
    }

    /// Parse timestamp from database - handles both SQLite and RFC3339 formats
    ///
    /// SQLite CURRENT_TIMESTAMP returns: "YYYY-MM-DD HH:MM:SS"
    /// Rows written by this store use RFC3339.
    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(naive.and_utc());
        }

        Err(anyhow::anyhow!(
            "Unable to parse timestamp '{}' as RFC3339 or SQLite format",
            s
        ))
    }

    /// Convert libsql::Row to NavigationNode
    ///
    /// # Row Format
    ///
    /// Columns in [`SELECT_COLUMNS`] order: id, label, icon, link,
    /// description, node_type, parent_id, tool_id, requires_role, position,
    /// is_active (INTEGER 0/1), created_at (TEXT).
    fn row_to_node(row: &Row) -> Result<NavigationNode> {
        let id: i64 = row.get(0).context("Failed to get id")?;
        let label: String = row.get(1).context("Failed to get label")?;
        let icon: String = row.get(2).context("Failed to get icon")?;
        let link: Option<String> = row.get(3).context("Failed to get link")?;
        let description: Option<String> = row.get(4).context("Failed to get description")?;
        let node_type: String = row.get(5).context("Failed to get node_type")?;
        let parent_id: Option<i64> = row.get(6).context("Failed to get parent_id")?;
        let tool_id: Option<String> = row.get(7).context("Failed to get tool_id")?;
        let requires_role: Option<String> = row.get(8).context("Failed to get requires_role")?;
        let position: i64 = row.get(9).context("Failed to get position")?;
        let is_active: i64 = row.get(10).context("Failed to get is_active")?;
        let created_at_str: String = row.get(11).context("Failed to get created_at")?;

        let icon: NavIcon = icon
            .parse()
            .with_context(|| format!("Row {} has unknown icon", id))?;
        let node_type: NodeType = node_type
            .parse()
            .with_context(|| format!("Row {} has unknown node type", id))?;
        let created_at =
            Self::parse_timestamp(&created_at_str).context("Failed to parse created_at")?;

        Ok(NavigationNode {
            id,
            label,
            icon,
            link,
            description,
            node_type,
            parent_id,
            tool_id,
            requires_role,
            position,
            is_active: is_active != 0,
            created_at,
        })
    }

    async fn collect_rows(mut rows: libsql::Rows) -> Result<Vec<NavigationNode>> {
        let mut nodes = Vec::new();
        while let Some(row) = rows.next().await.context("Failed to read row")? {
            nodes.push(Self::row_to_node(&row)?);
        }
        Ok(nodes)
    }
}

#[async_trait]
impl NavigationStore for TursoStore {
    async fn list_nodes(&self) -> Result<Vec<NavigationNode>> {
        let conn = self.connection().await?;
        let rows = conn
            .query(&format!("{} ORDER BY id ASC", SELECT_COLUMNS), ())
            .await
            .context("Failed to query navigation nodes")?;
        Self::collect_rows(rows).await
    }

    async fn get_node(&self, id: i64) -> Result<Option<NavigationNode>> {
        let conn = self.connection().await?;
        let mut rows = conn
            .query(&format!("{} WHERE id = ?1", SELECT_COLUMNS), params![id])
            .await
            .with_context(|| format!("Failed to query navigation node {}", id))?;

        match rows.next().await.context("Failed to read row")? {
            Some(row) => Ok(Some(Self::row_to_node(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_children(&self, parent_id: Option<i64>) -> Result<Vec<NavigationNode>> {
        let conn = self.connection().await?;
        let rows = match parent_id {
            Some(parent_id) => conn
                .query(
                    &format!("{} WHERE parent_id = ?1 ORDER BY id ASC", SELECT_COLUMNS),
                    params![parent_id],
                )
                .await,
            None => conn
                .query(
                    &format!("{} WHERE parent_id IS NULL ORDER BY id ASC", SELECT_COLUMNS),
                    (),
                )
                .await,
        }
        .with_context(|| format!("Failed to query children of {:?}", parent_id))?;

        Self::collect_rows(rows).await
    }

    async fn create_node(&self, node: NewNavigationNode) -> Result<NavigationNode> {
        let conn = self.connection().await?;
        conn.execute(
            "INSERT INTO navigation_nodes (label, icon, link, description, node_type, parent_id,
                tool_id, requires_role, position, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                node.label.clone(),
                node.icon.as_str(),
                node.link.clone(),
                node.description.clone(),
                node.node_type.as_str(),
                node.parent_id,
                node.tool_id.clone(),
                node.requires_role.clone(),
                node.position,
                i64::from(node.is_active),
                node.created_at.to_rfc3339(),
            ],
        )
        .await
        .context("Failed to insert navigation node")?;

        let id = conn.last_insert_rowid();

        self.get_node(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Navigation node {} not found after creation", id))
    }

    async fn update_node(&self, id: i64, changes: NodeChanges) -> Result<Option<NavigationNode>> {
        let conn = self.connection().await?;
        let affected = conn
            .execute(
                "UPDATE navigation_nodes SET label = ?1, icon = ?2, link = ?3, description = ?4,
                    node_type = ?5, parent_id = ?6, tool_id = ?7, requires_role = ?8,
                    position = ?9, is_active = ?10
                 WHERE id = ?11",
                params![
                    changes.label,
                    changes.icon.as_str(),
                    changes.link,
                    changes.description,
                    changes.node_type.as_str(),
                    changes.parent_id,
                    changes.tool_id,
                    changes.requires_role,
                    changes.position,
                    i64::from(changes.is_active),
                    id,
                ],
            )
            .await
            .with_context(|| format!("Failed to update navigation node {}", id))?;

        if affected == 0 {
            return Ok(None);
        }
        self.get_node(id).await
    }

    async fn set_position(&self, id: i64, position: i64) -> Result<Option<NavigationNode>> {
        let conn = self.connection().await?;
        let affected = conn
            .execute(
                "UPDATE navigation_nodes SET position = ?1 WHERE id = ?2",
                params![position, id],
            )
            .await
            .with_context(|| format!("Failed to update position of navigation node {}", id))?;

        if affected == 0 {
            return Ok(None);
        }
        self.get_node(id).await
    }

    async fn delete_nodes(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let conn = self.connection().await?;
        conn.execute("BEGIN TRANSACTION", ())
            .await
            .context("Failed to begin delete transaction")?;

        let mut deleted = 0;
        for &id in ids {
            match conn
                .execute("DELETE FROM navigation_nodes WHERE id = ?1", params![id])
                .await
            {
                Ok(count) => deleted += count,
                Err(e) => {
                    let _ = conn.execute("ROLLBACK", ()).await;
                    return Err(anyhow::Error::new(e)
                        .context(format!("Failed to delete navigation node {}", id)));
                }
            }
        }

        conn.execute("COMMIT", ())
            .await
            .context("Failed to commit delete transaction")?;

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_accepts_both_formats() {
        let rfc = TursoStore::parse_timestamp("2025-03-01T10:15:00+00:00").unwrap();
        let sqlite = TursoStore::parse_timestamp("2025-03-01 10:15:00").unwrap();
        assert_eq!(rfc, sqlite);
        assert!(TursoStore::parse_timestamp("yesterday").is_err());
    }
}
