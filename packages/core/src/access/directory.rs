//! Session and grant collaborators
//!
//! Authentication and role management live outside this system. The engine
//! only needs two questions answered:
//!
//! - [`SessionVerifier`]: which user (and roles) does a bearer token belong to?
//! - [`AccessDirectory`]: which tools do these roles grant, and are they admin?
//!
//! [`StaticAccessDirectory`] answers both from an [`AccessFile`] (JSON). All
//! fields use `#[serde(default)]` so partial files load without error.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Authenticated session as resolved from a bearer token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub user_id: String,
    #[serde(default)]
    pub roles: HashSet<String>,
}

/// Resolves bearer tokens to sessions
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// `Ok(None)` means the token is unknown or expired
    async fn verify(&self, token: &str) -> Result<Option<SessionRecord>>;
}

/// Role → tool-grant lookup and admin check
#[async_trait]
pub trait AccessDirectory: Send + Sync {
    /// Union of the tools granted by every role in `roles`
    async fn tool_grants(&self, roles: &HashSet<String>) -> Result<HashSet<String>>;

    /// Whether `roles` entitle the caller to the admin API
    fn is_admin(&self, roles: &HashSet<String>) -> bool;
}

fn default_admin_role() -> String {
    "admin".to_string()
}

/// On-disk access configuration
///
/// ```json
/// {
///   "adminRole": "admin",
///   "sessions": { "token-1": { "userId": "u-1", "roles": ["staff"] } },
///   "roleTools": { "staff": ["interventions", "reports"] }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessFile {
    #[serde(default = "default_admin_role")]
    pub admin_role: String,

    #[serde(default)]
    pub sessions: HashMap<String, SessionRecord>,

    #[serde(default)]
    pub role_tools: HashMap<String, HashSet<String>>,
}

impl Default for AccessFile {
    fn default() -> Self {
        Self {
            admin_role: default_admin_role(),
            sessions: HashMap::new(),
            role_tools: HashMap::new(),
        }
    }
}

impl AccessFile {
    /// Load from `path`; a missing file yields the empty default
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Access file {} not found; no sessions will authenticate",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read access file {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse access file {}", path.display()))
    }
}

/// In-memory directory backed by an [`AccessFile`]
#[derive(Debug, Clone, Default)]
pub struct StaticAccessDirectory {
    file: AccessFile,
}

impl StaticAccessDirectory {
    pub fn new(file: AccessFile) -> Self {
        Self { file }
    }

    /// Register a session token (builder style)
    pub fn with_session(
        mut self,
        token: impl Into<String>,
        user_id: impl Into<String>,
        roles: &[&str],
    ) -> Self {
        self.file.sessions.insert(
            token.into(),
            SessionRecord {
                user_id: user_id.into(),
                roles: roles.iter().map(|r| r.to_string()).collect(),
            },
        );
        self
    }

    /// Grant `tools` to `role` (builder style)
    pub fn with_role_tools(mut self, role: impl Into<String>, tools: &[&str]) -> Self {
        self.file
            .role_tools
            .entry(role.into())
            .or_default()
            .extend(tools.iter().map(|t| t.to_string()));
        self
    }

    pub fn admin_role(&self) -> &str {
        &self.file.admin_role
    }
}

#[async_trait]
impl SessionVerifier for StaticAccessDirectory {
    async fn verify(&self, token: &str) -> Result<Option<SessionRecord>> {
        Ok(self.file.sessions.get(token).cloned())
    }
}

#[async_trait]
impl AccessDirectory for StaticAccessDirectory {
    async fn tool_grants(&self, roles: &HashSet<String>) -> Result<HashSet<String>> {
        Ok(roles
            .iter()
            .filter_map(|role| self.file.role_tools.get(role))
            .flatten()
            .cloned()
            .collect())
    }

    fn is_admin(&self, roles: &HashSet<String>) -> bool {
        roles.contains(&self.file.admin_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_grants_are_union_of_roles() {
        let directory = StaticAccessDirectory::default()
            .with_role_tools("staff", &["interventions"])
            .with_role_tools("counselor", &["interventions", "reports"]);

        let roles: HashSet<String> = ["staff", "counselor", "unknown"]
            .iter()
            .map(|r| r.to_string())
            .collect();
        let grants = directory.tool_grants(&roles).await.unwrap();

        assert_eq!(grants.len(), 2);
        assert!(grants.contains("reports"));
    }

    #[tokio::test]
    async fn test_verify_unknown_token_is_none() {
        let directory = StaticAccessDirectory::default().with_session("t-1", "u-1", &["admin"]);
        assert!(directory.verify("nope").await.unwrap().is_none());
        let session = directory.verify("t-1").await.unwrap().unwrap();
        assert!(directory.is_admin(&session.roles));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let file = AccessFile::load(&dir.path().join("access.json")).await.unwrap();
        assert_eq!(file.admin_role, "admin");
        assert!(file.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("access.json");
        let contents = json!({
            "adminRole": "district-admin",
            "sessions": { "tok": { "userId": "u-9" } }
        });
        tokio::fs::write(&path, contents.to_string()).await.unwrap();

        let file = AccessFile::load(&path).await.unwrap();
        assert_eq!(file.admin_role, "district-admin");
        assert!(file.sessions["tok"].roles.is_empty());
        assert!(file.role_tools.is_empty());
    }
}
