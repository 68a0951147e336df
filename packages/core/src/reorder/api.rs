//! Remote surface the reorder protocol and navigation feed talk to
//!
//! In production this is the HTTP API (see the `navtree-server` client);
//! [`ServiceApi`] binds the same trait straight to a [`NavigationService`]
//! for embedders and tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::access::AccessContext;
use crate::models::NavigationNode;
use crate::services::NavigationService;

/// Operations the admin and end-user clients need from the server
#[async_trait]
pub trait NavigationApi: Send + Sync {
    /// Every node, flat (admin list)
    async fn list_all(&self) -> Result<Vec<NavigationNode>>;

    /// Position-only patch; returns the updated node
    async fn patch_position(&self, id: i64, position: i64) -> Result<NavigationNode>;

    /// Active nodes visible to the current caller (end-user list)
    async fn visible_nodes(&self) -> Result<Vec<NavigationNode>>;
}

/// In-process [`NavigationApi`] over a [`NavigationService`]
#[derive(Clone)]
pub struct ServiceApi {
    service: NavigationService,
    access: AccessContext,
}

impl ServiceApi {
    pub fn new(service: NavigationService) -> Self {
        Self {
            service,
            access: AccessContext::default(),
        }
    }

    /// Caller identity used by [`NavigationApi::visible_nodes`]
    pub fn with_access(mut self, access: AccessContext) -> Self {
        self.access = access;
        self
    }
}

#[async_trait]
impl NavigationApi for ServiceApi {
    async fn list_all(&self) -> Result<Vec<NavigationNode>> {
        Ok(self.service.list_all().await?)
    }

    async fn patch_position(&self, id: i64, position: i64) -> Result<NavigationNode> {
        Ok(self.service.update_position(id, position).await?)
    }

    async fn visible_nodes(&self) -> Result<Vec<NavigationNode>> {
        Ok(self.service.visible_nodes(&self.access).await?)
    }
}
