//! HTTP client for the navigation API
//!
//! Implements [`NavigationApi`] against a running server so the reorder
//! protocol and the navigation feed can talk to it over the network.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use navtree_core::models::NavigationNode;
use navtree_core::reorder::NavigationApi;

use crate::api::Envelope;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Bearer-authenticated client for one server
pub struct HttpNavigationClient {
    http: Client,
    base_url: String,
    token: String,
}

impl HttpNavigationClient {
    /// Create a client for `base_url` (e.g. `http://localhost:3001`)
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and unwrap the response envelope
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Failed to {}", what))?;

        let status = response.status();
        let envelope: Envelope<T> = response
            .json()
            .await
            .with_context(|| format!("Invalid response to {} (HTTP {})", what, status))?;

        if !status.is_success() || !envelope.is_success {
            return Err(anyhow!(
                "Failed to {} (HTTP {}): {}",
                what,
                status,
                envelope.message.unwrap_or_default()
            ));
        }

        envelope
            .data
            .ok_or_else(|| anyhow!("Response to {} carried no data", what))
    }
}

#[async_trait]
impl NavigationApi for HttpNavigationClient {
    async fn list_all(&self) -> Result<Vec<NavigationNode>> {
        let request = self.http.get(self.url("/api/admin/navigation"));
        self.send(request, "list navigation").await
    }

    async fn patch_position(&self, id: i64, position: i64) -> Result<NavigationNode> {
        let request = self
            .http
            .patch(self.url("/api/admin/navigation/position"))
            .json(&serde_json::json!({ "id": id, "position": position }));
        self.send(request, &format!("update position of {}", id))
            .await
    }

    async fn visible_nodes(&self) -> Result<Vec<NavigationNode>> {
        let request = self.http.get(self.url("/api/navigation"));
        self.send(request, "load navigation").await
    }
}
