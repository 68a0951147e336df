//! End-user navigation loading with cancel-on-drop
//!
//! The fetch runs on a spawned task wrapped in [`Abortable`]. Dropping the
//! [`NavigationFeed`] (the view unmounting) aborts it, so a late response is
//! never applied.

use futures::future::{AbortHandle, Abortable};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::models::NavigationNode;
use crate::reorder::NavigationApi;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum FeedState {
    #[default]
    Loading,
    Ready(Vec<NavigationNode>),
    Failed(String),
}

pub struct NavigationFeed {
    state: Arc<RwLock<FeedState>>,
    abort: AbortHandle,
    task: Option<JoinHandle<()>>,
}

impl NavigationFeed {
    /// Start fetching the caller's visible nodes
    ///
    /// Must be called from within a Tokio runtime.
    pub fn load<A>(api: Arc<A>) -> Self
    where
        A: NavigationApi + 'static,
    {
        let state = Arc::new(RwLock::new(FeedState::Loading));
        let (abort, registration) = AbortHandle::new_pair();

        let sink = state.clone();
        let fetch = Abortable::new(
            async move {
                let loaded = match api.visible_nodes().await {
                    Ok(nodes) => FeedState::Ready(nodes),
                    Err(e) => {
                        tracing::warn!("Failed to load navigation: {:#}", e);
                        FeedState::Failed(format!("{:#}", e))
                    }
                };
                *sink.write().await = loaded;
            },
            registration,
        );

        let task = tokio::spawn(async move {
            if fetch.await.is_err() {
                tracing::debug!("Navigation load aborted");
            }
        });

        Self {
            state,
            abort,
            task: Some(task),
        }
    }

    /// Current state without waiting
    pub async fn snapshot(&self) -> FeedState {
        self.state.read().await.clone()
    }

    /// Wait for the fetch to finish (or be aborted) and return the state
    pub async fn ready(&mut self) -> FeedState {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Navigation load task failed: {}", e);
            }
        }
        self.snapshot().await
    }

    pub fn abort(&self) {
        self.abort.abort();
    }
}

impl Drop for NavigationFeed {
    fn drop(&mut self) {
        self.abort.abort();
    }
}
