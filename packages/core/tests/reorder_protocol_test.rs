//! Integration tests for the drag-and-drop reorder protocol
//!
//! Tests cover:
//! - Same-group move renumbers every sibling in steps of 10
//! - Cross-group drop sends zero patches
//! - Failed patches revert to the server state fetched after the batch
//! - Pre-drag fallback when the re-fetch fails too
//! - Navigation feed abort on drop

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use navtree_core::access::AccessContext;
use navtree_core::db::{MemoryStore, NavigationStore};
use navtree_core::models::{NavIcon, NavigationNode, NodeType};
use navtree_core::reorder::{
    FeedState, NavigationApi, NavigationFeed, ReconcilePhase, ReorderController, ReorderError,
    ReorderOutcome, ReorderState, ServiceApi,
};
use navtree_core::services::NavigationService;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn node(id: i64, label: &str, parent_id: Option<i64>, position: i64) -> NavigationNode {
    NavigationNode {
        id,
        label: label.to_string(),
        icon: NavIcon::Link,
        link: Some(format!("/{}", label.to_lowercase())),
        description: None,
        node_type: if parent_id.is_none() {
            NodeType::Section
        } else {
            NodeType::Link
        },
        parent_id,
        tool_id: None,
        requires_role: None,
        position,
        is_active: true,
        created_at: Utc::now(),
    }
}

/// Section 1 with A, B, C; section 5 with D
fn fixture() -> Vec<NavigationNode> {
    vec![
        node(1, "Tools", None, 0),
        node(2, "A", Some(1), 0),
        node(3, "B", Some(1), 10),
        node(4, "C", Some(1), 20),
        node(5, "Other", None, 10),
        node(6, "D", Some(5), 0),
    ]
}

/// NavigationApi over a MemoryStore that records patches and can be told to
/// fail specific patches or the next list fetches
struct RecordingApi {
    store: MemoryStore,
    patches: Mutex<Vec<(i64, i64)>>,
    failing_ids: HashSet<i64>,
    fail_lists: AtomicBool,
}

impl RecordingApi {
    fn new(nodes: Vec<NavigationNode>) -> Self {
        Self {
            store: MemoryStore::with_nodes(nodes),
            patches: Mutex::new(Vec::new()),
            failing_ids: HashSet::new(),
            fail_lists: AtomicBool::new(false),
        }
    }

    fn failing_on(mut self, ids: &[i64]) -> Self {
        self.failing_ids = ids.iter().copied().collect();
        self
    }

    fn patches(&self) -> Vec<(i64, i64)> {
        let mut patches = self.patches.lock().unwrap().clone();
        patches.sort();
        patches
    }
}

#[async_trait]
impl NavigationApi for RecordingApi {
    async fn list_all(&self) -> Result<Vec<NavigationNode>> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(anyhow!("list unavailable"));
        }
        self.store.list_nodes().await
    }

    async fn patch_position(&self, id: i64, position: i64) -> Result<NavigationNode> {
        self.patches.lock().unwrap().push((id, position));
        if self.failing_ids.contains(&id) {
            return Err(anyhow!("patch rejected for {}", id));
        }
        self.store
            .set_position(id, position)
            .await?
            .ok_or_else(|| anyhow!("node {} not found", id))
    }

    async fn visible_nodes(&self) -> Result<Vec<NavigationNode>> {
        self.list_all().await
    }
}

fn labels_in_group(nodes: &[NavigationNode], parent_id: Option<i64>) -> Vec<(String, i64)> {
    let mut group: Vec<&NavigationNode> =
        nodes.iter().filter(|n| n.parent_id == parent_id).collect();
    group.sort_by_key(|n| n.position);
    group.iter().map(|n| (n.label.clone(), n.position)).collect()
}

// =========================================================================
// Reorder
// =========================================================================

#[tokio::test]
async fn test_same_group_move_renumbers_siblings() -> Result<()> {
    let api = Arc::new(RecordingApi::new(fixture()));
    let mut reorder = ReorderController::load(api.clone()).await?;

    // Drag C onto A
    reorder.drag_start(4)?;
    let outcome = reorder.drop_and_persist(2).await?;

    assert_eq!(outcome, ReorderOutcome::Saved { patched: 3 });
    assert_eq!(api.patches(), vec![(2, 10), (3, 20), (4, 0)]);
    assert_eq!(
        labels_in_group(reorder.nodes(), Some(1)),
        vec![
            ("C".to_string(), 0),
            ("A".to_string(), 10),
            ("B".to_string(), 20)
        ]
    );
    assert_eq!(
        reorder.state(),
        ReorderState::Reconciling(ReconcilePhase::Success)
    );

    Ok(())
}

#[tokio::test]
async fn test_cross_group_drop_is_noop() -> Result<()> {
    let api = Arc::new(RecordingApi::new(fixture()));
    let mut reorder = ReorderController::load(api.clone()).await?;
    let before = reorder.nodes().to_vec();

    // Drag D (under Other) onto A (under Tools)
    reorder.drag_start(6)?;
    let outcome = reorder.drop_and_persist(2).await?;

    assert_eq!(outcome, ReorderOutcome::NoOp);
    assert!(api.patches().is_empty());
    assert_eq!(reorder.nodes(), before.as_slice());
    assert_eq!(reorder.state(), ReorderState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_failed_patch_reverts_to_fresh_server_state() -> Result<()> {
    // The patch for B fails; A and C commit
    let api = Arc::new(RecordingApi::new(fixture()).failing_on(&[3]));
    let mut reorder = ReorderController::load(api.clone()).await?;

    reorder.drag_start(4)?;
    let err = reorder.drop_and_persist(2).await.unwrap_err();

    assert!(matches!(
        err,
        ReorderError::PositionsNotSaved {
            failed: 1,
            total: 3
        }
    ));
    assert_eq!(err.to_string(), "Failed to update positions");
    assert_eq!(
        reorder.state(),
        ReorderState::Reconciling(ReconcilePhase::Failed)
    );

    // Local list equals what the server holds after the partial commit
    let server = api.store.list_nodes().await?;
    assert_eq!(reorder.nodes(), server.as_slice());
    assert_eq!(
        labels_in_group(reorder.nodes(), Some(1)),
        vec![
            ("C".to_string(), 0),
            ("A".to_string(), 10),
            ("B".to_string(), 10)
        ]
    );

    reorder.acknowledge();
    assert_eq!(reorder.state(), ReorderState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_failed_refetch_restores_pre_drag_list() -> Result<()> {
    let api = Arc::new(RecordingApi::new(fixture()).failing_on(&[2, 3, 4]));
    let mut reorder = ReorderController::load(api.clone()).await?;
    let before = reorder.nodes().to_vec();

    reorder.drag_start(2)?;
    reorder.drop_on(4)?;
    assert_eq!(
        labels_in_group(reorder.nodes(), Some(1))[0].0,
        "B".to_string()
    );

    api.fail_lists.store(true, Ordering::SeqCst);
    let err = reorder.persist().await.unwrap_err();

    assert!(matches!(err, ReorderError::PositionsNotSaved { failed: 3, .. }));
    assert_eq!(reorder.nodes(), before.as_slice());

    Ok(())
}

#[tokio::test]
async fn test_reorder_through_service_api() -> Result<()> {
    let store = Arc::new(MemoryStore::with_nodes(fixture()));
    let api = Arc::new(ServiceApi::new(NavigationService::new(store.clone())));
    let mut reorder = ReorderController::load(api).await?;

    // Move A to the end
    reorder.drag_start(2)?;
    reorder.drop_and_persist(4).await?;

    let order: Vec<String> = reorder
        .flattened()
        .iter()
        .filter(|f| f.level == 1 && f.node.parent_id == Some(1))
        .map(|f| f.node.label.clone())
        .collect();
    assert_eq!(order, vec!["B", "C", "A"]);
    assert_eq!(store.get_node(2).await?.map(|n| n.position), Some(20));

    Ok(())
}

// =========================================================================
// Navigation Feed
// =========================================================================

/// Visible-nodes fetch that takes a while and records completion
struct SlowApi {
    completed: AtomicBool,
    delay: Duration,
}

#[async_trait]
impl NavigationApi for SlowApi {
    async fn list_all(&self) -> Result<Vec<NavigationNode>> {
        Ok(fixture())
    }

    async fn patch_position(&self, _id: i64, _position: i64) -> Result<NavigationNode> {
        Err(anyhow!("read-only"))
    }

    async fn visible_nodes(&self) -> Result<Vec<NavigationNode>> {
        tokio::time::sleep(self.delay).await;
        self.completed.store(true, Ordering::SeqCst);
        Ok(fixture())
    }
}

#[tokio::test]
async fn test_feed_loads_visible_nodes() {
    let store = Arc::new(MemoryStore::with_nodes(fixture()));
    let api = ServiceApi::new(NavigationService::new(store))
        .with_access(AccessContext::new("u-1", ["staff"], Vec::<String>::new()));

    let mut feed = NavigationFeed::load(Arc::new(api));
    match feed.ready().await {
        FeedState::Ready(nodes) => assert_eq!(nodes.len(), 6),
        other => panic!("unexpected feed state: {:?}", other),
    }
}

#[tokio::test]
async fn test_feed_dropped_before_response_never_applies() {
    let api = Arc::new(SlowApi {
        completed: AtomicBool::new(false),
        delay: Duration::from_millis(100),
    });

    let feed = NavigationFeed::load(api.clone());
    assert_eq!(feed.snapshot().await, FeedState::Loading);
    drop(feed);

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(!api.completed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_feed_abort_keeps_loading_state() {
    let api = Arc::new(SlowApi {
        completed: AtomicBool::new(false),
        delay: Duration::from_millis(100),
    });

    let mut feed = NavigationFeed::load(api.clone());
    feed.abort();

    assert_eq!(feed.ready().await, FeedState::Loading);
    assert!(!api.completed.load(Ordering::SeqCst));
}
