//! Integration tests for waypoint-store against a live Neo4j instance.
//!
//! These tests require a reachable Neo4j server (see `WaypointConfig` defaults).
//! Run with: cargo test --package waypoint-store --test neo4j_integration -- --ignored
//!
//! Skipped automatically if Neo4j is not available.

use waypoint_core::config::Neo4jConfig;
use waypoint_core::{Action, ActionData, ActionId, Edge, EdgeKind};
use waypoint_store::{ChangeSet, EdgeFilter, GraphStore, Neo4jStore, StoreError};

async fn connect_or_skip() -> Option<Neo4jStore> {
    match Neo4jStore::connect(&Neo4jConfig::default()).await {
        Ok(store) => Some(store),
        Err(e) => {
            eprintln!("Skipping integration test (Neo4j not available): {e}");
            None
        }
    }
}

async fn cleanup(store: &Neo4jStore, ids: &[ActionId]) {
    let q = neo4rs::query("MATCH (a:Action) WHERE a.id IN $ids DETACH DELETE a")
        .param("ids", ids.iter().map(|id| id.to_string()).collect::<Vec<_>>());
    let _ = store.run(q).await;
}

fn action(title: &str) -> Action {
    let mut action = Action::new(ActionData::titled(title));
    action.data.description = Some(format!("{title} description"));
    action.data.summaries = Some(serde_json::json!({"short": title}));
    action
}

#[tokio::test]
#[ignore = "requires live Neo4j: cargo test --package waypoint-store --test neo4j_integration -- --ignored"]
async fn put_and_get_action_roundtrip() {
    let Some(store) = connect_or_skip().await else {
        return;
    };
    let a = action("roundtrip");

    store.put_action(a.clone()).await.unwrap();
    let back = store.get_action(&a.id).await.unwrap();

    assert_eq!(back.id, a.id);
    assert_eq!(back.data, a.data);
    assert_eq!(back.version, 1);
    assert_eq!(back.created_at, a.created_at);
    assert!(back.data.vision.is_none());

    cleanup(&store, &[a.id]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j: cargo test --package waypoint-store --test neo4j_integration -- --ignored"]
async fn empty_and_unset_fields_stay_distinct() {
    let Some(store) = connect_or_skip().await else {
        return;
    };
    let mut a = Action::new(ActionData::titled("blank"));
    a.data.description = Some(String::new());
    a.data.vision = None;

    store.put_action(a.clone()).await.unwrap();
    let back = store.get_action(&a.id).await.unwrap();

    assert_eq!(back.data.description.as_deref(), Some(""));
    assert_eq!(back.data.vision, None);
    assert_eq!(back.data.summaries, None);

    cleanup(&store, &[a.id]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j: cargo test --package waypoint-store --test neo4j_integration -- --ignored"]
async fn adopted_flag_persists() {
    let Some(store) = connect_or_skip().await else {
        return;
    };
    let parent = action("adopting parent");
    let child = action("adopted child");
    let family = Edge::family(parent.id, child.id);
    let mut adopted = Edge::depends_on(child.id, parent.id);
    adopted.adopt(&family);

    store
        .commit(
            ChangeSet::new()
                .put_action(parent.clone())
                .put_action(child.clone())
                .put_edge(family.clone())
                .put_edge(adopted.clone()),
        )
        .await
        .unwrap();

    let deps = store
        .get_edges(&EdgeFilter::dependencies_of(parent.id))
        .await
        .unwrap();
    assert_eq!(deps, vec![adopted.clone()]);

    let family_edges = store
        .get_edges(&EdgeFilter {
            src: Some(parent.id),
            kind: Some(EdgeKind::Family),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!family_edges[0].adopted);

    cleanup(&store, &[parent.id, child.id]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j: cargo test --package waypoint-store --test neo4j_integration -- --ignored"]
async fn family_edges_answer_children_and_parent() {
    let Some(store) = connect_or_skip().await else {
        return;
    };
    let parent = action("parent");
    let child = action("child");
    let family = Edge::family(parent.id, child.id);
    let derived = Edge::derived_from_family(&family);

    store
        .commit(
            ChangeSet::new()
                .put_action(parent.clone())
                .put_action(child.clone())
                .put_edge(family.clone())
                .put_edge(derived.clone()),
        )
        .await
        .unwrap();

    let children = store.get_children(&parent.id).await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, child.id);
    assert_eq!(
        store.get_parent(&child.id).await.unwrap().map(|p| p.id),
        Some(parent.id)
    );

    let deps = store
        .get_edges(&EdgeFilter::dependencies_of(parent.id))
        .await
        .unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].id, derived.id);
    assert_eq!(deps[0].derived_from, Some(family.id));

    cleanup(&store, &[parent.id, child.id]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j: cargo test --package waypoint-store --test neo4j_integration -- --ignored"]
async fn stale_version_rolls_back() {
    let Some(store) = connect_or_skip().await else {
        return;
    };
    let a = action("guarded");
    let b = action("never written");
    store.put_action(a.clone()).await.unwrap();

    let result = store
        .commit(ChangeSet::new().expect_version(a.id, 42).put_action(b.clone()))
        .await;

    assert!(matches!(result, Err(StoreError::VersionConflict { .. })));
    assert!(matches!(
        store.get_action(&b.id).await,
        Err(StoreError::ActionNotFound(_))
    ));

    cleanup(&store, &[a.id, b.id]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j: cargo test --package waypoint-store --test neo4j_integration -- --ignored"]
async fn dangling_edge_rolls_back() {
    let Some(store) = connect_or_skip().await else {
        return;
    };
    let a = action("lonely");

    let result = store
        .commit(
            ChangeSet::new()
                .put_action(a.clone())
                .put_edge(Edge::depends_on(a.id, ActionId::new())),
        )
        .await;

    assert!(matches!(result, Err(StoreError::DanglingEdge { .. })));
    assert!(store.get_action(&a.id).await.is_err());
}

#[tokio::test]
#[ignore = "requires live Neo4j: cargo test --package waypoint-store --test neo4j_integration -- --ignored"]
async fn structural_commit_advances_revision() {
    let Some(store) = connect_or_skip().await else {
        return;
    };
    let a = action("a");
    let b = action("b");
    store.put_action(a.clone()).await.unwrap();
    store.put_action(b.clone()).await.unwrap();

    let before = store.snapshot().await.unwrap().revision;
    store.put_edge(Edge::depends_on(a.id, b.id)).await.unwrap();
    let after = store.snapshot().await.unwrap().revision;
    assert!(after > before);

    let stale = store
        .commit(ChangeSet::new().expect_revision(before).put_edge(Edge::depends_on(b.id, a.id)))
        .await;
    assert!(matches!(stale, Err(StoreError::RevisionConflict { .. })));

    cleanup(&store, &[a.id, b.id]).await;
}
