//! Write operations against Neo4j.
//!
//! A [`ChangeSet`] is applied inside one transaction. The transaction first
//! takes a write lock on the `GraphMeta` node, which serializes concurrent
//! commits, then checks every guard, and only then writes. Any failure
//! rolls the whole transaction back.

use std::collections::HashMap;

use chrono::Utc;
use neo4rs::{query, Txn};

use waypoint_core::{Action, ActionId, Edge, EdgeId};

use crate::client::{txn_rows, Neo4jStore};
use crate::error::StoreError;
use crate::queries::rel_type;
use crate::types::ChangeSet;

impl Neo4jStore {
    pub(crate) async fn commit_changes(&self, changes: &ChangeSet) -> Result<(), StoreError> {
        let mut txn = self.start_txn().await?;

        match apply_in_txn(&mut txn, changes).await {
            Ok(revision) => {
                txn.commit().await?;
                tracing::debug!(
                    revision,
                    put_actions = changes.put_actions.len(),
                    put_edges = changes.put_edges.len(),
                    delete_edges = changes.delete_edges.len(),
                    delete_actions = changes.delete_actions.len(),
                    "Change set committed"
                );
                Ok(())
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    tracing::warn!(error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}

/// Check guards and apply writes. Returns the revision after the commit.
async fn apply_in_txn(txn: &mut Txn, changes: &ChangeSet) -> Result<u64, StoreError> {
    let meta = txn_rows(
        txn,
        query(
            "MERGE (m:GraphMeta {key: 'graph'})
             ON CREATE SET m.revision = 0
             SET m.locked_at = $now
             RETURN m.revision AS revision",
        )
        .param("now", Utc::now().to_rfc3339()),
    )
    .await?;
    let revision = meta
        .first()
        .and_then(|row| row.get::<i64>("revision").ok())
        .unwrap_or(0)
        .max(0) as u64;

    if let Some(expected) = changes.expected_revision {
        if expected != revision {
            return Err(StoreError::RevisionConflict {
                expected,
                actual: revision,
            });
        }
    }

    check_versions(txn, changes).await?;

    if !changes.delete_edges.is_empty() {
        let ids = edge_ids(&changes.delete_edges);
        let found = txn_rows(
            txn,
            query("MATCH (:Action)-[r]->(:Action) WHERE r.id IN $ids RETURN r.id AS id")
                .param("ids", ids.clone()),
        )
        .await?;
        let found: Vec<String> = found
            .iter()
            .filter_map(|row| row.get::<String>("id").ok())
            .collect();
        if let Some(missing) = changes
            .delete_edges
            .iter()
            .find(|id| !found.contains(&id.to_string()))
        {
            return Err(StoreError::EdgeNotFound(*missing));
        }

        txn.run(query("MATCH (:Action)-[r]->(:Action) WHERE r.id IN $ids DELETE r").param("ids", ids))
            .await?;
    }

    if !changes.delete_actions.is_empty() {
        let ids = action_ids(&changes.delete_actions);
        let existing = existing_actions(txn, &ids).await?;
        if let Some(missing) = changes
            .delete_actions
            .iter()
            .find(|id| !existing.contains(&id.to_string()))
        {
            return Err(StoreError::ActionNotFound(*missing));
        }

        txn.run(query("MATCH (a:Action) WHERE a.id IN $ids DETACH DELETE a").param("ids", ids))
            .await?;
    }

    for action in &changes.put_actions {
        put_action(txn, action).await?;
    }

    for edge in &changes.put_edges {
        put_edge(txn, edge).await?;
    }

    if changes.is_structural() {
        txn.run(query(
            "MATCH (m:GraphMeta {key: 'graph'}) SET m.revision = m.revision + 1",
        ))
        .await?;
        return Ok(revision + 1);
    }

    Ok(revision)
}

async fn check_versions(txn: &mut Txn, changes: &ChangeSet) -> Result<(), StoreError> {
    if changes.expected_versions.is_empty() {
        return Ok(());
    }

    let ids: Vec<String> = changes
        .expected_versions
        .iter()
        .map(|(id, _)| id.to_string())
        .collect();
    let rows = txn_rows(
        txn,
        query("MATCH (a:Action) WHERE a.id IN $ids RETURN a.id AS id, a.version AS version")
            .param("ids", ids),
    )
    .await?;

    let current: HashMap<String, u64> = rows
        .iter()
        .filter_map(|row| {
            let id = row.get::<String>("id").ok()?;
            let version = row.get::<i64>("version").ok()?;
            Some((id, version.max(0) as u64))
        })
        .collect();

    for (id, expected) in &changes.expected_versions {
        match current.get(&id.to_string()) {
            None => return Err(StoreError::ActionNotFound(*id)),
            Some(actual) if actual != expected => {
                return Err(StoreError::VersionConflict {
                    id: *id,
                    expected: *expected,
                    actual: *actual,
                })
            }
            Some(_) => {}
        }
    }

    Ok(())
}

async fn existing_actions(txn: &mut Txn, ids: &[String]) -> Result<Vec<String>, StoreError> {
    let rows = txn_rows(
        txn,
        query("MATCH (a:Action) WHERE a.id IN $ids RETURN a.id AS id").param("ids", ids.to_vec()),
    )
    .await?;
    Ok(rows
        .iter()
        .filter_map(|row| row.get::<String>("id").ok())
        .collect())
}

/// Upsert every property of an action.
async fn put_action(txn: &mut Txn, action: &Action) -> Result<(), StoreError> {
    let summaries_json = match &action.data.summaries {
        Some(value) => Some(serde_json::to_string(value)?),
        None => None,
    };

    let q = query(
        "MERGE (a:Action {id: $id})
         SET a.title = $title, a.description = $description, a.vision = $vision,
             a.summaries_json = $summaries_json, a.done = $done, a.version = $version,
             a.created_at = $created_at, a.updated_at = $updated_at",
    )
    .param("id", action.id.to_string())
    .param("title", action.data.title.clone())
    .param("description", action.data.description.clone())
    .param("vision", action.data.vision.clone())
    .param("summaries_json", summaries_json)
    .param("done", action.done)
    .param("version", action.version as i64)
    .param("created_at", action.created_at.to_rfc3339())
    .param("updated_at", action.updated_at.to_rfc3339());

    txn.run(q).await?;
    Ok(())
}

/// Create an edge; fails with `DanglingEdge` when an endpoint is missing.
async fn put_edge(txn: &mut Txn, edge: &Edge) -> Result<(), StoreError> {
    let endpoints = vec![edge.src.to_string(), edge.dst.to_string()];
    let existing = existing_actions(txn, &endpoints).await?;
    for endpoint in [edge.src, edge.dst] {
        if !existing.contains(&endpoint.to_string()) {
            return Err(StoreError::DanglingEdge {
                edge_id: edge.id,
                action_id: endpoint,
            });
        }
    }

    let rel = rel_type(edge.kind);
    let cypher = format!(
        "MATCH (a:Action {{id: $src}})
         MATCH (b:Action {{id: $dst}})
         MERGE (a)-[r:{rel} {{id: $id}}]->(b)
         SET r.derived_from = $derived_from, r.adopted = $adopted, r.created_at = $created_at"
    );

    let q = query(&cypher)
        .param("src", edge.src.to_string())
        .param("dst", edge.dst.to_string())
        .param("id", edge.id.to_string())
        .param(
            "derived_from",
            edge.derived_from.map(|id| id.to_string()),
        )
        .param("adopted", edge.adopted)
        .param("created_at", edge.created_at.to_rfc3339());

    txn.run(q).await?;
    Ok(())
}

fn edge_ids(ids: &[EdgeId]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

fn action_ids(ids: &[ActionId]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
