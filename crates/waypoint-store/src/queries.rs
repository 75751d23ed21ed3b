//! Read operations against Neo4j and row conversion helpers.

use chrono::{DateTime, Utc};
use neo4rs::{query, Row};
use uuid::Uuid;

use waypoint_core::{Action, ActionData, ActionId, Edge, EdgeId, EdgeKind};

use crate::client::{txn_rows, Neo4jStore};
use crate::error::StoreError;
use crate::types::{EdgeFilter, GraphSnapshot, Prerequisites};

/// Projection shared by every edge query.
const EDGE_RETURN: &str = "RETURN r.id AS id, a.id AS src, b.id AS dst, type(r) AS rel_type,
        coalesce(r.derived_from, '') AS derived_from, coalesce(r.adopted, false) AS adopted,
        r.created_at AS created_at";

impl Neo4jStore {
    pub(crate) async fn fetch_action(&self, id: &ActionId) -> Result<Action, StoreError> {
        let q = query("MATCH (a:Action {id: $id}) RETURN a").param("id", id.to_string());

        match self.query_one(q).await? {
            Some(row) => action_from_row(&row, "a"),
            None => Err(StoreError::ActionNotFound(*id)),
        }
    }

    pub(crate) async fn fetch_actions(&self, ids: &[ActionId]) -> Result<Vec<Action>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let q = query("MATCH (a:Action) WHERE a.id IN $ids RETURN a")
            .param("ids", ids.iter().map(|id| id.to_string()).collect::<Vec<_>>());

        let rows = self.query_rows(q).await?;
        rows.iter().map(|row| action_from_row(row, "a")).collect()
    }

    pub(crate) async fn fetch_children(&self, id: &ActionId) -> Result<Vec<Action>, StoreError> {
        self.fetch_action(id).await?;

        let q = query(
            "MATCH (:Action {id: $id})-[:FAMILY]->(c:Action)
             RETURN c
             ORDER BY c.created_at, c.id",
        )
        .param("id", id.to_string());

        let rows = self.query_rows(q).await?;
        rows.iter().map(|row| action_from_row(row, "c")).collect()
    }

    pub(crate) async fn fetch_parent(&self, id: &ActionId) -> Result<Option<Action>, StoreError> {
        self.fetch_action(id).await?;

        let q = query("MATCH (p:Action)-[:FAMILY]->(:Action {id: $id}) RETURN p LIMIT 1")
            .param("id", id.to_string());

        match self.query_one(q).await? {
            Some(row) => Ok(Some(action_from_row(&row, "p")?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn fetch_edges(&self, filter: &EdgeFilter) -> Result<Vec<Edge>, StoreError> {
        let rel = match filter.kind {
            Some(kind) => rel_type(kind).to_string(),
            None => format!("{}|{}", rel_type(EdgeKind::Family), rel_type(EdgeKind::DependsOn)),
        };

        let mut conditions = Vec::new();
        if filter.src.is_some() {
            conditions.push("a.id = $src");
        }
        if filter.dst.is_some() {
            conditions.push("b.id = $dst");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let cypher = format!("MATCH (a:Action)-[r:{rel}]->(b:Action) {where_clause} {EDGE_RETURN}");
        let mut q = query(&cypher);
        if let Some(src) = filter.src {
            q = q.param("src", src.to_string());
        }
        if let Some(dst) = filter.dst {
            q = q.param("dst", dst.to_string());
        }

        let rows = self.query_rows(q).await?;
        rows.iter().map(edge_from_row).collect()
    }

    /// Read an action, its incoming dependencies and their sources inside
    /// one transaction.
    pub(crate) async fn fetch_prerequisites(&self, id: &ActionId) -> Result<Prerequisites, StoreError> {
        let mut txn = self.start_txn().await?;

        let action_rows = txn_rows(
            &mut txn,
            query("MATCH (a:Action {id: $id}) RETURN a").param("id", id.to_string()),
        )
        .await?;
        let edge_rows = txn_rows(
            &mut txn,
            query(&format!(
                "MATCH (a:Action)-[r:DEPENDS_ON]->(b:Action {{id: $id}}) {EDGE_RETURN}
                 ORDER BY created_at, id"
            ))
            .param("id", id.to_string()),
        )
        .await?;
        let source_rows = txn_rows(
            &mut txn,
            query("MATCH (a:Action)-[:DEPENDS_ON]->(:Action {id: $id}) RETURN DISTINCT a")
                .param("id", id.to_string()),
        )
        .await?;

        txn.commit().await?;

        let action = match action_rows.first() {
            Some(row) => action_from_row(row, "a")?,
            None => return Err(StoreError::ActionNotFound(*id)),
        };
        let edges = edge_rows
            .iter()
            .map(edge_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let sources = source_rows
            .iter()
            .map(|row| action_from_row(row, "a"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Prerequisites {
            action,
            edges,
            sources,
        })
    }

    /// Read revision, actions, and edges inside one transaction.
    pub(crate) async fn fetch_snapshot(&self) -> Result<GraphSnapshot, StoreError> {
        let mut txn = self.start_txn().await?;

        let meta = txn_rows(
            &mut txn,
            query("OPTIONAL MATCH (m:GraphMeta {key: 'graph'}) RETURN coalesce(m.revision, 0) AS revision"),
        )
        .await?;
        let revision = meta
            .first()
            .and_then(|row| row.get::<i64>("revision").ok())
            .unwrap_or(0)
            .max(0) as u64;

        let action_rows = txn_rows(
            &mut txn,
            query("MATCH (a:Action) RETURN a ORDER BY a.created_at, a.id"),
        )
        .await?;
        let edge_rows = txn_rows(
            &mut txn,
            query(&format!(
                "MATCH (a:Action)-[r:FAMILY|DEPENDS_ON]->(b:Action) {EDGE_RETURN}"
            )),
        )
        .await?;

        txn.commit().await?;

        let actions = action_rows
            .iter()
            .map(|row| action_from_row(row, "a"))
            .collect::<Result<Vec<_>, _>>()?;
        let edges = edge_rows
            .iter()
            .map(edge_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GraphSnapshot {
            revision,
            actions,
            edges,
        })
    }
}

/// Cypher relationship type for an edge kind.
pub(crate) fn rel_type(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Family => "FAMILY",
        EdgeKind::DependsOn => "DEPENDS_ON",
    }
}

fn kind_from_rel_type(rel: &str) -> Result<EdgeKind, StoreError> {
    match rel {
        "FAMILY" => Ok(EdgeKind::Family),
        "DEPENDS_ON" => Ok(EdgeKind::DependsOn),
        other => Err(StoreError::Serialization(format!(
            "Unknown relationship type: {other}"
        ))),
    }
}

fn action_from_row(row: &Row, column: &str) -> Result<Action, StoreError> {
    let node: neo4rs::Node = row
        .get(column)
        .map_err(|e| StoreError::Serialization(format!("Failed to deserialize action: {e}")))?;
    action_from_node(&node)
}

/// Convert an `(:Action)` node into an [`Action`]. Unset optional fields
/// are stored as null, which Neo4j drops from the node.
fn action_from_node(node: &neo4rs::Node) -> Result<Action, StoreError> {
    let id: String = node
        .get("id")
        .map_err(|e| StoreError::Serialization(format!("Action node without id: {e}")))?;
    let summaries = match optional(node, "summaries_json") {
        Some(json) => Some(serde_json::from_str(&json)?),
        None => None,
    };
    let version: i64 = node.get("version").unwrap_or(1);

    Ok(Action {
        id: ActionId(parse_uuid(&id)?),
        data: ActionData {
            title: node.get("title").unwrap_or_default(),
            description: optional(node, "description"),
            vision: optional(node, "vision"),
            summaries,
        },
        done: node.get("done").unwrap_or(false),
        version: version.max(0) as u64,
        created_at: parse_time(&node.get::<String>("created_at").unwrap_or_default())?,
        updated_at: parse_time(&node.get::<String>("updated_at").unwrap_or_default())?,
    })
}

fn edge_from_row(row: &Row) -> Result<Edge, StoreError> {
    let get = |key: &str| -> Result<String, StoreError> {
        row.get::<String>(key)
            .map_err(|e| StoreError::Serialization(format!("Edge row missing {key}: {e}")))
    };

    let derived_from = get("derived_from")?;
    Ok(Edge {
        id: EdgeId(parse_uuid(&get("id")?)?),
        src: ActionId(parse_uuid(&get("src")?)?),
        dst: ActionId(parse_uuid(&get("dst")?)?),
        kind: kind_from_rel_type(&get("rel_type")?)?,
        derived_from: if derived_from.is_empty() {
            None
        } else {
            Some(EdgeId(parse_uuid(&derived_from)?))
        },
        adopted: row.get::<bool>("adopted").unwrap_or(false),
        created_at: parse_time(&get("created_at")?)?,
    })
}

fn parse_uuid(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|e| StoreError::Serialization(format!("Bad id {raw:?}: {e}")))
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Serialization(format!("Bad timestamp {raw:?}: {e}")))
}

fn optional(node: &neo4rs::Node, key: &str) -> Option<String> {
    node.get::<String>(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rel_type_roundtrip() {
        for kind in [EdgeKind::Family, EdgeKind::DependsOn] {
            assert_eq!(kind_from_rel_type(rel_type(kind)).unwrap(), kind);
        }
        assert!(kind_from_rel_type("CONNECTS_TO").is_err());
    }

    #[test]
    fn parse_time_accepts_rfc3339() {
        let now = Utc::now();
        let parsed = parse_time(&now.to_rfc3339()).unwrap();
        assert_eq!(parsed, now);
        assert!(parse_time("yesterday").is_err());
    }
}
