//! Errors from Graph Store operations.

use waypoint_core::{ActionId, EdgeId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Action not found: {0}")]
    ActionNotFound(ActionId),

    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    #[error("Version conflict on action {id}: expected {expected}, found {actual}")]
    VersionConflict {
        id: ActionId,
        expected: u64,
        actual: u64,
    },

    #[error("Revision conflict: expected graph revision {expected}, found {actual}")]
    RevisionConflict { expected: u64, actual: u64 },

    #[error("Edge {edge_id} references missing action {action_id}")]
    DanglingEdge { edge_id: EdgeId, action_id: ActionId },

    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
