//! Error types for the waypoint-engine crate.

use thiserror::Error;

use waypoint_core::ActionId;
use waypoint_store::StoreError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid edge: {0}")]
    InvalidEdge(String),

    #[error("Dependency cycle: {dst} already leads to {src}")]
    CycleDetected { src: ActionId, dst: ActionId },

    #[error("Action {0} cannot depend on itself")]
    SelfDependency(ActionId),

    #[error("Dependency {src} -> {dst} already exists")]
    DuplicateEdge { src: ActionId, dst: ActionId },

    #[error("Dependency {src} -> {dst} is managed by a family edge; detach or move the child instead")]
    ProtectedEdge { src: ActionId, dst: ActionId },

    /// `id` is `None` when the graph changed shape underneath the operation.
    #[error("Version conflict{}: expected {expected}, found {actual}", .id.map(|id| format!(" on {id}")).unwrap_or_default())]
    VersionConflict {
        id: Option<ActionId>,
        expected: u64,
        actual: u64,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl EngineError {
    pub fn action_not_found(id: ActionId) -> Self {
        EngineError::NotFound {
            kind: "Action",
            id: id.to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::VersionConflict { .. })
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ActionNotFound(id) => EngineError::action_not_found(id),
            StoreError::EdgeNotFound(id) => EngineError::NotFound {
                kind: "Edge",
                id: id.to_string(),
            },
            StoreError::VersionConflict {
                id,
                expected,
                actual,
            } => EngineError::VersionConflict {
                id: Some(id),
                expected,
                actual,
            },
            StoreError::RevisionConflict { expected, actual } => EngineError::VersionConflict {
                id: None,
                expected,
                actual,
            },
            other => EngineError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_conflicts_map_to_version_conflict() {
        let id = ActionId::new();
        let err: EngineError = StoreError::VersionConflict {
            id,
            expected: 2,
            actual: 3,
        }
        .into();
        assert!(matches!(err, EngineError::VersionConflict { id: Some(got), expected: 2, actual: 3 } if got == id));

        let err: EngineError = StoreError::RevisionConflict {
            expected: 4,
            actual: 5,
        }
        .into();
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "Version conflict: expected 4, found 5");
    }

    #[test]
    fn store_not_found_maps_to_not_found() {
        let id = ActionId::new();
        let err: EngineError = StoreError::ActionNotFound(id).into();
        assert_eq!(err.to_string(), format!("Action not found: {id}"));

        let err: EngineError = StoreError::Connection("refused".to_string()).into();
        assert!(matches!(err, EngineError::Store(_)));
    }
}
