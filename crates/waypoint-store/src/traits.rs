//! GraphStore trait definition.
//!
//! The abstract interface every backend implements. The engine holds a
//! `dyn GraphStore` so tests can run against [`crate::MemoryStore`] and
//! deployments against [`crate::Neo4jStore`] without code changes.

use async_trait::async_trait;

use waypoint_core::{Action, ActionId, Edge, EdgeId};

use crate::error::StoreError;
use crate::types::{ChangeSet, EdgeFilter, GraphSnapshot, Prerequisites};

/// Abstract interface for action and edge persistence.
///
/// Reads return point-in-time data. Writes go through [`GraphStore::commit`],
/// which applies a [`ChangeSet`] atomically; the single-row helpers are
/// one-element change sets.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Get an action by id.
    async fn get_action(&self, id: &ActionId) -> Result<Action, StoreError>;

    /// Get several actions by id. Ids that do not exist are skipped.
    async fn get_actions(&self, ids: &[ActionId]) -> Result<Vec<Action>, StoreError>;

    /// Direct family children of an action.
    async fn get_children(&self, id: &ActionId) -> Result<Vec<Action>, StoreError>;

    /// Family parent of an action, if it has one.
    async fn get_parent(&self, id: &ActionId) -> Result<Option<Action>, StoreError>;

    /// Edges matching a filter.
    async fn get_edges(&self, filter: &EdgeFilter) -> Result<Vec<Edge>, StoreError>;

    /// An action, its incoming `depends_on` edges and their sources, all
    /// from the same committed state.
    async fn get_prerequisites(&self, id: &ActionId) -> Result<Prerequisites, StoreError>;

    /// The whole graph at one revision.
    async fn snapshot(&self) -> Result<GraphSnapshot, StoreError>;

    /// Apply a change set atomically.
    async fn commit(&self, changes: ChangeSet) -> Result<(), StoreError>;

    async fn put_action(&self, action: Action) -> Result<(), StoreError> {
        self.commit(ChangeSet::new().put_action(action)).await
    }

    async fn put_edge(&self, edge: Edge) -> Result<(), StoreError> {
        self.commit(ChangeSet::new().put_edge(edge)).await
    }

    async fn delete_edge(&self, id: EdgeId) -> Result<(), StoreError> {
        self.commit(ChangeSet::new().delete_edge(id)).await
    }

    async fn delete_action(&self, id: ActionId) -> Result<(), StoreError> {
        self.commit(ChangeSet::new().delete_action(id)).await
    }
}
