//! In-memory Graph Store.
//!
//! Keeps all actions and edges in hash maps behind a `tokio::sync::RwLock`.
//! Commits are applied to a copy of the state and swapped in only when
//! every guard and endpoint check passes, so a failed commit leaves no trace.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use waypoint_core::{Action, ActionId, Edge, EdgeId, EdgeKind};

use crate::error::StoreError;
use crate::traits::GraphStore;
use crate::types::{ChangeSet, EdgeFilter, GraphSnapshot, Prerequisites};

/// Plain graph state shared by the memory and file backends.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryState {
    revision: u64,
    actions: HashMap<ActionId, Action>,
    edges: HashMap<EdgeId, Edge>,
}

impl MemoryState {
    pub(crate) fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        Self {
            revision: snapshot.revision,
            actions: snapshot.actions.into_iter().map(|a| (a.id, a)).collect(),
            edges: snapshot.edges.into_iter().map(|e| (e.id, e)).collect(),
        }
    }

    /// Copy out the state with rows ordered by creation time.
    pub(crate) fn to_snapshot(&self) -> GraphSnapshot {
        let mut actions: Vec<Action> = self.actions.values().cloned().collect();
        actions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        let mut edges: Vec<Edge> = self.edges.values().cloned().collect();
        edges.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        GraphSnapshot {
            revision: self.revision,
            actions,
            edges,
        }
    }

    pub(crate) fn action(&self, id: &ActionId) -> Result<Action, StoreError> {
        self.actions
            .get(id)
            .cloned()
            .ok_or(StoreError::ActionNotFound(*id))
    }

    pub(crate) fn actions(&self, ids: &[ActionId]) -> Vec<Action> {
        ids.iter()
            .filter_map(|id| self.actions.get(id).cloned())
            .collect()
    }

    pub(crate) fn children(&self, id: &ActionId) -> Result<Vec<Action>, StoreError> {
        if !self.actions.contains_key(id) {
            return Err(StoreError::ActionNotFound(*id));
        }
        let mut children: Vec<Action> = self
            .edges
            .values()
            .filter(|e| e.kind == EdgeKind::Family && &e.src == id)
            .filter_map(|e| self.actions.get(&e.dst).cloned())
            .collect();
        children.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(children)
    }

    pub(crate) fn parent(&self, id: &ActionId) -> Result<Option<Action>, StoreError> {
        if !self.actions.contains_key(id) {
            return Err(StoreError::ActionNotFound(*id));
        }
        Ok(self
            .edges
            .values()
            .find(|e| e.kind == EdgeKind::Family && &e.dst == id)
            .and_then(|e| self.actions.get(&e.src).cloned()))
    }

    pub(crate) fn edges(&self, filter: &EdgeFilter) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .edges
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        edges.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        edges
    }

    pub(crate) fn prerequisites(&self, id: &ActionId) -> Result<Prerequisites, StoreError> {
        let action = self.action(id)?;
        let edges = self.edges(&EdgeFilter::dependencies_of(*id));
        let srcs: Vec<ActionId> = edges.iter().map(|e| e.src).collect();
        let sources = self.actions(&srcs);
        Ok(Prerequisites {
            action,
            edges,
            sources,
        })
    }

    /// Check guards, then apply `changes` to a copy and swap it in.
    pub(crate) fn apply(&mut self, changes: &ChangeSet) -> Result<(), StoreError> {
        if let Some(expected) = changes.expected_revision {
            if expected != self.revision {
                return Err(StoreError::RevisionConflict {
                    expected,
                    actual: self.revision,
                });
            }
        }

        for (id, expected) in &changes.expected_versions {
            let current = self.actions.get(id).ok_or(StoreError::ActionNotFound(*id))?;
            if current.version != *expected {
                return Err(StoreError::VersionConflict {
                    id: *id,
                    expected: *expected,
                    actual: current.version,
                });
            }
        }

        let mut next = self.clone();

        for edge_id in &changes.delete_edges {
            if next.edges.remove(edge_id).is_none() {
                return Err(StoreError::EdgeNotFound(*edge_id));
            }
        }

        for action_id in &changes.delete_actions {
            if next.actions.remove(action_id).is_none() {
                return Err(StoreError::ActionNotFound(*action_id));
            }
            next.edges.retain(|_, e| !e.touches(action_id));
        }

        for action in &changes.put_actions {
            next.actions.insert(action.id, action.clone());
        }

        for edge in &changes.put_edges {
            next.edges.insert(edge.id, edge.clone());
        }

        for edge in &changes.put_edges {
            for endpoint in [edge.src, edge.dst] {
                if !next.actions.contains_key(&endpoint) {
                    return Err(StoreError::DanglingEdge {
                        edge_id: edge.id,
                        action_id: endpoint,
                    });
                }
            }
        }

        if changes.is_structural() {
            next.revision += 1;
        }

        *self = next;
        Ok(())
    }
}

/// In-memory implementation of [`GraphStore`].
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot (fixtures, imports).
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        Self {
            state: RwLock::new(MemoryState::from_snapshot(snapshot)),
        }
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn get_action(&self, id: &ActionId) -> Result<Action, StoreError> {
        self.state.read().await.action(id)
    }

    async fn get_actions(&self, ids: &[ActionId]) -> Result<Vec<Action>, StoreError> {
        Ok(self.state.read().await.actions(ids))
    }

    async fn get_children(&self, id: &ActionId) -> Result<Vec<Action>, StoreError> {
        self.state.read().await.children(id)
    }

    async fn get_parent(&self, id: &ActionId) -> Result<Option<Action>, StoreError> {
        self.state.read().await.parent(id)
    }

    async fn get_edges(&self, filter: &EdgeFilter) -> Result<Vec<Edge>, StoreError> {
        Ok(self.state.read().await.edges(filter))
    }

    async fn get_prerequisites(&self, id: &ActionId) -> Result<Prerequisites, StoreError> {
        self.state.read().await.prerequisites(id)
    }

    async fn snapshot(&self) -> Result<GraphSnapshot, StoreError> {
        Ok(self.state.read().await.to_snapshot())
    }

    async fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.apply(&changes)?;
        tracing::debug!(
            revision = state.revision,
            put_actions = changes.put_actions.len(),
            put_edges = changes.put_edges.len(),
            delete_edges = changes.delete_edges.len(),
            delete_actions = changes.delete_actions.len(),
            "Change set committed"
        );
        Ok(())
    }
}
