//! Records exchanged with the Graph Store: snapshots, edge filters, and
//! the atomic write unit.

use serde::{Deserialize, Serialize};

use waypoint_core::{Action, ActionId, Edge, EdgeId, EdgeKind};

/// A consistent point-in-time copy of the whole graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphSnapshot {
    /// Graph revision the copy was taken at. See [`ChangeSet::expect_revision`].
    pub revision: u64,
    pub actions: Vec<Action>,
    pub edges: Vec<Edge>,
}

/// An action together with its incoming `depends_on` edges and their
/// source actions, read at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Prerequisites {
    pub action: Action,
    pub edges: Vec<Edge>,
    pub sources: Vec<Action>,
}

/// Selects edges by endpoint and kind. Unset fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeFilter {
    pub src: Option<ActionId>,
    pub dst: Option<ActionId>,
    pub kind: Option<EdgeKind>,
}

impl EdgeFilter {
    /// Incoming `depends_on` edges of `dst`: its prerequisites.
    pub fn dependencies_of(dst: ActionId) -> Self {
        Self {
            src: None,
            dst: Some(dst),
            kind: Some(EdgeKind::DependsOn),
        }
    }

    /// Outgoing `depends_on` edges of `src`: what waits on it.
    pub fn dependents_of(src: ActionId) -> Self {
        Self {
            src: Some(src),
            dst: None,
            kind: Some(EdgeKind::DependsOn),
        }
    }

    pub fn matches(&self, edge: &Edge) -> bool {
        self.src.map_or(true, |s| edge.src == s)
            && self.dst.map_or(true, |d| edge.dst == d)
            && self.kind.map_or(true, |k| edge.kind == k)
    }
}

/// A set of writes applied all-or-nothing.
///
/// Guards are checked before anything is written. Application order is:
/// delete edges, delete actions (dropping any edge still touching them),
/// put actions, put edges. After application every edge must have both
/// endpoints present, otherwise the whole set is rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub expected_revision: Option<u64>,
    pub expected_versions: Vec<(ActionId, u64)>,
    pub put_actions: Vec<Action>,
    pub put_edges: Vec<Edge>,
    pub delete_edges: Vec<EdgeId>,
    pub delete_actions: Vec<ActionId>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the set unless the graph revision still equals `revision`.
    pub fn expect_revision(mut self, revision: u64) -> Self {
        self.expected_revision = Some(revision);
        self
    }

    /// Reject the set unless `id` exists with exactly `version`.
    pub fn expect_version(mut self, id: ActionId, version: u64) -> Self {
        self.expected_versions.push((id, version));
        self
    }

    pub fn put_action(mut self, action: Action) -> Self {
        self.put_actions.push(action);
        self
    }

    pub fn put_edge(mut self, edge: Edge) -> Self {
        self.put_edges.push(edge);
        self
    }

    pub fn delete_edge(mut self, id: EdgeId) -> Self {
        self.delete_edges.push(id);
        self
    }

    pub fn delete_action(mut self, id: ActionId) -> Self {
        self.delete_actions.push(id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.put_actions.is_empty()
            && self.put_edges.is_empty()
            && self.delete_edges.is_empty()
            && self.delete_actions.is_empty()
    }

    /// Whether applying this set changes the graph shape and so advances
    /// the revision.
    pub fn is_structural(&self) -> bool {
        !self.put_edges.is_empty() || !self.delete_edges.is_empty() || !self.delete_actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_core::ActionData;

    #[test]
    fn edge_filter_matches() {
        let a = ActionId::new();
        let b = ActionId::new();
        let dep = Edge::depends_on(a, b);
        let fam = Edge::family(a, b);

        assert!(EdgeFilter::default().matches(&dep));
        assert!(EdgeFilter::dependencies_of(b).matches(&dep));
        assert!(!EdgeFilter::dependencies_of(a).matches(&dep));
        assert!(EdgeFilter::dependents_of(a).matches(&dep));
        assert!(!EdgeFilter::dependents_of(a).matches(&fam));
    }

    #[test]
    fn field_only_change_is_not_structural() {
        let action = Action::new(ActionData::titled("a"));
        let fields = ChangeSet::new().put_action(action.clone());
        assert!(!fields.is_structural());
        assert!(!fields.is_empty());

        let structural = ChangeSet::new().delete_action(action.id);
        assert!(structural.is_structural());
        assert!(ChangeSet::new().is_empty());
    }
}
