//! In-memory action graph.
//!
//! Built from a [`GraphSnapshot`] and indexed for the lookups the engine
//! needs: parent and children over `family` edges, prerequisites and
//! dependents over `depends_on` edges. Structural operations plan against a
//! mutable copy before anything is written to the store.

use std::collections::{HashMap, HashSet, VecDeque};

use waypoint_core::{Action, ActionId, Edge, EdgeId, EdgeKind};
use waypoint_store::GraphSnapshot;

#[derive(Debug, Clone, Default)]
pub struct ActionGraph {
    /// Store revision the snapshot was taken at.
    pub revision: u64,
    actions: HashMap<ActionId, Action>,
    edges: HashMap<EdgeId, Edge>,
    /// child -> incoming family edges (more than one only in corrupt data)
    family_in: HashMap<ActionId, Vec<EdgeId>>,
    /// parent -> outgoing family edges
    family_out: HashMap<ActionId, Vec<EdgeId>>,
    /// dst -> incoming depends_on edges
    deps_in: HashMap<ActionId, Vec<EdgeId>>,
    /// src -> outgoing depends_on edges
    deps_out: HashMap<ActionId, Vec<EdgeId>>,
}

impl ActionGraph {
    /// Build from a snapshot. Edges whose endpoints are missing are ignored.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let mut graph = Self {
            revision: snapshot.revision,
            actions: HashMap::with_capacity(snapshot.actions.len()),
            ..Default::default()
        };

        for action in snapshot.actions {
            graph.actions.insert(action.id, action);
        }

        for edge in snapshot.edges {
            if graph.actions.contains_key(&edge.src) && graph.actions.contains_key(&edge.dst) {
                graph.insert_edge(edge);
            } else {
                tracing::warn!(edge_id = %edge.id, "Skipping edge with missing endpoint");
            }
        }

        graph
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, id: &ActionId) -> bool {
        self.actions.contains_key(id)
    }

    pub fn action(&self, id: &ActionId) -> Option<&Action> {
        self.actions.get(id)
    }

    pub(crate) fn action_mut(&mut self, id: &ActionId) -> Option<&mut Action> {
        self.actions.get_mut(id)
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.values()
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// The family edge pointing at `id`, if any.
    pub fn parent_edge(&self, id: &ActionId) -> Option<&Edge> {
        self.family_in
            .get(id)
            .and_then(|ids| ids.first())
            .and_then(|edge_id| self.edges.get(edge_id))
    }

    pub fn parent_of(&self, id: &ActionId) -> Option<ActionId> {
        self.parent_edge(id).map(|e| e.src)
    }

    /// Every family parent of `id`. A consistent graph has at most one.
    pub fn parents_of(&self, id: &ActionId) -> Vec<ActionId> {
        self.edges_by(&self.family_in, id).map(|e| e.src).collect()
    }

    /// Direct children, in creation order.
    pub fn children_of(&self, id: &ActionId) -> Vec<ActionId> {
        let children = self.edges_by(&self.family_out, id).map(|e| e.dst);
        self.sorted(children)
    }

    pub fn has_children(&self, id: &ActionId) -> bool {
        self.family_out.get(id).is_some_and(|ids| !ids.is_empty())
    }

    /// Incoming `depends_on` edges of `id`: its prerequisites.
    pub fn dependency_edges(&self, id: &ActionId) -> Vec<&Edge> {
        self.edges_by(&self.deps_in, id).collect()
    }

    /// Outgoing `depends_on` edges of `id`: what waits on it.
    pub fn dependent_edges(&self, id: &ActionId) -> Vec<&Edge> {
        self.edges_by(&self.deps_out, id).collect()
    }

    /// Prerequisites of `id`, in creation order.
    pub fn dependencies_of(&self, id: &ActionId) -> Vec<ActionId> {
        let srcs = self.edges_by(&self.deps_in, id).map(|e| e.src);
        self.sorted(srcs)
    }

    /// Actions that depend on `id`, in creation order.
    pub fn dependents_of(&self, id: &ActionId) -> Vec<ActionId> {
        let dsts = self.edges_by(&self.deps_out, id).map(|e| e.dst);
        self.sorted(dsts)
    }

    /// The `depends_on(src, dst)` edge, if one exists.
    pub fn find_dependency(&self, src: &ActionId, dst: &ActionId) -> Option<&Edge> {
        self.edges_by(&self.deps_out, src).find(|e| &e.dst == dst)
    }

    /// Chain of parents from the immediate parent up to the root.
    pub fn ancestors(&self, id: &ActionId) -> Vec<ActionId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([*id]);
        let mut current = *id;
        while let Some(parent) = self.parent_of(&current) {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Whether `candidate` sits on the parent chain of `id`.
    pub fn is_ancestor(&self, candidate: &ActionId, id: &ActionId) -> bool {
        self.ancestors(id).contains(candidate)
    }

    /// All family descendants of `id`, breadth first.
    pub fn descendants(&self, id: &ActionId) -> Vec<ActionId> {
        let mut visited = HashSet::from([*id]);
        let mut queue = VecDeque::from([*id]);
        let mut found = Vec::new();

        while let Some(node) = queue.pop_front() {
            for child in self.children_of(&node) {
                if visited.insert(child) {
                    found.push(child);
                    queue.push_back(child);
                }
            }
        }

        found
    }

    /// Whether `to` is reachable from `from` by following `depends_on`
    /// edges from src to dst.
    pub fn dependency_path_exists(&self, from: &ActionId, to: &ActionId) -> bool {
        if from == to {
            return true;
        }

        let mut visited = HashSet::from([*from]);
        let mut queue = VecDeque::from([*from]);

        while let Some(node) = queue.pop_front() {
            for edge in self.edges_by(&self.deps_out, &node) {
                if &edge.dst == to {
                    return true;
                }
                if visited.insert(edge.dst) {
                    queue.push_back(edge.dst);
                }
            }
        }

        false
    }

    pub(crate) fn insert_action(&mut self, action: Action) {
        self.actions.insert(action.id, action);
    }

    /// Remove an action and every edge touching it. Returns the removed edges.
    pub(crate) fn remove_action(&mut self, id: &ActionId) -> Vec<Edge> {
        let touching: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.touches(id))
            .map(|e| e.id)
            .collect();
        let removed = touching
            .iter()
            .filter_map(|edge_id| self.remove_edge(edge_id))
            .collect();
        self.actions.remove(id);
        removed
    }

    /// Insert or replace an edge.
    pub(crate) fn insert_edge(&mut self, edge: Edge) {
        self.remove_edge(&edge.id);
        let (incoming, outgoing) = self.indexes_mut(edge.kind);
        incoming.entry(edge.dst).or_default().push(edge.id);
        outgoing.entry(edge.src).or_default().push(edge.id);
        self.edges.insert(edge.id, edge);
    }

    pub(crate) fn remove_edge(&mut self, id: &EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(id)?;
        let (incoming, outgoing) = self.indexes_mut(edge.kind);
        if let Some(ids) = incoming.get_mut(&edge.dst) {
            ids.retain(|e| e != id);
        }
        if let Some(ids) = outgoing.get_mut(&edge.src) {
            ids.retain(|e| e != id);
        }
        Some(edge)
    }

    /// Order ids by `(created_at, id)`, dropping duplicates.
    pub fn sorted(&self, ids: impl IntoIterator<Item = ActionId>) -> Vec<ActionId> {
        let mut unique: Vec<ActionId> = ids.into_iter().collect::<HashSet<_>>().into_iter().collect();
        unique.sort_by_key(|id| (self.actions.get(id).map(|a| a.created_at), *id));
        unique
    }

    fn edges_by<'a>(
        &'a self,
        index: &'a HashMap<ActionId, Vec<EdgeId>>,
        id: &ActionId,
    ) -> impl Iterator<Item = &'a Edge> + 'a {
        index
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id))
    }

    fn indexes_mut(
        &mut self,
        kind: EdgeKind,
    ) -> (
        &mut HashMap<ActionId, Vec<EdgeId>>,
        &mut HashMap<ActionId, Vec<EdgeId>>,
    ) {
        match kind {
            EdgeKind::Family => (&mut self.family_in, &mut self.family_out),
            EdgeKind::DependsOn => (&mut self.deps_in, &mut self.deps_out),
        }
    }
}
