//! Edge consistency rules.
//!
//! Every structural operation runs against a [`Plan`]: a private copy of
//! the graph that is validated and modified step by step. Nothing reaches
//! the store until the whole operation has succeeded, at which point the
//! plan is turned into a single [`ChangeSet`] guarded by the snapshot's
//! revision and by the version of every action it rewrites or deletes.
//!
//! Invariants kept here:
//! - each action has at most one family parent, and containment never loops;
//! - every `family(P, C)` edge has exactly one `depends_on(C, P)` edge
//!   derived from it, created and removed together with it;
//! - the `depends_on` graph stays acyclic.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use waypoint_core::events::{EventPayload, GraphEvent};
use waypoint_core::{Action, ActionId, ChildHandling, Edge, EdgeId, EdgeKind};
use waypoint_store::ChangeSet;

use crate::error::{EngineError, Result};
use crate::graph::ActionGraph;
use crate::types::{Attachment, DeleteOutcome};

pub struct Plan {
    graph: ActionGraph,
    now: DateTime<Utc>,
    /// Edge ids present in the snapshot.
    original_edges: HashSet<EdgeId>,
    /// Version each rewritten or deleted action had in the snapshot.
    read_versions: HashMap<ActionId, u64>,
    created: HashSet<ActionId>,
    put_edges: Vec<EdgeId>,
    delete_edges: Vec<EdgeId>,
    deleted: Vec<ActionId>,
    events: Vec<EventPayload>,
}

/// What a finished plan writes and reports.
pub struct PlanOutput {
    pub changes: ChangeSet,
    pub events: Vec<GraphEvent>,
}

impl Plan {
    pub fn new(graph: ActionGraph) -> Self {
        Self {
            original_edges: graph.edges().map(|e| e.id).collect(),
            graph,
            now: Utc::now(),
            read_versions: HashMap::new(),
            created: HashSet::new(),
            put_edges: Vec::new(),
            delete_edges: Vec::new(),
            deleted: Vec::new(),
            events: Vec::new(),
        }
    }

    /// The graph as it will look once the plan is committed.
    pub fn graph(&self) -> &ActionGraph {
        &self.graph
    }

    pub fn require(&self, id: &ActionId) -> Result<&Action> {
        self.graph
            .action(id)
            .ok_or_else(|| EngineError::action_not_found(*id))
    }

    /// Fail unless `id` still has the version the caller read.
    pub fn check_version(&self, id: &ActionId, expected: u64) -> Result<()> {
        let actual = self
            .read_versions
            .get(id)
            .copied()
            .unwrap_or(self.require(id)?.version);
        if actual != expected {
            return Err(EngineError::VersionConflict {
                id: Some(*id),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Add a brand-new action.
    pub fn create_action(&mut self, action: Action) {
        self.events.push(EventPayload::ActionCreated {
            action_id: action.id,
            title: action.data.title.clone(),
        });
        self.created.insert(action.id);
        self.graph.insert_action(action);
    }

    /// Attach `child` under `parent`, creating the family edge and its
    /// derived dependency.
    pub fn attach_child(&mut self, parent: ActionId, child: ActionId) -> Result<Attachment> {
        self.require(&parent)?;
        self.require(&child)?;

        if parent == child {
            return Err(EngineError::InvalidEdge(format!(
                "action {child} cannot be its own parent"
            )));
        }
        if let Some(existing) = self.graph.parent_of(&child) {
            return Err(EngineError::InvalidEdge(format!(
                "action {child} already has parent {existing}"
            )));
        }
        if self.graph.is_ancestor(&child, &parent) {
            return Err(EngineError::InvalidEdge(format!(
                "action {child} is an ancestor of {parent}"
            )));
        }

        let family = Edge::family(parent, child);
        let derived = match self.graph.find_dependency(&child, &parent).cloned() {
            // An explicit prerequisite in the same direction becomes the derived edge.
            Some(mut existing) => {
                existing.adopt(&family);
                existing
            }
            None => {
                if self.graph.dependency_path_exists(&parent, &child) {
                    return Err(EngineError::CycleDetected {
                        src: child,
                        dst: parent,
                    });
                }
                self.touch(parent);
                Edge::derived_from_family(&family)
            }
        };

        self.put_edge(family.clone());
        self.put_edge(derived.clone());
        self.touch(child);

        self.events.push(EventPayload::ChildAttached {
            parent_id: parent,
            child_id: child,
            family_edge: family.id,
            derived_edge: derived.id,
        });

        Ok(Attachment {
            parent_id: parent,
            child_id: child,
            previous_parent: None,
            family_edge: family,
            dependency_edge: derived,
        })
    }

    /// Remove `child`'s family edge and its derived dependency. A derived
    /// edge that was adopted from an explicit prerequisite is kept as that
    /// prerequisite. Returns the former parent.
    pub fn detach_child(&mut self, child: ActionId) -> Result<ActionId> {
        self.require(&child)?;
        let family = self
            .graph
            .parent_edge(&child)
            .cloned()
            .ok_or_else(|| EngineError::NotFound {
                kind: "Parent of action",
                id: child.to_string(),
            })?;
        let parent = family.src;

        let derived: Vec<Edge> = self
            .graph
            .dependency_edges(&parent)
            .into_iter()
            .filter(|e| e.derived_from == Some(family.id))
            .cloned()
            .collect();

        self.remove_edge(family.id);
        let mut prerequisites_changed = false;
        for mut edge in derived {
            if edge.adopted {
                edge.release();
                self.put_edge(edge);
            } else {
                self.remove_edge(edge.id);
                prerequisites_changed = true;
            }
        }
        self.touch(child);
        if prerequisites_changed {
            self.touch(parent);
        }

        self.events.push(EventPayload::ChildDetached {
            parent_id: parent,
            child_id: child,
        });

        Ok(parent)
    }

    /// Detach then attach under `new_parent`.
    pub fn move_child(&mut self, child: ActionId, new_parent: ActionId) -> Result<Attachment> {
        self.require(&child)?;
        self.require(&new_parent)?;
        if self.graph.parent_of(&child) == Some(new_parent) {
            return Err(EngineError::InvalidEdge(format!(
                "action {child} is already a child of {new_parent}"
            )));
        }

        let previous = self.detach_child(child)?;
        let mut attachment = self.attach_child(new_parent, child)?;
        attachment.previous_parent = Some(previous);
        Ok(attachment)
    }

    /// Record that `dst` depends on `src`.
    pub fn add_dependency(&mut self, src: ActionId, dst: ActionId) -> Result<Edge> {
        self.require(&src)?;
        self.require(&dst)?;

        if src == dst {
            return Err(EngineError::SelfDependency(src));
        }
        if self.graph.find_dependency(&src, &dst).is_some() {
            return Err(EngineError::DuplicateEdge { src, dst });
        }
        if self.graph.dependency_path_exists(&dst, &src) {
            return Err(EngineError::CycleDetected { src, dst });
        }

        let edge = Edge::depends_on(src, dst);
        self.put_edge(edge.clone());
        self.touch(dst);

        self.events.push(EventPayload::DependencyAdded {
            edge_id: edge.id,
            src,
            dst,
        });

        Ok(edge)
    }

    /// Remove an explicit `depends_on(src, dst)` edge.
    pub fn remove_dependency(&mut self, src: ActionId, dst: ActionId) -> Result<Edge> {
        let edge = self
            .graph
            .find_dependency(&src, &dst)
            .cloned()
            .ok_or_else(|| EngineError::NotFound {
                kind: "Dependency",
                id: format!("{src} -> {dst}"),
            })?;
        if edge.is_derived() {
            return Err(EngineError::ProtectedEdge { src, dst });
        }

        self.remove_edge(edge.id);
        self.touch(dst);

        self.events.push(EventPayload::DependencyRemoved {
            edge_id: edge.id,
            src,
            dst,
        });

        Ok(edge)
    }

    /// Delete `id`, disposing of its children according to `handling`.
    pub fn delete_action(&mut self, id: ActionId, handling: ChildHandling) -> Result<DeleteOutcome> {
        let deleted_action = self.require(&id)?.clone();
        let children = self.graph.children_of(&id);
        let children_count = children.len();
        let mut deleted_descendants = Vec::new();

        match handling {
            ChildHandling::CascadeDelete => {
                for child in &children {
                    let outcome = self.delete_action(*child, ChildHandling::CascadeDelete)?;
                    deleted_descendants.push(*child);
                    deleted_descendants.extend(outcome.deleted_descendants);
                }
            }
            ChildHandling::Orphan => {
                for child in &children {
                    self.detach_child(*child)?;
                }
            }
            ChildHandling::ReparentToGrandparent => {
                for child in &children {
                    self.detach_child(*child)?;
                }
                if let Some(grandparent) = self.graph.parent_of(&id) {
                    self.detach_child(id)?;
                    for child in &children {
                        self.attach_child(grandparent, *child)?;
                    }
                }
            }
        }

        if self.graph.parent_of(&id).is_some() {
            self.detach_child(id)?;
        }

        let remaining: Vec<Edge> = self
            .graph
            .edges()
            .filter(|e| e.touches(&id))
            .cloned()
            .collect();
        for edge in remaining {
            if edge.kind == EdgeKind::DependsOn && edge.dst != id {
                self.touch(edge.dst);
            }
            self.remove_edge(edge.id);
        }

        self.remember_version(id);
        self.graph.remove_action(&id);
        self.deleted.push(id);

        self.events.push(EventPayload::ActionDeleted {
            action_id: id,
            child_handling: handling,
        });

        Ok(DeleteOutcome {
            deleted_action,
            children_count,
            child_handling: handling,
            deleted_descendants,
        })
    }

    /// Turn the plan into one guarded change set.
    pub fn finish(self) -> PlanOutput {
        let mut changes = ChangeSet::new();

        if !self.put_edges.is_empty() || !self.delete_edges.is_empty() || !self.deleted.is_empty() {
            changes = changes.expect_revision(self.graph.revision);
        }

        let mut guarded: Vec<(&ActionId, &u64)> = self.read_versions.iter().collect();
        guarded.sort();
        for (id, version) in guarded {
            changes = changes.expect_version(*id, *version);
        }

        for id in &self.deleted {
            if !self.created.contains(id) {
                changes = changes.delete_action(*id);
            }
        }
        for edge_id in &self.delete_edges {
            changes = changes.delete_edge(*edge_id);
        }

        let mut written: Vec<&Action> = self
            .graph
            .actions()
            .filter(|a| self.created.contains(&a.id) || self.read_versions.contains_key(&a.id))
            .collect();
        written.sort_by_key(|a| (a.created_at, a.id));
        for action in written {
            changes = changes.put_action(action.clone());
        }

        for edge_id in &self.put_edges {
            if let Some(edge) = self.graph.edge(edge_id) {
                changes = changes.put_edge(edge.clone());
            }
        }

        let events = self.events.into_iter().map(GraphEvent::new).collect();
        PlanOutput { changes, events }
    }

    /// Bump `id` once for this plan: version + 1 and a fresh `updated_at`.
    /// New and already-bumped actions are left alone.
    fn touch(&mut self, id: ActionId) {
        if self.created.contains(&id) || self.read_versions.contains_key(&id) {
            return;
        }
        let now = self.now;
        if let Some(action) = self.graph.action_mut(&id) {
            self.read_versions.insert(id, action.version);
            action.version += 1;
            action.updated_at = now;
        }
    }

    fn remember_version(&mut self, id: ActionId) {
        if self.created.contains(&id) || self.read_versions.contains_key(&id) {
            return;
        }
        if let Some(action) = self.graph.action(&id) {
            self.read_versions.insert(id, action.version);
        }
    }

    fn put_edge(&mut self, edge: Edge) {
        if !self.put_edges.contains(&edge.id) {
            self.put_edges.push(edge.id);
        }
        self.graph.insert_edge(edge);
    }

    fn remove_edge(&mut self, id: EdgeId) {
        self.put_edges.retain(|e| e != &id);
        if self.original_edges.contains(&id) && !self.delete_edges.contains(&id) {
            self.delete_edges.push(id);
        }
        self.graph.remove_edge(&id);
    }
}
