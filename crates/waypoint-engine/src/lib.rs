//! waypoint-engine: the action graph engine.
//!
//! Reads the graph from a [`GraphStore`], enforces the family/dependency
//! consistency rules, answers "what is workable next?" and builds context
//! views. [`ActionEngine`] is the single entry point callers use; every
//! mutation is versioned and committed as one atomic change set, and its
//! events are appended to the journal when one is configured.

pub mod consistency;
pub mod context;
pub mod error;
pub mod graph;
pub mod integrity;
pub mod journal;
pub mod types;
pub mod workability;

pub use context::{ActionContext, RelationshipFlags};
pub use error::EngineError;
pub use integrity::{IntegrityReport, Violation};
pub use types::{
    Attachment, CreateActionRequest, CreatedAction, DeleteOutcome, Detachment, RemovedDependency,
};

use std::sync::Arc;

use chrono::Utc;

use waypoint_core::events::{EventPayload, GraphEvent};
use waypoint_core::{Action, ActionId, ActionPatch, ChildHandling, Edge};
use waypoint_journal::JournalStore;
use waypoint_store::{ChangeSet, GraphStore, Prerequisites};

use crate::consistency::Plan;
use crate::error::Result;
use crate::graph::ActionGraph;

/// The action graph engine.
pub struct ActionEngine {
    store: Arc<dyn GraphStore>,
    journal: Option<Arc<dyn JournalStore>>,
}

impl ActionEngine {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            journal: None,
        }
    }

    /// Enable journal recording.
    pub fn with_journal(mut self, journal: Arc<dyn JournalStore>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    // ── Mutations ─────────────────────────────────────────────

    /// Create an action, optionally under a parent and with prerequisites,
    /// in one commit.
    pub async fn create_action(&self, request: CreateActionRequest) -> Result<CreatedAction> {
        validate_title(&request.data.title)?;
        let action = Action::new(request.data);
        let id = action.id;

        if request.parent_id.is_none() && request.depends_on.is_empty() {
            let event = GraphEvent::new(EventPayload::ActionCreated {
                action_id: id,
                title: action.data.title.clone(),
            });
            self.store.put_action(action.clone()).await?;
            tracing::info!(operation = "create_action", action_id = %id, "Mutation committed");
            self.finish("create_action", vec![event]);
            return Ok(CreatedAction {
                action,
                dependencies_added: 0,
            });
        }

        let mut plan = self.plan().await?;
        plan.create_action(action);
        if let Some(parent) = request.parent_id {
            plan.attach_child(parent, id)?;
        }
        for prerequisite in &request.depends_on {
            plan.add_dependency(*prerequisite, id)?;
        }
        let action = plan.require(&id)?.clone();

        self.commit("create_action", plan).await?;

        Ok(CreatedAction {
            action,
            dependencies_added: request.depends_on.len(),
        })
    }

    /// Apply a field patch, guarded by the version the caller read.
    pub async fn update_action(
        &self,
        id: ActionId,
        version: u64,
        patch: ActionPatch,
    ) -> Result<Action> {
        if patch.is_empty() {
            return Err(EngineError::ValidationError(
                "no fields supplied to update".to_string(),
            ));
        }
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }

        let current = self.store.get_action(&id).await?;
        if current.version != version {
            return Err(EngineError::VersionConflict {
                id: Some(id),
                expected: version,
                actual: current.version,
            });
        }

        let mut updated = current.bumped(Utc::now());
        patch.apply_to(&mut updated);

        self.store
            .commit(
                ChangeSet::new()
                    .expect_version(id, version)
                    .put_action(updated.clone()),
            )
            .await?;
        tracing::info!(
            operation = "update_action",
            action_id = %id,
            version = updated.version,
            "Mutation committed"
        );

        let event = GraphEvent::new(EventPayload::ActionUpdated {
            action_id: id,
            changed_fields: patch.field_names(),
            version: updated.version,
        });
        self.finish("update_action", vec![event]);

        Ok(updated)
    }

    /// Toggle the done flag as a versioned update.
    pub async fn set_done(&self, id: ActionId, version: u64, done: bool) -> Result<Action> {
        self.update_action(id, version, ActionPatch::done(done)).await
    }

    pub async fn delete_action(
        &self,
        id: ActionId,
        child_handling: ChildHandling,
    ) -> Result<DeleteOutcome> {
        let mut plan = self.plan().await?;
        let outcome = plan.delete_action(id, child_handling)?;
        self.commit("delete_action", plan).await?;
        Ok(outcome)
    }

    /// Record that `dst` depends on `src`.
    pub async fn add_dependency(&self, src: ActionId, dst: ActionId) -> Result<Edge> {
        let mut plan = self.plan().await?;
        let edge = plan.add_dependency(src, dst)?;
        self.commit("add_dependency", plan).await?;
        Ok(edge)
    }

    pub async fn remove_dependency(&self, src: ActionId, dst: ActionId) -> Result<RemovedDependency> {
        let mut plan = self.plan().await?;
        let removed_edge = plan.remove_dependency(src, dst)?;
        self.commit("remove_dependency", plan).await?;
        Ok(RemovedDependency { removed_edge })
    }

    pub async fn attach_child(
        &self,
        parent: ActionId,
        child: ActionId,
        child_version: Option<u64>,
    ) -> Result<Attachment> {
        let mut plan = self.plan().await?;
        if let Some(version) = child_version {
            plan.check_version(&child, version)?;
        }
        let attachment = plan.attach_child(parent, child)?;
        self.commit("attach_child", plan).await?;
        Ok(attachment)
    }

    pub async fn detach_child(&self, child: ActionId, child_version: Option<u64>) -> Result<Detachment> {
        let mut plan = self.plan().await?;
        if let Some(version) = child_version {
            plan.check_version(&child, version)?;
        }
        let former_parent = plan.detach_child(child)?;
        let child = plan.require(&child)?.clone();
        self.commit("detach_child", plan).await?;
        Ok(Detachment {
            former_parent,
            child,
        })
    }

    pub async fn move_child(
        &self,
        child: ActionId,
        new_parent: ActionId,
        child_version: Option<u64>,
    ) -> Result<Attachment> {
        let mut plan = self.plan().await?;
        if let Some(version) = child_version {
            plan.check_version(&child, version)?;
        }
        let attachment = plan.move_child(child, new_parent)?;
        self.commit("move_child", plan).await?;
        Ok(attachment)
    }

    // ── Queries ───────────────────────────────────────────────

    pub async fn get_action(&self, id: ActionId) -> Result<Action> {
        Ok(self.store.get_action(&id).await?)
    }

    /// Not-done prerequisites of `id`, in creation order.
    pub async fn unmet_dependencies(&self, id: ActionId) -> Result<Vec<Action>> {
        let prerequisites = self.store.get_prerequisites(&id).await?;
        Ok(open_prerequisites(prerequisites))
    }

    /// Whether `id` is not done and has no unmet prerequisites. Reads only
    /// the action, its incoming dependency edges and their sources, in one
    /// store call.
    pub async fn is_workable(&self, id: ActionId) -> Result<bool> {
        let prerequisites = self.store.get_prerequisites(&id).await?;
        if prerequisites.action.done {
            return Ok(false);
        }
        Ok(open_prerequisites(prerequisites).is_empty())
    }

    /// The next action to work on, optionally limited to `scope` and its
    /// descendants.
    pub async fn next_action(&self, scope: Option<ActionId>) -> Result<Option<Action>> {
        let graph = self.load_graph().await?;
        if let Some(root) = &scope {
            if !graph.contains(root) {
                return Err(EngineError::action_not_found(*root));
            }
        }
        Ok(workability::select_next(&graph, scope.as_ref()).and_then(|id| graph.action(&id).cloned()))
    }

    /// The whole workable frontier in next-action order.
    pub async fn workable_actions(&self, limit: Option<usize>) -> Result<Vec<Action>> {
        let graph = self.load_graph().await?;
        Ok(workability::workable_frontier(&graph, None)
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .filter_map(|id| graph.action(&id).cloned())
            .collect())
    }

    pub async fn get_context(&self, id: ActionId) -> Result<ActionContext> {
        let graph = self.load_graph().await?;
        context::build_context(&graph, &id)
    }

    pub async fn check_integrity(&self) -> Result<IntegrityReport> {
        let graph = self.load_graph().await?;
        let report = integrity::check(&graph);
        if !report.is_consistent() {
            tracing::warn!(
                violations = report.violations.len(),
                revision = report.revision,
                "Integrity check found violations"
            );
        }
        Ok(report)
    }

    // ── Internals ─────────────────────────────────────────────

    async fn load_graph(&self) -> Result<ActionGraph> {
        let snapshot = self.store.snapshot().await?;
        tracing::debug!(
            revision = snapshot.revision,
            actions = snapshot.actions.len(),
            edges = snapshot.edges.len(),
            "Snapshot loaded"
        );
        Ok(ActionGraph::from_snapshot(snapshot))
    }

    async fn plan(&self) -> Result<Plan> {
        Ok(Plan::new(self.load_graph().await?))
    }

    async fn commit(&self, operation: &str, plan: Plan) -> Result<()> {
        let output = plan.finish();
        let changes = output.changes;
        let (actions, edges) = (changes.put_actions.len(), changes.put_edges.len());
        let (removed_edges, removed_actions) = (changes.delete_edges.len(), changes.delete_actions.len());

        self.store.commit(changes).await?;

        tracing::info!(
            operation,
            actions,
            edges,
            removed_edges,
            removed_actions,
            "Mutation committed"
        );
        self.finish(operation, output.events);
        Ok(())
    }

    fn finish(&self, operation: &str, events: Vec<GraphEvent>) {
        if let Some(journal) = &self.journal {
            journal::record(journal.as_ref(), operation, events);
        }
    }
}

/// Not-done sources among `prerequisites`, in creation order.
fn open_prerequisites(prerequisites: Prerequisites) -> Vec<Action> {
    let Prerequisites { edges, sources, .. } = prerequisites;
    let unmet = workability::unmet_sources(&edges, |src| sources.iter().find(|a| &a.id == src));
    let mut open: Vec<Action> = sources
        .into_iter()
        .filter(|a| unmet.contains(&a.id))
        .collect();
    open.sort_by_key(|a| (a.created_at, a.id));
    open
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(EngineError::ValidationError(
            "title must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_core::{ActionData, EdgeKind};
    use waypoint_journal::{FileJournal, JournalQuery};
    use waypoint_store::{EdgeFilter, MemoryStore};

    fn engine() -> ActionEngine {
        ActionEngine::new(Arc::new(MemoryStore::new()))
    }

    async fn create(engine: &ActionEngine, title: &str) -> Action {
        engine
            .create_action(CreateActionRequest::titled(title))
            .await
            .unwrap()
            .action
    }

    async fn edges(engine: &ActionEngine) -> Vec<Edge> {
        engine.store().get_edges(&EdgeFilter::default()).await.unwrap()
    }

    #[tokio::test]
    async fn create_with_parent_and_dependencies() {
        let engine = engine();
        let parent = create(&engine, "Launch").await;
        let prereq = create(&engine, "Budget approved").await;

        let created = engine
            .create_action(
                CreateActionRequest::titled("Write press release")
                    .under(parent.id)
                    .depending_on([prereq.id]),
            )
            .await
            .unwrap();

        assert_eq!(created.dependencies_added, 1);
        assert_eq!(created.action.version, 1);
        let child = created.action.id;
        assert_eq!(
            engine.store().get_parent(&child).await.unwrap().map(|p| p.id),
            Some(parent.id)
        );
        assert_eq!(edges(&engine).await.len(), 3);
        assert!(!engine.is_workable(child).await.unwrap());
        // Parent now waits on the new child.
        assert_eq!(engine.get_action(parent.id).await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn create_validates_title_and_references() {
        let engine = engine();
        assert!(matches!(
            engine.create_action(CreateActionRequest::titled("   ")).await,
            Err(EngineError::ValidationError(_))
        ));

        let result = engine
            .create_action(CreateActionRequest::titled("orphan").under(ActionId::new()))
            .await;
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
        assert!(engine.store().snapshot().await.unwrap().actions.is_empty());
    }

    #[tokio::test]
    async fn attach_done_detach_scenario() {
        let engine = engine();
        let p = create(&engine, "P").await;
        let c = create(&engine, "C").await;

        engine.attach_child(p.id, c.id, None).await.unwrap();
        let dep = engine
            .store()
            .get_edges(&EdgeFilter::dependencies_of(p.id))
            .await
            .unwrap();
        assert_eq!(dep.len(), 1);
        assert_eq!(dep[0].src, c.id);
        assert!(!engine.is_workable(p.id).await.unwrap());

        let c_now = engine.get_action(c.id).await.unwrap();
        engine.set_done(c.id, c_now.version, true).await.unwrap();
        assert!(engine.is_workable(p.id).await.unwrap());

        let detached = engine.detach_child(c.id, None).await.unwrap();
        assert_eq!(detached.former_parent, p.id);
        assert!(edges(&engine).await.is_empty());

        let c_now = engine.get_action(c.id).await.unwrap();
        engine.set_done(c.id, c_now.version, false).await.unwrap();
        assert!(engine.is_workable(p.id).await.unwrap());
    }

    #[tokio::test]
    async fn explicit_prerequisite_survives_attach_and_detach() {
        let engine = engine();
        let p = create(&engine, "P").await;
        let c = create(&engine, "C").await;

        let explicit = engine.add_dependency(c.id, p.id).await.unwrap();
        engine.attach_child(p.id, c.id, None).await.unwrap();
        engine.detach_child(c.id, None).await.unwrap();

        let deps = engine
            .store()
            .get_edges(&EdgeFilter::dependencies_of(p.id))
            .await
            .unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].id, explicit.id);
        assert!(!deps[0].is_derived());
        assert!(!engine.is_workable(p.id).await.unwrap());

        let removed = engine.remove_dependency(c.id, p.id).await.unwrap();
        assert_eq!(removed.removed_edge.id, explicit.id);
        assert!(engine.is_workable(p.id).await.unwrap());
    }

    #[tokio::test]
    async fn reverse_dependency_is_a_cycle() {
        let engine = engine();
        let a = create(&engine, "A").await;
        let b = create(&engine, "B").await;

        engine.add_dependency(a.id, b.id).await.unwrap();
        let err = engine.add_dependency(b.id, a.id).await.unwrap_err();

        assert!(matches!(err, EngineError::CycleDetected { .. }));
        assert_eq!(edges(&engine).await.len(), 1);
    }

    #[tokio::test]
    async fn delete_orphan_scenario() {
        let engine = engine();
        let p = create(&engine, "P").await;
        let c1 = create(&engine, "C1").await;
        let c2 = create(&engine, "C2").await;
        let x = create(&engine, "X").await;
        engine.attach_child(p.id, c1.id, None).await.unwrap();
        engine.attach_child(p.id, c2.id, None).await.unwrap();
        engine.add_dependency(x.id, p.id).await.unwrap();

        let outcome = engine.delete_action(p.id, ChildHandling::Orphan).await.unwrap();

        assert_eq!(outcome.deleted_action.id, p.id);
        assert_eq!(outcome.children_count, 2);
        assert_eq!(outcome.child_handling, ChildHandling::Orphan);
        assert!(matches!(
            engine.get_action(p.id).await,
            Err(EngineError::NotFound { .. })
        ));
        assert!(engine.store().get_parent(&c1.id).await.unwrap().is_none());
        assert!(engine.store().get_parent(&c2.id).await.unwrap().is_none());
        assert!(edges(&engine).await.is_empty());
    }

    #[tokio::test]
    async fn derived_edge_cannot_be_removed_directly() {
        let engine = engine();
        let p = create(&engine, "P").await;
        let c = create(&engine, "C").await;
        engine.attach_child(p.id, c.id, None).await.unwrap();
        let before = engine.store().snapshot().await.unwrap();

        let err = engine.remove_dependency(c.id, p.id).await.unwrap_err();

        assert!(matches!(err, EngineError::ProtectedEdge { .. }));
        assert_eq!(engine.store().snapshot().await.unwrap(), before);
    }

    #[tokio::test]
    async fn remove_explicit_dependency() {
        let engine = engine();
        let a = create(&engine, "A").await;
        let b = create(&engine, "B").await;
        let edge = engine.add_dependency(a.id, b.id).await.unwrap();

        let removed = engine.remove_dependency(a.id, b.id).await.unwrap();

        assert_eq!(removed.removed_edge.id, edge.id);
        assert!(engine.is_workable(b.id).await.unwrap());
        assert!(matches!(
            engine.remove_dependency(a.id, b.id).await,
            Err(EngineError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn versions_advance_by_one_and_stale_updates_fail() {
        let engine = engine();
        let a = create(&engine, "A").await;

        let mut version = a.version;
        for i in 0..3 {
            let patch = ActionPatch {
                description: Some(format!("revision {i}")),
                ..Default::default()
            };
            let updated = engine.update_action(a.id, version, patch).await.unwrap();
            assert_eq!(updated.version, version + 1);
            version = updated.version;
        }
        assert_eq!(version, a.version + 3);

        let before = engine.get_action(a.id).await.unwrap();
        let stale = engine
            .update_action(a.id, a.version, ActionPatch::done(true))
            .await;
        assert!(matches!(
            stale,
            Err(EngineError::VersionConflict { expected: 1, actual: 4, .. })
        ));
        assert_eq!(engine.get_action(a.id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn empty_patch_is_rejected() {
        let engine = engine();
        let a = create(&engine, "A").await;
        assert!(matches!(
            engine.update_action(a.id, 1, ActionPatch::default()).await,
            Err(EngineError::ValidationError(_))
        ));
        assert!(matches!(
            engine.update_action(ActionId::new(), 1, ActionPatch::done(true)).await,
            Err(EngineError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn stale_child_version_blocks_attach() {
        let engine = engine();
        let p = create(&engine, "P").await;
        let c = create(&engine, "C").await;
        engine
            .update_action(c.id, 1, ActionPatch::done(true))
            .await
            .unwrap();

        let err = engine.attach_child(p.id, c.id, Some(1)).await.unwrap_err();
        assert!(err.is_conflict());
        assert!(edges(&engine).await.is_empty());
    }

    #[tokio::test]
    async fn move_child_between_parents() {
        let engine = engine();
        let old = create(&engine, "Old").await;
        let new = create(&engine, "New").await;
        let c = create(&engine, "C").await;
        engine.attach_child(old.id, c.id, None).await.unwrap();

        let moved = engine.move_child(c.id, new.id, None).await.unwrap();

        assert_eq!(moved.previous_parent, Some(old.id));
        assert_eq!(moved.dependency_edge.derived_from, Some(moved.family_edge.id));
        let ctx = engine.get_context(c.id).await.unwrap();
        assert_eq!(ctx.ancestors[0].id, new.id);
        assert!(engine.is_workable(old.id).await.unwrap());
        assert!(engine.check_integrity().await.unwrap().is_consistent());
    }

    #[tokio::test]
    async fn next_action_prefers_leaves() {
        let engine = engine();
        let project = create(&engine, "Project").await;
        let step = engine
            .create_action(CreateActionRequest::titled("First step").under(project.id))
            .await
            .unwrap()
            .action;
        let later = create(&engine, "Unrelated").await;

        let next = engine.next_action(None).await.unwrap().unwrap();
        assert_eq!(next.id, step.id);

        let frontier = engine.workable_actions(None).await.unwrap();
        assert_eq!(
            frontier.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![step.id, later.id]
        );
        assert_eq!(engine.workable_actions(Some(1)).await.unwrap().len(), 1);

        assert!(matches!(
            engine.next_action(Some(ActionId::new())).await,
            Err(EngineError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn next_action_none_when_everything_done() {
        let engine = engine();
        let a = create(&engine, "A").await;
        engine.set_done(a.id, a.version, true).await.unwrap();
        assert!(engine.next_action(None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cascade_delete_removes_subtree() {
        let engine = engine();
        let root = create(&engine, "Root").await;
        let mid = engine
            .create_action(CreateActionRequest::titled("Mid").under(root.id))
            .await
            .unwrap()
            .action;
        engine
            .create_action(CreateActionRequest::titled("Leaf").under(mid.id))
            .await
            .unwrap();

        let outcome = engine
            .delete_action(mid.id, ChildHandling::CascadeDelete)
            .await
            .unwrap();

        assert_eq!(outcome.deleted_descendants.len(), 1);
        let snapshot = engine.store().snapshot().await.unwrap();
        assert_eq!(snapshot.actions.len(), 1);
        assert!(snapshot.edges.is_empty());
    }

    #[tokio::test]
    async fn unmet_dependencies_lists_open_prerequisites() {
        let engine = engine();
        let a = create(&engine, "A").await;
        let b = create(&engine, "B").await;
        let c = create(&engine, "C").await;
        engine.add_dependency(a.id, c.id).await.unwrap();
        engine.add_dependency(b.id, c.id).await.unwrap();
        engine.set_done(a.id, a.version, true).await.unwrap();

        let unmet = engine.unmet_dependencies(c.id).await.unwrap();
        assert_eq!(unmet.iter().map(|x| x.id).collect::<Vec<_>>(), vec![b.id]);
    }

    #[tokio::test]
    async fn context_reads_are_idempotent() {
        let engine = engine();
        let p = create(&engine, "P").await;
        let c = engine
            .create_action(CreateActionRequest::titled("C").under(p.id))
            .await
            .unwrap()
            .action;

        let first = engine.get_context(c.id).await.unwrap();
        let second = engine.get_context(c.id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.is_workable(c.id).await.unwrap(), engine.is_workable(c.id).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_structural_writer_loses() {
        let store = Arc::new(MemoryStore::new());
        let engine = ActionEngine::new(store.clone());
        let a = create(&engine, "A").await;
        let b = create(&engine, "B").await;

        // Plan against the current snapshot, then let another writer go first.
        let mut plan = engine.plan().await.unwrap();
        plan.add_dependency(b.id, a.id).unwrap();
        engine.add_dependency(a.id, b.id).await.unwrap();

        let err = engine.commit("add_dependency", plan).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(edges(&engine).await.len(), 1);
        assert!(engine.check_integrity().await.unwrap().is_consistent());
    }

    #[tokio::test]
    async fn mutations_are_journaled() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Arc::new(FileJournal::new(dir.path()).unwrap());
        let engine = ActionEngine::new(Arc::new(MemoryStore::new())).with_journal(journal.clone());

        let p = create(&engine, "P").await;
        let c = create(&engine, "C").await;
        engine.attach_child(p.id, c.id, None).await.unwrap();

        let entries = journal
            .list(&JournalQuery {
                action_id: Some(c.id),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.operation == "attach_child"));
        assert!(entries.iter().all(|e| e.verify_integrity()));
    }

    #[tokio::test]
    async fn family_edge_kinds_round_trip_through_store() {
        let engine = engine();
        let p = create(&engine, "P").await;
        let c = engine
            .create_action(CreateActionRequest {
                data: ActionData::titled("C"),
                parent_id: Some(p.id),
                depends_on: Vec::new(),
            })
            .await
            .unwrap()
            .action;

        let all = edges(&engine).await;
        let family = all.iter().find(|e| e.kind == EdgeKind::Family).unwrap();
        let derived = all.iter().find(|e| e.kind == EdgeKind::DependsOn).unwrap();
        assert_eq!((family.src, family.dst), (p.id, c.id));
        assert_eq!(derived.derived_from, Some(family.id));
    }
}
