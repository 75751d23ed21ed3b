//! Context builder: an action's neighborhood in one read.

use serde::{Deserialize, Serialize};

use waypoint_core::{Action, ActionId};

use crate::error::{EngineError, Result};
use crate::graph::ActionGraph;
use crate::workability;

/// Derived booleans describing where an action sits. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipFlags {
    pub is_root: bool,
    pub is_leaf: bool,
    pub is_done: bool,
    pub is_workable: bool,
    pub has_unmet_dependencies: bool,
    pub has_dependents: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionContext {
    pub action: Action,
    /// Immediate parent first, root last.
    pub ancestors: Vec<Action>,
    pub children: Vec<Action>,
    /// Actions this one depends on.
    pub dependencies: Vec<Action>,
    /// Actions that depend on this one.
    pub dependents: Vec<Action>,
    /// Other children of the same parent.
    pub siblings: Vec<Action>,
    pub relationship_flags: RelationshipFlags,
}

pub fn build_context(graph: &ActionGraph, id: &ActionId) -> Result<ActionContext> {
    let action = graph
        .action(id)
        .cloned()
        .ok_or_else(|| EngineError::action_not_found(*id))?;

    let resolve = |ids: Vec<ActionId>| -> Vec<Action> {
        ids.iter()
            .filter_map(|i| graph.action(i).cloned())
            .collect()
    };

    let ancestors = resolve(graph.ancestors(id));
    let children = resolve(graph.children_of(id));
    let dependencies = resolve(graph.dependencies_of(id));
    let dependents = resolve(graph.dependents_of(id));
    let siblings = match graph.parent_of(id) {
        Some(parent) => resolve(
            graph
                .children_of(&parent)
                .into_iter()
                .filter(|sibling| sibling != id)
                .collect(),
        ),
        None => Vec::new(),
    };

    let has_unmet_dependencies = !workability::unmet_dependencies(graph, id).is_empty();
    let relationship_flags = RelationshipFlags {
        is_root: ancestors.is_empty(),
        is_leaf: children.is_empty(),
        is_done: action.done,
        is_workable: !action.done && !has_unmet_dependencies,
        has_unmet_dependencies,
        has_dependents: !dependents.is_empty(),
    };

    Ok(ActionContext {
        action,
        ancestors,
        children,
        dependencies,
        dependents,
        siblings,
        relationship_flags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::{actions, family, graph};
    use waypoint_core::Edge;

    fn ids(actions: &[Action]) -> Vec<ActionId> {
        actions.iter().map(|a| a.id).collect()
    }

    #[test]
    fn context_of_middle_node() {
        let a = actions(&["root", "mid", "sib", "leaf", "prereq"]);
        let mut edges = family(&a[0], &a[1]);
        edges.extend(family(&a[0], &a[2]));
        edges.extend(family(&a[1], &a[3]));
        edges.push(Edge::depends_on(a[4].id, a[1].id));
        let g = graph(&a, edges);

        let ctx = build_context(&g, &a[1].id).unwrap();

        assert_eq!(ctx.action.id, a[1].id);
        assert_eq!(ids(&ctx.ancestors), vec![a[0].id]);
        assert_eq!(ids(&ctx.children), vec![a[3].id]);
        assert_eq!(ids(&ctx.siblings), vec![a[2].id]);
        assert_eq!(ids(&ctx.dependencies), vec![a[3].id, a[4].id]);
        assert_eq!(ids(&ctx.dependents), vec![a[0].id]);
        assert_eq!(
            ctx.relationship_flags,
            RelationshipFlags {
                is_root: false,
                is_leaf: false,
                is_done: false,
                is_workable: false,
                has_unmet_dependencies: true,
                has_dependents: true,
            }
        );
    }

    #[test]
    fn lone_action_is_root_leaf_and_workable() {
        let a = actions(&["alone"]);
        let ctx = build_context(&graph(&a, vec![]), &a[0].id).unwrap();

        assert!(ctx.ancestors.is_empty());
        assert!(ctx.siblings.is_empty());
        assert!(ctx.relationship_flags.is_root);
        assert!(ctx.relationship_flags.is_leaf);
        assert!(ctx.relationship_flags.is_workable);
        assert!(!ctx.relationship_flags.has_dependents);
    }

    #[test]
    fn missing_action_is_not_found() {
        let g = graph(&[], vec![]);
        assert!(matches!(
            build_context(&g, &ActionId::new()),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn repeated_reads_are_identical() {
        let a = actions(&["p", "c1", "c2"]);
        let mut edges = family(&a[0], &a[1]);
        edges.extend(family(&a[0], &a[2]));
        let g = graph(&a, edges);

        assert_eq!(build_context(&g, &a[1].id).unwrap(), build_context(&g, &a[1].id).unwrap());
    }
}
