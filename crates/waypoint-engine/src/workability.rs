//! Workability evaluation and next-action selection.
//!
//! An action is workable when it is not done and every prerequisite (the
//! `src` of each incoming `depends_on` edge) is done. Candidates are
//! ordered leaf work first, then by `created_at`, then by id.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use waypoint_core::{Action, ActionId, Edge};

use crate::graph::ActionGraph;

/// Prerequisite ids among `edges` whose action is not done. `lookup`
/// resolves an id to its action; unknown ids count as met.
pub fn unmet_sources<'a>(
    edges: impl IntoIterator<Item = &'a Edge>,
    lookup: impl Fn(&ActionId) -> Option<&'a Action>,
) -> Vec<ActionId> {
    let mut seen = HashSet::new();
    edges
        .into_iter()
        .map(|e| e.src)
        .filter(|src| seen.insert(*src))
        .filter(|src| lookup(src).is_some_and(|a| !a.done))
        .collect()
}

/// Prerequisites of `id` that are still open, in creation order.
pub fn unmet_dependencies(graph: &ActionGraph, id: &ActionId) -> Vec<ActionId> {
    let unmet = unmet_sources(graph.dependency_edges(id), |src| graph.action(src));
    graph.sorted(unmet)
}

pub fn is_workable(graph: &ActionGraph, id: &ActionId) -> bool {
    match graph.action(id) {
        Some(action) => !action.done && unmet_dependencies(graph, id).is_empty(),
        None => false,
    }
}

/// Sort key for candidates: leaves before containers, oldest first.
fn selection_key(graph: &ActionGraph, action: &Action) -> (bool, DateTime<Utc>, ActionId) {
    (graph.has_children(&action.id), action.created_at, action.id)
}

/// Every workable action, in next-action order. With `scope`, only the
/// scope action and its family descendants are considered.
pub fn workable_frontier(graph: &ActionGraph, scope: Option<&ActionId>) -> Vec<ActionId> {
    let in_scope: Option<HashSet<ActionId>> = scope.map(|root| {
        let mut set: HashSet<ActionId> = graph.descendants(root).into_iter().collect();
        set.insert(*root);
        set
    });

    let mut candidates: Vec<&Action> = graph
        .actions()
        .filter(|a| !a.done)
        .filter(|a| in_scope.as_ref().map_or(true, |set| set.contains(&a.id)))
        .filter(|a| unmet_dependencies(graph, &a.id).is_empty())
        .collect();

    candidates.sort_by_key(|a| selection_key(graph, a));
    candidates.into_iter().map(|a| a.id).collect()
}

/// The single best workable action, if any.
pub fn select_next(graph: &ActionGraph, scope: Option<&ActionId>) -> Option<ActionId> {
    workable_frontier(graph, scope).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::{actions, family, graph};

    #[test]
    fn dependency_blocks_until_done() {
        let mut a = actions(&["prereq", "task"]);
        let edges = vec![Edge::depends_on(a[0].id, a[1].id)];

        let g = graph(&a, edges.clone());
        assert!(is_workable(&g, &a[0].id));
        assert!(!is_workable(&g, &a[1].id));
        assert_eq!(unmet_dependencies(&g, &a[1].id), vec![a[0].id]);

        a[0].done = true;
        let g = graph(&a, edges);
        assert!(is_workable(&g, &a[1].id));
        assert!(!is_workable(&g, &a[0].id));
    }

    #[test]
    fn parent_waits_for_children() {
        let mut a = actions(&["parent", "child"]);
        let g = graph(&a, family(&a[0], &a[1]));
        assert!(!is_workable(&g, &a[0].id));

        a[1].done = true;
        let g = graph(&a, family(&a[0], &a[1]));
        assert!(is_workable(&g, &a[0].id));
    }

    #[test]
    fn next_prefers_leaves_then_oldest() {
        // container is oldest but has a child; that child is blocked by `first`.
        let mut a = actions(&["container", "first", "second", "child"]);
        a[3].done = true;
        let mut edges = family(&a[0], &a[3]);
        edges.push(Edge::depends_on(a[1].id, a[2].id));
        let g = graph(&a, edges);

        assert_eq!(workable_frontier(&g, None), vec![a[1].id, a[0].id]);
        assert_eq!(select_next(&g, None), Some(a[1].id));
    }

    #[test]
    fn scope_limits_candidates() {
        let a = actions(&["other", "root", "leaf"]);
        let g = graph(&a, family(&a[1], &a[2]));

        assert_eq!(select_next(&g, None), Some(a[0].id));
        assert_eq!(select_next(&g, Some(&a[1].id)), Some(a[2].id));
    }

    #[test]
    fn nothing_workable_when_all_done_or_blocked() {
        let mut a = actions(&["x", "y"]);
        a[0].done = true;
        a[1].done = true;
        assert_eq!(select_next(&graph(&a, vec![]), None), None);

        // A cycle can only come from corrupt data; it must not hang or panic.
        let b = actions(&["p", "q"]);
        let cyclic = graph(
            &b,
            vec![Edge::depends_on(b[0].id, b[1].id), Edge::depends_on(b[1].id, b[0].id)],
        );
        assert_eq!(select_next(&cyclic, None), None);
    }

    #[test]
    fn duplicate_prerequisite_counted_once() {
        let a = actions(&["p", "q"]);
        let edges = [Edge::depends_on(a[0].id, a[1].id), Edge::depends_on(a[0].id, a[1].id)];
        let unmet = unmet_sources(edges.iter(), |id| a.iter().find(|x| &x.id == id));
        assert_eq!(unmet, vec![a[0].id]);
    }
}
