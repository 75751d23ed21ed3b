//! Whole-graph integrity check.
//!
//! Verifies the invariants the consistency rules maintain. A healthy graph
//! yields an empty report; anything else points at data written around the
//! engine or at a bug.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use waypoint_core::{ActionId, EdgeId, EdgeKind};

use crate::graph::ActionGraph;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum Violation {
    /// A family edge without its `depends_on(child, parent)` edge.
    MissingDerivedEdge {
        family_edge: EdgeId,
        parent: ActionId,
        child: ActionId,
    },
    /// More than one dependency edge derived from the same family edge.
    DuplicateDerivedEdge {
        family_edge: EdgeId,
        edges: Vec<EdgeId>,
    },
    /// A derived edge whose family edge is gone or points elsewhere.
    OrphanDerivedEdge { edge: EdgeId, derived_from: EdgeId },
    MultipleParents {
        child: ActionId,
        parents: Vec<ActionId>,
    },
    DuplicateEdge {
        kind: EdgeKind,
        src: ActionId,
        dst: ActionId,
        edges: Vec<EdgeId>,
    },
    SelfLoop { edge: EdgeId, action: ActionId },
    /// Actions on, or only reachable through, a `depends_on` cycle.
    DependencyCycle { actions: Vec<ActionId> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub revision: u64,
    pub actions_checked: usize,
    pub edges_checked: usize,
    pub violations: Vec<Violation>,
}

impl IntegrityReport {
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }
}

pub fn check(graph: &ActionGraph) -> IntegrityReport {
    let mut violations = Vec::new();

    let mut edges: Vec<_> = graph.edges().collect();
    edges.sort_by_key(|e| (e.created_at, e.id));

    let mut derived_by_family: HashMap<EdgeId, Vec<EdgeId>> = HashMap::new();
    let mut by_endpoints: HashMap<(EdgeKind, ActionId, ActionId), Vec<EdgeId>> = HashMap::new();

    for edge in &edges {
        if edge.src == edge.dst {
            violations.push(Violation::SelfLoop {
                edge: edge.id,
                action: edge.src,
            });
        }
        by_endpoints
            .entry((edge.kind, edge.src, edge.dst))
            .or_default()
            .push(edge.id);

        if let Some(family_id) = edge.derived_from {
            let mirrors_family = graph.edge(&family_id).is_some_and(|family| {
                family.kind == EdgeKind::Family && family.src == edge.dst && family.dst == edge.src
            });
            if edge.kind == EdgeKind::DependsOn && mirrors_family {
                derived_by_family.entry(family_id).or_default().push(edge.id);
            } else {
                violations.push(Violation::OrphanDerivedEdge {
                    edge: edge.id,
                    derived_from: family_id,
                });
            }
        }
    }

    for edge in edges.iter().filter(|e| e.kind == EdgeKind::Family) {
        match derived_by_family.get(&edge.id).map(Vec::len).unwrap_or(0) {
            0 => violations.push(Violation::MissingDerivedEdge {
                family_edge: edge.id,
                parent: edge.src,
                child: edge.dst,
            }),
            1 => {}
            _ => violations.push(Violation::DuplicateDerivedEdge {
                family_edge: edge.id,
                edges: derived_by_family[&edge.id].clone(),
            }),
        }
    }

    let mut duplicates: Vec<_> = by_endpoints
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .collect();
    duplicates.sort_by_key(|((_, src, dst), ids)| (*src, *dst, ids.clone()));
    for ((kind, src, dst), edges) in duplicates {
        violations.push(Violation::DuplicateEdge {
            kind,
            src,
            dst,
            edges,
        });
    }

    let mut children: Vec<ActionId> = graph.actions().map(|a| a.id).collect();
    children.sort();
    for child in children {
        let parents = graph.parents_of(&child);
        if parents.len() > 1 {
            violations.push(Violation::MultipleParents { child, parents });
        }
    }

    let stuck = cyclic_actions(graph);
    if !stuck.is_empty() {
        violations.push(Violation::DependencyCycle {
            actions: graph.sorted(stuck),
        });
    }

    IntegrityReport {
        revision: graph.revision,
        actions_checked: graph.action_count(),
        edges_checked: graph.edge_count(),
        violations,
    }
}

/// Kahn's algorithm over `depends_on`: whatever never reaches in-degree
/// zero lies on or behind a cycle.
fn cyclic_actions(graph: &ActionGraph) -> Vec<ActionId> {
    let mut in_degree: HashMap<ActionId, usize> = graph
        .actions()
        .map(|a| (a.id, graph.dependency_edges(&a.id).len()))
        .collect();

    let mut queue: VecDeque<ActionId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();

    while let Some(node) = queue.pop_front() {
        for edge in graph.dependent_edges(&node) {
            if let Some(degree) = in_degree.get_mut(&edge.dst) {
                *degree = degree.saturating_sub(1);
                if *degree == 0 {
                    queue.push_back(edge.dst);
                }
            }
        }
    }

    in_degree
        .into_iter()
        .filter(|(_, degree)| *degree > 0)
        .map(|(id, _)| id)
        .collect()
}
