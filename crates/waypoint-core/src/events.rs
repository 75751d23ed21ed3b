//! Change events emitted by committed mutations.
//!
//! Every successful mutation produces one or more events describing what
//! changed in the graph. They are appended to the mutation journal and
//! returned to callers that want to forward them elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{ActionId, ChildHandling, EdgeId};

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// A single change to the action graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphEvent {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

impl GraphEvent {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: EventId::new(),
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Whether this event concerns the given action (as subject or endpoint).
    pub fn mentions(&self, id: &ActionId) -> bool {
        self.payload.action_ids().contains(id)
    }
}

/// The event payload, tagged by type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event_type")]
pub enum EventPayload {
    // ── Action lifecycle ──────────────────────────────────────
    ActionCreated {
        action_id: ActionId,
        title: String,
    },
    /// Fields changed through a versioned update.
    ActionUpdated {
        action_id: ActionId,
        changed_fields: Vec<String>,
        version: u64,
    },
    ActionDeleted {
        action_id: ActionId,
        child_handling: ChildHandling,
    },

    // ── Containment ───────────────────────────────────────────
    ChildAttached {
        parent_id: ActionId,
        child_id: ActionId,
        family_edge: EdgeId,
        derived_edge: EdgeId,
    },
    ChildDetached {
        parent_id: ActionId,
        child_id: ActionId,
    },

    // ── Prerequisites ─────────────────────────────────────────
    DependencyAdded {
        edge_id: EdgeId,
        src: ActionId,
        dst: ActionId,
    },
    DependencyRemoved {
        edge_id: EdgeId,
        src: ActionId,
        dst: ActionId,
    },
}

impl EventPayload {
    /// Every action id referenced by this payload.
    pub fn action_ids(&self) -> Vec<ActionId> {
        match self {
            EventPayload::ActionCreated { action_id, .. }
            | EventPayload::ActionUpdated { action_id, .. }
            | EventPayload::ActionDeleted { action_id, .. } => vec![*action_id],
            EventPayload::ChildAttached {
                parent_id,
                child_id,
                ..
            }
            | EventPayload::ChildDetached {
                parent_id,
                child_id,
            } => vec![*parent_id, *child_id],
            EventPayload::DependencyAdded { src, dst, .. }
            | EventPayload::DependencyRemoved { src, dst, .. } => vec![*src, *dst],
        }
    }
}
