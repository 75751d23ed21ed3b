//! Waypoint Journal: tamper-evident record of committed mutations.
//!
//! Each committed mutation is captured as a journal entry: the operation
//! name and the graph events it produced. Entries are content-hashed with
//! BLAKE3 so that later edits to a stored entry are detectable.

pub mod builder;
pub mod hash;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use waypoint_core::events::GraphEvent;
use waypoint_core::ActionId;

pub use builder::EntryBuilder;
pub use store::{FileJournal, JournalError, JournalQuery, JournalStore};

/// Unique identifier for a journal entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One committed mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub id: EntryId,
    /// Mutation API operation, e.g. "create_action" or "delete_action".
    pub operation: String,
    /// Events produced by the commit, in the order they were planned.
    pub events: Vec<GraphEvent>,
    pub recorded_at: DateTime<Utc>,
    /// BLAKE3 content hash (hex), set on finalization.
    pub content_hash: Option<String>,
}

impl JournalEntry {
    /// Compute the BLAKE3 hash of the entry's content.
    /// The hash covers all fields except `content_hash` itself.
    pub fn compute_hash(&self) -> String {
        hash::compute_entry_hash(self)
    }

    /// Verify that the stored content_hash matches a freshly computed hash.
    pub fn verify_integrity(&self) -> bool {
        match &self.content_hash {
            Some(stored) => stored == &self.compute_hash(),
            None => false,
        }
    }

    /// Whether any event in this entry references the given action.
    pub fn mentions(&self, id: &ActionId) -> bool {
        self.events.iter().any(|e| e.mentions(id))
    }
}
