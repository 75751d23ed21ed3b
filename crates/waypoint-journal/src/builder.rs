//! Builder for journal entries.
//!
//! ```
//! # use waypoint_journal::EntryBuilder;
//! # use waypoint_core::events::EventPayload;
//! # use waypoint_core::ActionId;
//! let mut builder = EntryBuilder::new("create_action");
//! builder.record(EventPayload::ActionCreated {
//!     action_id: ActionId::new(),
//!     title: "Draft the roadmap".to_string(),
//! });
//! let entry = builder.finalize();
//! assert!(entry.verify_integrity());
//! ```

use chrono::Utc;

use waypoint_core::events::{EventPayload, GraphEvent};

use crate::{EntryId, JournalEntry};

/// Accumulates events for one mutation before sealing them with a hash.
pub struct EntryBuilder {
    entry: JournalEntry,
}

impl EntryBuilder {
    pub fn new(operation: &str) -> Self {
        Self {
            entry: JournalEntry {
                id: EntryId::new(),
                operation: operation.to_string(),
                events: Vec::new(),
                recorded_at: Utc::now(),
                content_hash: None,
            },
        }
    }

    /// Record a new event built from a payload.
    pub fn record(&mut self, payload: EventPayload) {
        self.entry.events.push(GraphEvent::new(payload));
    }

    /// Append events that were already stamped elsewhere.
    pub fn extend(&mut self, events: impl IntoIterator<Item = GraphEvent>) {
        self.entry.events.extend(events);
    }

    pub fn id(&self) -> EntryId {
        self.entry.id
    }

    /// Set the final timestamp and compute the content hash.
    pub fn finalize(mut self) -> JournalEntry {
        self.entry.recorded_at = Utc::now();
        let hash = self.entry.compute_hash();
        self.entry.content_hash = Some(hash);
        self.entry
    }
}
