//! Journal helpers for committed mutations.

use waypoint_core::events::GraphEvent;
use waypoint_journal::{EntryBuilder, JournalEntry, JournalStore};

/// Seal `events` into an entry and append it.
///
/// A journal failure never fails the mutation that produced the events;
/// it is logged and the entry is still returned.
pub fn record(
    journal: &dyn JournalStore,
    operation: &str,
    events: Vec<GraphEvent>,
) -> Option<JournalEntry> {
    if events.is_empty() {
        return None;
    }

    let mut builder = EntryBuilder::new(operation);
    builder.extend(events);
    let entry = builder.finalize();

    match journal.append(&entry) {
        Ok(()) => {
            tracing::debug!(
                entry_id = %entry.id,
                operation,
                events = entry.events.len(),
                "Journal entry recorded"
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, operation, "Failed to record journal entry");
        }
    }

    Some(entry)
}
