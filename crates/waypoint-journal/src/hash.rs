//! BLAKE3 content hashing for tamper evidence.

use serde::Serialize;

use crate::JournalEntry;

/// Hashable representation of a JournalEntry (excludes content_hash).
#[derive(Serialize)]
struct HashableEntry<'a> {
    id: &'a crate::EntryId,
    operation: &'a str,
    events: &'a [waypoint_core::events::GraphEvent],
    recorded_at: &'a chrono::DateTime<chrono::Utc>,
}

/// Compute the BLAKE3 hash of an entry's content.
///
/// Serializes all fields except `content_hash` to JSON, then hashes the
/// bytes. Returns the hex-encoded hash.
pub fn compute_entry_hash(entry: &JournalEntry) -> String {
    let hashable = HashableEntry {
        id: &entry.id,
        operation: &entry.operation,
        events: &entry.events,
        recorded_at: &entry.recorded_at,
    };

    let json = serde_json::to_vec(&hashable).unwrap_or_default();
    blake3::hash(&json).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntryBuilder;
    use waypoint_core::events::EventPayload;
    use waypoint_core::ActionId;

    #[test]
    fn hash_is_stable_for_same_content() {
        let mut builder = EntryBuilder::new("create_action");
        builder.record(EventPayload::ActionCreated {
            action_id: ActionId::new(),
            title: "a".to_string(),
        });
        let entry = builder.finalize();

        assert_eq!(compute_entry_hash(&entry), compute_entry_hash(&entry.clone()));
        assert_eq!(entry.content_hash.as_deref(), Some(compute_entry_hash(&entry).as_str()));
    }

    #[test]
    fn hash_changes_with_operation() {
        let entry = EntryBuilder::new("update_action").finalize();
        let mut altered = entry.clone();
        altered.operation = "delete_action".to_string();
        assert_ne!(compute_entry_hash(&entry), compute_entry_hash(&altered));
    }
}
