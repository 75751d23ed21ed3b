//! Journal storage: trait and file-backed implementation.
//!
//! Entries are stored as JSON files addressed by their id.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use waypoint_core::ActionId;

use crate::{EntryId, JournalEntry};

/// Errors that can occur during journal storage operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("Journal entry not found: {0}")]
    NotFound(EntryId),

    #[error("Integrity check failed for journal entry {0}: stored hash does not match content")]
    IntegrityViolation(EntryId),

    #[error("Journal entry has no content hash (not finalized)")]
    NotFinalized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Query parameters for listing journal entries.
#[derive(Debug, Default)]
pub struct JournalQuery {
    /// Filter by mutation operation name.
    pub operation: Option<String>,
    /// Only entries with an event referencing this action.
    pub action_id: Option<ActionId>,
    /// Only include entries recorded at or after this time.
    pub from: Option<DateTime<Utc>>,
    /// Only include entries recorded at or before this time.
    pub to: Option<DateTime<Utc>>,
}

/// Trait for journal persistence backends.
pub trait JournalStore: Send + Sync {
    /// Store a finalized entry. Returns an error if the entry has no content hash.
    fn append(&self, entry: &JournalEntry) -> Result<(), JournalError>;

    /// Retrieve an entry by ID, verifying integrity.
    fn get(&self, id: EntryId) -> Result<JournalEntry, JournalError>;

    /// List entries matching the query, ordered by recorded_at ascending.
    fn list(&self, query: &JournalQuery) -> Result<Vec<JournalEntry>, JournalError>;
}

/// File-system backed journal, one JSON file per entry, sharded by the
/// first two hex digits of the entry id.
///
/// ```text
/// {root}/
///   3f/
///     3f2a…c9.json
/// ```
pub struct FileJournal {
    root: PathBuf,
}

impl FileJournal {
    /// Create a journal rooted at the given directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn entry_path(&self, id: EntryId) -> PathBuf {
        let name = id.0.simple().to_string();
        self.root.join(&name[..2]).join(format!("{name}.json"))
    }

    fn read_entry(path: &Path) -> Result<JournalEntry, JournalError> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

impl JournalStore for FileJournal {
    fn append(&self, entry: &JournalEntry) -> Result<(), JournalError> {
        if entry.content_hash.is_none() {
            return Err(JournalError::NotFinalized);
        }

        let path = self.entry_path(entry.id);
        if let Some(shard) = path.parent() {
            fs::create_dir_all(shard)?;
        }
        fs::write(&path, serde_json::to_string_pretty(entry)?)?;

        tracing::debug!(
            entry_id = %entry.id,
            operation = %entry.operation,
            "Journal entry appended"
        );
        Ok(())
    }

    fn get(&self, id: EntryId) -> Result<JournalEntry, JournalError> {
        let path = self.entry_path(id);
        if !path.is_file() {
            return Err(JournalError::NotFound(id));
        }
        let entry = Self::read_entry(&path)?;
        if !entry.verify_integrity() {
            return Err(JournalError::IntegrityViolation(id));
        }
        Ok(entry)
    }

    fn list(&self, query: &JournalQuery) -> Result<Vec<JournalEntry>, JournalError> {
        let mut results = Vec::new();
        for shard in fs::read_dir(&self.root)?.flatten() {
            if !shard.path().is_dir() {
                continue;
            }
            for file in fs::read_dir(shard.path())?.flatten() {
                let path = file.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let entry = Self::read_entry(&path)?;
                if matches_query(&entry, query) {
                    results.push(entry);
                }
            }
        }
        results.sort_by_key(|e| e.recorded_at);
        Ok(results)
    }
}

fn matches_query(entry: &JournalEntry, query: &JournalQuery) -> bool {
    query.operation.as_ref().map_or(true, |op| &entry.operation == op)
        && query.action_id.map_or(true, |id| entry.mentions(&id))
        && query.from.map_or(true, |from| entry.recorded_at >= from)
        && query.to.map_or(true, |to| entry.recorded_at <= to)
}
