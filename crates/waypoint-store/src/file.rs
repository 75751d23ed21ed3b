//! JSON-file backed Graph Store.
//!
//! The whole graph lives in one pretty-printed [`GraphSnapshot`] document.
//! Every commit rewrites it through a temporary file and a rename, so a
//! reader never sees a half-written document. Intended for single-process
//! use such as the CLI; concurrent processes are not coordinated.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use waypoint_core::{Action, ActionId, Edge};

use crate::error::StoreError;
use crate::memory::MemoryState;
use crate::traits::GraphStore;
use crate::types::{ChangeSet, EdgeFilter, GraphSnapshot, Prerequisites};

pub struct FileStore {
    path: PathBuf,
    state: RwLock<MemoryState>,
}

impl FileStore {
    /// Open the document at `path`, starting empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let snapshot = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str::<GraphSnapshot>(&json)?
        } else {
            GraphSnapshot::default()
        };

        tracing::debug!(
            path = %path.display(),
            actions = snapshot.actions.len(),
            edges = snapshot.edges.len(),
            "File store opened"
        );

        Ok(Self {
            path,
            state: RwLock::new(MemoryState::from_snapshot(snapshot)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn persist(path: &Path, snapshot: &GraphSnapshot) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl GraphStore for FileStore {
    async fn get_action(&self, id: &ActionId) -> Result<Action, StoreError> {
        self.state.read().await.action(id)
    }

    async fn get_actions(&self, ids: &[ActionId]) -> Result<Vec<Action>, StoreError> {
        Ok(self.state.read().await.actions(ids))
    }

    async fn get_children(&self, id: &ActionId) -> Result<Vec<Action>, StoreError> {
        self.state.read().await.children(id)
    }

    async fn get_parent(&self, id: &ActionId) -> Result<Option<Action>, StoreError> {
        self.state.read().await.parent(id)
    }

    async fn get_edges(&self, filter: &EdgeFilter) -> Result<Vec<Edge>, StoreError> {
        Ok(self.state.read().await.edges(filter))
    }

    async fn get_prerequisites(&self, id: &ActionId) -> Result<Prerequisites, StoreError> {
        self.state.read().await.prerequisites(id)
    }

    async fn snapshot(&self) -> Result<GraphSnapshot, StoreError> {
        Ok(self.state.read().await.to_snapshot())
    }

    async fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.apply(&changes)?;
        persist(&self.path, &next.to_snapshot())?;
        *state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_core::ActionData;

    #[tokio::test]
    async fn commits_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let a = Action::new(ActionData::titled("a"));
        let b = Action::new(ActionData::titled("b"));
        {
            let store = FileStore::open(&path).unwrap();
            store
                .commit(
                    ChangeSet::new()
                        .put_action(a.clone())
                        .put_action(b.clone())
                        .put_edge(Edge::depends_on(a.id, b.id)),
                )
                .await
                .unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        let snapshot = reopened.snapshot().await.unwrap();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.actions.len(), 2);
        assert_eq!(snapshot.edges.len(), 1);
        assert_eq!(reopened.get_action(&a.id).await.unwrap(), a);
    }

    #[tokio::test]
    async fn failed_commit_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let store = FileStore::open(&path).unwrap();
        let a = Action::new(ActionData::titled("a"));
        store.put_action(a.clone()).await.unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let result = store
            .commit(ChangeSet::new().expect_version(a.id, 9).delete_action(a.id))
            .await;

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert!(store.get_action(&a.id).await.is_ok());
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nothing-here.json")).unwrap();
        assert!(store.path().ends_with("nothing-here.json"));
    }
}
