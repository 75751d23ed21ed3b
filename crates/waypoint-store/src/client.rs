//! Neo4j connection management and the Neo4j-backed Graph Store.
//!
//! Actions are `(:Action)` nodes keyed by `id`. Edges are `[:FAMILY]` and
//! `[:DEPENDS_ON]` relationships carrying their own `id`. A single
//! `(:GraphMeta {key: 'graph'})` node holds the graph revision and is
//! write-locked at the start of every commit.

use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query, Row, Txn};

use waypoint_core::config::Neo4jConfig;
use waypoint_core::{Action, ActionId, Edge};

use crate::error::StoreError;
use crate::traits::GraphStore;
use crate::types::{ChangeSet, EdgeFilter, GraphSnapshot, Prerequisites};

/// Thread-safe Neo4j client with connection pooling.
///
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    /// Connect to Neo4j and make sure the id constraint exists.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, StoreError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { graph };
        store.ensure_schema().await?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(store)
    }

    /// Get a reference to the underlying neo4rs Graph for direct operations.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.run(neo4rs::query(
            "CREATE CONSTRAINT action_id IF NOT EXISTS FOR (a:Action) REQUIRE a.id IS UNIQUE",
        ))
        .await
    }

    /// Execute a write-only query.
    pub async fn run(&self, query: Query) -> Result<(), StoreError> {
        self.graph.run(query).await?;
        Ok(())
    }

    /// Execute a read query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<Row>, StoreError> {
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a read query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<Row>, StoreError> {
        let mut stream = self.graph.execute(query).await?;
        Ok(stream.next().await?)
    }

    /// Begin a transaction.
    pub async fn start_txn(&self) -> Result<Txn, StoreError> {
        Ok(self.graph.start_txn().await?)
    }
}

/// Run a query inside a transaction and collect its rows.
pub(crate) async fn txn_rows(txn: &mut Txn, query: Query) -> Result<Vec<Row>, StoreError> {
    let mut stream = txn.execute(query).await?;
    let mut rows = Vec::new();
    while let Some(row) = stream.next(txn.handle()).await? {
        rows.push(row);
    }
    Ok(rows)
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn get_action(&self, id: &ActionId) -> Result<Action, StoreError> {
        self.fetch_action(id).await
    }

    async fn get_actions(&self, ids: &[ActionId]) -> Result<Vec<Action>, StoreError> {
        self.fetch_actions(ids).await
    }

    async fn get_children(&self, id: &ActionId) -> Result<Vec<Action>, StoreError> {
        self.fetch_children(id).await
    }

    async fn get_parent(&self, id: &ActionId) -> Result<Option<Action>, StoreError> {
        self.fetch_parent(id).await
    }

    async fn get_edges(&self, filter: &EdgeFilter) -> Result<Vec<Edge>, StoreError> {
        self.fetch_edges(filter).await
    }

    async fn get_prerequisites(&self, id: &ActionId) -> Result<Prerequisites, StoreError> {
        self.fetch_prerequisites(id).await
    }

    async fn snapshot(&self) -> Result<GraphSnapshot, StoreError> {
        self.fetch_snapshot().await
    }

    async fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
        self.commit_changes(&changes).await
    }
}
