//! Waypoint Store: the Graph Store behind the action graph engine.
//!
//! This crate owns every persisted action and edge row. It exposes plain
//! CRUD plus one atomic write unit ([`ChangeSet`]); it carries no policy
//! about which edges may exist. Backends:
//! - [`MemoryStore`]: process-local, used by tests and dry runs
//! - [`FileStore`]: one JSON document on disk
//! - [`Neo4jStore`]: Cypher over Bolt

pub mod client;
pub mod error;
pub mod file;
pub mod memory;
pub mod mutations;
pub mod queries;
pub mod traits;
pub mod types;

pub use client::Neo4jStore;
pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::GraphStore;
pub use types::{ChangeSet, EdgeFilter, GraphSnapshot, Prerequisites};
