//! Configuration management for Waypoint services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (WAYPOINT__ prefix, `__` separator)
//! 2. Config file (waypoint.toml, or any prefix passed to [`WaypointConfig::load`])
//! 3. Defaults

use serde::Deserialize;

use crate::error::WaypointError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaypointConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub journal: JournalConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl WaypointConfig {
    /// Load configuration from `{file_prefix}.toml` (optional) and the environment.
    pub fn load(file_prefix: &str) -> Result<Self, WaypointError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("WAYPOINT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: WaypointConfig = cfg.try_deserialize()?;
        tracing::debug!(backend = ?loaded.store.backend, "Configuration loaded");
        Ok(loaded)
    }
}

/// Which Graph Store implementation backs the engine.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local, lost on exit. Useful for tests and dry runs.
    Memory,
    /// A single JSON document on disk.
    #[default]
    File,
    Neo4j,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Path of the JSON document used by the file backend.
    #[serde(default = "default_file_path")]
    pub file_path: String,

    #[serde(default)]
    pub neo4j: Neo4jConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            file_path: default_file_path(),
            neo4j: Neo4jConfig::default(),
        }
    }
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jConfig {
    #[serde(default = "default_neo4j_uri")]
    pub uri: String,
    #[serde(default = "default_neo4j_user")]
    pub user: String,
    #[serde(default = "default_neo4j_password")]
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: default_neo4j_uri(),
            user: default_neo4j_user(),
            password: default_neo4j_password(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

/// Mutation journal settings.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_journal_dir")]
    pub dir: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_journal_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Fallback filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_file_path() -> String {
    "./waypoint.json".to_string()
}

fn default_neo4j_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_neo4j_user() -> String {
    "neo4j".to_string()
}

fn default_neo4j_password() -> String {
    "waypoint-dev".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_journal_dir() -> String {
    "./journal".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}
