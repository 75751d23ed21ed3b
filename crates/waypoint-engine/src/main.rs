//! CLI entry point for the waypoint action graph.
//!
//! Designed for subprocess invocation from tool handlers: request bodies
//! are read as JSON from stdin, results are written as JSON to stdout, and
//! logs go to stderr.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use waypoint_core::config::{LogConfig, StoreBackend, StoreConfig, WaypointConfig};
use waypoint_core::{ActionId, ActionPatch, ChildHandling};
use waypoint_engine::{ActionEngine, CreateActionRequest};
use waypoint_journal::FileJournal;
use waypoint_store::{FileStore, GraphStore, MemoryStore, Neo4jStore};

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Hierarchical, dependency-ordered action tracking")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: waypoint).
    #[arg(short, long, default_value = "waypoint", global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Create an action (reads a JSON request from stdin).
    Create,
    /// Update fields of an action (reads a JSON patch from stdin).
    Update {
        #[arg(long)]
        id: ActionId,
        /// Version the caller last read.
        #[arg(long)]
        version: u64,
    },
    /// Mark an action done, or not done with --undo.
    Done {
        #[arg(long)]
        id: ActionId,
        #[arg(long)]
        version: u64,
        #[arg(long)]
        undo: bool,
    },
    /// Delete an action.
    Delete {
        #[arg(long)]
        id: ActionId,
        /// orphan, reparent, or cascade.
        #[arg(long, default_value = "orphan")]
        children: ChildHandling,
    },
    /// Make --dst depend on --src.
    Depend {
        #[arg(long)]
        src: ActionId,
        #[arg(long)]
        dst: ActionId,
    },
    /// Remove an explicit dependency.
    Undepend {
        #[arg(long)]
        src: ActionId,
        #[arg(long)]
        dst: ActionId,
    },
    /// Attach a child under a parent.
    Attach {
        #[arg(long)]
        parent: ActionId,
        #[arg(long)]
        child: ActionId,
        #[arg(long)]
        version: Option<u64>,
    },
    /// Make a child independent of its parent.
    Detach {
        #[arg(long)]
        child: ActionId,
        #[arg(long)]
        version: Option<u64>,
    },
    /// Move a child to a new parent.
    Move {
        #[arg(long)]
        child: ActionId,
        #[arg(long)]
        parent: ActionId,
        #[arg(long)]
        version: Option<u64>,
    },
    /// Show the next workable action.
    Next {
        /// Only consider this action and its descendants.
        #[arg(long)]
        scope: Option<ActionId>,
    },
    /// List every workable action in next-action order.
    Workable {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show an action with its neighborhood.
    Context {
        #[arg(long)]
        id: ActionId,
    },
    /// Show a single action.
    Show {
        #[arg(long)]
        id: ActionId,
    },
    /// Verify graph invariants.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = WaypointConfig::load(&cli.config)?;
    init_logging(&config.log);

    let store = open_store(&config.store).await?;
    let mut engine = ActionEngine::new(store);
    if config.journal.enabled {
        engine = engine.with_journal(Arc::new(FileJournal::new(&config.journal.dir)?));
    }

    match cli.command {
        Command::Create => {
            let request: CreateActionRequest = read_stdin()?;
            emit(&engine.create_action(request).await?)?;
        }
        Command::Update { id, version } => {
            let patch: ActionPatch = read_stdin()?;
            emit(&engine.update_action(id, version, patch).await?)?;
        }
        Command::Done { id, version, undo } => {
            emit(&engine.set_done(id, version, !undo).await?)?;
        }
        Command::Delete { id, children } => {
            emit(&engine.delete_action(id, children).await?)?;
        }
        Command::Depend { src, dst } => {
            emit(&engine.add_dependency(src, dst).await?)?;
        }
        Command::Undepend { src, dst } => {
            emit(&engine.remove_dependency(src, dst).await?)?;
        }
        Command::Attach {
            parent,
            child,
            version,
        } => {
            emit(&engine.attach_child(parent, child, version).await?)?;
        }
        Command::Detach { child, version } => {
            emit(&engine.detach_child(child, version).await?)?;
        }
        Command::Move {
            child,
            parent,
            version,
        } => {
            emit(&engine.move_child(child, parent, version).await?)?;
        }
        Command::Next { scope } => {
            emit(&engine.next_action(scope).await?)?;
        }
        Command::Workable { limit } => {
            emit(&engine.workable_actions(limit).await?)?;
        }
        Command::Context { id } => {
            emit(&engine.get_context(id).await?)?;
        }
        Command::Show { id } => {
            emit(&engine.get_action(id).await?)?;
        }
        Command::Check => {
            let report = engine.check_integrity().await?;
            emit(&report)?;
            if !report.is_consistent() {
                anyhow::bail!("{} integrity violation(s) found", report.violations.len());
            }
        }
    }

    Ok(())
}

fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    if log.json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }
}

async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn GraphStore>> {
    let store: Arc<dyn GraphStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(FileStore::open(&config.file_path)?),
        StoreBackend::Neo4j => Arc::new(Neo4jStore::connect(&config.neo4j).await?),
    };
    Ok(store)
}

fn read_stdin<T: serde::de::DeserializeOwned>() -> anyhow::Result<T> {
    let input = std::io::read_to_string(std::io::stdin())?;
    Ok(serde_json::from_str(&input)?)
}

fn emit<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
