//! waypoint-core: Shared types, configuration, and error handling for Waypoint.
//!
//! This crate provides the foundational types used across all Waypoint components:
//! - Actions (units of work) and their payload
//! - Edges of both kinds (family containment, depends_on prerequisites)
//! - Change events emitted by committed mutations
//! - Configuration management
//! - Common error types

pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use error::WaypointError;
pub use types::{Action, ActionData, ActionId, ActionPatch, ChildHandling, Edge, EdgeId, EdgeKind};
