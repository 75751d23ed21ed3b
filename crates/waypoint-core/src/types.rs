//! Core domain types for the Waypoint action graph.
//!
//! An action is a unit of trackable work. Actions are connected by two kinds
//! of edges stored in one tagged edge set: `family` (containment, parent to
//! child) and `depends_on` (prerequisite, src must be done before dst).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WaypointError;

// ── Identifiers ───────────────────────────────────────────────────

/// Unique identifier for an action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub Uuid);

impl ActionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActionId {
    type Err = WaypointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| WaypointError::InvalidId(s.to_string()))
    }
}

/// Unique identifier for an edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EdgeId {
    type Err = WaypointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| WaypointError::InvalidId(s.to_string()))
    }
}

// ── Actions ───────────────────────────────────────────────────────

/// Descriptive payload of an action.
///
/// `summaries` is produced by external collaborators and carried through
/// untouched; the engine never looks inside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ActionData {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Desired end-state once the action is done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summaries: Option<serde_json::Value>,
}

impl ActionData {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// A node in the action graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Action {
    pub id: ActionId,
    pub data: ActionData,
    pub done: bool,
    /// Incremented by exactly one on every committed change to this action.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Action {
    pub fn new(data: ActionData) -> Self {
        let now = Utc::now();
        Self {
            id: ActionId::new(),
            data,
            done: false,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy of this action with the version advanced and `updated_at` refreshed.
    pub fn bumped(&self, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.version += 1;
        next.updated_at = now;
        next
    }
}

/// A partial update to an action's fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ActionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summaries: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
}

impl ActionPatch {
    pub fn done(done: bool) -> Self {
        Self {
            done: Some(done),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.vision.is_none()
            && self.summaries.is_none()
            && self.done.is_none()
    }

    /// Names of the fields this patch sets.
    pub fn field_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.title.is_some() {
            names.push("title".to_string());
        }
        if self.description.is_some() {
            names.push("description".to_string());
        }
        if self.vision.is_some() {
            names.push("vision".to_string());
        }
        if self.summaries.is_some() {
            names.push("summaries".to_string());
        }
        if self.done.is_some() {
            names.push("done".to_string());
        }
        names
    }

    /// Write the set fields into `action`. Version and timestamps are left alone.
    pub fn apply_to(&self, action: &mut Action) {
        if let Some(title) = &self.title {
            action.data.title = title.clone();
        }
        if let Some(description) = &self.description {
            action.data.description = Some(description.clone());
        }
        if let Some(vision) = &self.vision {
            action.data.vision = Some(vision.clone());
        }
        if let Some(summaries) = &self.summaries {
            action.data.summaries = Some(summaries.clone());
        }
        if let Some(done) = self.done {
            action.done = done;
        }
    }
}

// ── Edges ─────────────────────────────────────────────────────────

/// The kind of relationship an edge expresses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Containment: `src` is the parent, `dst` the child.
    Family,
    /// Prerequisite: `src` must be done before `dst` may be done.
    DependsOn,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Family => "family",
            EdgeKind::DependsOn => "depends_on",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed, kind-tagged edge between two actions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub src: ActionId,
    pub dst: ActionId,
    pub kind: EdgeKind,
    /// Set on the system-managed `depends_on(child, parent)` edge; names the
    /// family edge it mirrors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<EdgeId>,
    /// The derived edge was an explicit prerequisite before the family edge
    /// took it over; detaching hands it back instead of deleting it.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub adopted: bool,
    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// `family(parent, child)`.
    pub fn family(parent: ActionId, child: ActionId) -> Self {
        Self {
            id: EdgeId::new(),
            src: parent,
            dst: child,
            kind: EdgeKind::Family,
            derived_from: None,
            adopted: false,
            created_at: Utc::now(),
        }
    }

    /// `depends_on(src, dst)`: `dst` cannot be done until `src` is.
    pub fn depends_on(src: ActionId, dst: ActionId) -> Self {
        Self {
            id: EdgeId::new(),
            src,
            dst,
            kind: EdgeKind::DependsOn,
            derived_from: None,
            adopted: false,
            created_at: Utc::now(),
        }
    }

    /// The `depends_on(child, parent)` edge mirroring a family edge.
    pub fn derived_from_family(family: &Edge) -> Self {
        let mut edge = Self::depends_on(family.dst, family.src);
        edge.derived_from = Some(family.id);
        edge
    }

    /// Take over an explicit `depends_on(child, parent)` as the derived
    /// edge of `family`.
    pub fn adopt(&mut self, family: &Edge) {
        self.derived_from = Some(family.id);
        self.adopted = true;
    }

    /// Turn an adopted edge back into the explicit prerequisite it was.
    pub fn release(&mut self) {
        self.derived_from = None;
        self.adopted = false;
    }

    pub fn is_derived(&self) -> bool {
        self.derived_from.is_some()
    }

    pub fn touches(&self, id: &ActionId) -> bool {
        &self.src == id || &self.dst == id
    }
}

// ── Deletion policy ───────────────────────────────────────────────

/// What happens to an action's children when it is deleted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChildHandling {
    /// Children lose their parent and become independent.
    #[default]
    Orphan,
    /// Children move up to the deleted action's parent (orphaned if none).
    #[serde(alias = "reparentToGrandparent", alias = "reparent")]
    ReparentToGrandparent,
    /// Children are deleted recursively with the same policy.
    #[serde(alias = "cascadeDelete", alias = "cascade")]
    CascadeDelete,
}

impl ChildHandling {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChildHandling::Orphan => "orphan",
            ChildHandling::ReparentToGrandparent => "reparent_to_grandparent",
            ChildHandling::CascadeDelete => "cascade_delete",
        }
    }
}

impl fmt::Display for ChildHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChildHandling {
    type Err = WaypointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "orphan" => Ok(ChildHandling::Orphan),
            "reparent" | "reparent_to_grandparent" | "reparenttograndparent" => {
                Ok(ChildHandling::ReparentToGrandparent)
            }
            "cascade" | "cascade_delete" | "cascadedelete" => Ok(ChildHandling::CascadeDelete),
            _ => Err(WaypointError::UnknownChildHandling(s.to_string())),
        }
    }
}
