//! Request and response types for engine operations.

use serde::{Deserialize, Serialize};

use waypoint_core::{Action, ActionData, ActionId, ChildHandling, Edge};

/// Request to create an action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateActionRequest {
    #[serde(flatten)]
    pub data: ActionData,
    /// Attach the new action under this parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ActionId>,
    /// Prerequisites of the new action.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<ActionId>,
}

impl CreateActionRequest {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            data: ActionData::titled(title),
            ..Default::default()
        }
    }

    pub fn under(mut self, parent: ActionId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn depending_on(mut self, prerequisites: impl IntoIterator<Item = ActionId>) -> Self {
        self.depends_on.extend(prerequisites);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedAction {
    pub action: Action,
    pub dependencies_added: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted_action: Action,
    pub children_count: usize,
    pub child_handling: ChildHandling,
    /// Descendants removed along with the action (cascade only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deleted_descendants: Vec<ActionId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedDependency {
    pub removed_edge: Edge,
}

/// Result of attaching or moving a child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub parent_id: ActionId,
    pub child_id: ActionId,
    /// Set when the child was moved away from another parent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_parent: Option<ActionId>,
    pub family_edge: Edge,
    /// The `depends_on(child, parent)` edge derived from `family_edge`.
    pub dependency_edge: Edge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detachment {
    pub former_parent: ActionId,
    pub child: Action,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_reads_flat_json() {
        let parent = ActionId::new();
        let json = serde_json::json!({
            "title": "Draft outline",
            "vision": "A clear structure",
            "parent_id": parent.to_string(),
        });

        let request: CreateActionRequest = serde_json::from_value(json).unwrap();

        assert_eq!(request.data.title, "Draft outline");
        assert_eq!(request.data.vision.as_deref(), Some("A clear structure"));
        assert_eq!(request.parent_id, Some(parent));
        assert!(request.depends_on.is_empty());
    }
}
