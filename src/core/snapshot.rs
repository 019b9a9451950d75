//! Read-only snapshots of a state tree for diagnostics.
//!
//! Snapshots describe structure and activity only. They carry no actions
//! or handler values and cannot be loaded back into a machine.

use super::node::NodeStatus;
use serde::{Deserialize, Serialize};

/// One node of a [`StateMachine::snapshot`](super::StateMachine::snapshot).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Name under which the node is registered with its parent.
    pub name: String,
    /// Short type name of the node's handler value.
    pub handler: String,
    /// Position relative to the dispatch path.
    pub status: NodeStatus,
    /// Names on the node's active-stack, bottom first.
    pub active: Vec<String>,
    /// All declared children, ordered by name.
    pub children: Vec<StateSnapshot>,
}

impl StateSnapshot {
    /// Descendant reached by following child names.
    pub fn find(&self, path: &[&str]) -> Option<&StateSnapshot> {
        path.iter().try_fold(self, |node, name| {
            node.children.iter().find(|child| child.name == *name)
        })
    }

    /// Pretty-printed JSON, for logs and debugging tools.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
