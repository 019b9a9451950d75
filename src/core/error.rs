//! Runtime errors for state machine operations.

use super::node::NodeId;
use thiserror::Error;

/// Result alias used by every runtime operation and callback.
pub type StateResult<T = ()> = Result<T, StateError>;

/// Errors that can occur while configuring or driving a state machine.
///
/// All of these are usage errors: they are returned to the direct caller
/// and never retried or recovered internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A transition named a state that is not a child of the node.
    #[error("State \"{name}\" is not a child of \"{parent}\"")]
    NotFound { parent: String, name: String },

    /// A child with the same name is already registered on the node.
    #[error("State \"{name}\" already exists in the children of \"{parent}\"")]
    AlreadyExists { parent: String, name: String },

    /// The operation is not valid in the node's current configuration.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// An event payload or handler value did not have the declared type.
    #[error("Type mismatch for \"{name}\": expected {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The node handle does not address a node of this machine.
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),
}
