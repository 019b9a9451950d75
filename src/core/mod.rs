//! Core runtime of the hierarchical state machine.
//!
//! This module contains the state tree and everything that runs on it:
//! - Arena nodes addressed by [`NodeId`]
//! - Transitions (`change_state`, `push_state`, `pop_state`)
//! - Update dispatch with polled [`Condition`]s
//! - Named events with a checked payload kind
//!
//! Dispatch always reaches exactly one node, the active leaf, found by
//! following the top of each active-stack down from the root.

mod condition;
mod error;
mod event;
mod handle;
mod machine;
mod node;
mod snapshot;

pub use condition::Condition;
pub use error::{StateError, StateResult};
pub use event::{EventHandler, PayloadKind};
pub use handle::StateRef;
pub use machine::StateMachine;
pub use node::{handler_name, LifecycleAction, NodeId, NodeStatus, UpdateAction};
pub use snapshot::StateSnapshot;
