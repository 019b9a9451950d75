//! Arena nodes that make up the state tree.
//!
//! A node never owns its parent: the parent link is a plain [`NodeId`]
//! into the same arena, so the tree can be mutated from inside callbacks
//! without reference cycles.

use super::condition::Condition;
use super::error::StateResult;
use super::event::EventHandler;
use super::handle::StateRef;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Callback invoked on enter, on exit, and when a condition fires.
pub type LifecycleAction<D> = Arc<dyn Fn(&mut StateRef<'_, D>) -> StateResult + Send + Sync>;

/// Callback invoked on update with the caller's elapsed-time value.
pub type UpdateAction<D> = Arc<dyn Fn(&mut StateRef<'_, D>, D) -> StateResult + Send + Sync>;

/// Stable handle to a node in a [`StateMachine`](super::StateMachine).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The anonymous root every machine starts with.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a node currently sits in the dispatch structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    /// Created but not yet registered as anyone's child.
    Detached,
    /// Registered with a parent, not on its active-stack.
    Inactive,
    /// On the root-to-leaf dispatch path.
    Dispatching,
    /// On its parent's active-stack but not receiving dispatch.
    Suspended,
}

impl NodeStatus {
    /// Dispatching or suspended.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Dispatching | Self::Suspended)
    }
}

/// Short name for a handler type, used when a child is added without an
/// explicit name.
///
/// Module paths and generic arguments are dropped, so `game::Hunting<u8>`
/// becomes `Hunting`.
pub fn handler_name<H: ?Sized>() -> &'static str {
    short_type_name(std::any::type_name::<H>())
}

pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

pub(crate) struct Node<D> {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: BTreeMap<String, NodeId>,
    pub(crate) active: Vec<NodeId>,
    pub(crate) on_enter: Option<LifecycleAction<D>>,
    pub(crate) on_update: Option<UpdateAction<D>>,
    pub(crate) on_exit: Option<LifecycleAction<D>>,
    pub(crate) conditions: Vec<Condition<D>>,
    pub(crate) events: HashMap<String, EventHandler<D>>,
    pub(crate) handler: Box<dyn Any + Send>,
    pub(crate) handler_type: &'static str,
}

impl<D> Node<D> {
    pub(crate) fn new<H: Any + Send>(handler: H) -> Self {
        Self {
            name: String::new(),
            parent: None,
            children: BTreeMap::new(),
            active: Vec::new(),
            on_enter: None,
            on_update: None,
            on_exit: None,
            conditions: Vec::new(),
            events: HashMap::new(),
            handler: Box::new(handler),
            handler_type: std::any::type_name::<H>(),
        }
    }

    pub(crate) fn root() -> Self {
        Self {
            name: "root".to_string(),
            ..Self::new(())
        }
    }

    pub(crate) fn top(&self) -> Option<NodeId> {
        self.active.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Hunting;

    #[allow(dead_code)]
    struct Wrapper<T>(T);

    #[test]
    fn handler_name_drops_module_path() {
        assert_eq!(handler_name::<Hunting>(), "Hunting");
    }

    #[test]
    fn handler_name_drops_generic_arguments() {
        assert_eq!(handler_name::<Wrapper<Hunting>>(), "Wrapper");
    }

    #[test]
    fn handler_name_of_unit() {
        assert_eq!(handler_name::<()>(), "()");
    }

    #[test]
    fn root_id_is_first_slot() {
        assert_eq!(NodeId::ROOT.index(), 0);
        assert_eq!(NodeId::ROOT.to_string(), "#0");
    }

    #[test]
    fn new_node_is_empty() {
        let node: Node<f32> = Node::new(5u8);
        assert!(node.name.is_empty());
        assert!(node.parent.is_none());
        assert!(node.top().is_none());
        assert_eq!(node.handler_type, "u8");
    }

    #[test]
    fn active_statuses() {
        assert!(NodeStatus::Dispatching.is_active());
        assert!(NodeStatus::Suspended.is_active());
        assert!(!NodeStatus::Inactive.is_active());
        assert!(!NodeStatus::Detached.is_active());
    }
}
