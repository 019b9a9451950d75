//! The arena-backed state tree and its runtime operations.
//!
//! Every node lives in a single `Vec` owned by [`StateMachine`]. Parents
//! refer to children by [`NodeId`] and children refer back the same way,
//! so callbacks can freely mutate the tree through a [`StateRef`] while a
//! dispatch is in flight.
//!
//! Dispatch always follows the single path of active-stack tops from a
//! node down to its active leaf. Only that leaf runs its own update action,
//! conditions and event handlers.

use super::condition::Condition;
use super::error::{StateError, StateResult};
use super::event::{EventHandler, PayloadKind};
use super::handle::StateRef;
use super::node::{short_type_name, LifecycleAction, Node, NodeId, NodeStatus, UpdateAction};
use super::snapshot::StateSnapshot;
use std::any::Any;
use tracing::{debug, trace};

/// Hierarchical, stack-based state machine.
///
/// `D` is the caller's elapsed-time type. It is passed to update actions
/// untouched and never interpreted by the machine.
///
/// # Example
///
/// ```rust
/// use statestack::core::{NodeStatus, StateMachine};
///
/// let mut machine = StateMachine::new();
/// let idle = machine.create_state(());
/// let walk = machine.create_state(());
/// machine.root().add_child(idle, "Idle").unwrap();
/// machine.root().add_child(walk, "Walk").unwrap();
///
/// machine.change_state("Idle").unwrap();
/// machine.push_state("Walk").unwrap();
/// assert_eq!(machine.active_path(), vec!["Walk"]);
/// assert_eq!(machine.status(idle).unwrap(), NodeStatus::Suspended);
///
/// machine.pop_state().unwrap();
/// assert_eq!(machine.active_path(), vec!["Idle"]);
/// ```
pub struct StateMachine<D = f32> {
    nodes: Vec<Node<D>>,
}

impl StateMachine<f32> {
    /// Create a machine holding only the anonymous root, ticking with `f32`.
    pub fn new() -> Self {
        Self::with_tick()
    }
}

impl Default for StateMachine<f32> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Copy + 'static> StateMachine<D> {
    /// Create a machine whose update actions receive a `D`.
    pub fn with_tick() -> Self {
        Self {
            nodes: vec![Node::root()],
        }
    }

    /// Handle to the root node.
    pub fn root(&mut self) -> StateRef<'_, D> {
        StateRef::new(self, NodeId::ROOT)
    }

    /// Handle to any node of this machine.
    pub fn state(&mut self, id: NodeId) -> StateResult<StateRef<'_, D>> {
        self.node(id)?;
        Ok(StateRef::new(self, id))
    }

    /// Allocate a detached node carrying `handler`.
    ///
    /// The node takes part in dispatch once it is registered with
    /// [`StateRef::add_child`].
    pub fn create_state<H: Any + Send>(&mut self, handler: H) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(handler));
        id
    }

    /// Number of nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolve a path of child names starting at the root.
    pub fn find(&self, path: &[&str]) -> Option<NodeId> {
        path.iter().try_fold(NodeId::ROOT, |id, name| {
            self.nodes.get(id.0)?.children.get(*name).copied()
        })
    }

    /// Replace the root's active child.
    pub fn change_state(&mut self, name: &str) -> StateResult {
        self.change_state_at(NodeId::ROOT, name)
    }

    /// Push a child of the root above the current one.
    pub fn push_state(&mut self, name: &str) -> StateResult {
        self.push_state_at(NodeId::ROOT, name)
    }

    /// Pop and exit the root's top active child.
    pub fn pop_state(&mut self) -> StateResult {
        self.pop_state_at(NodeId::ROOT)
    }

    /// Deliver one tick to the active leaf.
    pub fn update(&mut self, delta: D) -> StateResult {
        self.update_at(NodeId::ROOT, delta)
    }

    /// Trigger a payload-less event on the active leaf.
    pub fn trigger_event(&mut self, name: &str) -> StateResult {
        self.trigger_event_at(NodeId::ROOT, name, &(), PayloadKind::unit())
    }

    /// Trigger an event carrying `payload` on the active leaf.
    pub fn trigger_event_with<P: Any>(&mut self, name: &str, payload: P) -> StateResult {
        self.trigger_event_at(NodeId::ROOT, name, &payload, PayloadKind::of::<P>())
    }

    /// Exit every active state, leaving the root with an empty stack.
    pub fn exit(&mut self) -> StateResult {
        self.exit_at(NodeId::ROOT)
    }

    /// Name of a node. The root is called `root`; detached nodes have an
    /// empty name.
    pub fn name(&self, id: NodeId) -> StateResult<&str> {
        Ok(&self.node(id)?.name)
    }

    /// Parent of a node, `None` for the root and detached nodes.
    pub fn parent(&self, id: NodeId) -> StateResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Child of `id` registered under `name`.
    pub fn child(&self, id: NodeId, name: &str) -> StateResult<Option<NodeId>> {
        Ok(self.node(id)?.children.get(name).copied())
    }

    /// Active-stack of a node, bottom first.
    pub fn active_children(&self, id: NodeId) -> StateResult<&[NodeId]> {
        Ok(&self.node(id)?.active)
    }

    /// Where a node sits relative to the dispatch path.
    pub fn status(&self, id: NodeId) -> StateResult<NodeStatus> {
        let node = self.node(id)?;
        if id == NodeId::ROOT {
            return Ok(NodeStatus::Dispatching);
        }
        let Some(parent_id) = node.parent else {
            return Ok(NodeStatus::Detached);
        };
        let parent = self.node(parent_id)?;
        if !parent.active.contains(&id) {
            return Ok(NodeStatus::Inactive);
        }
        if parent.top() == Some(id) && self.status(parent_id)? == NodeStatus::Dispatching {
            Ok(NodeStatus::Dispatching)
        } else {
            Ok(NodeStatus::Suspended)
        }
    }

    /// Node reached by following active-stack tops from the root.
    pub fn active_leaf(&self) -> NodeId {
        self.leaf_from(NodeId::ROOT).unwrap_or(NodeId::ROOT)
    }

    /// Names along the dispatch path, excluding the root.
    pub fn active_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = NodeId::ROOT;
        while let Some(top) = self.nodes.get(current.0).and_then(Node::top) {
            path.push(self.nodes[top.0].name.as_str());
            current = top;
        }
        path
    }

    /// Read-only picture of the whole tree.
    pub fn snapshot(&self) -> StateSnapshot {
        self.snapshot_at(NodeId::ROOT)
    }

    fn snapshot_at(&self, id: NodeId) -> StateSnapshot {
        let node = &self.nodes[id.0];
        StateSnapshot {
            name: node.name.clone(),
            handler: short_type_name(node.handler_type).to_string(),
            status: self.status(id).unwrap_or(NodeStatus::Detached),
            active: node
                .active
                .iter()
                .map(|child| self.nodes[child.0].name.clone())
                .collect(),
            children: node
                .children
                .values()
                .map(|child| self.snapshot_at(*child))
                .collect(),
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> StateResult<&Node<D>> {
        self.nodes.get(id.0).ok_or(StateError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> StateResult<&mut Node<D>> {
        self.nodes.get_mut(id.0).ok_or(StateError::UnknownNode(id))
    }

    fn leaf_from(&self, id: NodeId) -> StateResult<NodeId> {
        let mut current = id;
        while let Some(top) = self.node(current)?.top() {
            current = top;
        }
        Ok(current)
    }

    fn lookup(&self, parent: NodeId, name: &str) -> StateResult<NodeId> {
        let node = self.node(parent)?;
        node.children
            .get(name)
            .copied()
            .ok_or_else(|| StateError::NotFound {
                parent: node.name.clone(),
                name: name.to_string(),
            })
    }

    pub(crate) fn add_child_at(&mut self, parent: NodeId, child: NodeId, name: String) -> StateResult {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if child == NodeId::ROOT || child == parent {
            return Err(StateError::InvalidOperation(format!(
                "state {child} cannot be added as a child of {parent}"
            )));
        }
        if let Some(existing) = child_node.parent {
            return Err(StateError::InvalidOperation(format!(
                "state \"{}\" is already a child of \"{}\"",
                child_node.name,
                self.node(existing)?.name
            )));
        }
        if parent_node.children.contains_key(&name) {
            return Err(StateError::AlreadyExists {
                parent: parent_node.name.clone(),
                name,
            });
        }

        // The child must not be an ancestor of its new parent.
        let mut ancestor = parent_node.parent;
        while let Some(id) = ancestor {
            if id == child {
                return Err(StateError::InvalidOperation(format!(
                    "adding {child} under {parent} would create a cycle"
                )));
            }
            ancestor = self.node(id)?.parent;
        }

        self.node_mut(parent)?.children.insert(name.clone(), child);
        let child_node = self.node_mut(child)?;
        child_node.parent = Some(parent);
        child_node.name = name;
        Ok(())
    }

    pub(crate) fn add_child_auto_at(&mut self, parent: NodeId, child: NodeId) -> StateResult {
        let name = short_type_name(self.node(child)?.handler_type).to_string();
        self.add_child_at(parent, child, name)
    }

    pub(crate) fn enter_at(&mut self, id: NodeId) -> StateResult {
        let node = self.node(id)?;
        let on_enter = node.on_enter.clone();
        trace!(state = %node.name, "entering state");
        match on_enter {
            Some(action) => action(&mut StateRef::new(self, id)),
            None => Ok(()),
        }
    }

    pub(crate) fn exit_at(&mut self, id: NodeId) -> StateResult {
        // Tear down the active sub-path first so the deepest state exits first.
        while let Some(top) = self.node_mut(id)?.active.pop() {
            self.exit_at(top)?;
        }
        let node = self.node(id)?;
        let on_exit = node.on_exit.clone();
        trace!(state = %node.name, "exiting state");
        match on_exit {
            Some(action) => action(&mut StateRef::new(self, id)),
            None => Ok(()),
        }
    }

    pub(crate) fn change_state_at(&mut self, id: NodeId, name: &str) -> StateResult {
        let target = self.lookup(id, name)?;
        let parent = self.node(id)?.name.clone();
        debug!(%parent, state = name, "changing state");

        if let Some(top) = self.node_mut(id)?.active.pop() {
            self.exit_at(top)?;
        }
        self.node_mut(id)?.active.push(target);
        self.enter_at(target)
    }

    pub(crate) fn push_state_at(&mut self, id: NodeId, name: &str) -> StateResult {
        let target = self.lookup(id, name)?;
        let parent = self.node(id)?.name.clone();
        debug!(%parent, state = name, "pushing state");

        self.node_mut(id)?.active.push(target);
        self.enter_at(target)
    }

    pub(crate) fn pop_state_at(&mut self, id: NodeId) -> StateResult {
        let node = self.node_mut(id)?;
        let Some(top) = node.active.pop() else {
            return Err(StateError::InvalidOperation(format!(
                "pop_state called on \"{}\" with no active children to pop",
                node.name
            )));
        };
        let (parent, state) = (&self.node(id)?.name, &self.node(top)?.name);
        debug!(%parent, %state, "popping state");
        self.exit_at(top)
    }

    pub(crate) fn update_at(&mut self, id: NodeId, delta: D) -> StateResult {
        let leaf = self.leaf_from(id)?;
        let node = self.node(leaf)?;
        let on_update = node.on_update.clone();
        let conditions = node.conditions.clone();
        trace!(state = %node.name, "updating state");

        let mut state = StateRef::new(self, leaf);
        if let Some(action) = on_update {
            action(&mut state, delta)?;
        }
        for condition in &conditions {
            if condition.check() {
                condition.fire(&mut state)?;
            }
        }
        Ok(())
    }

    pub(crate) fn trigger_event_at(
        &mut self,
        id: NodeId,
        name: &str,
        payload: &dyn Any,
        kind: PayloadKind,
    ) -> StateResult {
        let leaf = self.leaf_from(id)?;
        let node = self.node(leaf)?;
        let Some(handler) = node.events.get(name).cloned() else {
            trace!(state = %node.name, event = name, "ignoring undeclared event");
            return Ok(());
        };
        handler.invoke(name, &mut StateRef::new(self, leaf), payload, kind)
    }

    pub(crate) fn set_enter_action(&mut self, id: NodeId, action: LifecycleAction<D>) -> StateResult {
        self.node_mut(id)?.on_enter = Some(action);
        Ok(())
    }

    pub(crate) fn set_exit_action(&mut self, id: NodeId, action: LifecycleAction<D>) -> StateResult {
        self.node_mut(id)?.on_exit = Some(action);
        Ok(())
    }

    pub(crate) fn set_update_action(&mut self, id: NodeId, action: UpdateAction<D>) -> StateResult {
        self.node_mut(id)?.on_update = Some(action);
        Ok(())
    }

    pub(crate) fn add_condition(&mut self, id: NodeId, condition: Condition<D>) -> StateResult {
        self.node_mut(id)?.conditions.push(condition);
        Ok(())
    }

    pub(crate) fn set_event(&mut self, id: NodeId, name: &str, handler: EventHandler<D>) -> StateResult {
        self.node_mut(id)?.events.insert(name.to_string(), handler);
        Ok(())
    }
}
