//! Node handles passed to host code and callbacks.

use super::condition::Condition;
use super::error::{StateError, StateResult};
use super::event::{EventHandler, PayloadKind};
use super::machine::StateMachine;
use super::node::{NodeId, NodeStatus};
use std::any::Any;
use std::sync::Arc;

/// Mutable handle to one node of a [`StateMachine`].
///
/// A handle borrows the whole machine, so every runtime operation is
/// available from inside a callback: a state can change its own children,
/// ask its parent to pop it, or trigger an event on the machine. Changes
/// take effect immediately.
///
/// # Example
///
/// ```rust
/// use statestack::core::StateMachine;
///
/// #[derive(Default)]
/// struct Hunting {
///     meals: u32,
/// }
///
/// let mut machine = StateMachine::new();
/// let hunting = machine.create_state(Hunting::default());
/// let mut root = machine.root();
/// root.add_child_auto(hunting).unwrap();
/// root.change_state("Hunting").unwrap();
///
/// let mut state = machine.state(hunting).unwrap();
/// state.handler_mut::<Hunting>().unwrap().meals += 1;
/// assert_eq!(state.handler::<Hunting>().unwrap().meals, 1);
/// state.parent().unwrap().pop_state().unwrap();
/// assert!(machine.active_path().is_empty());
/// ```
pub struct StateRef<'a, D = f32> {
    machine: &'a mut StateMachine<D>,
    id: NodeId,
}

impl<'a, D: Copy + 'static> StateRef<'a, D> {
    pub(crate) fn new(machine: &'a mut StateMachine<D>, id: NodeId) -> Self {
        StateRef { machine, id }
    }

    /// Id of the node this handle points at.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Name the node was registered under.
    pub fn name(&self) -> &str {
        self.machine.name(self.id).unwrap_or_default()
    }

    /// The machine the node belongs to.
    pub fn machine(&mut self) -> &mut StateMachine<D> {
        self.machine
    }

    /// Id of the parent node, if any.
    pub fn parent_id(&self) -> Option<NodeId> {
        self.machine.parent(self.id).ok().flatten()
    }

    /// Handle to the parent node.
    ///
    /// Fails with [`StateError::InvalidOperation`] on the root and on
    /// detached nodes.
    pub fn parent(&mut self) -> StateResult<StateRef<'_, D>> {
        let parent = self.parent_id().ok_or_else(|| {
            StateError::InvalidOperation(format!("state \"{}\" has no parent", self.name()))
        })?;
        Ok(StateRef::new(self.machine, parent))
    }

    /// Child registered under `name`.
    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.machine.child(self.id, name).ok().flatten()
    }

    /// Active-stack of this node, bottom first.
    pub fn active_children(&self) -> &[NodeId] {
        self.machine.active_children(self.id).unwrap_or_default()
    }

    /// Position of this node relative to the dispatch path.
    pub fn status(&self) -> StateResult<NodeStatus> {
        self.machine.status(self.id)
    }

    /// The handler value attached when the node was created.
    pub fn handler<H: Any>(&self) -> StateResult<&H> {
        let node = self.machine.node(self.id)?;
        node.handler
            .downcast_ref::<H>()
            .ok_or_else(|| StateError::TypeMismatch {
                name: node.name.clone(),
                expected: std::any::type_name::<H>(),
                found: node.handler_type,
            })
    }

    /// Mutable access to the handler value.
    pub fn handler_mut<H: Any>(&mut self) -> StateResult<&mut H> {
        let node = self.machine.node_mut(self.id)?;
        match node.handler.downcast_mut::<H>() {
            Some(handler) => Ok(handler),
            None => Err(StateError::TypeMismatch {
                name: node.name.clone(),
                expected: std::any::type_name::<H>(),
                found: node.handler_type,
            }),
        }
    }

    /// Register a detached node as a child under `name`.
    pub fn add_child(&mut self, child: NodeId, name: &str) -> StateResult {
        self.machine.add_child_at(self.id, child, name.to_string())
    }

    /// Register a detached node under the short name of its handler type.
    pub fn add_child_auto(&mut self, child: NodeId) -> StateResult {
        self.machine.add_child_auto_at(self.id, child)
    }

    /// Exit the current active child, if any, and enter `name` in its place.
    pub fn change_state(&mut self, name: &str) -> StateResult {
        self.machine.change_state_at(self.id, name)
    }

    /// Enter `name` above the current active child, suspending it.
    pub fn push_state(&mut self, name: &str) -> StateResult {
        self.machine.push_state_at(self.id, name)
    }

    /// Exit the top active child. The child beneath resumes without being
    /// entered again.
    pub fn pop_state(&mut self) -> StateResult {
        self.machine.pop_state_at(self.id)
    }

    /// Update the active leaf below this node.
    pub fn update(&mut self, delta: D) -> StateResult {
        self.machine.update_at(self.id, delta)
    }

    /// Run this node's enter action.
    pub fn enter(&mut self) -> StateResult {
        self.machine.enter_at(self.id)
    }

    /// Exit this node's active sub-path, then run its exit action.
    pub fn exit(&mut self) -> StateResult {
        self.machine.exit_at(self.id)
    }

    /// Trigger a payload-less event on the active leaf below this node.
    pub fn trigger_event(&mut self, name: &str) -> StateResult {
        self.machine
            .trigger_event_at(self.id, name, &(), PayloadKind::unit())
    }

    /// Trigger an event carrying `payload` on the active leaf below this node.
    pub fn trigger_event_with<P: Any>(&mut self, name: &str, payload: P) -> StateResult {
        self.machine
            .trigger_event_at(self.id, name, &payload, PayloadKind::of::<P>())
    }

    /// Set the action run when this node is entered, replacing any previous one.
    pub fn set_enter_action<F>(&mut self, action: F) -> StateResult
    where
        F: Fn(&mut StateRef<'_, D>) -> StateResult + Send + Sync + 'static,
    {
        self.machine.set_enter_action(self.id, Arc::new(action))
    }

    /// Set the action run when this node is exited, after its active
    /// children have exited.
    pub fn set_exit_action<F>(&mut self, action: F) -> StateResult
    where
        F: Fn(&mut StateRef<'_, D>) -> StateResult + Send + Sync + 'static,
    {
        self.machine.set_exit_action(self.id, Arc::new(action))
    }

    /// Set the action run on each update while this node is the active leaf.
    /// It receives the elapsed time passed to `update`.
    pub fn set_update_action<F>(&mut self, action: F) -> StateResult
    where
        F: Fn(&mut StateRef<'_, D>, D) -> StateResult + Send + Sync + 'static,
    {
        self.machine.set_update_action(self.id, Arc::new(action))
    }

    /// Append a condition polled on every update while this node is the
    /// active leaf.
    pub fn set_condition<P, F>(&mut self, predicate: P, action: F) -> StateResult
    where
        P: Fn() -> bool + Send + Sync + 'static,
        F: Fn(&mut StateRef<'_, D>) -> StateResult + Send + Sync + 'static,
    {
        self.machine
            .add_condition(self.id, Condition::new(predicate, action))
    }

    /// Bind a payload-less event, replacing any handler with the same name.
    pub fn set_event<F>(&mut self, name: &str, action: F) -> StateResult
    where
        F: Fn(&mut StateRef<'_, D>) -> StateResult + Send + Sync + 'static,
    {
        self.machine
            .set_event(self.id, name, EventHandler::new(action))
    }

    /// Bind an event carrying a `P` payload, replacing any handler with the
    /// same name.
    pub fn set_event_with<P, F>(&mut self, name: &str, action: F) -> StateResult
    where
        P: Any,
        F: Fn(&mut StateRef<'_, D>, &P) -> StateResult + Send + Sync + 'static,
    {
        self.machine
            .set_event(self.id, name, EventHandler::with_payload(action))
    }
}
