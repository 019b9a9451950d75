//! Fluent builder for state trees.

use crate::builder::error::BuildError;
use crate::core::{handler_name, NodeId, StateMachine, StateRef, StateResult};
use std::any::Any;
use tracing::debug;

/// Cursor-based builder for constructing state machines with a fluent API.
///
/// The builder always points at one node, the state currently being
/// configured. [`state`](Self::state) moves the cursor into a new child,
/// [`end`](Self::end) moves it back to the parent. Construction errors are
/// recorded and reported by [`build`](Self::build), so chains never need to
/// be broken up to handle them.
///
/// # Example
///
/// ```rust
/// use statestack::builder::StateMachineBuilder;
///
/// #[derive(Default)]
/// struct Swimming;
///
/// #[derive(Default)]
/// struct Hunting;
///
/// let mut machine = StateMachineBuilder::new()
///     .state_auto::<Swimming>()
///         .update(|state, _dt| state.push_state("Hunting"))
///         .state_auto::<Hunting>()
///             .update(|state, _dt| state.parent()?.pop_state())
///         .end()
///     .end()
///     .build()
///     .unwrap();
///
/// machine.change_state("Swimming").unwrap();
/// machine.update(1.0).unwrap();
/// assert_eq!(machine.active_path(), vec!["Swimming", "Hunting"]);
/// machine.update(1.0).unwrap();
/// assert_eq!(machine.active_path(), vec!["Swimming"]);
/// ```
pub struct StateMachineBuilder<D = f32> {
    machine: StateMachine<D>,
    cursor: NodeId,
    parents: Vec<NodeId>,
    error: Option<BuildError>,
}

impl StateMachineBuilder<f32> {
    /// Create a builder scoped to a fresh anonymous root.
    pub fn new() -> Self {
        Self::with_tick()
    }
}

impl Default for StateMachineBuilder<f32> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Copy + 'static> StateMachineBuilder<D> {
    /// Create a builder for a machine whose update actions receive a `D`.
    pub fn with_tick() -> Self {
        Self {
            machine: StateMachine::with_tick(),
            cursor: NodeId::ROOT,
            parents: Vec::new(),
            error: None,
        }
    }

    /// Node currently being configured.
    pub fn current(&self) -> NodeId {
        self.cursor
    }

    /// Number of open child states above the root.
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    /// Add a child named `name` carrying `H::default()` and move into it.
    pub fn state<H: Any + Send + Default>(self, name: &str) -> Self {
        self.state_with(name, H::default())
    }

    /// Add a child named after `H` and move into it.
    pub fn state_auto<H: Any + Send + Default>(self) -> Self {
        self.state_with(handler_name::<H>(), H::default())
    }

    /// Add a child named `name` carrying `handler` and move into it.
    pub fn state_with<H: Any + Send>(mut self, name: &str, handler: H) -> Self {
        let child = self.machine.create_state(handler);
        if let Err(err) = self
            .machine
            .state(self.cursor)
            .and_then(|mut parent| parent.add_child(child, name))
        {
            self.record(err.into());
        }
        // The cursor moves even on failure so the surrounding end() calls
        // stay balanced.
        self.parents.push(self.cursor);
        self.cursor = child;
        self
    }

    /// Set the action run when the current state is entered.
    pub fn enter<F>(self, action: F) -> Self
    where
        F: Fn(&mut StateRef<'_, D>) -> StateResult + Send + Sync + 'static,
    {
        self.configure(|state| state.set_enter_action(action))
    }

    /// Set the action run when the current state is exited.
    pub fn exit<F>(self, action: F) -> Self
    where
        F: Fn(&mut StateRef<'_, D>) -> StateResult + Send + Sync + 'static,
    {
        self.configure(|state| state.set_exit_action(action))
    }

    /// Set the action run on every update that reaches the current state.
    pub fn update<F>(self, action: F) -> Self
    where
        F: Fn(&mut StateRef<'_, D>, D) -> StateResult + Send + Sync + 'static,
    {
        self.configure(|state| state.set_update_action(action))
    }

    /// Add an action that fires on each update while `predicate` holds.
    pub fn condition<P, F>(self, predicate: P, action: F) -> Self
    where
        P: Fn() -> bool + Send + Sync + 'static,
        F: Fn(&mut StateRef<'_, D>) -> StateResult + Send + Sync + 'static,
    {
        self.configure(|state| state.set_condition(predicate, action))
    }

    /// Bind a payload-less event on the current state.
    pub fn event<F>(self, name: &str, action: F) -> Self
    where
        F: Fn(&mut StateRef<'_, D>) -> StateResult + Send + Sync + 'static,
    {
        self.configure(|state| state.set_event(name, action))
    }

    /// Bind an event carrying a `P` payload on the current state.
    pub fn event_with<P, F>(self, name: &str, action: F) -> Self
    where
        P: Any,
        F: Fn(&mut StateRef<'_, D>, &P) -> StateResult + Send + Sync + 'static,
    {
        self.configure(|state| state.set_event_with(name, action))
    }

    /// Finish the current state and return to its parent.
    pub fn end(mut self) -> Self {
        match self.parents.pop() {
            Some(parent) => self.cursor = parent,
            None => self.record(BuildError::UnbalancedEnd),
        }
        self
    }

    /// Finish construction and return the machine.
    ///
    /// Returns the first error recorded while building, or an error if a
    /// child state was left open.
    pub fn build(self) -> Result<StateMachine<D>, BuildError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.parents.is_empty() {
            return Err(BuildError::UnclosedState {
                name: self.machine.name(self.cursor)?.to_string(),
            });
        }
        debug!(states = self.machine.node_count() - 1, "built state machine");
        Ok(self.machine)
    }

    fn configure<F>(mut self, apply: F) -> Self
    where
        F: FnOnce(&mut StateRef<'_, D>) -> StateResult,
    {
        if let Err(err) = self
            .machine
            .state(self.cursor)
            .and_then(|mut state| apply(&mut state))
        {
            self.record(err.into());
        }
        self
    }

    fn record(&mut self, err: BuildError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
