//! Polled conditions attached to a state.
//!
//! A condition pairs a boolean predicate with an action. On every update
//! that reaches the active leaf, the leaf's conditions are evaluated in
//! declaration order and each one whose predicate is currently true fires
//! its action. There is no edge detection: a condition that stays true
//! fires on every tick.

use super::error::StateResult;
use super::handle::StateRef;
use super::node::LifecycleAction;
use std::sync::Arc;

/// Predicate/action pair evaluated during update.
///
/// # Example
///
/// ```rust
/// use statestack::core::Condition;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// let hungry = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&hungry);
/// let condition: Condition<f32> = Condition::new(
///     move || flag.load(Ordering::SeqCst),
///     |state| state.parent()?.push_state("Hunting"),
/// );
///
/// assert!(!condition.check());
/// hungry.store(true, Ordering::SeqCst);
/// assert!(condition.check());
/// ```
pub struct Condition<D> {
    predicate: Arc<dyn Fn() -> bool + Send + Sync>,
    action: LifecycleAction<D>,
}

impl<D> Condition<D> {
    /// Pair a predicate with the action to run while it holds.
    pub fn new<P, A>(predicate: P, action: A) -> Self
    where
        P: Fn() -> bool + Send + Sync + 'static,
        A: Fn(&mut StateRef<'_, D>) -> StateResult + Send + Sync + 'static,
    {
        Condition {
            predicate: Arc::new(predicate),
            action: Arc::new(action),
        }
    }

    /// Evaluate the predicate.
    pub fn check(&self) -> bool {
        (self.predicate)()
    }

    pub(crate) fn fire(&self, state: &mut StateRef<'_, D>) -> StateResult {
        (self.action)(state)
    }
}

impl<D> Clone for Condition<D> {
    fn clone(&self) -> Self {
        Condition {
            predicate: Arc::clone(&self.predicate),
            action: Arc::clone(&self.action),
        }
    }
}
