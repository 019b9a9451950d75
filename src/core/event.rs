//! Named event handlers with a declared payload kind.
//!
//! Every handler records the type of payload it expects. Triggering an
//! event checks the supplied payload against that declaration before the
//! handler runs, so a wrong payload surfaces as
//! [`StateError::TypeMismatch`] instead of a failed cast inside user code.

use super::error::{StateError, StateResult};
use super::handle::StateRef;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

type EventAction<D> = Arc<dyn Fn(&mut StateRef<'_, D>, &dyn Any) -> StateResult + Send + Sync>;

/// Runtime tag for an event payload type.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PayloadKind {
    id: TypeId,
    name: &'static str,
}

impl PayloadKind {
    /// Kind of payload `P`.
    pub fn of<P: Any>() -> Self {
        PayloadKind {
            id: TypeId::of::<P>(),
            name: std::any::type_name::<P>(),
        }
    }

    /// Kind used by events declared without a payload.
    pub fn unit() -> Self {
        Self::of::<()>()
    }

    /// Type name of the payload.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this kind describes `P`.
    pub fn is<P: Any>(&self) -> bool {
        self.id == TypeId::of::<P>()
    }
}

impl fmt::Debug for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PayloadKind").field(&self.name).finish()
    }
}

/// Handler bound to an event name on a state.
pub struct EventHandler<D> {
    kind: PayloadKind,
    action: EventAction<D>,
}

impl<D: Copy + 'static> EventHandler<D> {
    /// Handler for an event that carries no payload.
    ///
    /// The handler only accepts payload-less triggers. Triggering it with any
    /// payload fails with [`StateError::TypeMismatch`] before the action runs.
    pub fn new<F>(action: F) -> Self
    where
        F: Fn(&mut StateRef<'_, D>) -> StateResult + Send + Sync + 'static,
    {
        EventHandler {
            kind: PayloadKind::unit(),
            action: Arc::new(move |state: &mut StateRef<'_, D>, _: &dyn Any| action(state)),
        }
    }

    /// Handler for an event carrying a `P` payload.
    pub fn with_payload<P, F>(action: F) -> Self
    where
        P: Any,
        F: Fn(&mut StateRef<'_, D>, &P) -> StateResult + Send + Sync + 'static,
    {
        EventHandler {
            kind: PayloadKind::of::<P>(),
            action: Arc::new(
                move |state: &mut StateRef<'_, D>, payload: &dyn Any| match payload
                    .downcast_ref::<P>()
                {
                    Some(payload) => action(state, payload),
                    // Unreachable through `invoke`, which checks the kind first.
                    None => Err(StateError::TypeMismatch {
                        name: state.name().to_string(),
                        expected: std::any::type_name::<P>(),
                        found: "unknown",
                    }),
                },
            ),
        }
    }

    /// Declared payload kind.
    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    pub(crate) fn invoke(
        &self,
        event: &str,
        state: &mut StateRef<'_, D>,
        payload: &dyn Any,
        supplied: PayloadKind,
    ) -> StateResult {
        if supplied != self.kind {
            return Err(StateError::TypeMismatch {
                name: event.to_string(),
                expected: self.kind.name,
                found: supplied.name,
            });
        }
        (self.action)(state, payload)
    }
}

impl<D> Clone for EventHandler<D> {
    fn clone(&self) -> Self {
        EventHandler {
            kind: self.kind,
            action: Arc::clone(&self.action),
        }
    }
}
