//! Build errors for the state machine builder.

use crate::core::StateError;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("end() called on the root builder. There is no parent state to return to")]
    UnbalancedEnd,

    #[error("State \"{name}\" was not closed. Call .end() before .build()")]
    UnclosedState { name: String },
}
