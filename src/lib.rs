//! Statestack: a hierarchical, stack-based state machine runtime
//!
//! States form a tree. Every state keeps a stack of active children, and
//! the path of stack tops from the root down is the only path that receives
//! updates and events. Pushing a state suspends the one beneath it without
//! exiting it; popping resumes the suspended state without entering it again.
//!
//! # Core Concepts
//!
//! - **StateMachine**: Arena of states with `change_state`, `push_state`,
//!   `pop_state`, `update` and `trigger_event`
//! - **StateRef**: Handle given to callbacks, with full access to the machine
//! - **Conditions**: Predicates polled on every update of the active leaf
//! - **Events**: Named handlers with a payload type checked at trigger time
//! - **StateMachineBuilder**: Fluent, cursor-based tree construction
//!
//! # Example
//!
//! ```rust
//! use statestack::StateMachineBuilder;
//! use std::sync::atomic::{AtomicI32, Ordering};
//! use std::sync::Arc;
//!
//! let hunger = Arc::new(AtomicI32::new(0));
//! let (swim, hunt, full) = (hunger.clone(), hunger.clone(), hunger.clone());
//!
//! let mut shark = StateMachineBuilder::new()
//!     .state::<()>("Swimming")
//!         .update(move |_, _| {
//!             swim.fetch_add(1, Ordering::SeqCst);
//!             Ok(())
//!         })
//!         .condition(
//!             move || hunt.load(Ordering::SeqCst) > 2,
//!             |state| state.push_state("Hunting"),
//!         )
//!         .state::<()>("Hunting")
//!             .enter(move |_| {
//!                 full.store(0, Ordering::SeqCst);
//!                 Ok(())
//!             })
//!             .update(|state, _| state.parent()?.pop_state())
//!         .end()
//!     .end()
//!     .build()
//!     .unwrap();
//!
//! shark.change_state("Swimming").unwrap();
//! for _ in 0..3 {
//!     shark.update(1.0).unwrap();
//! }
//! assert_eq!(shark.active_path(), vec!["Swimming", "Hunting"]);
//! assert_eq!(hunger.load(Ordering::SeqCst), 0);
//!
//! shark.update(1.0).unwrap();
//! assert_eq!(shark.active_path(), vec!["Swimming"]);
//! ```

pub mod builder;
pub mod core;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use crate::core::{NodeId, NodeStatus, StateError, StateMachine, StateRef, StateResult};
