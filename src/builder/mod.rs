//! Builder API for declarative state tree construction.
//!
//! The builder is a cursor over the state currently being configured.
//! `state` descends into a new child, the configuration methods attach
//! actions, conditions and events to the current state, and `end` climbs
//! back to the parent. Indenting the chain by depth mirrors the tree:
//!
//! ```rust
//! use statestack::builder::StateMachineBuilder;
//!
//! let machine = StateMachineBuilder::new()
//!     .state::<()>("Approach")
//!         .event("TargetReached", |state| state.push_state("Retreat"))
//!         .state::<()>("Retreat")
//!         .end()
//!     .end()
//!     .build()
//!     .unwrap();
//!
//! assert!(machine.find(&["Approach", "Retreat"]).is_some());
//! ```

pub mod error;
pub mod machine;

pub use error::BuildError;
pub use machine::StateMachineBuilder;
