//! End-to-end behavior of the runtime through the public API.

use statestack::core::NodeStatus;
use statestack::{BuildError, StateError, StateMachine, StateMachineBuilder};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

/// Shared call log: "<state> <callback>" entries in order.
#[derive(Clone, Default)]
struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }

    fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Root with flat children, each logging enter/update/exit and a "Ping" event.
fn instrumented(names: &[&str], calls: &Calls) -> StateMachine {
    names
        .iter()
        .fold(StateMachineBuilder::new(), |builder, name| {
            let (enter, update, exit, ping) =
                (calls.clone(), calls.clone(), calls.clone(), calls.clone());
            builder
                .state::<()>(name)
                .enter(move |state| {
                    enter.push(format!("{} enter", state.name()));
                    Ok(())
                })
                .update(move |state, _| {
                    update.push(format!("{} update", state.name()));
                    Ok(())
                })
                .exit(move |state| {
                    exit.push(format!("{} exit", state.name()));
                    Ok(())
                })
                .event("Ping", move |state| {
                    ping.push(format!("{} ping", state.name()));
                    Ok(())
                })
                .end()
        })
        .build()
        .unwrap()
}

#[test]
fn change_to_unknown_state_is_not_found_and_keeps_stack() {
    let calls = Calls::default();
    let mut machine = instrumented(&["A"], &calls);
    machine.change_state("A").unwrap();

    let err = machine.change_state("Nope").unwrap_err();

    assert_eq!(
        err,
        StateError::NotFound {
            parent: "root".to_string(),
            name: "Nope".to_string()
        }
    );
    assert_eq!(machine.active_path(), vec!["A"]);
    assert_eq!(calls.entries(), vec!["A enter"]);
}

#[test]
fn push_to_unknown_state_is_not_found() {
    let mut machine = StateMachine::new();
    assert!(matches!(
        machine.push_state("unknown state"),
        Err(StateError::NotFound { .. })
    ));
}

#[test]
fn duplicate_child_is_rejected_and_original_kept() {
    let calls = Calls::default();
    let mut machine = instrumented(&["A"], &calls);
    machine.change_state("A").unwrap();
    let original = machine.find(&["A"]).unwrap();

    let duplicate = machine.create_state(());
    let err = machine.root().add_child(duplicate, "A").unwrap_err();

    assert!(matches!(err, StateError::AlreadyExists { ref name, .. } if name == "A"));
    assert_eq!(machine.find(&["A"]), Some(original));
    assert_eq!(machine.status(duplicate).unwrap(), NodeStatus::Detached);

    machine.update(1.0).unwrap();
    assert_eq!(calls.entries(), vec!["A enter", "A update"]);
}

#[test]
fn change_state_exits_previous_exactly_once() {
    let calls = Calls::default();
    let mut machine = instrumented(&["A", "B"], &calls);

    machine.change_state("A").unwrap();
    machine.change_state("B").unwrap();
    machine.update(1.0).unwrap();
    machine.trigger_event("Ping").unwrap();

    assert_eq!(calls.count("A exit"), 1);
    assert_eq!(calls.count("B enter"), 1);
    assert_eq!(calls.count("A update"), 0);
    assert_eq!(calls.count("A ping"), 0);
    assert_eq!(
        calls.entries(),
        vec!["A enter", "A exit", "B enter", "B update", "B ping"]
    );
}

#[test]
fn push_suspends_and_pop_resumes_without_reentering() {
    let calls = Calls::default();
    let mut machine = instrumented(&["A", "B"], &calls);

    machine.change_state("A").unwrap();
    machine.push_state("B").unwrap();
    machine.update(1.0).unwrap();
    assert_eq!(calls.count("A update"), 0);
    assert_eq!(calls.count("B update"), 1);
    assert_eq!(calls.count("A exit"), 0);

    machine.pop_state().unwrap();
    machine.update(1.0).unwrap();

    assert_eq!(calls.count("A update"), 1);
    assert_eq!(calls.count("A enter"), 1);
    assert_eq!(calls.count("B exit"), 1);
}

#[test]
fn pop_on_empty_stack_is_invalid_operation() {
    let calls = Calls::default();
    let mut machine = instrumented(&["A"], &calls);

    assert!(matches!(
        machine.pop_state(),
        Err(StateError::InvalidOperation(_))
    ));

    machine.change_state("A").unwrap();
    machine.pop_state().unwrap();
    assert!(matches!(
        machine.pop_state(),
        Err(StateError::InvalidOperation(_))
    ));
    assert_eq!(calls.entries(), vec!["A enter", "A exit"]);
}

#[test]
fn new_state_is_inactive_until_changed_to() {
    let calls = Calls::default();
    let mut machine = instrumented(&["A"], &calls);

    machine.update(1.0).unwrap();
    machine.trigger_event("Ping").unwrap();

    assert!(calls.entries().is_empty());
    let a = machine.find(&["A"]).unwrap();
    assert_eq!(machine.status(a).unwrap(), NodeStatus::Inactive);
}

#[test]
fn update_is_not_delivered_after_pop() {
    let calls = Calls::default();
    let mut machine = instrumented(&["A"], &calls);

    machine.change_state("A").unwrap();
    machine.update(1.0).unwrap();
    machine.pop_state().unwrap();
    machine.update(1.0).unwrap();

    assert_eq!(calls.count("A update"), 1);
}

#[test]
fn condition_fires_every_tick_while_true() {
    let ready = Arc::new(AtomicBool::new(false));
    let fired = Arc::new(AtomicI32::new(0));
    let (flag, count) = (Arc::clone(&ready), Arc::clone(&fired));

    let mut machine = StateMachineBuilder::new()
        .state::<()>("Waiting")
        .condition(
            move || flag.load(Ordering::SeqCst),
            move |_| {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
        .end()
        .build()
        .unwrap();
    machine.change_state("Waiting").unwrap();

    machine.update(1.0).unwrap();
    machine.update(1.0).unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    ready.store(true, Ordering::SeqCst);
    machine.update(1.0).unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    machine.update(1.0).unwrap();
    machine.update(1.0).unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 3);

    ready.store(false, Ordering::SeqCst);
    machine.update(1.0).unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 3);
}

#[test]
fn conditions_run_after_update_in_declaration_order() {
    let calls = Calls::default();
    let (update, first, second) = (calls.clone(), calls.clone(), calls.clone());

    let mut machine = StateMachineBuilder::new()
        .state::<()>("A")
        .condition(
            || true,
            move |_| {
                first.push("first".to_string());
                Ok(())
            },
        )
        .update(move |_, _| {
            update.push("update".to_string());
            Ok(())
        })
        .condition(
            || true,
            move |_| {
                second.push("second".to_string());
                Ok(())
            },
        )
        .end()
        .build()
        .unwrap();

    machine.change_state("A").unwrap();
    machine.update(1.0).unwrap();
    assert_eq!(calls.entries(), vec!["update", "first", "second"]);
}

#[test]
fn undeclared_event_is_ignored() {
    let calls = Calls::default();
    let mut machine = instrumented(&["A"], &calls);
    machine.change_state("A").unwrap();
    calls.clear();

    machine.trigger_event("X").unwrap();
    machine.trigger_event_with("X", 42u32).unwrap();

    assert!(calls.entries().is_empty());
    assert_eq!(machine.active_path(), vec!["A"]);
}

#[test]
fn root_exit_tears_down_nested_chain_deepest_first() {
    let calls = Calls::default();
    let (a_exit, b_exit) = (calls.clone(), calls.clone());

    let mut machine = StateMachineBuilder::new()
        .state::<()>("A")
        .exit(move |_| {
            a_exit.push("A exit".to_string());
            Ok(())
        })
        .state::<()>("B")
        .exit(move |_| {
            b_exit.push("B exit".to_string());
            Ok(())
        })
        .end()
        .end()
        .build()
        .unwrap();

    machine.change_state("A").unwrap();
    let a = machine.find(&["A"]).unwrap();
    machine.state(a).unwrap().push_state("B").unwrap();
    assert_eq!(machine.active_path(), vec!["A", "B"]);

    machine.root().exit().unwrap();

    assert_eq!(calls.entries(), vec!["B exit", "A exit"]);
    assert!(machine.active_path().is_empty());
}

#[test]
fn typed_event_rejects_wrong_payload() {
    #[derive(Debug)]
    struct Collision {
        force: i32,
    }

    let total = Arc::new(AtomicI32::new(0));
    let sum = Arc::clone(&total);

    let mut machine = StateMachineBuilder::new()
        .state::<()>("Flying")
        .event_with("Hit", move |_, hit: &Collision| {
            sum.fetch_add(hit.force, Ordering::SeqCst);
            Ok(())
        })
        .end()
        .build()
        .unwrap();
    machine.change_state("Flying").unwrap();

    machine
        .trigger_event_with("Hit", Collision { force: 7 })
        .unwrap();
    assert_eq!(total.load(Ordering::SeqCst), 7);

    let err = machine.trigger_event_with("Hit", 7i32).unwrap_err();
    assert!(matches!(err, StateError::TypeMismatch { ref name, found: "i32", .. } if name == "Hit"));

    assert!(matches!(
        machine.trigger_event("Hit"),
        Err(StateError::TypeMismatch { found: "()", .. })
    ));
    assert_eq!(total.load(Ordering::SeqCst), 7);
}

#[test]
fn events_reach_only_the_active_leaf() {
    let calls = Calls::default();
    let (outer, inner) = (calls.clone(), calls.clone());

    let mut machine = StateMachineBuilder::new()
        .state::<()>("Outer")
        .event("Ping", move |_| {
            outer.push("outer".to_string());
            Ok(())
        })
        .state::<()>("Inner")
        .event("Ping", move |_| {
            inner.push("inner".to_string());
            Ok(())
        })
        .end()
        .end()
        .build()
        .unwrap();

    machine.change_state("Outer").unwrap();
    machine.trigger_event("Ping").unwrap();

    let outer_id = machine.find(&["Outer"]).unwrap();
    machine.state(outer_id).unwrap().change_state("Inner").unwrap();
    machine.trigger_event("Ping").unwrap();

    assert_eq!(calls.entries(), vec!["outer", "inner"]);
}

#[test]
fn callbacks_can_transition_ancestors() {
    let mut machine = StateMachineBuilder::new()
        .state::<()>("Approach")
        .event("TargetReached", |state| state.push_state("Retreat"))
        .state::<()>("Retreat")
        .update(|state, _| state.parent()?.parent()?.change_state("Done"))
        .end()
        .end()
        .state::<()>("Done")
        .end()
        .build()
        .unwrap();

    machine.change_state("Approach").unwrap();
    machine.trigger_event("TargetReached").unwrap();
    assert_eq!(machine.active_path(), vec!["Approach", "Retreat"]);

    machine.update(0.1).unwrap();
    assert_eq!(machine.active_path(), vec!["Done"]);

    let retreat = machine.find(&["Approach", "Retreat"]).unwrap();
    assert_eq!(machine.status(retreat).unwrap(), NodeStatus::Inactive);
}

#[test]
fn callback_errors_propagate_to_caller() {
    let mut machine = StateMachineBuilder::new()
        .state::<()>("A")
        .update(|state, _| state.change_state("Missing"))
        .end()
        .build()
        .unwrap();

    machine.change_state("A").unwrap();
    assert!(matches!(
        machine.update(1.0),
        Err(StateError::NotFound { ref parent, .. }) if parent == "A"
    ));
}

#[test]
fn statuses_follow_lifecycle() {
    let calls = Calls::default();
    let mut machine = instrumented(&["A", "B"], &calls);
    let a = machine.find(&["A"]).unwrap();
    let b = machine.find(&["B"]).unwrap();
    let detached = machine.create_state(());

    let status = |machine: &StateMachine| -> HashMap<&'static str, NodeStatus> {
        HashMap::from([
            ("A", machine.status(a).unwrap()),
            ("B", machine.status(b).unwrap()),
        ])
    };

    assert_eq!(machine.status(detached).unwrap(), NodeStatus::Detached);
    assert_eq!(status(&machine)["A"], NodeStatus::Inactive);

    machine.change_state("A").unwrap();
    assert_eq!(status(&machine)["A"], NodeStatus::Dispatching);

    machine.push_state("B").unwrap();
    assert_eq!(status(&machine)["A"], NodeStatus::Suspended);
    assert_eq!(status(&machine)["B"], NodeStatus::Dispatching);

    machine.pop_state().unwrap();
    assert_eq!(status(&machine)["A"], NodeStatus::Dispatching);
    assert_eq!(status(&machine)["B"], NodeStatus::Inactive);

    machine.exit().unwrap();
    assert_eq!(status(&machine)["A"], NodeStatus::Inactive);
}

#[test]
fn build_reports_first_error() {
    let result = StateMachineBuilder::new()
        .state::<()>("A")
        .end()
        .state::<()>("A")
        .end()
        .end()
        .build();

    assert!(matches!(
        result,
        Err(BuildError::State(StateError::AlreadyExists { .. }))
    ));
}

#[test]
fn pushing_a_state_already_on_the_stack_enters_it_again() {
    let calls = Calls::default();
    let mut machine = instrumented(&["A", "B"], &calls);
    machine.change_state("A").unwrap();
    machine.push_state("B").unwrap();

    machine.push_state("A").unwrap();
    assert_eq!(machine.active_path(), vec!["A"]);
    assert_eq!(calls.count("A enter"), 2);

    machine.update(1.0).unwrap();
    machine.pop_state().unwrap();
    machine.update(1.0).unwrap();
    assert_eq!(machine.active_path(), vec!["B"]);

    machine.pop_state().unwrap();
    assert_eq!(machine.active_path(), vec!["A"]);
    assert_eq!(
        calls.entries(),
        vec!["A enter", "B enter", "A enter", "A update", "A exit", "B update", "B exit"]
    );
}

#[test]
fn payload_less_event_rejects_a_payload() {
    let calls = Calls::default();
    let mut machine = instrumented(&["A"], &calls);
    machine.change_state("A").unwrap();

    let err = machine.trigger_event_with("Ping", 3u8).unwrap_err();

    assert!(matches!(
        err,
        StateError::TypeMismatch { expected: "()", found: "u8", .. }
    ));
    assert_eq!(calls.count("A ping"), 0);
}
