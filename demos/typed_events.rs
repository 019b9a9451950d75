//! Typed Events
//!
//! Events may carry a payload. The payload type is declared when the event
//! is bound and checked when it is triggered, so sending the wrong payload
//! is reported as an error instead of being silently misread.
//!
//! Run with: cargo run --example typed_events

use statestack::{StateError, StateMachineBuilder};

#[derive(Debug)]
struct Damage {
    amount: u32,
}

#[derive(Default)]
struct Alive {
    health: u32,
}

fn main() {
    println!("=== Typed Events ===\n");

    let mut player = StateMachineBuilder::new()
        .state_with("Alive", Alive { health: 10 })
            .event_with("Hit", |state, damage: &Damage| {
                let alive = state.handler_mut::<Alive>()?;
                alive.health = alive.health.saturating_sub(damage.amount);
                println!("Took {} damage, health {}", damage.amount, alive.health);
                if alive.health == 0 {
                    state.parent()?.change_state("Dead")?;
                }
                Ok(())
            })
        .end()
        .state::<()>("Dead")
            .enter(|_| {
                println!("Player died");
                Ok(())
            })
        .end()
        .build()
        .expect("player machine should build");

    player.change_state("Alive").expect("Alive is declared");

    player
        .trigger_event_with("Hit", Damage { amount: 4 })
        .expect("matching payload");

    match player.trigger_event_with("Hit", 4u32) {
        Err(StateError::TypeMismatch { expected, found, .. }) => {
            println!("Rejected payload: expected {expected}, found {found}");
        }
        other => println!("Unexpected result: {other:?}"),
    }

    // Undeclared events are ignored.
    player.trigger_event("Heal").expect("ignored");

    player
        .trigger_event_with("Hit", Damage { amount: 7 })
        .expect("matching payload");
    println!("Active path: {:?}", player.active_path());

    println!("\n=== Example Complete ===");
}
