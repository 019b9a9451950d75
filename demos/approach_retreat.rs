//! Approach / Retreat
//!
//! An actor walks toward a goal on a line. When the host detects that the
//! goal was reached it triggers an event, and the approach state pushes a
//! nested retreat state. A condition pops the retreat once the actor is far
//! enough away, resuming the approach.
//!
//! Key concepts:
//! - Events delivered to the active leaf only
//! - Conditions polled every update
//! - Nested states addressing their parent
//!
//! Run with: cargo run --example approach_retreat

use statestack::StateMachineBuilder;
use std::sync::{Arc, Mutex};

const GOAL: f32 = 0.0;
const RESET_DISTANCE: f32 = 10.0;

#[derive(Default)]
struct Moving {
    speed: f32,
}

#[derive(Default)]
struct Retreating {
    speed: f32,
}

fn main() {
    println!("=== Approach / Retreat ===\n");

    let position = Arc::new(Mutex::new(6.0_f32));
    let (approach, retreat, distance) = (
        Arc::clone(&position),
        Arc::clone(&position),
        Arc::clone(&position),
    );

    let mut actor = StateMachineBuilder::new()
        .state_with("Approach", Moving { speed: 3.0 })
            .enter(|_| {
                println!("Entering Approach state");
                Ok(())
            })
            .update(move |state, dt| {
                let speed = state.handler::<Moving>()?.speed;
                let mut pos = approach.lock().unwrap();
                *pos -= (*pos - GOAL).signum() * speed * dt;
                Ok(())
            })
            .event("TargetReached", |state| state.push_state("Retreat"))
            .exit(|_| {
                println!("Exiting Approach state");
                Ok(())
            })
            .state_with("Retreat", Retreating { speed: 4.0 })
                .enter(|_| {
                    println!("Entering Retreat state");
                    Ok(())
                })
                .update(move |state, dt| {
                    let speed = state.handler::<Retreating>()?.speed;
                    *retreat.lock().unwrap() += speed * dt;
                    Ok(())
                })
                .condition(
                    move || (*distance.lock().unwrap() - GOAL).abs() >= RESET_DISTANCE,
                    |state| state.parent()?.pop_state(),
                )
                .exit(|_| {
                    println!("Exiting Retreat state");
                    Ok(())
                })
            .end()
        .end()
        .build()
        .expect("actor machine should build");

    actor.change_state("Approach").expect("Approach is declared");

    for frame in 0..16 {
        actor.update(0.5).expect("update should not fail");
        let pos = *position.lock().unwrap();
        println!("  frame {frame:2}: pos={pos:5.1} path={:?}", actor.active_path());

        // The host owns collision detection.
        if (pos - GOAL).abs() < 1.0 {
            actor
                .trigger_event("TargetReached")
                .expect("event should not fail");
        }
    }

    println!("\nFinal tree:");
    println!("{}", actor.snapshot().to_json().expect("snapshot serializes"));

    println!("\n=== Example Complete ===");
}
