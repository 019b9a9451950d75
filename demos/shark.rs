//! Shark State Machine
//!
//! A shark swims around getting hungrier until it pushes a hunting state.
//! Hunting suspends swimming rather than replacing it, so once the shark
//! has eaten it pops back to swimming without entering it again.
//!
//! Key concepts:
//! - Push/pop for interrupt-style states
//! - Handler values carrying per-state data
//! - Host-owned counters read by update actions
//!
//! Run with: cargo run --example shark
//! Set RUST_LOG=statestack=debug to see transitions.

use statestack::StateMachineBuilder;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Default)]
struct Swimming;

#[derive(Default)]
struct Hunting {
    attempts: u32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Shark State Machine ===\n");

    // How hungry the shark is now. Owned by the host, not the machine.
    let hunger = Arc::new(AtomicI32::new(0));
    let (swimming, hunting) = (Arc::clone(&hunger), Arc::clone(&hunger));

    let mut shark = StateMachineBuilder::new()
        .state_auto::<Swimming>()
            .update(move |state, _dt| {
                println!("Swimming around...");
                if swimming.fetch_add(1, Ordering::SeqCst) + 1 > 5 {
                    state.push_state("Hunting")?;
                }
                Ok(())
            })
            .state_auto::<Hunting>()
                .enter(|state| {
                    state.handler_mut::<Hunting>()?.attempts = 0;
                    Ok(())
                })
                .update(move |state, _dt| {
                    let hunt = state.handler_mut::<Hunting>()?;
                    hunt.attempts += 1;
                    // Every third lunge catches something.
                    if hunt.attempts % 3 == 0 {
                        println!("Feeding");
                        hunting.fetch_sub(5, Ordering::SeqCst);
                    } else {
                        println!("Hunting");
                    }
                    if hunting.fetch_add(1, Ordering::SeqCst) + 1 <= 5 {
                        state.parent()?.pop_state()?;
                    }
                    Ok(())
                })
            .end()
        .end()
        .build()
        .expect("shark machine should build");

    shark.change_state("Swimming").expect("Swimming is declared");

    for tick in 1..=15 {
        shark.update(1.0).expect("update should not fail");
        println!(
            "  tick {tick:2}: hunger={} path={:?}",
            hunger.load(Ordering::SeqCst),
            shark.active_path()
        );
    }

    println!("\n=== Example Complete ===");
}
