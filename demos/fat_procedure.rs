//! Factory acceptance test: a top-level procedure whose EXECUTE phase runs
//! a selectable set of FAT procedures, driven through the async command
//! channel and checkpointed halfway.

use parking_lot::Mutex;
use statechart::builder::{standard_states, CatalogTemplate, StateDecl};
use statechart::core::Catalog;
use statechart::driver::Driver;
use statechart::engine::{Engine, Observer, StateLog};
use statechart::{Checkpoint, StateEvent, Trigger};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Prints every state the machine enters.
struct Console;

impl Observer for Console {
    fn state_entered(&mut self, event: &StateEvent<'_>) {
        println!("entered {}", event.log_line());
    }

    fn state_finished(&mut self, event: &StateEvent<'_>) {
        println!("finished {}", event.log_line());
    }

    fn machine_finished(&mut self) {
        println!("factory acceptance test complete");
    }
}

fn controls(error_prev: &str) -> Vec<StateDecl> {
    vec![
        StateDecl::new("STOPPING")
            .next("STOPPED")
            .optional(["ERROR"])
            .prev("STOPPING"),
        StateDecl::new("STOPPED").next("IDLE").optional(["ERROR"]),
        StateDecl::new("ABORTING")
            .next("ABORTED")
            .optional(["ERROR"])
            .prev("ABORTING"),
        StateDecl::new("ABORTED").next("RESETTING").optional(["ERROR"]),
        StateDecl::new("RESETTING")
            .next("IDLE")
            .optional(["ERROR"])
            .prev("RESETTING"),
        StateDecl::new("ERROR")
            .next("RESETTING")
            .optional(["ERROR"])
            .prev(error_prev),
    ]
}

fn fat_catalog() -> Result<Catalog, statechart::BuildError> {
    let procedure = |n: usize, next: &str| {
        StateDecl::new(format!("FAT_PROCEDURE_{n}"))
            .next(next)
            .optional(["ERROR"])
            .sub_states(standard_states().renamed(format!("FatSubProcedure_{n}")))
    };

    let procedures = CatalogTemplate::new("FatProcedure")
        .states([
            StateDecl::new("IDLE")
                .initial()
                .next("INITIALIZING")
                .optional(["STOPPING", "ERROR"])
                .prev("IDLE"),
            StateDecl::new("INITIALIZING")
                .options(["FAT_PROCEDURE_1", "FAT_PROCEDURE_2", "FAT_PROCEDURE_3"])
                .optional(["ERROR"]),
            procedure(1, "FAT_PROCEDURE_2"),
            procedure(2, "FAT_PROCEDURE_3"),
            procedure(3, "FAT_PROCEDURE_4"),
            procedure(4, "FAT_PROCEDURE_5"),
            procedure(5, "FAT_PROCEDURE_6"),
            procedure(6, "COMPLETED"),
            StateDecl::new("COMPLETED").final_state(),
        ])
        .states(controls("ERROR"));

    CatalogTemplate::new("FatSuper")
        .states([
            StateDecl::new("IDLE")
                .initial()
                .next("STARTING")
                .optional(["STOPPING", "ERROR"])
                .prev("IDLE"),
            StateDecl::new("STARTING")
                .next("EXECUTE")
                .optional(["STOPPING", "ERROR"]),
            StateDecl::new("EXECUTE")
                .next("COMPLETE")
                .optional(["STOPPING", "ERROR"])
                .sub_states(procedures),
            StateDecl::new("COMPLETE").final_state(),
        ])
        .states(controls("IDLE"))
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("info");

    let log = Arc::new(Mutex::new(StateLog::new()));
    let engine = Engine::builder(fat_catalog()?)
        .observer(Console)
        .observer(Arc::clone(&log))
        .build()?;
    let (driver, handle) = Driver::new(engine, 32);
    let task = tokio::spawn(driver.run());

    for _ in 0..3 {
        handle.next().await?;
    }
    // Skip straight to the third procedure.
    handle.trigger(Trigger::option(2, "FAT_PROCEDURE_3")).await?;
    handle.next().await?;
    info!(tree = ?handle.state_tree().await?, "procedure 3 started");

    let checkpoint = handle.checkpoint().await?;
    let json = checkpoint.to_json()?;
    println!("{json}");

    handle.trigger(Trigger::error()).await?;
    handle.previous().await?;
    println!("after error and previous: {:?}", handle.state_tree().await?);

    handle.shutdown().await?;
    let engine = task.await?;
    println!("driver returned at {}", engine.current_path_string());
    println!("states entered under the driver:\n{}", log.lock().render());

    // Resume the checkpoint on a fresh machine and finish the run.
    let mut resumed = Engine::builder(fat_catalog()?).observer(Console).build()?;
    resumed.resume(&Checkpoint::from_json(&json)?)?;
    while resumed.next().is_transition() {}
    println!(
        "resumed run finished: {} ({} transitions)",
        resumed.is_finished(),
        resumed.history().len()
    );

    Ok(())
}
