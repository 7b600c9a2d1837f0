//! Calibration procedure: eight calibration phases, each running the
//! standard sub-procedure. Run with `RUST_LOG=statechart=debug` to see
//! every dispatch.

use parking_lot::Mutex;
use statechart::builder::{standard_states, CatalogDocument, CatalogTemplate, StateDecl};
use statechart::engine::{Engine, HookTable, StateLog};
use statechart::{BuildError, StateEvent};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const PHASES: [&str; 8] = [
    "CALIBRATION_1",
    "CALIBRATION_2",
    "CALIBRATION_3",
    "CALIBRATION_4",
    "CALIBRATION_5",
    "CALIBRATION_6",
    "VERIFYING",
    "COMPLETING",
];

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn calibration() -> CatalogTemplate {
    let procedure = standard_states().renamed("CalibrationProcedure");
    let mut template = CatalogTemplate::new("Calibration")
        .state(
            StateDecl::new("IDLE")
                .initial()
                .next("INITIALIZING")
                .optional(["STOPPING", "ERROR"]),
        )
        .state(
            StateDecl::new("INITIALIZING")
                .next(PHASES[0])
                .optional(["ERROR"]),
        );

    for (i, phase) in PHASES.iter().enumerate() {
        let next = PHASES.get(i + 1).copied().unwrap_or("COMPLETED");
        template = template.state(
            StateDecl::new(*phase)
                .next(next)
                .optional(["ERROR"])
                .sub_states(procedure.clone()),
        );
    }

    template.states([
        StateDecl::new("COMPLETED").final_state(),
        StateDecl::new("STOPPING").next("STOPPED").optional(["ERROR"]),
        StateDecl::new("STOPPED").next("IDLE").optional(["ERROR"]),
        StateDecl::new("ABORTING").next("ABORTED").optional(["ERROR"]),
        StateDecl::new("ABORTED").next("RESETTING").optional(["ERROR"]),
        StateDecl::new("RESETTING").next("IDLE").optional(["ERROR"]),
        StateDecl::new("ERROR").next("RESETTING").optional(["ERROR"]),
    ])
}

fn main() -> Result<(), BuildError> {
    init_logging("info");

    let log = Arc::new(Mutex::new(StateLog::new()));
    let hooks = HookTable::new().on("state_calibration_3__error_entered", |event: &StateEvent<'_>| {
        println!("!! calibration 3 failed at {}", event.log_line());
    });

    let mut engine = Engine::builder(calibration().build()?)
        .observer(Arc::clone(&log))
        .hooks(hooks)
        .build()?;

    // Run into CALIBRATION_3, fail it, and recover through the standard
    // RESETTING path.
    while engine.current_path_string() != "CALIBRATION_3.EXECUTE" {
        engine.next();
    }
    engine.error();
    engine.next();
    engine.next();
    println!("recovered to {}", engine.current_path_string());

    while engine.next().is_transition() {}

    println!("--- state log ---");
    println!("{}", log.lock().render());
    println!(
        "finished: {}, {} transitions in {:?}",
        engine.is_finished(),
        engine.history().len(),
        engine.history().duration().unwrap_or_default()
    );

    // The same shape, described as data.
    let document = CatalogDocument::from_json(
        r#"{
            "root": "Short",
            "templates": {
                "Short": [
                    { "name": "CALIBRATION_1", "initial": true, "next": "DONE",
                      "optional": ["ERROR"], "sub_states": "StandardStates" },
                    { "name": "DONE", "final": true },
                    { "name": "ERROR", "next": "CALIBRATION_1" }
                ]
            }
        }"#,
    )?;
    let short = Engine::builder(document.build()?).build()?;
    println!("document machine starts at {}", short.current_path_string());

    Ok(())
}
