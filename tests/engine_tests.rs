//! End-to-end behaviour of built engines: linear runs, reverse navigation,
//! bubbling through composites, relocation and the procedure catalogs the
//! engine was written for.

use parking_lot::Mutex;
use statechart::builder::{
    guarded_standard_states, standard_states, CatalogDocument, CatalogTemplate, StateDecl,
};
use statechart::core::{Catalog, StateRef};
use statechart::engine::{Dispatch, Engine, HookTable, Observer, StateLog};
use statechart::validation::{ConfigError, EdgeKind};
use statechart::{StateEvent, Trigger};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn calibration() -> Catalog {
    let procedure = standard_states().renamed("CalibrationProcedure");
    let step = |name: &str, next: &str| {
        StateDecl::new(name)
            .next(next)
            .optional(["ERROR"])
            .sub_states(procedure.clone())
    };
    CatalogTemplate::new("Calibration")
        .states([
            StateDecl::new("IDLE")
                .initial()
                .next("INITIALIZING")
                .optional(["STOPPING", "ERROR"]),
            StateDecl::new("INITIALIZING")
                .next("CALIBRATION_1")
                .optional(["ERROR"]),
            step("CALIBRATION_1", "CALIBRATION_2"),
            step("CALIBRATION_2", "CALIBRATION_3"),
            step("CALIBRATION_3", "CALIBRATION_4"),
            step("CALIBRATION_4", "CALIBRATION_5"),
            step("CALIBRATION_5", "CALIBRATION_6"),
            step("CALIBRATION_6", "VERIFYING"),
            step("VERIFYING", "COMPLETING"),
            step("COMPLETING", "COMPLETED"),
            StateDecl::new("COMPLETED").final_state(),
            StateDecl::new("STOPPING").next("STOPPED").optional(["ERROR"]),
            StateDecl::new("STOPPED").next("IDLE").optional(["ERROR"]),
            StateDecl::new("ABORTING").next("ABORTED").optional(["ERROR"]),
            StateDecl::new("ABORTED").next("RESETTING").optional(["ERROR"]),
            StateDecl::new("RESETTING").next("IDLE").optional(["ERROR"]),
            StateDecl::new("ERROR").next("RESETTING").optional(["ERROR"]),
        ])
        .build()
        .unwrap()
}

fn fat_procedure() -> Catalog {
    let step = |n: usize, next: &str| {
        StateDecl::new(format!("FAT_PROCEDURE_{n}"))
            .next(next)
            .optional(["ERROR"])
            .sub_states(standard_states().renamed(format!("FatSubProcedure_{n}")))
    };
    let procedures = CatalogTemplate::new("FatProcedure").states([
        StateDecl::new("IDLE")
            .initial()
            .next("INITIALIZING")
            .optional(["STOPPING", "ERROR"])
            .prev("IDLE"),
        StateDecl::new("INITIALIZING")
            .options(["FAT_PROCEDURE_1", "FAT_PROCEDURE_2", "FAT_PROCEDURE_3"])
            .optional(["ERROR"]),
        step(1, "FAT_PROCEDURE_2"),
        step(2, "FAT_PROCEDURE_3"),
        step(3, "FAT_PROCEDURE_4"),
        step(4, "COMPLETED"),
        StateDecl::new("COMPLETED").final_state(),
        StateDecl::new("STOPPING")
            .next("STOPPED")
            .optional(["ERROR"])
            .prev("STOPPING"),
        StateDecl::new("STOPPED").next("IDLE").optional(["ERROR"]),
        StateDecl::new("RESETTING")
            .next("IDLE")
            .optional(["ERROR"])
            .prev("RESETTING"),
        StateDecl::new("ERROR")
            .next("RESETTING")
            .optional(["ERROR"])
            .prev("ERROR"),
    ]);
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
            StateDecl::new("STOPPING")
                .next("STOPPED")
                .optional(["ERROR"])
                .prev("STOPPING"),
            StateDecl::new("STOPPED").next("IDLE").optional(["ERROR"]),
            StateDecl::new("RESETTING")
                .next("IDLE")
                .optional(["ERROR"])
                .prev("RESETTING"),
            StateDecl::new("ERROR")
                .next("RESETTING")
                .optional(["ERROR"])
                .prev("IDLE"),
        ])
        .build()
        .unwrap()
}

fn names(engine: &Engine) -> String {
    engine.current_path_string()
}

#[test]
fn linear_run_visits_declared_order() {
    let catalog = CatalogTemplate::new("Main")
        .state(StateDecl::new("IDLE").initial().next("RUNNING"))
        .state(StateDecl::new("RUNNING").next("DONE"))
        .state(StateDecl::new("DONE").final_state())
        .build()
        .unwrap();
    let mut engine = Engine::builder(catalog).build().unwrap();

    let mut visited = vec![names(&engine)];
    while engine.next().is_transition() {
        visited.push(names(&engine));
    }
    assert_eq!(visited, ["IDLE", "RUNNING", "DONE"]);
    assert!(engine.is_finished());

    let done = engine.current_state();
    assert!(engine
        .edges()
        .outgoing(done)
        .iter()
        .all(|edge| edge.event != statechart::engine::EdgeEvent::Previous));
}

#[test]
fn next_error_previous_lands_on_override() {
    let catalog = CatalogTemplate::new("Main")
        .state(StateDecl::new("IDLE").initial().next("RUNNING"))
        .state(StateDecl::new("RUNNING").next("DONE").optional(["ERROR"]))
        .state(StateDecl::new("DONE").final_state())
        .state(StateDecl::new("ERROR").prev("IDLE"))
        .build()
        .unwrap();
    let mut engine = Engine::builder(catalog).build().unwrap();

    engine.next();
    engine.error();
    engine.previous();
    assert_eq!(engine.current_state_ref().name(), "IDLE");
}

#[test]
fn error_always_returns_to_resetting() {
    let sources: [&[Trigger]; 3] = [
        &[],
        &[Trigger::Next],
        &[Trigger::Next, Trigger::Next],
    ];
    for path in sources {
        let catalog = guarded_standard_states().build().unwrap();
        let mut engine = Engine::builder(catalog).build().unwrap();
        for trigger in path {
            engine.trigger(trigger.clone());
        }
        assert!(engine.error().is_transition());
        engine.previous();
        assert_eq!(engine.current_state_ref().name(), "RESETTING");
    }
}

#[test]
fn state_tree_lists_root_to_leaf() {
    let catalog = calibration();
    let mut engine = Engine::builder(catalog).build().unwrap();
    engine.next();
    engine.next();

    let tree = engine.current_state_tree();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].name(), "CALIBRATION_1");
    assert_eq!(tree[1].name(), "IDLE");
    assert_eq!(tree[1].catalog().template(), "CalibrationProcedure");
    assert_eq!(
        engine.current_super_state().map(StateRef::name),
        Some("CALIBRATION_1")
    );
}

#[test]
fn reused_templates_get_distinct_identities() {
    let catalog = calibration();
    let first = catalog.get("CALIBRATION_1").unwrap().sub_catalog().unwrap();
    let last = catalog.get("COMPLETING").unwrap().sub_catalog().unwrap();

    assert_ne!(first.id(), last.id());
    assert_eq!(first.parent().map(StateRef::name), Some("CALIBRATION_1"));
    assert_eq!(last.parent().map(StateRef::name), Some("COMPLETING"));
}

#[test]
fn calibration_runs_to_completion() {
    let log = Arc::new(Mutex::new(StateLog::new()));
    let mut engine = Engine::builder(calibration())
        .observer(Arc::clone(&log))
        .build()
        .unwrap();

    let mut steps = 0;
    while engine.next().is_transition() {
        steps += 1;
    }

    assert_eq!(steps, 2 + 8 * 4);
    assert_eq!(engine.current_state_ref().name(), "COMPLETED");
    let log = log.lock();
    assert!(log.is_finished());
    assert!(log.lines().iter().any(|line| line == "CALIBRATION_3.EXECUTE"));
    assert_eq!(log.last(), Some("COMPLETED"));
}

#[test]
fn fat_procedure_options_pick_branch() {
    let mut engine = Engine::builder(fat_procedure()).build().unwrap();
    engine.next();
    engine.next();
    assert_eq!(names(&engine), "EXECUTE.IDLE");

    engine.next();
    assert_eq!(
        engine.option(2, "FAT_PROCEDURE_3"),
        Dispatch::Transitioned {
            from: engine.find(&["EXECUTE", "INITIALIZING"]).unwrap(),
            to: engine.find(&["EXECUTE", "FAT_PROCEDURE_3", "IDLE"]).unwrap(),
        }
    );
    assert_eq!(names(&engine), "EXECUTE.FAT_PROCEDURE_3.IDLE");
    assert_eq!(engine.current_state_tree().len(), 3);
}

#[test]
fn fat_procedure_error_bubbles_to_innermost_handler() {
    let mut engine = Engine::builder(fat_procedure()).build().unwrap();
    engine.relocate_path(&["EXECUTE", "FAT_PROCEDURE_1", "EXECUTE"]).unwrap();

    engine.error();
    assert_eq!(names(&engine), "EXECUTE.FAT_PROCEDURE_1.ERROR");

    engine.relocate_path(&["EXECUTE", "INITIALIZING"]).unwrap();
    engine.error();
    assert_eq!(names(&engine), "EXECUTE.ERROR");
    assert_eq!(engine.previous(), Dispatch::Ignored);
}

#[test]
fn fat_procedure_completes_and_finishes_execute() {
    let finished = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&finished);
    let hooks = HookTable::new().on("state_execute_finished", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let mut engine = Engine::builder(fat_procedure())
        .hooks(hooks)
        .build()
        .unwrap();

    engine.relocate_path(&["EXECUTE", "FAT_PROCEDURE_4"]).unwrap();
    for _ in 0..4 {
        engine.next();
    }
    assert_eq!(names(&engine), "EXECUTE.COMPLETED");
    assert_eq!(finished.load(Ordering::SeqCst), 1);

    engine.next();
    assert_eq!(names(&engine), "COMPLETE");
    assert!(engine.is_finished());
}

#[test]
fn relocate_then_next_matches_fresh_start() {
    let target = ["CALIBRATION_2", "EXECUTE"];

    let mut travelled = Engine::builder(calibration()).build().unwrap();
    for _ in 0..7 {
        travelled.next();
    }
    travelled.error();
    travelled.relocate_path(&target).unwrap();

    let mut fresh = Engine::builder(calibration()).build().unwrap();
    fresh.relocate_path(&target).unwrap();

    assert_eq!(travelled.previous_state(), None);
    assert_eq!(travelled.previous(), fresh.previous());
    travelled.next();
    fresh.next();
    assert_eq!(names(&travelled), names(&fresh));
    assert_eq!(
        travelled.previous_state_ref(),
        fresh.previous_state_ref()
    );
}

#[test]
fn authored_hooks_see_the_state_path() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let procedure = CatalogTemplate::new("Procedure")
        .state(
            StateDecl::new("IDLE")
                .initial()
                .next("DONE")
                .on_exited(move |event| sink.lock().push(event.log_line())),
        )
        .state(StateDecl::new("DONE").final_state());
    let catalog = CatalogTemplate::new("Main")
        .state(StateDecl::new("STEP").initial().sub_states(procedure))
        .build()
        .unwrap();

    let mut engine = Engine::builder(catalog).build().unwrap();
    engine.next();
    assert_eq!(*seen.lock(), ["STEP.IDLE"]);
}

#[test]
fn construction_names_the_offending_target() {
    let catalog = CatalogTemplate::new("Main")
        .state(StateDecl::new("IDLE").initial().next("MISSING"))
        .build()
        .unwrap();
    let error = Engine::builder(catalog).build().unwrap_err();

    assert!(matches!(
        error.primary(),
        Some(ConfigError::UnresolvedTarget { target, kind: EdgeKind::Next, .. }) if target == "MISSING"
    ));
    assert!(error.to_string().contains("MISSING"));
}

#[test]
fn construction_requires_named_trigger_for_optional_target() {
    let catalog = CatalogTemplate::new("Main")
        .state(StateDecl::new("IDLE").initial().optional(["ABORTING"]))
        .state(StateDecl::new("ABORTING"))
        .build()
        .unwrap();
    let error = Engine::builder(catalog.clone()).build().unwrap_err();
    assert!(matches!(
        error.primary(),
        Some(ConfigError::MissingTrigger { target, .. }) if target == "ABORTING"
    ));

    let mut engine = Engine::builder(catalog)
        .trigger_target("ABORTING")
        .build()
        .unwrap();
    assert!(engine.jump("ABORTING").is_transition());
}

#[test]
fn document_catalog_checkpoints_and_resumes() {
    let document = CatalogDocument::from_json(
        r#"{
            "root": "Procedure",
            "templates": {
                "Procedure": [
                    { "name": "STEP_1", "initial": true, "next": "STEP_2",
                      "optional": ["ERROR"], "sub_states": "StandardStates" },
                    { "name": "STEP_2", "next": "DONE", "optional": ["ERROR"],
                      "sub_states": "StandardStates" },
                    { "name": "DONE", "final": true },
                    { "name": "ERROR", "next": "STEP_1", "prev": "STEP_1" }
                ]
            }
        }"#,
    )
    .unwrap();

    let mut engine = Engine::builder(document.build().unwrap()).build().unwrap();
    engine.next();
    let checkpoint = engine.checkpoint();
    let restored =
        statechart::Checkpoint::from_bytes(&checkpoint.to_bytes().unwrap()).unwrap();

    let mut resumed = Engine::builder(document.build().unwrap()).build().unwrap();
    resumed.resume(&restored).unwrap();
    assert_eq!(names(&resumed), "STEP_1.STARTING");
    assert_eq!(resumed.history().len(), 2);
    assert!(resumed.history().last().unwrap().is_discontinuous());
}

#[derive(Default)]
struct Tally {
    events: Vec<String>,
    machine_finished: usize,
}

impl Observer for Tally {
    fn state_entered(&mut self, event: &StateEvent<'_>) {
        self.events.push(format!("entered {}", event.log_line()));
    }

    fn state_exited(&mut self, event: &StateEvent<'_>) {
        self.events.push(format!("exited {}", event.log_line()));
    }

    fn state_finished(&mut self, event: &StateEvent<'_>) {
        self.events.push(format!("finished {}", event.log_line()));
    }

    fn machine_finished(&mut self) {
        self.machine_finished += 1;
    }
}

#[test]
fn every_observer_sees_every_notification() {
    let steps = CatalogTemplate::new("Steps")
        .state(StateDecl::new("A").initial().next("B"))
        .state(StateDecl::new("B").final_state());
    let catalog = CatalogTemplate::new("Main")
        .state(StateDecl::new("IDLE").initial().next("RUN"))
        .state(StateDecl::new("RUN").next("DONE").sub_states(steps))
        .state(StateDecl::new("DONE").final_state())
        .build()
        .unwrap();

    let first = Arc::new(Mutex::new(Tally::default()));
    let second = Arc::new(Mutex::new(Tally::default()));
    let first_log = Arc::new(Mutex::new(StateLog::new()));
    let second_log = Arc::new(Mutex::new(StateLog::new()));
    let mut engine = Engine::builder(catalog)
        .observer(Arc::clone(&first))
        .observer(Arc::clone(&first_log))
        .observer(Arc::clone(&second))
        .observer(Arc::clone(&second_log))
        .build()
        .unwrap();

    while engine.next().is_transition() {}
    assert!(engine.is_finished());
    assert_eq!(engine.next(), Dispatch::Ignored);
    engine.previous();

    let expected = [
        "entered IDLE",
        "exited IDLE",
        "entered RUN",
        "entered RUN.A",
        "exited RUN.A",
        "entered RUN.B",
        "finished RUN",
        "exited RUN",
        "entered DONE",
    ];
    assert_eq!(first.lock().events, expected);
    assert_eq!(second.lock().events, expected);
    assert_eq!(first.lock().machine_finished, 1);
    assert_eq!(second.lock().machine_finished, 1);

    assert_eq!(first_log.lock().render(), "IDLE\nRUN\nRUN.A\nRUN.B\nDONE");
    assert_eq!(first_log.lock().lines(), second_log.lock().lines());
    assert!(first_log.lock().is_finished() && second_log.lock().is_finished());
}

#[test]
fn previous_override_naming_the_forward_source_disables_previous() {
    let catalog = CatalogTemplate::new("Main")
        .state(StateDecl::new("A").initial().next("B"))
        .state(StateDecl::new("B").next("C").prev("A"))
        .state(StateDecl::new("C").final_state())
        .build()
        .unwrap();
    let mut engine = Engine::builder(catalog).build().unwrap();

    assert!(engine.next().is_transition());
    assert_eq!(engine.previous(), Dispatch::Ignored);
    assert_eq!(names(&engine), "B");
}

#[test]
fn long_sessions_keep_every_transition() {
    let catalog = CatalogTemplate::new("Main")
        .state(StateDecl::new("IDLE").initial().next("RUNNING"))
        .state(StateDecl::new("RUNNING").next("DONE"))
        .state(StateDecl::new("DONE").final_state())
        .build()
        .unwrap();
    let mut engine = Engine::builder(catalog).build().unwrap();

    for _ in 0..5_000 {
        engine.next();
        engine.previous();
    }
    assert_eq!(engine.history().len(), 10_000);
    assert_eq!(names(&engine), "IDLE");
}
