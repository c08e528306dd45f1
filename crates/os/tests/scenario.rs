use kernel::{MemoryMode, ProcState, SchedulerKind};
use os::{run, Scenario};

const WAIT_CHILD: &str = include_str!("../../../demos/wait_child.json");

#[test]
fn demo_scenario_halts_cleanly() {
    let scenario = Scenario::from_json(WAIT_CHILD).unwrap();
    assert_eq!(scenario.config.scheduler, SchedulerKind::Priority);
    assert_eq!(scenario.config.memory_mode, MemoryMode::DemandPaged);

    let outcome = run(&scenario).unwrap();
    assert!(outcome.halted);
    assert!(!outcome.internal_error);
    assert_eq!(outcome.interrupts.first().map(String::as_str), Some("IRQ_RESET"));

    // init prints on terminal 0, the child on terminal 1
    assert_eq!(outcome.screens[0], vec![1]);
    assert_eq!(outcome.screens[1], vec![43]);

    let report = &outcome.report;
    assert_eq!(report.processes_created, 2);
    assert!(report
        .processes
        .iter()
        .all(|p| p.state == ProcState::Dead));
}

#[test]
fn scheduler_choice_does_not_change_the_result() {
    for kind in [
        SchedulerKind::FirstReady,
        SchedulerKind::RoundRobin,
        SchedulerKind::Priority,
    ] {
        let mut scenario = Scenario::from_json(WAIT_CHILD).unwrap();
        scenario.config.scheduler = kind;
        let outcome = run(&scenario).unwrap();
        assert!(outcome.halted, "{} did not halt", kind);
        assert_eq!(outcome.screens[1], vec![43], "{}", kind);
    }
}

#[test]
fn missing_init_program_is_an_internal_error() {
    let scenario = Scenario::from_json(
        r#"{
            "programs": [ { "name": "trata_int.maq", "load_addr": 10, "words": [1] } ],
            "events": []
        }"#,
    )
    .unwrap();
    let outcome = run(&scenario).unwrap();
    assert!(outcome.halted);
    assert!(outcome.internal_error);
    assert_eq!(outcome.report.processes_created, 0);
}
