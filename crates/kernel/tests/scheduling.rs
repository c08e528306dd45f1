mod common;

use common::{registry, Rig, CHILD_NAME_ADDR};
use kernel::{KernelConfig, ProcState, SchedulerKind};
use types::{syscall, Irq, TrapAction};

fn with(scheduler: SchedulerKind, quantum: u32) -> Rig {
    let config = KernelConfig {
        scheduler,
        default_quantum: quantum,
        ..KernelConfig::default()
    };
    let mut rig = Rig::new(config, registry(), 200);
    rig.irq(Irq::Reset);
    rig
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn a_switch_hands_over_the_quantum_remainder() {
    let mut rig = Rig::booted();
    rig.create(CHILD_NAME_ADDR);
    for _ in 0..4 {
        assert_eq!(rig.irq(Irq::Timer), TrapAction::Continue);
        assert_eq!(rig.kernel.current(), Some(1));
    }
    assert_eq!(rig.kernel.scheduler().quantum().remaining(), 4);

    rig.wait(2);
    assert_eq!(rig.kernel.current(), Some(2));
    assert_eq!(rig.kernel.scheduler().quantum().remaining(), 4);
    // six of ten interrupts used: (0.5 + 0.6) / 2
    let init = rig.kernel.process(1).unwrap();
    assert!(close(init.priority, 0.55), "priority {}", init.priority);

    // the child blocks on the slice it inherited
    rig.syscall(syscall::READ, 0);
    let child = rig.kernel.process(2).unwrap();
    assert_eq!(child.state(), ProcState::Blocked);
    assert!(close(child.priority, 0.55), "priority {}", child.priority);
}

#[test]
fn exhausting_the_slice_halves_the_priority() {
    let mut rig = Rig::booted();
    for _ in 0..9 {
        assert_eq!(rig.irq(Irq::Timer), TrapAction::Continue);
    }
    assert!(rig.kernel.scheduler().quantum().is_exhausted());

    rig.irq(Irq::Timer);

    let init = rig.kernel.process(1).unwrap();
    assert_eq!(init.priority, 0.25);
    assert_eq!(init.metrics.preemptions, 1);
    assert_eq!(rig.kernel.scheduler().quantum().remaining(), 9);

    rig.irq(Irq::Timer);
    assert_eq!(rig.kernel.process(1).unwrap().priority, 0.25);
}

#[test]
fn repeated_preemption_keeps_halving() {
    let mut rig = with(SchedulerKind::Priority, 1);
    for _ in 0..10 {
        rig.irq(Irq::Timer);
    }
    let init = rig.kernel.process(1).unwrap();
    assert_eq!(init.priority, 0.5 / 1024.0);
    assert_eq!(init.metrics.preemptions, 10);
}

#[test]
fn the_lower_priority_process_keeps_the_cpu() {
    let mut rig = with(SchedulerKind::Priority, 2);
    rig.create(CHILD_NAME_ADDR);
    assert_eq!(rig.kernel.current(), Some(1));
    assert!(rig.kernel.scheduler().quantum().is_exhausted());

    // init blocks having used its whole slice; the quantum refills on the
    // same pass and the child inherits it
    assert_eq!(rig.syscall(syscall::READ, 0), TrapAction::Continue);
    assert_eq!(rig.kernel.process(1).unwrap().priority, 0.75);
    assert_eq!(rig.kernel.current(), Some(2));
    assert_eq!(rig.kernel.scheduler().quantum().remaining(), 2);

    // released, init still ranks behind the child, which exhausting its
    // slice only moves further ahead
    rig.machine.devices.push_input(0, 5);
    for _ in 0..3 {
        rig.irq(Irq::Timer);
        assert_eq!(rig.kernel.current(), Some(2));
    }
    assert_eq!(rig.state(1), ProcState::Ready);
    let child = rig.kernel.process(2).unwrap();
    assert_eq!(child.priority, 0.25);
    assert_eq!(child.metrics.preemptions, 1);
    assert_eq!(rig.kernel.scheduler().quantum().remaining(), 1);

    // the child blocks; init takes over the rest of the slice
    rig.syscall(syscall::READ, 0);
    assert_eq!(rig.kernel.current(), Some(1));
    assert_eq!(rig.state(1), ProcState::Running);
    assert_eq!(rig.state(2), ProcState::Blocked);
    assert_eq!(rig.kernel.scheduler().quantum().remaining(), 1);
}

#[test]
fn round_robin_rotates_the_queue() {
    let mut rig = with(SchedulerKind::RoundRobin, 2);
    rig.create(CHILD_NAME_ADDR);
    assert_eq!(rig.kernel.current(), Some(1));

    rig.irq(Irq::Timer);
    assert_eq!(rig.kernel.current(), Some(2));
    assert_eq!(rig.kernel.ready_queue().iter().collect::<Vec<_>>(), vec![2, 1]);
    assert_eq!(rig.kernel.process(1).unwrap().metrics.preemptions, 1);
    // round robin leaves priorities alone
    assert_eq!(rig.kernel.process(1).unwrap().priority, 0.5);
}

#[test]
fn first_ready_never_preempts() {
    let mut rig = with(SchedulerKind::FirstReady, 1);
    rig.create(CHILD_NAME_ADDR);
    for _ in 0..5 {
        rig.irq(Irq::Timer);
        assert_eq!(rig.kernel.current(), Some(1));
    }
    rig.kill(0);
    assert_eq!(rig.kernel.current(), Some(2));
}
