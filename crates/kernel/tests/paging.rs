mod common;

use common::{init_image, registry, Rig, CHILD_NAME_ADDR, HANDLER};
use kernel::{Kernel, KernelConfig, MemoryMode};
use types::{CpuFault, Irq, TrapAction};
use vm::{CpuEvent, Machine, ProgramRegistry, ScriptedCpu};

fn contiguous() -> KernelConfig {
    KernelConfig {
        memory_mode: MemoryMode::Contiguous,
        ..KernelConfig::default()
    }
}

#[test]
fn first_access_faults_once_and_claims_one_frame() {
    let config = KernelConfig::default();
    let machine = Machine::new(200, config.page_size, registry());
    let mut kernel = Kernel::new(config, machine.hardware());
    let mut cpu = ScriptedCpu::new(
        machine.clone(),
        vec![
            CpuEvent::access(13),
            CpuEvent::access(13),
            CpuEvent::access(17),
        ],
    );

    cpu.power_on(&mut kernel);
    cpu.run(&mut kernel);

    assert_eq!(machine.mmu.faults(), 1);
    let owned: Vec<usize> = kernel.frames().owned_by(1).collect();
    assert_eq!(owned, vec![2]);
    let page = machine.ram.words(20, 30).unwrap();
    assert_eq!(page, init_image()[10..20].to_vec());
    assert_eq!(machine.mmu.active().frame_of(1), Some(2));
    assert!(!kernel.internal_error());
    assert_eq!(cpu.trace().len(), 2);
}

#[test]
fn tail_page_is_zero_padded() {
    let programs = registry().with("init.maq", 0, (1..=13).collect());
    let mut rig = Rig::new(KernelConfig::default(), programs, 200);
    rig.irq(Irq::Reset);

    rig.machine.set_fault(CpuFault::PageMissing, 15);
    assert_eq!(rig.irq(Irq::CpuError), TrapAction::Continue);

    let frame = rig.kernel.frames().owned_by(1).next().unwrap();
    let base = rig.kernel.frames().base(frame);
    assert_eq!(
        rig.machine.ram.words(base, base + 10).unwrap(),
        vec![11, 12, 13, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn frame_exhaustion_is_fatal_and_changes_nothing() {
    // 20 words: frame 0 holds the save area, frame 1 the handler
    let mut rig = Rig::new(KernelConfig::default(), registry(), 20);
    assert_eq!(rig.irq(Irq::Reset), TrapAction::Continue);
    let before = rig.kernel.frames().clone();
    assert_eq!(before.free_count(), 0);

    rig.machine.set_fault(CpuFault::PageMissing, 3);
    assert_eq!(rig.irq(Irq::CpuError), TrapAction::Halt);

    assert!(rig.kernel.internal_error());
    assert_eq!(rig.kernel.frames(), &before);
    let init = rig.kernel.process(1).unwrap();
    assert!(init.page_table.as_ref().unwrap().is_empty());
}

#[test]
fn create_pages_in_the_name_it_copies() {
    let mut rig = Rig::booted();

    rig.create(CHILD_NAME_ADDR);

    assert_eq!(rig.a(), 2);
    assert_eq!(rig.kernel.frames().owned_by(1).count(), 1);
    let table = rig.kernel.process(1).unwrap().page_table.clone().unwrap();
    assert_eq!(table.len(), 1);
    assert!(table.frame_of(2).is_some());
}

#[test]
fn name_copy_without_a_free_frame_fails_softly() {
    let mut rig = Rig::new(KernelConfig::default(), registry(), 20);
    rig.irq(Irq::Reset);

    assert_eq!(rig.create(CHILD_NAME_ADDR), TrapAction::Continue);
    assert_eq!(rig.a(), -1);
    assert!(!rig.kernel.internal_error());
}

#[test]
fn other_cpu_faults_are_fatal() {
    let mut rig = Rig::booted();
    rig.machine.set_fault(CpuFault::InvalidInstruction, 0);
    assert_eq!(rig.irq(Irq::CpuError), TrapAction::Halt);
    assert!(rig.kernel.internal_error());
}

#[test]
fn contiguous_load_maps_every_page_up_front() {
    let mut rig = Rig::new(contiguous(), registry(), 200);
    assert_eq!(rig.irq(Irq::Reset), TrapAction::Continue);

    let owned: Vec<usize> = rig.kernel.frames().owned_by(1).collect();
    assert_eq!(owned, vec![2, 3, 4]);
    assert_eq!(rig.machine.mmu.active().len(), 3);
    assert_eq!(rig.machine.ram.words(20, 50).unwrap(), init_image());
    assert_eq!(rig.kernel.backing_store().used(), 0);

    assert_eq!(rig.machine.mmu.access(25), Ok(init_image()[25]));
    assert_eq!(rig.machine.mmu.faults(), 0);

    // the name copy needs no paging here
    rig.create(CHILD_NAME_ADDR);
    assert_eq!(rig.a(), 2);
    assert_eq!(rig.kernel.frames().owned_by(2).count(), 3);
}

#[test]
fn contiguous_load_without_room_fails_the_create() {
    let programs = ProgramRegistry::new()
        .with("trata_int.maq", 10, HANDLER.to_vec())
        .with("init.maq", 0, {
            let mut words = vec![0; 3];
            words.extend(vm::loader::encode_str("child.bin"));
            words
        })
        .with("child.bin", 0, (0..30).collect());
    // frames: 0 and 1 reserved, 2 and 3 for init, 4 left
    let mut rig = Rig::new(contiguous(), programs, 50);
    rig.irq(Irq::Reset);
    assert_eq!(rig.kernel.frames().free_count(), 1);
    let before = rig.kernel.frames().clone();

    assert_eq!(rig.create(3), TrapAction::Continue);
    assert_eq!(rig.a(), -1);
    assert_eq!(rig.kernel.frames(), &before);
    assert!(rig.kernel.process(2).is_none());
    assert!(!rig.kernel.internal_error());
}

#[test]
fn page_fault_in_contiguous_mode_is_fatal() {
    let mut rig = Rig::new(contiguous(), registry(), 200);
    rig.irq(Irq::Reset);
    rig.machine.set_fault(CpuFault::PageMissing, 99);
    assert_eq!(rig.irq(Irq::CpuError), TrapAction::Halt);
    assert!(rig.kernel.internal_error());
}
