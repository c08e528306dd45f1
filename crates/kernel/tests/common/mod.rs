#![allow(dead_code)]

use kernel::{Kernel, KernelConfig, Pid, ProcState};
use types::{save_area, syscall, InterruptHandler, Irq, TrapAction, Word};
use vm::loader::encode_str;
use vm::{Machine, ProgramRegistry};

pub const HANDLER: &[Word] = &[90, 91, 92, 93, 94];
/// Where init keeps the name of the program it creates.
pub const CHILD_NAME_ADDR: Word = 20;
/// Where init keeps a word that is not a byte.
pub const BAD_NAME_ADDR: Word = 5;

/// init: 20 words of code, then "child.bin\0" at 20.
pub fn init_image() -> Vec<Word> {
    let mut words: Vec<Word> = (100..120).collect();
    words[BAD_NAME_ADDR as usize] = 300;
    words.extend(encode_str("child.bin"));
    words
}

pub fn registry() -> ProgramRegistry {
    ProgramRegistry::new()
        .with("trata_int.maq", 10, HANDLER.to_vec())
        .with("init.maq", 0, init_image())
        .with("child.bin", 0, (200..230).collect())
}

/// A kernel booted on a machine it shares memory and devices with.
pub struct Rig {
    pub machine: Machine,
    pub kernel: Kernel,
}

impl Rig {
    pub fn new(config: KernelConfig, programs: ProgramRegistry, memory_size: usize) -> Self {
        let machine = Machine::new(memory_size, config.page_size, programs);
        let kernel = Kernel::new(config, machine.hardware());
        Self { machine, kernel }
    }

    pub fn standard() -> Self {
        Self::new(KernelConfig::default(), registry(), 200)
    }

    /// Boot and deliver RESET.
    pub fn booted() -> Self {
        let mut rig = Self::standard();
        assert_eq!(rig.irq(Irq::Reset), TrapAction::Continue);
        rig
    }

    pub fn irq(&mut self, irq: Irq) -> TrapAction {
        let action = self.kernel.handle_interrupt(irq);
        check_invariants(&self.kernel);
        action
    }

    /// The running process traps with `id` in A and `x` in X.
    pub fn syscall(&mut self, id: Word, x: Word) -> TrapAction {
        self.machine.set_saved(save_area::A, id);
        self.machine.set_saved(save_area::X, x);
        self.irq(Irq::SystemCall)
    }

    pub fn create(&mut self, name_addr: Word) -> TrapAction {
        self.syscall(syscall::CREATE_PROCESS, name_addr)
    }

    pub fn kill(&mut self, pid: Word) -> TrapAction {
        self.syscall(syscall::KILL_PROCESS, pid)
    }

    pub fn wait(&mut self, pid: Word) -> TrapAction {
        self.syscall(syscall::WAIT_PROCESS, pid)
    }

    /// Let `n` instructions elapse without raising the timer.
    pub fn run_for(&mut self, n: Word) {
        self.machine.devices.advance(n);
    }

    /// Register A as the CPU will reload it.
    pub fn a(&self) -> Word {
        self.machine.saved(save_area::A)
    }

    pub fn state(&self, pid: Pid) -> ProcState {
        self.kernel.process(pid).expect("no such process").state()
    }
}

/// Properties that hold after every interrupt.
pub fn check_invariants(kernel: &Kernel) {
    for p in kernel.processes() {
        assert_eq!(
            p.state() == ProcState::Blocked,
            p.block_cause() != kernel::BlockCause::None,
            "pid {} state {} cause {:?}",
            p.pid(),
            p.state(),
            p.block_cause()
        );
        assert_eq!(
            kernel.ready_queue().contains(p.pid()),
            p.state().is_runnable(),
            "pid {} state {} queue {:?}",
            p.pid(),
            p.state(),
            kernel.ready_queue()
        );
        if p.is_alive() {
            assert_eq!(
                p.metrics.existence_time(),
                (kernel.clock() - p.created_at) as u64,
                "pid {} time accounting",
                p.pid()
            );
        }
    }
    if let Some(pid) = kernel.current() {
        assert_eq!(kernel.process(pid).map(|p| p.state()), Some(ProcState::Running));
    }
}
