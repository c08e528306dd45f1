use std::collections::VecDeque;

use types::{save_area, CpuFault, HwError, InterruptHandler, Irq, TrapAction, Word};

use crate::machine::Machine;

/// What the CPU does once the event's instructions have elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Raise an interrupt with the given cause.
    Raise(Irq),
    /// Perform a user-mode load; a translation failure raises `CpuError`.
    Access(usize),
}

/// One scripted CPU event: the running process executed `after`
/// instructions, left the given registers in the save area and then hit
/// `step`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuEvent {
    pub step: Step,
    pub after: Word,
    pub a: Option<Word>,
    pub x: Option<Word>,
    pub fault: Option<(CpuFault, Word)>,
}

impl CpuEvent {
    pub fn raise(irq: Irq) -> Self {
        Self {
            step: Step::Raise(irq),
            after: 0,
            a: None,
            x: None,
            fault: None,
        }
    }

    pub fn access(vaddr: usize) -> Self {
        Self {
            step: Step::Access(vaddr),
            ..Self::raise(Irq::CpuError)
        }
    }

    pub fn syscall(id: Word, x: Word) -> Self {
        Self {
            a: Some(id),
            x: Some(x),
            ..Self::raise(Irq::SystemCall)
        }
    }

    pub fn after(mut self, instructions: Word) -> Self {
        self.after = instructions;
        self
    }

    pub fn with_fault(mut self, fault: CpuFault, complement: Word) -> Self {
        self.fault = Some((fault, complement));
        self
    }
}

/// Replays a script of CPU events against an interrupt handler.
///
/// Stands in for the instruction interpreter: instead of executing code it
/// advances the clock, writes the registers a process would have produced
/// and raises the interrupt that code would have triggered. An armed timer
/// that expires while instructions elapse is delivered first.
#[derive(Debug)]
pub struct ScriptedCpu {
    machine: Machine,
    events: VecDeque<CpuEvent>,
    trace: Vec<(Irq, TrapAction)>,
    halted: bool,
}

impl ScriptedCpu {
    pub fn new(machine: Machine, events: impl IntoIterator<Item = CpuEvent>) -> Self {
        Self {
            machine,
            events: events.into_iter().collect(),
            trace: Vec::new(),
            halted: false,
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Every interrupt delivered so far with the handler's answer.
    pub fn trace(&self) -> &[(Irq, TrapAction)] {
        &self.trace
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Deliver the power-on RESET interrupt.
    pub fn power_on(&mut self, handler: &mut dyn InterruptHandler) -> TrapAction {
        self.deliver(handler, Irq::Reset)
    }

    /// Run events until the script is exhausted or the handler halts.
    pub fn run(&mut self, handler: &mut dyn InterruptHandler) -> Option<TrapAction> {
        let mut last = None;
        while !self.halted {
            let Some(event) = self.events.pop_front() else {
                break;
            };
            if let Some(action) = self.step(handler, event) {
                last = Some(action);
            }
        }
        last
    }

    fn step(&mut self, handler: &mut dyn InterruptHandler, event: CpuEvent) -> Option<TrapAction> {
        if self.machine.devices.advance(event.after.max(0)) {
            let action = self.deliver(handler, Irq::Timer);
            if self.halted {
                return Some(action);
            }
        }

        if let Some(a) = event.a {
            self.machine.set_saved(save_area::A, a);
        }
        if let Some(x) = event.x {
            self.machine.set_saved(save_area::X, x);
        }
        if let Some((fault, complement)) = event.fault {
            self.machine.set_fault(fault, complement);
        }

        let irq = match event.step {
            Step::Raise(irq) => irq,
            Step::Access(vaddr) => match self.machine.mmu.access(vaddr) {
                Ok(_) => return None,
                Err(HwError::PageMissing(addr)) => {
                    self.machine.set_fault(CpuFault::PageMissing, addr as Word);
                    Irq::CpuError
                }
                Err(_) => {
                    self.machine.set_fault(CpuFault::InvalidAddress, vaddr as Word);
                    Irq::CpuError
                }
            },
        };
        Some(self.deliver(handler, irq))
    }

    fn deliver(&mut self, handler: &mut dyn InterruptHandler, irq: Irq) -> TrapAction {
        let action = handler.handle_interrupt(irq);
        log::trace!("cpu: {} -> {:?}", irq, action);
        self.trace.push((irq, action));
        if action == TrapAction::Halt {
            self.halted = true;
        }
        action
    }
}
