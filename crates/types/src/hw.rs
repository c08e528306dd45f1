//! Collaborator interfaces the kernel is written against.
//!
//! Every access is fallible; the kernel decides whether a failure is a
//! retry, a failure code for the calling process or a fatal condition.

use alloc::boxed::Box;
use core::fmt;

use crate::{CpuMode, HwResult, Irq, PageTable, Program, Word};

/// Word-addressed physical memory.
pub trait PhysicalMemory: fmt::Debug {
    fn size(&self) -> usize;
    fn read(&self, addr: usize) -> HwResult<Word>;
    fn write(&mut self, addr: usize, value: Word) -> HwResult<()>;
}

/// Device registers on the I/O bus, addressed as `base + offset`.
pub trait DeviceBus: fmt::Debug {
    fn read(&mut self, device: usize) -> HwResult<Word>;
    fn write(&mut self, device: usize, value: Word) -> HwResult<()>;
}

/// Address translation unit.
pub trait Mmu: fmt::Debug {
    /// Read one word at `vaddr`. In user mode the address is translated
    /// through `table`; in supervisor mode it is used as a physical address.
    fn read(&self, table: &PageTable, vaddr: usize, mode: CpuMode) -> HwResult<Word>;
    /// Make `table` the one the CPU translates through after the interrupt.
    fn install(&mut self, table: &PageTable);
}

/// Resolves program names to executable images.
pub trait ProgramLoader: fmt::Debug {
    fn load(&self, name: &str) -> HwResult<Program>;
}

/// Outcome of one trap callback, consumed by the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapAction {
    /// Return from the interrupt into the dispatched process.
    Continue,
    /// Nothing runnable: stop until the next interrupt.
    Idle,
    /// The kernel has shut down; the timer is disarmed.
    Halt,
}

/// The trap callback the CPU invokes on every interrupt.
pub trait InterruptHandler {
    fn handle_interrupt(&mut self, irq: Irq) -> TrapAction;
}

/// Bundle of collaborators handed to the kernel at initialization.
#[derive(Debug)]
pub struct Hardware {
    pub memory: Box<dyn PhysicalMemory>,
    pub devices: Box<dyn DeviceBus>,
    pub mmu: Box<dyn Mmu>,
    pub loader: Box<dyn ProgramLoader>,
}
