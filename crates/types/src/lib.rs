#![no_std]
//! Hardware ABI shared by the kernel and the simulated machine.
//!
//! Both sides agree on the save-area layout, interrupt and fault codes,
//! device register numbering and the collaborator traits here, so the kernel
//! never depends on the simulator and the simulator never depends on the
//! kernel.

extern crate alloc;

pub mod abi;
pub use abi::{device, save_area, syscall, DEFAULT_PAGE_SIZE, TRAP_HANDLER_ADDR};

pub mod irq;
pub use irq::{CpuFault, CpuMode, Irq};

pub mod result;
pub use result::{HwError, HwResult};

pub mod page_table;
pub use page_table::PageTable;

pub mod program;
pub use program::Program;

pub mod hw;
pub use hw::{DeviceBus, Hardware, InterruptHandler, Mmu, PhysicalMemory, ProgramLoader, TrapAction};

/// One addressable memory cell / register value of the simulated computer.
pub type Word = i32;
