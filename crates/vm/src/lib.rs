//! In-process simulated computer used to drive the kernel.
//!
//! Each device is a cheap clonable handle over shared state (`Rc<RefCell<_>>`),
//! so a test or the runner can hand boxed clones to the kernel and keep its
//! own handle to inspect memory, terminals, the clock and the installed page
//! table afterwards.

pub mod memory;
pub mod devices;
pub mod mmu;
pub mod loader;
pub mod cpu;
pub mod machine;

pub use cpu::{CpuEvent, ScriptedCpu};
pub use devices::Devices;
pub use loader::ProgramRegistry;
pub use machine::Machine;
pub use memory::Ram;
pub use mmu::SoftMmu;
