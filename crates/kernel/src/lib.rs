#![cfg_attr(not(test), no_std)]
//! Teaching kernel for the simulated computer.
//!
//! The CPU calls [`Kernel`] through [`types::InterruptHandler`] on every
//! interrupt. The kernel keeps a table of processes, services blocking I/O
//! and process waits, picks the next process to run and, when demand
//! paging, pulls pages from a backing store into free frames.

extern crate alloc;

pub mod config;
pub use config::{KernelConfig, MemoryMode, SchedulerKind};

pub mod error;
pub use error::{KernelError, KernelResult};

pub mod process;
pub use process::{BlockCause, Image, Pid, ProcState, Process, ProcessMetrics, TrapFrame};

pub mod table;
pub use table::ProcessTable;

pub mod queue;
pub use queue::ReadyQueue;

pub mod frames;
pub use frames::{Frame, FrameTable};

pub mod disk;
pub use disk::BackingStore;

pub mod scheduler;
pub use scheduler::{priority_after, Quantum, Scheduler};

pub mod metrics;
pub use metrics::{MetricsReport, ProcessReport};

mod kernel;
pub use kernel::Kernel;

mod paging;
mod syscall;
mod trap;
