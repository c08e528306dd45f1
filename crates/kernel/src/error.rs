use core::fmt;

use types::HwError;

use crate::process::Pid;

/// Failures inside the kernel. None of these reach the CPU: the trap path
/// turns them into a -1 for the caller or the internal-error flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    Hardware(HwError),
    /// Page fault with every frame occupied.
    NoFreeFrame,
    OutOfFrames { needed: usize, free: usize },
    BackingStoreFull { needed: usize, free: usize },
    /// Non-byte value in a user string at this virtual address.
    BadString(usize),
    NameTooLong(usize),
    UnknownProcess(Pid),
    HandlerMisplaced { expected: usize, found: usize },
    NoCurrentProcess,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::Hardware(err) => write!(f, "hardware: {}", err),
            KernelError::NoFreeFrame => f.write_str("no free frame (page replacement not implemented)"),
            KernelError::OutOfFrames { needed, free } => {
                write!(f, "image needs {} frames, {} free", needed, free)
            }
            KernelError::BackingStoreFull { needed, free } => {
                write!(f, "backing store full: need {} words, {} free", needed, free)
            }
            KernelError::BadString(addr) => write!(f, "invalid character at virtual address {}", addr),
            KernelError::NameTooLong(max) => write!(f, "name longer than {} words", max),
            KernelError::UnknownProcess(pid) => write!(f, "no process with pid {}", pid),
            KernelError::HandlerMisplaced { expected, found } => write!(
                f,
                "interrupt handler loaded at {}, expected {}",
                found, expected
            ),
            KernelError::NoCurrentProcess => f.write_str("no current process"),
        }
    }
}

impl core::error::Error for KernelError {}

impl From<HwError> for KernelError {
    fn from(err: HwError) -> Self {
        KernelError::Hardware(err)
    }
}

pub type KernelResult<T> = Result<T, KernelError>;
