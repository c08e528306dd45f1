use alloc::string::String;
use core::fmt;

/// Failure reported by a hardware collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwError {
    /// Physical or translated address outside memory.
    InvalidAddress(usize),
    /// Virtual address whose page has no frame in the given page table.
    PageMissing(usize),
    /// No device register with this number.
    InvalidDevice(usize),
    /// Device cannot accept the access right now.
    DeviceBusy(usize),
    /// Device access failed outright.
    DeviceFault(usize),
    /// The loader could not resolve the program name.
    ProgramNotFound(String),
}

pub type HwResult<T> = core::result::Result<T, HwError>;

impl fmt::Display for HwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HwError::InvalidAddress(addr) => write!(f, "invalid address {}", addr),
            HwError::PageMissing(addr) => write!(f, "page missing for virtual address {}", addr),
            HwError::InvalidDevice(dev) => write!(f, "invalid device {}", dev),
            HwError::DeviceBusy(dev) => write!(f, "device {} busy", dev),
            HwError::DeviceFault(dev) => write!(f, "device {} failed", dev),
            HwError::ProgramNotFound(name) => write!(f, "program '{}' not found", name),
        }
    }
}

impl core::error::Error for HwError {}
