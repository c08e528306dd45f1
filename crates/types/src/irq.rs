use core::fmt;

use crate::Word;

/// Cause of an interrupt, as delivered by the CPU to the trap callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Irq {
    Reset,
    CpuError,
    SystemCall,
    Timer,
    Keyboard,
    Screen,
    Unknown(Word),
}

impl Irq {
    /// Causes with a dedicated interrupt counter.
    pub const COUNTED: [Irq; 6] = [
        Irq::Reset,
        Irq::CpuError,
        Irq::SystemCall,
        Irq::Timer,
        Irq::Keyboard,
        Irq::Screen,
    ];

    pub fn from_raw(raw: Word) -> Self {
        match raw {
            0 => Irq::Reset,
            1 => Irq::CpuError,
            2 => Irq::SystemCall,
            3 => Irq::Timer,
            4 => Irq::Keyboard,
            5 => Irq::Screen,
            other => Irq::Unknown(other),
        }
    }

    pub fn raw(self) -> Word {
        match self {
            Irq::Reset => 0,
            Irq::CpuError => 1,
            Irq::SystemCall => 2,
            Irq::Timer => 3,
            Irq::Keyboard => 4,
            Irq::Screen => 5,
            Irq::Unknown(raw) => raw,
        }
    }

    /// Index into a counter array of `COUNTED.len()` slots.
    pub fn counter_index(self) -> Option<usize> {
        match self {
            Irq::Unknown(_) => None,
            known => Some(known.raw() as usize),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Irq::Reset => "IRQ_RESET",
            Irq::CpuError => "IRQ_CPU_ERROR",
            Irq::SystemCall => "IRQ_SYSTEM_CALL",
            Irq::Timer => "IRQ_TIMER",
            Irq::Keyboard => "IRQ_KEYBOARD",
            Irq::Screen => "IRQ_SCREEN",
            Irq::Unknown(_) => "IRQ_UNKNOWN",
        }
    }
}

impl fmt::Display for Irq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Irq::Unknown(raw) => write!(f, "{} ({})", self.name(), raw),
            _ => f.write_str(self.name()),
        }
    }
}

/// Fault cause the CPU leaves in the save area when raising `Irq::CpuError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuFault {
    None,
    InvalidAddress,
    InvalidOperation,
    InvalidInstruction,
    PageMissing,
    PrivilegedInstruction,
    DeviceBusy,
    CpuHalted,
    Unknown(Word),
}

impl CpuFault {
    pub fn from_raw(raw: Word) -> Self {
        match raw {
            0 => CpuFault::None,
            1 => CpuFault::InvalidAddress,
            2 => CpuFault::InvalidOperation,
            3 => CpuFault::InvalidInstruction,
            4 => CpuFault::PageMissing,
            5 => CpuFault::PrivilegedInstruction,
            6 => CpuFault::DeviceBusy,
            7 => CpuFault::CpuHalted,
            other => CpuFault::Unknown(other),
        }
    }

    pub fn raw(self) -> Word {
        match self {
            CpuFault::None => 0,
            CpuFault::InvalidAddress => 1,
            CpuFault::InvalidOperation => 2,
            CpuFault::InvalidInstruction => 3,
            CpuFault::PageMissing => 4,
            CpuFault::PrivilegedInstruction => 5,
            CpuFault::DeviceBusy => 6,
            CpuFault::CpuHalted => 7,
            CpuFault::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for CpuFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CpuFault::None => "no fault",
            CpuFault::InvalidAddress => "invalid address",
            CpuFault::InvalidOperation => "invalid operation",
            CpuFault::InvalidInstruction => "invalid instruction",
            CpuFault::PageMissing => "page missing",
            CpuFault::PrivilegedInstruction => "privileged instruction",
            CpuFault::DeviceBusy => "device busy",
            CpuFault::CpuHalted => "cpu halted",
            CpuFault::Unknown(raw) => return write!(f, "unknown fault {}", raw),
        };
        f.write_str(name)
    }
}

/// Privilege mode the CPU returns to after an interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuMode {
    Supervisor = 0,
    User = 1,
}

impl CpuMode {
    pub fn raw(self) -> Word {
        self as Word
    }
}
