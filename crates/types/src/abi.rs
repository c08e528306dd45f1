//! Fixed addresses and numbering the CPU, the devices and the kernel agree on.

/// Physical address where the interrupt handler program must be loaded.
/// The CPU jumps here after saving its registers into the save area.
pub const TRAP_HANDLER_ADDR: usize = 10;

/// Words per page/frame unless the kernel is configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Physical words the CPU fills on interrupt entry and reloads on return.
pub mod save_area {
    pub const PC: usize = 0;
    pub const A: usize = 1;
    pub const X: usize = 2;
    pub const FAULT: usize = 3;
    pub const COMPLEMENT: usize = 4;
    pub const MODE: usize = 5;

    /// One past the last save-area word.
    pub const END: usize = 6;
}

/// System call identifiers, passed by user code in register A.
pub mod syscall {
    use crate::Word;

    pub const READ: Word = 1;
    pub const WRITE: Word = 2;
    pub const CREATE_PROCESS: Word = 7;
    pub const KILL_PROCESS: Word = 8;
    pub const WAIT_PROCESS: Word = 9;
}

/// Device register numbering on the I/O bus.
///
/// Four terminals sit at bases 0, 4, 8 and 12, each exposing keyboard data,
/// keyboard status, screen data and screen status. A status of 0 means
/// "not ready". The clock registers follow the terminals.
pub mod device {
    pub const KEYBOARD: usize = 0;
    pub const KEYBOARD_READY: usize = 1;
    pub const SCREEN: usize = 2;
    pub const SCREEN_READY: usize = 3;

    pub const TERMINAL_STRIDE: usize = 4;
    pub const TERMINAL_COUNT: usize = 4;

    pub const CLOCK_INSTRUCTIONS: usize = 16;
    pub const CLOCK_REAL: usize = 17;
    pub const CLOCK_TIMER: usize = 18;
    pub const CLOCK_PENDING: usize = 19;

    /// Terminal base register assigned to a process: `((pid - 1) % 4) * 4`.
    pub const fn terminal_base(pid: usize) -> usize {
        (pid.saturating_sub(1) % TERMINAL_COUNT) * TERMINAL_STRIDE
    }
}
