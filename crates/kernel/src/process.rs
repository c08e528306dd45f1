use core::fmt;

use serde::Serialize;
use types::{device, PageTable, Word};

/// Process identifier. 0 is reserved and never names a process.
pub type Pid = usize;

/// Priority every process starts with.
pub const INITIAL_PRIORITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcState {
    Running,
    Ready,
    Blocked,
    Dead,
}

impl ProcState {
    /// Ready or running: holds a place in the ready queue.
    pub fn is_runnable(self) -> bool {
        matches!(self, ProcState::Running | ProcState::Ready)
    }
}

impl fmt::Display for ProcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProcState::Running => "RUNNING",
            ProcState::Ready => "READY",
            ProcState::Blocked => "BLOCKED",
            ProcState::Dead => "DEAD",
        })
    }
}

/// What a blocked process is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCause {
    None,
    /// Keyboard data on the terminal at this device base.
    Input(usize),
    /// Screen space on the terminal at this device base.
    Output(usize),
    /// Death of this process.
    Process(Pid),
}

/// CPU registers saved on interrupt entry and restored on dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrapFrame {
    pub pc: Word,
    pub a: Word,
    pub x: Word,
    pub fault: Word,
    pub complement: Word,
}

/// Per-process accounting, in instructions of the simulated clock.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessMetrics {
    pub preemptions: u64,
    pub ready_count: u64,
    pub blocked_count: u64,
    pub running_count: u64,
    pub ready_time: u64,
    pub blocked_time: u64,
    pub running_time: u64,
}

impl ProcessMetrics {
    /// Turnaround: every instruction since creation spent in some state.
    pub fn existence_time(&self) -> u64 {
        self.ready_time + self.blocked_time + self.running_time
    }

    pub fn avg_response_time(&self) -> f64 {
        if self.ready_count == 0 {
            0.0
        } else {
            self.ready_time as f64 / self.ready_count as f64
        }
    }

    fn charge(&mut self, state: ProcState, elapsed: u64) {
        match state {
            ProcState::Running => self.running_time += elapsed,
            ProcState::Ready => self.ready_time += elapsed,
            ProcState::Blocked => self.blocked_time += elapsed,
            ProcState::Dead => {}
        }
    }

    fn count_entry(&mut self, state: ProcState) {
        match state {
            ProcState::Running => self.running_count += 1,
            ProcState::Ready => self.ready_count += 1,
            ProcState::Blocked => self.blocked_count += 1,
            ProcState::Dead => {}
        }
    }
}

/// Where a process image lives: its virtual load range and, when demand
/// paged, the backing-store offset of its first word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Image {
    pub load_addr: usize,
    pub len: usize,
    pub disk_base: usize,
}

impl Image {
    pub fn end(&self) -> usize {
        self.load_addr + self.len
    }

    pub fn contains(&self, vaddr: usize) -> bool {
        vaddr >= self.load_addr && vaddr < self.end()
    }
}

/// Process descriptor.
///
/// State and block cause change together through `block`/`unblock`/`kill`,
/// so a process is BLOCKED exactly when its cause is not `None`.
#[derive(Debug, Clone)]
pub struct Process {
    pid: Pid,
    state: ProcState,
    block: BlockCause,
    pub tf: TrapFrame,
    /// Base register of the terminal this process reads and writes.
    pub device: usize,
    /// In [0, 1]; lower runs sooner.
    pub priority: f64,
    /// Dropped on death; its frames stay occupied.
    pub page_table: Option<PageTable>,
    pub image: Image,
    /// Clock reading when the process was created.
    pub created_at: Word,
    pub metrics: ProcessMetrics,
}

impl Process {
    /// A fresh process is born READY.
    pub fn new(pid: Pid, image: Image, created_at: Word) -> Self {
        let mut metrics = ProcessMetrics::default();
        metrics.count_entry(ProcState::Ready);
        Self {
            pid,
            state: ProcState::Ready,
            block: BlockCause::None,
            tf: TrapFrame {
                pc: image.load_addr as Word,
                ..TrapFrame::default()
            },
            device: device::terminal_base(pid),
            priority: INITIAL_PRIORITY,
            page_table: Some(PageTable::new()),
            image,
            created_at,
            metrics,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn state(&self) -> ProcState {
        self.state
    }

    pub fn block_cause(&self) -> BlockCause {
        self.block
    }

    pub fn is_alive(&self) -> bool {
        self.state != ProcState::Dead
    }

    /// Move between READY and RUNNING. Blocking and death go through
    /// `block` and `kill`.
    pub fn set_state(&mut self, state: ProcState) {
        debug_assert!(state.is_runnable(), "use block()/kill() for {}", state);
        self.enter(state);
    }

    pub fn block(&mut self, cause: BlockCause) {
        debug_assert!(cause != BlockCause::None);
        self.enter(ProcState::Blocked);
        self.block = cause;
    }

    pub fn unblock(&mut self) {
        self.enter(ProcState::Ready);
        self.block = BlockCause::None;
    }

    /// Mark DEAD and drop the page table. Returns the table so the caller
    /// can log what was mapped.
    pub fn kill(&mut self) -> Option<PageTable> {
        self.enter(ProcState::Dead);
        self.block = BlockCause::None;
        self.page_table.take()
    }

    /// Account `elapsed` instructions to the current state.
    pub fn charge(&mut self, elapsed: u64) {
        self.metrics.charge(self.state, elapsed);
    }

    fn enter(&mut self, state: ProcState) {
        self.state = state;
        self.metrics.count_entry(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> Image {
        Image {
            load_addr: 0,
            len: 25,
            disk_base: 0,
        }
    }

    #[test]
    fn new_process_is_born_ready() {
        let p = Process::new(5, image(), 40);
        assert_eq!(p.state(), ProcState::Ready);
        assert_eq!(p.metrics.ready_count, 1);
        assert_eq!(p.priority, INITIAL_PRIORITY);
        assert_eq!(p.device, 0);
        assert_eq!(p.created_at, 40);
        assert!(p.page_table.is_some());
    }

    #[test]
    fn device_base_cycles_over_four_terminals() {
        let bases: Vec<usize> = (1..=6).map(|pid| Process::new(pid, image(), 0).device).collect();
        assert_eq!(bases, vec![0, 4, 8, 12, 0, 4]);
    }

    #[test]
    fn block_cause_follows_state() {
        let mut p = Process::new(1, image(), 0);
        p.block(BlockCause::Input(0));
        assert_eq!(p.state(), ProcState::Blocked);
        assert_eq!(p.block_cause(), BlockCause::Input(0));
        p.unblock();
        assert_eq!(p.state(), ProcState::Ready);
        assert_eq!(p.block_cause(), BlockCause::None);
        assert_eq!(p.metrics.blocked_count, 1);
        assert_eq!(p.metrics.ready_count, 2);
    }

    #[test]
    fn kill_drops_the_page_table() {
        let mut p = Process::new(1, image(), 0);
        p.block(BlockCause::Process(2));
        assert!(p.kill().is_some());
        assert!(!p.is_alive());
        assert_eq!(p.block_cause(), BlockCause::None);
        assert!(p.page_table.is_none());
    }

    #[test]
    fn time_is_charged_to_the_current_state() {
        let mut p = Process::new(1, image(), 0);
        p.charge(7);
        p.set_state(ProcState::Running);
        p.charge(5);
        p.block(BlockCause::Output(0));
        p.charge(3);
        assert_eq!(p.metrics.ready_time, 7);
        assert_eq!(p.metrics.running_time, 5);
        assert_eq!(p.metrics.blocked_time, 3);
        assert_eq!(p.metrics.existence_time(), 15);
        assert_eq!(p.metrics.avg_response_time(), 7.0);
    }
}
