use types::{device, save_area, CpuMode, Hardware, Program, Word, TRAP_HANDLER_ADDR};

use crate::config::{KernelConfig, MemoryMode};
use crate::disk::BackingStore;
use crate::error::{KernelError, KernelResult};
use crate::frames::FrameTable;
use crate::metrics::SystemMetrics;
use crate::process::{BlockCause, Image, Pid, ProcState, Process};
use crate::queue::ReadyQueue;
use crate::scheduler::Scheduler;
use crate::table::ProcessTable;

/// The kernel context. Owns every piece of mutable kernel state; the
/// hardware is reached only through the collaborators in `hw`.
#[derive(Debug)]
pub struct Kernel {
    pub(crate) config: KernelConfig,
    pub(crate) hw: Hardware,
    pub(crate) table: ProcessTable,
    pub(crate) queue: ReadyQueue,
    pub(crate) frames: FrameTable,
    pub(crate) disk: BackingStore,
    pub(crate) scheduler: Scheduler,
    pub(crate) current: Option<Pid>,
    pub(crate) metrics: SystemMetrics,
    internal_error: bool,
}

impl Kernel {
    /// Boot: reserve the kernel's frames, load the interrupt handler at its
    /// fixed address and arm the timer. Failures set the internal-error flag
    /// and the first interrupt shuts the machine down.
    pub fn new(config: KernelConfig, hw: Hardware) -> Self {
        let frames = FrameTable::new(hw.memory.size(), config.page_size);
        let mut kernel = Self {
            table: ProcessTable::new(config.initial_slots),
            queue: ReadyQueue::new(),
            disk: BackingStore::new(config.disk_size),
            scheduler: Scheduler::new(config.scheduler, config.default_quantum),
            current: None,
            metrics: SystemMetrics::default(),
            internal_error: false,
            frames,
            config,
            hw,
        };
        log::info!(
            "boot: {} frames of {} words, scheduler={} memory={}",
            kernel.frames.len(),
            kernel.config.page_size,
            kernel.config.scheduler,
            kernel.config.memory_mode
        );

        kernel.frames.reserve_range(0, save_area::END);
        if let Err(err) = kernel.load_trap_handler() {
            kernel.fail(format_args!("boot: interrupt handler: {}", err));
        }
        if let Err(err) = kernel.hw.devices.write(device::CLOCK_TIMER, kernel.config.timer_interval) {
            kernel.fail(format_args!("boot: cannot program the timer: {}", err));
        }
        kernel
    }

    fn load_trap_handler(&mut self) -> KernelResult<()> {
        let program = self.hw.loader.load(&self.config.trap_handler)?;
        if program.load_addr != TRAP_HANDLER_ADDR {
            return Err(KernelError::HandlerMisplaced {
                expected: TRAP_HANDLER_ADDR,
                found: program.load_addr,
            });
        }
        for (offset, word) in program.words.iter().enumerate() {
            self.hw.memory.write(program.load_addr + offset, *word)?;
        }
        self.frames.reserve_range(0, program.end());
        log::info!(
            "boot: '{}' loaded at [{}, {})",
            program.name,
            program.load_addr,
            program.end()
        );
        Ok(())
    }

    /// Set the sticky internal-error flag. The next dispatch halts.
    pub(crate) fn fail(&mut self, reason: core::fmt::Arguments<'_>) {
        log::error!("{}", reason);
        self.internal_error = true;
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn internal_error(&self) -> bool {
        self.internal_error
    }

    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.table.get(pid)
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> + '_ {
        self.table.iter()
    }

    pub fn ready_queue(&self) -> &ReadyQueue {
        &self.queue
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn backing_store(&self) -> &BackingStore {
        &self.disk
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Last clock reading, in instructions.
    pub fn clock(&self) -> Word {
        self.metrics.clock
    }

    /// Load `name` into a new READY process at the back of the ready queue.
    /// The pid is only consumed when creation succeeds.
    pub fn create_process(&mut self, name: &str) -> KernelResult<Pid> {
        let program = self.hw.loader.load(name)?;
        let pid = self.table.next_pid();
        let image = Image {
            load_addr: program.load_addr,
            len: program.len(),
            disk_base: 0,
        };
        let mut process = Process::new(pid, image, self.metrics.clock);

        match self.config.memory_mode {
            MemoryMode::Contiguous => self.load_contiguous(&mut process, &program)?,
            MemoryMode::DemandPaged => {
                process.image.disk_base = self.disk.append(&program.words)?;
                log::debug!(
                    "create_process: '{}' staged at disk [{}, {})",
                    name,
                    process.image.disk_base,
                    process.image.disk_base + program.len()
                );
            }
        }

        self.table.push(process);
        self.queue.push_back(pid);
        self.metrics.processes_created += 1;
        log::info!("create_process: pid={} name='{}' pc={}", pid, name, program.load_addr);
        Ok(pid)
    }

    /// Copy every page of `program` into freshly claimed frames and map it.
    /// Nothing is claimed unless all pages fit.
    fn load_contiguous(&mut self, process: &mut Process, program: &Program) -> KernelResult<()> {
        let pid = process.pid();
        let page_size = self.config.page_size;
        let pages = page_span(program.load_addr, program.len(), page_size);
        let needed = pages.len();
        let free = self.frames.free_count();
        if needed > free {
            return Err(KernelError::OutOfFrames { needed, free });
        }
        let Some(table) = process.page_table.as_mut() else {
            return Err(KernelError::UnknownProcess(pid));
        };
        for page in pages {
            let frame = self.frames.claim(pid).ok_or(KernelError::NoFreeFrame)?;
            let base = self.frames.base(frame);
            for offset in 0..page_size {
                let word = program.word_at(page * page_size + offset).unwrap_or(0);
                self.hw.memory.write(base + offset, word)?;
            }
            table.map(page, frame);
        }
        log::debug!(
            "create_process: pid={} mapped {} pages",
            pid,
            table.len()
        );
        Ok(())
    }

    /// Block `pid`, take it off the ready queue and charge it for the part
    /// of the slice it used.
    pub(crate) fn block(&mut self, pid: Pid, cause: BlockCause) {
        self.scheduler.charge_block(&mut self.table, pid);
        if let Some(proc) = self.table.get_mut(pid) {
            proc.block(cause);
            self.queue.remove(pid);
            log::debug!("block: pid={} on {:?}", pid, cause);
        }
    }

    pub(crate) fn unblock(&mut self, pid: Pid) {
        if let Some(proc) = self.table.get_mut(pid) {
            proc.unblock();
            self.queue.push_back(pid);
            log::debug!("unblock: pid={}", pid);
        }
    }

    /// Kill `pid`. Fails for unknown or already dead processes.
    pub(crate) fn kill(&mut self, pid: Pid) -> KernelResult<()> {
        let proc = self
            .table
            .get_mut(pid)
            .filter(|p| p.is_alive())
            .ok_or(KernelError::UnknownProcess(pid))?;
        let dropped = proc.kill();
        self.queue.remove(pid);
        if self.current == Some(pid) {
            self.current = None;
        }
        log::info!(
            "kill: pid={} ({} pages unmapped, frames kept)",
            pid,
            dropped.map(|t| t.len()).unwrap_or(0)
        );
        Ok(())
    }

    /// Make `pid` current and RUNNING, as RESET does for init.
    pub(crate) fn start(&mut self, pid: Pid) {
        if let Some(proc) = self.table.get_mut(pid) {
            proc.set_state(ProcState::Running);
            self.current = Some(pid);
        }
    }

    pub(crate) fn set_user_mode(&mut self) -> KernelResult<()> {
        self.hw.memory.write(save_area::MODE, CpuMode::User.raw())?;
        Ok(())
    }
}

/// Pages touched by `len` words starting at `start`.
pub(crate) fn page_span(start: usize, len: usize, page_size: usize) -> core::ops::Range<usize> {
    if len == 0 {
        return 0..0;
    }
    start / page_size..(start + len - 1) / page_size + 1
}
