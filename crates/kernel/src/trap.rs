//! Interrupt entry.
//!
//! Every interrupt runs the same five phases to completion: save the
//! interrupted registers, route on the cause, resolve pending I/O and
//! waits, schedule, then dispatch or halt. Nothing survives between
//! interrupts except the kernel context; a blocked process is just data.

use alloc::vec::Vec;

use types::{device, save_area, CpuFault, InterruptHandler, Irq, PageTable, TrapAction, Word};

use crate::config::MemoryMode;
use crate::error::{KernelError, KernelResult};
use crate::kernel::Kernel;
use crate::process::{BlockCause, Pid, ProcState, TrapFrame};

impl InterruptHandler for Kernel {
    fn handle_interrupt(&mut self, irq: Irq) -> TrapAction {
        log::debug!("trap: {} current={:?}", irq, self.current);
        self.update_metrics(irq);
        self.save_cpu_state();
        self.route(irq);
        self.resolve_pending();
        self.schedule();
        self.dispatch_or_halt()
    }
}

impl Kernel {
    fn save_cpu_state(&mut self) {
        let Some(pid) = self.current else {
            return;
        };
        match self.read_save_area() {
            Ok(tf) => {
                if let Some(proc) = self.table.get_mut(pid) {
                    proc.tf = tf;
                }
            }
            Err(err) => self.fail(format_args!("trap: cannot read the save area: {}", err)),
        }
    }

    fn read_save_area(&self) -> KernelResult<TrapFrame> {
        let mem = &self.hw.memory;
        Ok(TrapFrame {
            pc: mem.read(save_area::PC)?,
            a: mem.read(save_area::A)?,
            x: mem.read(save_area::X)?,
            fault: mem.read(save_area::FAULT)?,
            complement: mem.read(save_area::COMPLEMENT)?,
        })
    }

    fn write_save_area(&mut self, tf: &TrapFrame) -> KernelResult<()> {
        let mem = &mut self.hw.memory;
        mem.write(save_area::PC, tf.pc)?;
        mem.write(save_area::A, tf.a)?;
        mem.write(save_area::X, tf.x)?;
        mem.write(save_area::FAULT, tf.fault)?;
        mem.write(save_area::COMPLEMENT, tf.complement)?;
        Ok(())
    }

    fn route(&mut self, irq: Irq) {
        match irq {
            Irq::Reset => self.handle_reset(),
            Irq::SystemCall => self.handle_syscall(),
            Irq::CpuError => self.handle_cpu_error(),
            Irq::Timer => self.handle_timer(),
            Irq::Keyboard | Irq::Screen | Irq::Unknown(_) => {
                self.fail(format_args!("trap: unhandled interrupt {}", irq))
            }
        }
    }

    fn handle_reset(&mut self) {
        let init = self.config.init_program.clone();
        match self.create_process(&init) {
            Ok(pid) => {
                self.start(pid);
                if let Err(err) = self.set_user_mode() {
                    self.fail(format_args!("reset: cannot switch to user mode: {}", err));
                }
            }
            Err(err) => self.fail(format_args!("reset: cannot create '{}': {}", init, err)),
        }
    }

    fn handle_cpu_error(&mut self) {
        let Some((pid, fault, complement)) = self
            .current
            .and_then(|pid| self.table.get(pid))
            .map(|p| (p.pid(), CpuFault::from_raw(p.tf.fault), p.tf.complement))
        else {
            self.fail(format_args!("cpu_error: {}", KernelError::NoCurrentProcess));
            return;
        };

        if fault == CpuFault::PageMissing && self.config.memory_mode == MemoryMode::DemandPaged {
            self.handle_page_fault(pid, complement);
            return;
        }
        self.fail(format_args!(
            "cpu_error: unhandled fault {} (complement {}) in pid {}",
            fault, complement, pid
        ));
    }

    fn handle_page_fault(&mut self, pid: Pid, vaddr: Word) {
        let Ok(vaddr) = usize::try_from(vaddr) else {
            self.fail(format_args!("page_fault: pid {} at negative address {}", pid, vaddr));
            return;
        };
        match self.page_in(pid, vaddr) {
            Ok(frame) => log::info!("page_fault: pid={} vaddr={} served by frame {}", pid, vaddr, frame),
            Err(err) => self.fail(format_args!("page_fault: pid={} vaddr={}: {}", pid, vaddr, err)),
        }
    }

    fn handle_timer(&mut self) {
        let cleared = self.hw.devices.write(device::CLOCK_PENDING, 0);
        let rearmed = self.hw.devices.write(device::CLOCK_TIMER, self.config.timer_interval);
        if let Err(err) = cleared.and(rearmed) {
            self.fail(format_args!("timer: cannot re-arm: {}", err));
        }
    }

    /// Complete whatever blocked processes were waiting for, in pid order.
    fn resolve_pending(&mut self) {
        let blocked: Vec<(Pid, BlockCause)> = self
            .table
            .iter()
            .filter(|p| p.state() == ProcState::Blocked)
            .map(|p| (p.pid(), p.block_cause()))
            .collect();

        for (pid, cause) in blocked {
            match cause {
                BlockCause::Input(dev) => match self.try_input(pid, dev) {
                    Ok(true) => self.unblock(pid),
                    Ok(false) => {}
                    Err(err) => self.fail(format_args!("pending: keyboard {}: {}", dev, err)),
                },
                BlockCause::Output(dev) => match self.try_output(pid, dev) {
                    Ok(true) => self.unblock(pid),
                    Ok(false) => {}
                    Err(err) => self.fail(format_args!("pending: screen {}: {}", dev, err)),
                },
                BlockCause::Process(target) => self.resolve_wait(pid, target),
                BlockCause::None => {}
            }
        }
    }

    fn resolve_wait(&mut self, pid: Pid, target: Pid) {
        if !self.table.contains(target) {
            log::warn!("wait: pid={} waits for unknown pid {}", pid, target);
            if let Some(proc) = self.table.get_mut(pid) {
                proc.tf.a = -1;
            }
            self.unblock(pid);
        } else if self.table.get(target).is_some_and(|t| !t.is_alive()) {
            self.unblock(pid);
        }
    }

    fn schedule(&mut self) {
        let previous = self.current;
        let chosen = self.scheduler.select(previous, &mut self.table, &mut self.queue);
        // a process that blocked and was released in this same interrupt
        // comes back READY even when it is reselected
        if let Some(next) = chosen.and_then(|pid| self.table.get_mut(pid)) {
            if next.state() == ProcState::Ready {
                next.set_state(ProcState::Running);
            }
        }
        if chosen != previous {
            if let Some(prev) = previous.and_then(|pid| self.table.get_mut(pid)) {
                if prev.state() == ProcState::Running {
                    prev.set_state(ProcState::Ready);
                }
            }
            log::debug!("schedule: switch {:?} -> {:?}", previous, chosen);
        }
        self.current = chosen;
    }

    fn dispatch_or_halt(&mut self) -> TrapAction {
        if self.internal_error() || !self.table.any_alive() {
            return self.shutdown();
        }
        let Some(pid) = self.current else {
            log::debug!("dispatch: nothing runnable, idling");
            return TrapAction::Idle;
        };
        let Some((tf, table)) = self
            .table
            .get(pid)
            .map(|p| (p.tf, p.page_table.clone().unwrap_or_else(PageTable::new)))
        else {
            return TrapAction::Idle;
        };
        if let Err(err) = self.write_save_area(&tf) {
            self.fail(format_args!("dispatch: cannot write the save area: {}", err));
            return self.shutdown();
        }
        self.hw.mmu.install(&table);
        TrapAction::Continue
    }

    /// Disarm the timer and stop the machine. Both clock writes are
    /// attempted even if the first one fails.
    fn shutdown(&mut self) -> TrapAction {
        let cleared = self.hw.devices.write(device::CLOCK_PENDING, 0);
        let disarmed = self.hw.devices.write(device::CLOCK_TIMER, 0);
        if let Err(err) = cleared.and(disarmed) {
            self.fail(format_args!("shutdown: cannot stop the timer: {}", err));
        }
        if self.internal_error() {
            log::error!("shutdown: internal error, halting");
        } else {
            log::info!("--------------------------------------------------");
            log::info!("------     all processes dead, halting      ------");
            log::info!("--------------------------------------------------");
        }
        TrapAction::Halt
    }
}
