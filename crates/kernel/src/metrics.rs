use alloc::vec::Vec;
use core::fmt;

use serde::Serialize;
use types::{device, Irq, Word};

use crate::config::{MemoryMode, SchedulerKind};
use crate::kernel::Kernel;
use crate::process::{Pid, ProcState, ProcessMetrics};

/// Kernel-wide counters, updated once per interrupt.
#[derive(Debug, Clone, Default)]
pub struct SystemMetrics {
    /// Instruction clock at the last interrupt.
    pub clock: Word,
    pub interrupts: [u64; Irq::COUNTED.len()],
    pub unknown_interrupts: u64,
    pub processes_created: u64,
}

impl Kernel {
    /// Count `irq` and charge the instructions since the last interrupt to
    /// every process according to the state it was in.
    pub(crate) fn update_metrics(&mut self, irq: Irq) {
        match irq.counter_index() {
            Some(idx) => self.metrics.interrupts[idx] += 1,
            None => self.metrics.unknown_interrupts += 1,
        }

        let now = match self.hw.devices.read(device::CLOCK_INSTRUCTIONS) {
            Ok(now) => now,
            Err(err) => {
                self.fail(format_args!("metrics: cannot read the clock: {}", err));
                self.metrics.clock
            }
        };
        let elapsed = now.saturating_sub(self.metrics.clock).max(0) as u64;
        self.metrics.clock = now;
        for proc in self.table.iter_mut() {
            proc.charge(elapsed);
        }
    }

    /// End-of-run accounting.
    pub fn report(&self) -> MetricsReport {
        let processes: Vec<ProcessReport> = self
            .table
            .iter()
            .map(|p| ProcessReport {
                pid: p.pid(),
                state: p.state(),
                existence_time: p.metrics.existence_time(),
                avg_response_time: p.metrics.avg_response_time(),
                metrics: p.metrics.clone(),
            })
            .collect();

        let mut interrupts: Vec<InterruptCount> = Irq::COUNTED
            .iter()
            .zip(self.metrics.interrupts.iter())
            .map(|(irq, count)| InterruptCount {
                irq: irq.name(),
                count: *count,
            })
            .collect();
        if self.metrics.unknown_interrupts > 0 {
            interrupts.push(InterruptCount {
                irq: Irq::Unknown(-1).name(),
                count: self.metrics.unknown_interrupts,
            });
        }

        MetricsReport {
            timer_interval: self.config.timer_interval,
            quantum: self.config.default_quantum,
            scheduler: self.config.scheduler,
            memory_mode: self.config.memory_mode,
            processes_created: self.metrics.processes_created,
            total_running_time: processes.iter().map(|p| p.metrics.running_time).sum(),
            total_blocked_time: processes.iter().map(|p| p.metrics.blocked_time).sum(),
            preemptions: processes.iter().map(|p| p.metrics.preemptions).sum(),
            interrupts,
            processes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterruptCount {
    pub irq: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessReport {
    pub pid: Pid,
    pub state: ProcState,
    /// Turnaround time: instructions spent in any state.
    pub existence_time: u64,
    /// Ready time divided by the number of times the process became ready.
    pub avg_response_time: f64,
    pub metrics: ProcessMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub timer_interval: i32,
    pub quantum: u32,
    pub scheduler: SchedulerKind,
    pub memory_mode: MemoryMode,
    pub processes_created: u64,
    pub total_running_time: u64,
    pub total_blocked_time: u64,
    pub preemptions: u64,
    pub interrupts: Vec<InterruptCount>,
    pub processes: Vec<ProcessReport>,
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "##################################################")?;
        writeln!(f, "#####           Operating system metrics     #####")?;
        writeln!(f, "##################################################")?;
        writeln!(f)?;
        writeln!(f, "## Configuration")?;
        writeln!(f, "-> timer interval:   {} instructions", self.timer_interval)?;
        writeln!(f, "-> quantum:          {} interrupts", self.quantum)?;
        writeln!(f, "-> scheduler:        {}", self.scheduler)?;
        writeln!(f, "-> memory:           {}", self.memory_mode)?;
        writeln!(f)?;
        writeln!(f, "## System")?;
        writeln!(f, "-> processes created: {}", self.processes_created)?;
        writeln!(f, "-> running time:      {} instructions", self.total_running_time)?;
        writeln!(f, "-> blocked time:      {} instructions", self.total_blocked_time)?;
        writeln!(f, "-> preemptions:       {}", self.preemptions)?;
        writeln!(f)?;
        writeln!(f, "## Interrupts")?;
        for entry in &self.interrupts {
            writeln!(f, "-> {:<16} {}", entry.irq, entry.count)?;
        }
        for p in &self.processes {
            let m = &p.metrics;
            writeln!(f)?;
            writeln!(f, "-------------------- pid #{:02} ({}) --------------------", p.pid, p.state)?;
            writeln!(f, "-> turnaround time:   {} instructions", p.existence_time)?;
            writeln!(f, "-> preemptions:       {}", m.preemptions)?;
            writeln!(f, "-> avg response time: {:.2} instructions", p.avg_response_time)?;
            writeln!(f, "|            |   ready    |  blocked   |  running   |")?;
            writeln!(
                f,
                "| entries    | {:>10} | {:>10} | {:>10} |",
                m.ready_count, m.blocked_count, m.running_count
            )?;
            writeln!(
                f,
                "| time       | {:>10} | {:>10} | {:>10} |",
                m.ready_time, m.blocked_time, m.running_time
            )?;
        }
        Ok(())
    }
}
