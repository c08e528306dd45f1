//! Process selection.
//!
//! The scheduler runs once per interrupt, after pending I/O has been
//! resolved. It owns the kernel-wide quantum: the number of further
//! interrupts the running process may keep the CPU for.

use crate::config::SchedulerKind;
use crate::process::{Pid, ProcState};
use crate::queue::ReadyQueue;
use crate::table::ProcessTable;

/// New priority after a slice in which `remaining` of `quantum` interrupts
/// were left unused: the average of the old priority and the fraction of the
/// slice consumed.
pub fn priority_after(priority: f64, remaining: u32, quantum: u32) -> f64 {
    if quantum == 0 {
        return priority;
    }
    let used = quantum.saturating_sub(remaining) as f64 / quantum as f64;
    (priority + used) / 2.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantum {
    remaining: u32,
    default: u32,
}

impl Quantum {
    pub fn new(default: u32) -> Self {
        Self {
            remaining: default,
            default,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn default_len(&self) -> u32 {
        self.default
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    pub fn reset(&mut self) {
        self.remaining = self.default;
    }

    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    kind: SchedulerKind,
    quantum: Quantum,
}

impl Scheduler {
    pub fn new(kind: SchedulerKind, default_quantum: u32) -> Self {
        Self {
            kind,
            quantum: Quantum::new(default_quantum),
        }
    }

    pub fn kind(&self) -> SchedulerKind {
        self.kind
    }

    pub fn quantum(&self) -> &Quantum {
        &self.quantum
    }

    /// Priority `pid` gets for blocking now, with the current slice
    /// remainder counted as unused.
    pub fn charge_block(&self, table: &mut ProcessTable, pid: Pid) {
        if let Some(proc) = table.get_mut(pid) {
            proc.priority = priority_after(proc.priority, self.quantum.remaining, self.quantum.default);
        }
    }

    /// Choose the process to run after this interrupt. `current` is the
    /// process that was interrupted, if it still exists as current.
    /// Does not change process states; the caller applies the switch.
    pub fn select(
        &mut self,
        current: Option<Pid>,
        table: &mut ProcessTable,
        queue: &mut ReadyQueue,
    ) -> Option<Pid> {
        let chosen = match self.kind {
            SchedulerKind::FirstReady => first_ready(current, table),
            SchedulerKind::RoundRobin => self.round_robin(table, queue),
            SchedulerKind::Priority => self.priority(current, table),
        };
        // the quantum only runs down while the same process keeps the CPU;
        // under the priority policy an incoming process inherits what is left
        match self.kind {
            SchedulerKind::FirstReady => {}
            _ if chosen == current => self.quantum.tick(),
            SchedulerKind::RoundRobin => self.quantum.reset(),
            SchedulerKind::Priority => {}
        }
        log::trace!(
            "schedule: {:?} -> {:?} quantum={}",
            current,
            chosen,
            self.quantum.remaining
        );
        chosen
    }

    fn round_robin(&mut self, table: &mut ProcessTable, queue: &mut ReadyQueue) -> Option<Pid> {
        if self.quantum.is_exhausted() {
            self.quantum.reset();
            if let Some(pid) = queue.rotate() {
                if let Some(proc) = table.get_mut(pid) {
                    proc.metrics.preemptions += 1;
                }
                log::debug!("schedule: quantum expired, pid {} to the back", pid);
            }
        }
        queue.peek()
    }

    fn priority(&mut self, current: Option<Pid>, table: &mut ProcessTable) -> Option<Pid> {
        if self.quantum.is_exhausted() {
            self.quantum.reset();
            // charged against the fresh quantum: a full slice halves the priority
            let running = current
                .and_then(|pid| table.get_mut(pid))
                .filter(|p| p.state() == ProcState::Running);
            if let Some(proc) = running {
                proc.priority =
                    priority_after(proc.priority, self.quantum.remaining, self.quantum.default);
                proc.metrics.preemptions += 1;
                log::debug!(
                    "schedule: quantum expired for pid {}, priority {:.3}",
                    proc.pid(),
                    proc.priority
                );
            }
        }

        let mut best: Option<(Pid, f64)> = None;
        for proc in table.iter().filter(|p| p.state().is_runnable()) {
            // strict comparison keeps the lowest pid on ties
            if best.is_none_or(|(_, p)| proc.priority < p) {
                best = Some((proc.pid(), proc.priority));
            }
        }
        best.map(|(pid, _)| pid)
    }
}

fn first_ready(current: Option<Pid>, table: &ProcessTable) -> Option<Pid> {
    if let Some(pid) = current {
        if table.get(pid).is_some_and(|p| p.state() == ProcState::Running) {
            return Some(pid);
        }
    }
    table
        .iter()
        .find(|p| p.state() == ProcState::Ready)
        .map(|p| p.pid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{BlockCause, Image, Process};

    fn table_with(n: usize) -> (ProcessTable, ReadyQueue) {
        let mut table = ProcessTable::new(4);
        let mut queue = ReadyQueue::new();
        for pid in 1..=n {
            let image = Image {
                load_addr: 0,
                len: 1,
                disk_base: 0,
            };
            table.push(Process::new(pid, image, 0));
            queue.push_back(pid);
        }
        (table, queue)
    }

    fn run(table: &mut ProcessTable, pid: Pid) {
        table.get_mut(pid).unwrap().set_state(ProcState::Running);
    }

    #[test]
    fn decay_law() {
        assert_eq!(priority_after(0.5, 10, 10), 0.25);
        assert_eq!(priority_after(0.5, 0, 10), 0.75);
        assert_eq!(priority_after(1.0, 0, 10), 1.0);
        assert_eq!(priority_after(0.0, 5, 10), 0.25);
    }

    #[test]
    fn equal_priorities_pick_the_lowest_pid() {
        let (mut table, mut queue) = table_with(3);
        let mut sched = Scheduler::new(SchedulerKind::Priority, 10);
        assert_eq!(sched.select(None, &mut table, &mut queue), Some(1));
    }

    #[test]
    fn lowest_priority_wins() {
        let (mut table, mut queue) = table_with(3);
        table.get_mut(1).unwrap().priority = 0.9;
        table.get_mut(3).unwrap().priority = 0.2;
        let mut sched = Scheduler::new(SchedulerKind::Priority, 10);
        assert_eq!(sched.select(None, &mut table, &mut queue), Some(3));
    }

    #[test]
    fn blocked_processes_are_skipped() {
        let (mut table, mut queue) = table_with(2);
        table.get_mut(1).unwrap().block(BlockCause::Input(0));
        queue.remove(1);
        let mut sched = Scheduler::new(SchedulerKind::Priority, 10);
        assert_eq!(sched.select(Some(1), &mut table, &mut queue), Some(2));
        // a switch neither spends nor refills the quantum
        assert_eq!(sched.quantum().remaining(), 10);
    }

    #[test]
    fn reselection_spends_the_quantum() {
        let (mut table, mut queue) = table_with(1);
        run(&mut table, 1);
        let mut sched = Scheduler::new(SchedulerKind::Priority, 3);
        for expected in [2, 1, 0] {
            assert_eq!(sched.select(Some(1), &mut table, &mut queue), Some(1));
            assert_eq!(sched.quantum().remaining(), expected);
        }
        // exhausted: the quantum is refilled before the running process is charged
        assert_eq!(sched.select(Some(1), &mut table, &mut queue), Some(1));
        let p = table.get(1).unwrap();
        assert_eq!(p.priority, 0.25);
        assert_eq!(p.metrics.preemptions, 1);
        assert_eq!(sched.quantum().remaining(), 2);
    }

    #[test]
    fn exhaustion_favours_the_process_that_used_its_slice() {
        let (mut table, mut queue) = table_with(2);
        run(&mut table, 1);
        let mut sched = Scheduler::new(SchedulerKind::Priority, 1);
        assert_eq!(sched.select(Some(1), &mut table, &mut queue), Some(1));
        assert!(sched.quantum().is_exhausted());
        assert_eq!(sched.select(Some(1), &mut table, &mut queue), Some(1));
        assert_eq!(table.get(1).unwrap().priority, 0.25);
        assert_eq!(table.get(2).unwrap().priority, 0.5);
    }

    #[test]
    fn priority_switch_keeps_the_remainder() {
        let (mut table, mut queue) = table_with(2);
        run(&mut table, 1);
        let mut sched = Scheduler::new(SchedulerKind::Priority, 10);
        for _ in 0..4 {
            sched.select(Some(1), &mut table, &mut queue);
        }
        assert_eq!(sched.quantum().remaining(), 6);
        table.get_mut(2).unwrap().priority = 0.1;
        assert_eq!(sched.select(Some(1), &mut table, &mut queue), Some(2));
        assert_eq!(sched.quantum().remaining(), 6);
    }

    #[test]
    fn round_robin_rotates_on_exhaustion() {
        let (mut table, mut queue) = table_with(3);
        run(&mut table, 1);
        let mut sched = Scheduler::new(SchedulerKind::RoundRobin, 1);
        assert_eq!(sched.select(Some(1), &mut table, &mut queue), Some(1));
        assert_eq!(sched.select(Some(1), &mut table, &mut queue), Some(2));
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![2, 3, 1]);
        assert_eq!(table.get(1).unwrap().metrics.preemptions, 1);
    }

    #[test]
    fn first_ready_keeps_the_running_process() {
        let (mut table, mut queue) = table_with(3);
        let mut sched = Scheduler::new(SchedulerKind::FirstReady, 10);
        run(&mut table, 2);
        assert_eq!(sched.select(Some(2), &mut table, &mut queue), Some(2));
        table.get_mut(2).unwrap().kill();
        assert_eq!(sched.select(Some(2), &mut table, &mut queue), Some(1));
    }
}
