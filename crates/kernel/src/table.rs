use alloc::vec::Vec;

use crate::process::{Pid, Process};

/// Slot 0 never holds a process.
pub const RESERVED_SLOT: usize = 0;

/// Growable pid -> process mapping.
///
/// Pids are slot indices handed out in increasing order and never reused.
/// The slot array starts at `initial_slots` and doubles whenever it fills.
#[derive(Debug)]
pub struct ProcessTable {
    slots: Vec<Option<Process>>,
    capacity: usize,
}

impl ProcessTable {
    pub fn new(initial_slots: usize) -> Self {
        let capacity = initial_slots.max(2);
        let mut slots = Vec::with_capacity(capacity);
        slots.push(None);
        Self { slots, capacity }
    }

    /// Pid the next inserted process receives.
    pub fn next_pid(&self) -> Pid {
        self.slots.len()
    }

    /// Current slot capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store `process` under its pid, which must be `next_pid()`.
    pub fn push(&mut self, process: Process) -> Pid {
        let pid = process.pid();
        assert_eq!(pid, self.next_pid(), "pids must be assigned in order");
        if self.slots.len() == self.capacity {
            self.capacity *= 2;
            self.slots.reserve_exact(self.capacity - self.slots.len());
            log::debug!("process_table: grew to {} slots", self.capacity);
        }
        self.slots.push(Some(process));
        pid
    }

    pub fn get(&self, pid: Pid) -> Option<&Process> {
        self.slots.get(pid)?.as_ref()
    }

    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        self.slots.get_mut(pid)?.as_mut()
    }

    /// True when `pid` was ever handed out.
    pub fn contains(&self, pid: Pid) -> bool {
        pid != RESERVED_SLOT && pid < self.slots.len()
    }

    /// Processes in ascending pid order.
    pub fn iter(&self) -> impl Iterator<Item = &Process> + '_ {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Process> + '_ {
        self.slots.iter_mut().flatten()
    }

    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.iter().map(Process::pid)
    }

    /// Processes ever created.
    pub fn len(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn any_alive(&self) -> bool {
        self.iter().any(Process::is_alive)
    }
}
