use alloc::collections::VecDeque;

use crate::process::Pid;

/// FIFO of runnable pids. Holds ids, never process references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadyQueue {
    pids: VecDeque<Pid>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, pid: Pid) {
        debug_assert!(!self.contains(pid), "pid {} queued twice", pid);
        self.pids.push_back(pid);
    }

    pub fn pop_front(&mut self) -> Option<Pid> {
        self.pids.pop_front()
    }

    pub fn peek(&self) -> Option<Pid> {
        self.pids.front().copied()
    }

    /// Drop `pid` wherever it sits. Returns false if it was not queued.
    pub fn remove(&mut self, pid: Pid) -> bool {
        match self.pids.iter().position(|&p| p == pid) {
            Some(idx) => {
                self.pids.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Move the head to the tail and return it.
    pub fn rotate(&mut self) -> Option<Pid> {
        let head = self.pids.pop_front()?;
        self.pids.push_back(head);
        Some(head)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.pids.contains(&pid)
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Pid> + '_ {
        self.pids.iter().copied()
    }
}
