use alloc::vec;
use alloc::vec::Vec;

use crate::process::Pid;

/// Occupancy of one physical frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Free,
    /// Kernel-owned: the save area and the interrupt handler.
    Reserved,
    Owned(Pid),
}

/// Bookkeeping for physical frames.
///
/// Frames are handed out lowest-first and never returned: a dead process
/// keeps its frames and there is no eviction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTable {
    frames: Vec<Frame>,
    page_size: usize,
}

impl FrameTable {
    /// Track `memory_size / page_size` frames, all free.
    pub fn new(memory_size: usize, page_size: usize) -> Self {
        assert!(page_size != 0, "page_size must be > 0");
        Self {
            frames: vec![Frame::Free; memory_size / page_size],
            page_size,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Reserve every frame touching physical words `[start, end)`.
    pub fn reserve_range(&mut self, start: usize, end: usize) {
        if end <= start {
            return;
        }
        let first = start / self.page_size;
        let last = (end - 1) / self.page_size;
        for frame in first..=last.min(self.frames.len().saturating_sub(1)) {
            self.frames[frame] = Frame::Reserved;
        }
    }

    pub fn find_free(&self) -> Option<usize> {
        self.frames.iter().position(|f| *f == Frame::Free)
    }

    /// Claim the lowest free frame for `pid`, or None if exhausted.
    pub fn claim(&mut self, pid: Pid) -> Option<usize> {
        let frame = self.find_free()?;
        self.frames[frame] = Frame::Owned(pid);
        Some(frame)
    }

    pub fn state(&self, frame: usize) -> Option<Frame> {
        self.frames.get(frame).copied()
    }

    pub fn owner(&self, frame: usize) -> Option<Pid> {
        match self.frames.get(frame)? {
            Frame::Owned(pid) => Some(*pid),
            _ => None,
        }
    }

    pub fn free_count(&self) -> usize {
        self.frames.iter().filter(|f| **f == Frame::Free).count()
    }

    /// Frames owned by `pid`, ascending.
    pub fn owned_by(&self, pid: Pid) -> impl Iterator<Item = usize> + '_ {
        self.frames
            .iter()
            .enumerate()
            .filter(move |(_, f)| **f == Frame::Owned(pid))
            .map(|(i, _)| i)
    }

    /// Physical address of the first word of `frame`.
    pub fn base(&self, frame: usize) -> usize {
        frame * self.page_size
    }
}
