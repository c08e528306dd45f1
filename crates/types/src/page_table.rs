use alloc::collections::BTreeMap;

/// Per-process virtual page -> physical frame mapping.
///
/// Pages without an entry are unmapped; touching them makes the MMU raise a
/// page-missing fault.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTable {
    entries: BTreeMap<usize, usize>,
}

impl PageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&mut self, page: usize, frame: usize) {
        self.entries.insert(page, frame);
    }

    pub fn unmap(&mut self, page: usize) -> Option<usize> {
        self.entries.remove(&page)
    }

    pub fn frame_of(&self, page: usize) -> Option<usize> {
        self.entries.get(&page).copied()
    }

    /// Translate a virtual address to a physical one, or None if its page is
    /// not mapped.
    pub fn translate(&self, vaddr: usize, page_size: usize) -> Option<usize> {
        let frame = self.frame_of(vaddr / page_size)?;
        frame
            .checked_mul(page_size)?
            .checked_add(vaddr % page_size)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mapped `(page, frame)` pairs in ascending page order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries.iter().map(|(page, frame)| (*page, *frame))
    }
}
