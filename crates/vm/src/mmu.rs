use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use types::{CpuMode, HwError, HwResult, Mmu, PageTable, Word};

use crate::memory::Ram;

/// Software MMU over a shared `Ram`.
///
/// Holds the page table the kernel installed at its last dispatch; CPU-side
/// accesses go through `access`, which is what raises page-missing faults.
#[derive(Debug, Clone)]
pub struct SoftMmu {
    ram: Ram,
    page_size: usize,
    active: Rc<RefCell<PageTable>>,
    faults: Rc<Cell<usize>>,
}

impl SoftMmu {
    pub fn new(ram: Ram, page_size: usize) -> Self {
        assert!(page_size != 0, "page_size must be > 0");
        Self {
            ram,
            page_size,
            active: Rc::new(RefCell::new(PageTable::new())),
            faults: Rc::new(Cell::new(0)),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The page table installed by the kernel's last dispatch.
    pub fn active(&self) -> Ref<'_, PageTable> {
        self.active.borrow()
    }

    /// Number of page-missing faults raised by CPU-side accesses.
    pub fn faults(&self) -> usize {
        self.faults.get()
    }

    fn translate(&self, table: &PageTable, vaddr: usize) -> HwResult<usize> {
        table
            .translate(vaddr, self.page_size)
            .ok_or(HwError::PageMissing(vaddr))
    }

    /// CPU-side user-mode load through the active page table.
    pub fn access(&self, vaddr: usize) -> HwResult<Word> {
        let result = {
            let table = self.active.borrow();
            self.read(&table, vaddr, CpuMode::User)
        };
        if let Err(HwError::PageMissing(_)) = result {
            self.faults.set(self.faults.get() + 1);
        }
        result
    }
}

impl Mmu for SoftMmu {
    fn read(&self, table: &PageTable, vaddr: usize, mode: CpuMode) -> HwResult<Word> {
        let phys = match mode {
            CpuMode::Supervisor => vaddr,
            CpuMode::User => self.translate(table, vaddr)?,
        };
        self.ram.load_word(phys).ok_or(HwError::InvalidAddress(phys))
    }

    fn install(&mut self, table: &PageTable) {
        *self.active.borrow_mut() = table.clone();
    }
}
