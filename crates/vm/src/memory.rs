use std::cell::{Ref, RefCell};
use std::rc::Rc;

use types::{HwError, HwResult, PhysicalMemory, Word};

/// Word-addressed physical memory shared between the CPU side and the kernel.
#[derive(Debug, Clone)]
pub struct Ram {
    mem: Rc<RefCell<Vec<Word>>>,
}

impl Ram {
    pub fn new(memory_size: usize) -> Self {
        Self {
            mem: Rc::new(RefCell::new(vec![0; memory_size])),
        }
    }

    pub fn mem(&self) -> Ref<'_, Vec<Word>> {
        self.mem.borrow()
    }

    pub fn size(&self) -> usize {
        self.mem().len()
    }

    pub fn load_word(&self, addr: usize) -> Option<Word> {
        self.mem.borrow().get(addr).copied()
    }

    pub fn store_word(&self, addr: usize, value: Word) -> bool {
        let mut mem = self.mem.borrow_mut();
        match mem.get_mut(addr) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Copy of `[start, end)`, or None when the range is out of bounds.
    pub fn words(&self, start: usize, end: usize) -> Option<Vec<Word>> {
        let mem = self.mem.borrow();
        if end > mem.len() || start > end {
            return None;
        }
        Some(mem[start..end].to_vec())
    }
}

impl PhysicalMemory for Ram {
    fn size(&self) -> usize {
        Ram::size(self)
    }

    fn read(&self, addr: usize) -> HwResult<Word> {
        self.load_word(addr).ok_or(HwError::InvalidAddress(addr))
    }

    fn write(&mut self, addr: usize, value: Word) -> HwResult<()> {
        if self.store_word(addr, value) {
            Ok(())
        } else {
            Err(HwError::InvalidAddress(addr))
        }
    }
}
