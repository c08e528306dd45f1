use alloc::vec::Vec;

use types::Word;

use crate::error::{KernelError, KernelResult};

/// Append-only secondary storage for demand-paged images.
///
/// Space is never reclaimed. Cells past the written end read as 0, which
/// pads the last page of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackingStore {
    words: Vec<Word>,
    capacity: usize,
}

impl BackingStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            words: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Words written so far; also the offset of the next append.
    pub fn used(&self) -> usize {
        self.words.len()
    }

    pub fn free(&self) -> usize {
        self.capacity - self.words.len()
    }

    /// Store `data` after everything written before. Returns its offset.
    pub fn append(&mut self, data: &[Word]) -> KernelResult<usize> {
        if data.len() > self.free() {
            return Err(KernelError::BackingStoreFull {
                needed: data.len(),
                free: self.free(),
            });
        }
        let base = self.words.len();
        self.words.extend_from_slice(data);
        Ok(base)
    }

    pub fn read(&self, addr: usize) -> Word {
        self.words.get(addr).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_are_laid_out_back_to_back() {
        let mut disk = BackingStore::new(10);
        assert_eq!(disk.append(&[1, 2, 3]), Ok(0));
        assert_eq!(disk.append(&[4, 5]), Ok(3));
        assert_eq!(disk.read(3), 4);
        assert_eq!(disk.read(5), 0);
        assert_eq!(disk.used(), 5);
    }

    #[test]
    fn full_store_rejects_the_whole_image() {
        let mut disk = BackingStore::new(4);
        disk.append(&[1, 2, 3]).unwrap();
        assert_eq!(
            disk.append(&[4, 5]),
            Err(KernelError::BackingStoreFull { needed: 2, free: 1 })
        );
        assert_eq!(disk.used(), 3);
    }
}
