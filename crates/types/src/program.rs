use alloc::string::String;
use alloc::vec::Vec;

use crate::Word;

/// Executable image handed out by the program loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub name: String,
    /// Address the image expects its first word at (also its entry point).
    pub load_addr: usize,
    pub words: Vec<Word>,
}

impl Program {
    pub fn new(name: impl Into<String>, load_addr: usize, words: Vec<Word>) -> Self {
        Self {
            name: name.into(),
            load_addr,
            words,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// One past the last address covered by the image.
    pub fn end(&self) -> usize {
        self.load_addr + self.words.len()
    }

    /// Word stored at absolute address `addr`, if the image covers it.
    pub fn word_at(&self, addr: usize) -> Option<Word> {
        addr.checked_sub(self.load_addr)
            .and_then(|off| self.words.get(off))
            .copied()
    }
}
