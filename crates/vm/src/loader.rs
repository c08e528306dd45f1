use std::collections::BTreeMap;
use std::rc::Rc;

use types::{HwError, HwResult, Program, ProgramLoader, Word};

/// Name -> image registry standing in for the executable loader.
#[derive(Debug, Clone, Default)]
pub struct ProgramRegistry {
    programs: Rc<BTreeMap<String, Program>>,
}

impl ProgramRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, load_addr: usize, words: Vec<Word>) -> Self {
        self.insert(Program::new(name, load_addr, words));
        self
    }

    pub fn insert(&mut self, program: Program) {
        Rc::make_mut(&mut self.programs).insert(program.name.clone(), program);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.programs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl ProgramLoader for ProgramRegistry {
    fn load(&self, name: &str) -> HwResult<Program> {
        log::trace!("loader: resolving '{}'", name);
        self.programs
            .get(name)
            .cloned()
            .ok_or_else(|| HwError::ProgramNotFound(name.to_string()))
    }
}

/// Encode `text` as one word per byte followed by a NUL terminator, the way
/// programs embed strings they pass to the kernel.
pub fn encode_str(text: &str) -> Vec<Word> {
    text.bytes()
        .map(Word::from)
        .chain(std::iter::once(0))
        .collect()
}
