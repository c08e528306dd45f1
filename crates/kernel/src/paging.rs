//! Demand paging and kernel access to process memory.

use alloc::string::String;

use types::{CpuMode, HwError, Word};

use crate::config::MemoryMode;
use crate::error::{KernelError, KernelResult};
use crate::kernel::Kernel;
use crate::process::Pid;

impl Kernel {
    /// Bring the page holding `vaddr` into a free frame and map it for `pid`.
    ///
    /// Words inside the image come from the backing store, the rest of the
    /// page is zero. With no free frame nothing changes: there is no
    /// eviction. Returns the frame used.
    pub(crate) fn page_in(&mut self, pid: Pid, vaddr: usize) -> KernelResult<usize> {
        let page_size = self.config.page_size;
        let image = self
            .table
            .get(pid)
            .filter(|p| p.page_table.is_some())
            .map(|p| p.image)
            .ok_or(KernelError::UnknownProcess(pid))?;
        let frame = self.frames.find_free().ok_or(KernelError::NoFreeFrame)?;

        let page = vaddr / page_size;
        let base = self.frames.base(frame);
        for offset in 0..page_size {
            let v = page * page_size + offset;
            let word = if image.contains(v) {
                self.disk.read(image.disk_base + v - image.load_addr)
            } else {
                0
            };
            self.hw.memory.write(base + offset, word)?;
        }

        self.frames.claim(pid);
        if let Some(table) = self.table.get_mut(pid).and_then(|p| p.page_table.as_mut()) {
            table.map(page, frame);
        }
        log::debug!("page_in: pid={} page={} -> frame={}", pid, page, frame);
        Ok(frame)
    }

    /// Read one word of `pid`'s virtual memory through the MMU. A missing
    /// page is brought in first when demand paging.
    fn read_user(&mut self, pid: Pid, vaddr: usize) -> KernelResult<Word> {
        let table = self
            .table
            .get(pid)
            .and_then(|p| p.page_table.as_ref())
            .ok_or(KernelError::UnknownProcess(pid))?;
        match self.hw.mmu.read(table, vaddr, CpuMode::User) {
            Ok(word) => Ok(word),
            Err(HwError::PageMissing(_)) if self.config.memory_mode == MemoryMode::DemandPaged => {
                self.page_in(pid, vaddr)?;
                let table = self
                    .table
                    .get(pid)
                    .and_then(|p| p.page_table.as_ref())
                    .ok_or(KernelError::UnknownProcess(pid))?;
                Ok(self.hw.mmu.read(table, vaddr, CpuMode::User)?)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Copy a NUL-terminated string out of `pid`'s memory. Every word must
    /// be a byte value and the terminator must appear within
    /// `max_name_len` words.
    pub(crate) fn copy_str_from(&mut self, pid: Pid, vaddr: Word) -> KernelResult<String> {
        let start = usize::try_from(vaddr).map_err(|_| KernelError::BadString(0))?;
        let mut text = String::new();
        for addr in start..start + self.config.max_name_len {
            let word = self.read_user(pid, addr)?;
            let byte = u8::try_from(word).map_err(|_| KernelError::BadString(addr))?;
            if byte == 0 {
                return Ok(text);
            }
            text.push(char::from(byte));
        }
        Err(KernelError::NameTooLong(self.config.max_name_len))
    }
}
