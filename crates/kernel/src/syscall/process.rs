use types::Word;

use crate::error::{KernelError, KernelResult};
use crate::kernel::Kernel;
use crate::process::{BlockCause, Pid};
use crate::table::RESERVED_SLOT;

const FAILED: Word = -1;

impl Kernel {
    /// X: virtual address of the program name. A: new pid or -1.
    pub(super) fn sys_create_process(&mut self, pid: Pid) {
        let Some(addr) = self.table.get(pid).map(|p| p.tf.x) else {
            return;
        };
        let result = self
            .copy_str_from(pid, addr)
            .and_then(|name| self.create_process(&name));
        let a = match result {
            Ok(child) => child as Word,
            Err(err) => {
                log::warn!("create_process: pid={} failed: {}", pid, err);
                FAILED
            }
        };
        if let Some(caller) = self.table.get_mut(pid) {
            caller.tf.a = a;
        }
    }

    /// X: pid to kill, 0 for the caller. A: 0, or -1 for a dead or unknown
    /// target. A caller that killed itself gets no result.
    pub(super) fn sys_kill_process(&mut self, pid: Pid) {
        let Some(x) = self.table.get(pid).map(|p| p.tf.x) else {
            return;
        };
        let target = if x == 0 { Ok(pid) } else { target_pid(x) };
        let result = target.and_then(|target| self.kill(target));
        if let Err(err) = &result {
            log::warn!("kill: pid={}: {}", pid, err);
        }
        if let Some(caller) = self.table.get_mut(pid).filter(|p| p.is_alive()) {
            caller.tf.a = if result.is_ok() { 0 } else { FAILED };
        }
    }

    /// X: pid to wait for. Always blocks; the wait resolves on the next
    /// pending pass once the target is dead.
    pub(super) fn sys_wait_process(&mut self, pid: Pid) {
        let Some(x) = self.table.get(pid).map(|p| p.tf.x) else {
            return;
        };
        let target = target_pid(x).unwrap_or(RESERVED_SLOT);
        self.block(pid, BlockCause::Process(target));
    }
}

fn target_pid(x: Word) -> KernelResult<Pid> {
    usize::try_from(x).map_err(|_| KernelError::UnknownProcess(RESERVED_SLOT))
}
