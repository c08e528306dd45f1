//! System calls. The call id is in the caller's A register, the argument
//! in X; results go back in A.

use types::syscall::{CREATE_PROCESS, KILL_PROCESS, READ, WAIT_PROCESS, WRITE};

use crate::error::KernelError;
use crate::kernel::Kernel;

mod io;
mod process;

impl Kernel {
    pub(crate) fn handle_syscall(&mut self) {
        let Some(pid) = self.current else {
            self.fail(format_args!("syscall: {}", KernelError::NoCurrentProcess));
            return;
        };
        let Some(call_id) = self.table.get(pid).map(|p| p.tf.a) else {
            self.fail(format_args!("syscall: pid {} vanished", pid));
            return;
        };
        log::trace!("syscall: pid={} id={}", pid, call_id);
        match call_id {
            READ => self.sys_read(pid),
            WRITE => self.sys_write(pid),
            CREATE_PROCESS => self.sys_create_process(pid),
            KILL_PROCESS => self.sys_kill_process(pid),
            WAIT_PROCESS => self.sys_wait_process(pid),
            other => self.fail(format_args!("syscall: unknown id {} from pid {}", other, pid)),
        }
    }
}
