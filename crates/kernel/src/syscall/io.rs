use types::device::{KEYBOARD, KEYBOARD_READY, SCREEN, SCREEN_READY};

use crate::error::{KernelError, KernelResult};
use crate::kernel::Kernel;
use crate::process::{BlockCause, Pid};

impl Kernel {
    pub(super) fn sys_read(&mut self, pid: Pid) {
        let Some(dev) = self.table.get(pid).map(|p| p.device) else {
            return;
        };
        match self.try_input(pid, dev) {
            Ok(true) => {}
            Ok(false) => self.block(pid, BlockCause::Input(dev)),
            Err(err) => self.fail(format_args!("read: keyboard {}: {}", dev, err)),
        }
    }

    pub(super) fn sys_write(&mut self, pid: Pid) {
        let Some(dev) = self.table.get(pid).map(|p| p.device) else {
            return;
        };
        match self.try_output(pid, dev) {
            Ok(true) => {}
            Ok(false) => self.block(pid, BlockCause::Output(dev)),
            Err(err) => self.fail(format_args!("write: screen {}: {}", dev, err)),
        }
    }

    /// Move one keyboard word into `pid`'s A if terminal `dev` has one.
    /// Returns false when the keyboard is not ready.
    pub(crate) fn try_input(&mut self, pid: Pid, dev: usize) -> KernelResult<bool> {
        if self.hw.devices.read(dev + KEYBOARD_READY)? == 0 {
            return Ok(false);
        }
        let data = self.hw.devices.read(dev + KEYBOARD)?;
        let proc = self.table.get_mut(pid).ok_or(KernelError::UnknownProcess(pid))?;
        proc.tf.a = data;
        Ok(true)
    }

    /// Write `pid`'s X to the screen of terminal `dev` and set A to 0.
    /// Returns false when the screen is not ready.
    pub(crate) fn try_output(&mut self, pid: Pid, dev: usize) -> KernelResult<bool> {
        if self.hw.devices.read(dev + SCREEN_READY)? == 0 {
            return Ok(false);
        }
        let proc = self.table.get_mut(pid).ok_or(KernelError::UnknownProcess(pid))?;
        self.hw.devices.write(dev + SCREEN, proc.tf.x)?;
        proc.tf.a = 0;
        Ok(true)
    }
}
