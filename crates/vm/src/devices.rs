use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;

use types::device::{
    CLOCK_INSTRUCTIONS, CLOCK_PENDING, CLOCK_REAL, CLOCK_TIMER, KEYBOARD, KEYBOARD_READY, SCREEN,
    SCREEN_READY, TERMINAL_COUNT, TERMINAL_STRIDE,
};
use types::{DeviceBus, HwError, HwResult, Word};

#[derive(Debug, Default)]
struct Terminal {
    input: VecDeque<Word>,
    output: Vec<Word>,
    screen_busy: bool,
}

#[derive(Debug, Default)]
struct Clock {
    instructions: Word,
    timer: Word,
    pending: Word,
}

#[derive(Debug, Default)]
struct Bus {
    terminals: [Terminal; TERMINAL_COUNT],
    clock: Clock,
    failing: BTreeSet<usize>,
    writes: Vec<(usize, Word)>,
}

/// Four terminals plus the instruction clock/timer, behind one register bus.
#[derive(Debug, Clone, Default)]
pub struct Devices {
    bus: Rc<RefCell<Bus>>,
}

fn terminal_register(device: usize) -> Option<(usize, usize)> {
    let term = device / TERMINAL_STRIDE;
    if term < TERMINAL_COUNT {
        Some((term, device % TERMINAL_STRIDE))
    } else {
        None
    }
}

impl Devices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a value to be read from terminal `term`'s keyboard.
    pub fn push_input(&self, term: usize, value: Word) {
        self.bus.borrow_mut().terminals[term].input.push_back(value);
    }

    pub fn pending_input(&self, term: usize) -> usize {
        self.bus.borrow().terminals[term].input.len()
    }

    /// Everything written to terminal `term`'s screen so far.
    pub fn output(&self, term: usize) -> Vec<Word> {
        self.bus.borrow().terminals[term].output.clone()
    }

    pub fn set_screen_busy(&self, term: usize, busy: bool) {
        self.bus.borrow_mut().terminals[term].screen_busy = busy;
    }

    /// Make every access to `device` fail until `repair` is called.
    pub fn break_device(&self, device: usize) {
        self.bus.borrow_mut().failing.insert(device);
    }

    pub fn repair(&self, device: usize) {
        self.bus.borrow_mut().failing.remove(&device);
    }

    /// Every attempted register write, in order, including failed ones.
    pub fn write_log(&self) -> Vec<(usize, Word)> {
        self.bus.borrow().writes.clone()
    }

    pub fn instructions(&self) -> Word {
        self.bus.borrow().clock.instructions
    }

    pub fn timer(&self) -> Word {
        self.bus.borrow().clock.timer
    }

    pub fn timer_pending(&self) -> bool {
        self.bus.borrow().clock.pending != 0
    }

    /// Account `instructions` executed instructions. Returns true when the
    /// armed timer expired during them.
    pub fn advance(&self, instructions: Word) -> bool {
        let mut bus = self.bus.borrow_mut();
        let clock = &mut bus.clock;
        clock.instructions = clock.instructions.wrapping_add(instructions);
        if clock.timer > 0 {
            clock.timer -= instructions.min(clock.timer);
            if clock.timer == 0 {
                clock.pending = 1;
                return true;
            }
        }
        false
    }
}

impl DeviceBus for Devices {
    fn read(&mut self, device: usize) -> HwResult<Word> {
        let mut bus = self.bus.borrow_mut();
        if bus.failing.contains(&device) {
            return Err(HwError::DeviceFault(device));
        }
        if let Some((term, reg)) = terminal_register(device) {
            let terminal = &mut bus.terminals[term];
            return match reg {
                KEYBOARD => terminal.input.pop_front().ok_or(HwError::DeviceBusy(device)),
                KEYBOARD_READY => Ok(!terminal.input.is_empty() as Word),
                SCREEN_READY => Ok(!terminal.screen_busy as Word),
                _ => Err(HwError::InvalidDevice(device)),
            };
        }
        match device {
            CLOCK_INSTRUCTIONS => Ok(bus.clock.instructions),
            CLOCK_REAL => Ok(bus.clock.instructions / 10),
            CLOCK_TIMER => Ok(bus.clock.timer),
            CLOCK_PENDING => Ok(bus.clock.pending),
            _ => Err(HwError::InvalidDevice(device)),
        }
    }

    fn write(&mut self, device: usize, value: Word) -> HwResult<()> {
        let mut bus = self.bus.borrow_mut();
        bus.writes.push((device, value));
        if bus.failing.contains(&device) {
            return Err(HwError::DeviceFault(device));
        }
        if let Some((term, reg)) = terminal_register(device) {
            let terminal = &mut bus.terminals[term];
            if reg != SCREEN {
                return Err(HwError::InvalidDevice(device));
            }
            if terminal.screen_busy {
                return Err(HwError::DeviceBusy(device));
            }
            terminal.output.push(value);
            return Ok(());
        }
        match device {
            CLOCK_TIMER => bus.clock.timer = value,
            CLOCK_PENDING => bus.clock.pending = value,
            _ => return Err(HwError::InvalidDevice(device)),
        }
        Ok(())
    }
}
