use anyhow::{bail, Result};
use kernel::KernelConfig;
use serde::{Deserialize, Serialize};
use types::{syscall, CpuFault, Irq, Word};
use vm::loader::encode_str;
use vm::{CpuEvent, ProgramRegistry};

fn default_memory_size() -> usize {
    1000
}

/// A complete run: kernel configuration, machine size, program images,
/// keyboard input and the CPU script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: KernelConfig,
    #[serde(default = "default_memory_size")]
    pub memory_size: usize,
    pub programs: Vec<ProgramEntry>,
    #[serde(default)]
    pub inputs: Vec<InputEntry>,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

/// Strings placed inside a program image, NUL terminated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEntry {
    pub at: usize,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramEntry {
    pub name: String,
    #[serde(default)]
    pub load_addr: usize,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(default)]
    pub data: Vec<DataEntry>,
}

impl ProgramEntry {
    /// The image: `words`, with every `data` string written over it and the
    /// image grown as needed. `at` is relative to the load address.
    pub fn image(&self) -> Vec<Word> {
        let mut words = self.words.clone();
        for data in &self.data {
            let text = encode_str(&data.text);
            let end = data.at + text.len();
            if words.len() < end {
                words.resize(end, 0);
            }
            words[data.at..end].copy_from_slice(&text);
        }
        words
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputEntry {
    pub terminal: usize,
    pub values: Vec<Word>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Call {
    Read,
    Write,
    CreateProcess,
    KillProcess,
    WaitProcess,
}

impl Call {
    pub fn id(self) -> Word {
        match self {
            Call::Read => syscall::READ,
            Call::Write => syscall::WRITE,
            Call::CreateProcess => syscall::CREATE_PROCESS,
            Call::KillProcess => syscall::KILL_PROCESS,
            Call::WaitProcess => syscall::WAIT_PROCESS,
        }
    }
}

/// One step of the CPU script. `after` is the number of instructions the
/// running process executes before the step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptEvent {
    Syscall {
        call: Call,
        #[serde(default)]
        x: Word,
        #[serde(default)]
        after: Word,
    },
    /// A user-mode load; faults if the page is not mapped.
    Access {
        vaddr: usize,
        #[serde(default)]
        after: Word,
    },
    /// A CPU error with an explicit fault code.
    Fault {
        fault: Word,
        #[serde(default)]
        complement: Word,
        #[serde(default)]
        after: Word,
    },
    /// Any interrupt by raw cause number.
    Interrupt {
        irq: Word,
        #[serde(default)]
        after: Word,
    },
}

impl ScriptEvent {
    pub fn to_cpu_event(&self) -> CpuEvent {
        match *self {
            ScriptEvent::Syscall { call, x, after } => CpuEvent::syscall(call.id(), x).after(after),
            ScriptEvent::Access { vaddr, after } => CpuEvent::access(vaddr).after(after),
            ScriptEvent::Fault {
                fault,
                complement,
                after,
            } => CpuEvent::raise(Irq::CpuError)
                .with_fault(CpuFault::from_raw(fault), complement)
                .after(after),
            ScriptEvent::Interrupt { irq, after } => CpuEvent::raise(Irq::from_raw(irq)).after(after),
        }
    }
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        if self.config.page_size == 0 {
            bail!("page_size must be > 0");
        }
        for input in &self.inputs {
            if input.terminal >= types::device::TERMINAL_COUNT {
                bail!("no terminal {}", input.terminal);
            }
        }
        Ok(())
    }

    pub fn registry(&self) -> ProgramRegistry {
        let mut registry = ProgramRegistry::new();
        for program in &self.programs {
            registry = registry.with(&program.name, program.load_addr, program.image());
        }
        registry
    }

    pub fn cpu_events(&self) -> Vec<CpuEvent> {
        self.events.iter().map(ScriptEvent::to_cpu_event).collect()
    }
}
