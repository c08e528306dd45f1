use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};

/// How the next process is chosen on every interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    /// Keep the running process; otherwise the lowest-id READY one.
    FirstReady,
    /// FIFO queue, rotated when the quantum runs out.
    RoundRobin,
    /// Lowest priority value wins; priorities decay with CPU use.
    Priority,
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchedulerKind::FirstReady => "first_ready",
            SchedulerKind::RoundRobin => "round_robin",
            SchedulerKind::Priority => "priority",
        })
    }
}

/// Where a new process image lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryMode {
    /// Copied into frames and fully mapped at creation.
    Contiguous,
    /// Staged on the backing store; pages arrive on fault.
    DemandPaged,
}

impl fmt::Display for MemoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemoryMode::Contiguous => "contiguous",
            MemoryMode::DemandPaged => "demand_paged",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Interrupts a process may keep the CPU before it is preempted.
    pub default_quantum: u32,
    /// Instructions between timer interrupts.
    pub timer_interval: i32,
    pub page_size: usize,
    /// Process table slots before the first doubling.
    pub initial_slots: usize,
    /// Words in the backing store.
    pub disk_size: usize,
    /// Longest program name CREATE_PROCESS copies, terminator included.
    pub max_name_len: usize,
    pub scheduler: SchedulerKind,
    pub memory_mode: MemoryMode,
    pub init_program: String,
    pub trap_handler: String,
}

impl KernelConfig {
    pub const DEFAULT_QUANTUM: u32 = 10;
    pub const TIMER_INTERVAL: i32 = 100;
    pub const INITIAL_SLOTS: usize = 16;
    pub const DISK_SIZE: usize = 10_000;
    pub const MAX_NAME_LEN: usize = 100;
    pub const INIT_PROGRAM: &'static str = "init.maq";
    pub const TRAP_HANDLER: &'static str = "trata_int.maq";
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            default_quantum: Self::DEFAULT_QUANTUM,
            timer_interval: Self::TIMER_INTERVAL,
            page_size: types::DEFAULT_PAGE_SIZE,
            initial_slots: Self::INITIAL_SLOTS,
            disk_size: Self::DISK_SIZE,
            max_name_len: Self::MAX_NAME_LEN,
            scheduler: SchedulerKind::Priority,
            memory_mode: MemoryMode::DemandPaged,
            init_program: String::from(Self::INIT_PROGRAM),
            trap_handler: String::from(Self::TRAP_HANDLER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: KernelConfig =
            serde_json::from_str(r#"{ "scheduler": "round_robin", "page_size": 5 }"#).unwrap();
        assert_eq!(config.scheduler, SchedulerKind::RoundRobin);
        assert_eq!(config.page_size, 5);
        assert_eq!(config.default_quantum, 10);
        assert_eq!(config.timer_interval, 100);
        assert_eq!(config.memory_mode, MemoryMode::DemandPaged);
        assert_eq!(config.trap_handler, "trata_int.maq");
    }

    #[test]
    fn enum_names_are_snake_case() {
        let json = serde_json::to_string(&KernelConfig::default()).unwrap();
        assert!(json.contains(r#""scheduler":"priority""#));
        assert!(json.contains(r#""memory_mode":"demand_paged""#));
    }
}
