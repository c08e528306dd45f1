use anyhow::Result;
use kernel::{Kernel, MetricsReport};
use serde::Serialize;
use types::{device, TrapAction, Word};
use vm::{Machine, ScriptedCpu};

use crate::scenario::Scenario;

/// What a scenario run left behind.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub halted: bool,
    pub internal_error: bool,
    /// Interrupts delivered, by name, in order.
    pub interrupts: Vec<String>,
    /// Screen output of each terminal.
    pub screens: Vec<Vec<Word>>,
    pub report: MetricsReport,
}

/// Boot the kernel on a fresh machine and replay the scenario's script.
pub fn run(scenario: &Scenario) -> Result<Outcome> {
    scenario.validate()?;
    let machine = Machine::new(
        scenario.memory_size,
        scenario.config.page_size,
        scenario.registry(),
    );
    for input in &scenario.inputs {
        for value in &input.values {
            machine.devices.push_input(input.terminal, *value);
        }
    }

    let mut kernel = Kernel::new(scenario.config.clone(), machine.hardware());
    let mut cpu = ScriptedCpu::new(machine.clone(), scenario.cpu_events());

    log::info!(
        "runner: {} programs, {} events",
        scenario.programs.len(),
        scenario.events.len()
    );
    if cpu.power_on(&mut kernel) != TrapAction::Halt {
        cpu.run(&mut kernel);
    }
    if !cpu.is_halted() {
        log::warn!("runner: script ended before the kernel halted");
    }

    Ok(Outcome {
        halted: cpu.is_halted(),
        internal_error: kernel.internal_error(),
        interrupts: cpu
            .trace()
            .iter()
            .map(|(irq, _)| irq.name().to_string())
            .collect(),
        screens: (0..device::TERMINAL_COUNT)
            .map(|term| machine.devices.output(term))
            .collect(),
        report: kernel.report(),
    })
}
