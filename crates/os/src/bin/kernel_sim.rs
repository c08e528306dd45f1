use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use kernel::{MemoryMode, SchedulerKind};
use os::{console, Scenario};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchedulerArg {
    FirstReady,
    RoundRobin,
    Priority,
}

impl From<SchedulerArg> for SchedulerKind {
    fn from(arg: SchedulerArg) -> Self {
        match arg {
            SchedulerArg::FirstReady => SchedulerKind::FirstReady,
            SchedulerArg::RoundRobin => SchedulerKind::RoundRobin,
            SchedulerArg::Priority => SchedulerKind::Priority,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MemoryArg {
    Contiguous,
    DemandPaged,
}

impl From<MemoryArg> for MemoryMode {
    fn from(arg: MemoryArg) -> Self {
        match arg {
            MemoryArg::Contiguous => MemoryMode::Contiguous,
            MemoryArg::DemandPaged => MemoryMode::DemandPaged,
        }
    }
}

/// Run the teaching kernel on the simulated machine against a scripted workload
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file (JSON)
    #[arg(short, long)]
    scenario: PathBuf,

    /// Print the metrics report as JSON
    #[arg(long)]
    json: bool,

    /// Log every interrupt and scheduling decision
    #[arg(short, long)]
    verbose: bool,

    /// Override the scheduler from the scenario
    #[arg(long, value_enum)]
    scheduler: Option<SchedulerArg>,

    /// Override the memory mode from the scenario
    #[arg(long, value_enum)]
    memory_mode: Option<MemoryArg>,

    /// Override the quantum, in interrupts
    #[arg(long)]
    quantum: Option<u32>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    console::init(args.verbose).context("failed to install the logger")?;

    let text = fs::read_to_string(&args.scenario)
        .with_context(|| format!("failed to read {}", args.scenario.display()))?;
    let mut scenario = Scenario::from_json(&text)
        .with_context(|| format!("invalid scenario {}", args.scenario.display()))?;
    if let Some(scheduler) = args.scheduler {
        scenario.config.scheduler = scheduler.into();
    }
    if let Some(mode) = args.memory_mode {
        scenario.config.memory_mode = mode.into();
    }
    if let Some(quantum) = args.quantum {
        scenario.config.default_quantum = quantum;
    }

    let outcome = os::run(&scenario)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    for (term, screen) in outcome.screens.iter().enumerate() {
        if !screen.is_empty() {
            println!("{} {:?}", format!("terminal {}:", term).cyan(), screen);
        }
    }
    println!("{}", outcome.report);
    let status = match (outcome.halted, outcome.internal_error) {
        (true, false) => "halted: all processes finished".green(),
        (true, true) => "halted: internal error".red().bold(),
        (false, _) => "script exhausted before halt".yellow(),
    };
    println!("{}", status);
    Ok(())
}
