//! Host-side runner: boots the kernel on the simulated machine and replays
//! a scripted workload described in a JSON scenario file.

pub mod console;
pub mod runner;
pub mod scenario;

pub use runner::{run, Outcome};
pub use scenario::Scenario;
