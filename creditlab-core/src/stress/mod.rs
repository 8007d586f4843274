//! Scenario stress testing of a portfolio snapshot.

pub mod scenario;
pub mod simulator;

pub use scenario::{Scenario, ScenarioSet, ShockParams};
pub use simulator::{ScenarioOutcome, StressReport, StressSimulator};
