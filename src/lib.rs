//! Minimal logic-gate network synthesis
//!
//! Gate existence, wiring and per-row outputs are 0/1 decision variables
//! under linear constraints. The gate count is minimized with a SAT
//! solver, and every distinct gate-usage pattern is enumerated by adding a
//! blocking cut after each solution until the model becomes infeasible.

pub mod circuit;
pub mod config;
pub mod error;
pub mod sat;
pub mod synthesis;
pub mod utils;

pub use config::Settings;
pub use synthesis::{EnumerationReport, Solution, SynthesisProblem};

use anyhow::Result;

/// Enumerate all solutions for the configured instance
pub fn synthesize(settings: Settings) -> Result<EnumerationReport> {
    let problem = SynthesisProblem::new(settings)?;
    Ok(problem.enumerate())
}
