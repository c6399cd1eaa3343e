//! Synthesis problem: settings, encoded model and the enumeration entry point

use super::{EnumerationReport, SolutionEnumerator, SolutionValidator};
use crate::config::Settings;
use crate::sat::{encode, CadicalAdapter, EncodedModel, EncodingStatistics, SolverAdapter};
use anyhow::{Context, Result};
use std::time::Instant;

/// One configured synthesis instance
pub struct SynthesisProblem {
    settings: Settings,
    model: EncodedModel,
}

impl SynthesisProblem {
    /// Validate the settings and build the model
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let model = encode(&settings.problem).context("Failed to build the constraint model")?;

        Ok(Self { settings, model })
    }

    /// Enumerate with a fresh CaDiCaL session, released when the run ends
    pub fn enumerate(&self) -> EnumerationReport {
        let mut adapter = CadicalAdapter::new(self.settings.solver.prove_optimality);
        let report = self.enumerate_with(&mut adapter);
        log::debug!("{}", adapter.statistics());
        report
    }

    /// Enumerate with a caller-supplied adapter
    pub fn enumerate_with<A: SolverAdapter>(&self, adapter: A) -> EnumerationReport {
        let start_time = Instant::now();
        log::info!(
            "enumerating solutions over {} gates and {} rows",
            self.model.gate_count(),
            self.model.rows.len()
        );

        let report = SolutionEnumerator::new(&self.model, adapter)
            .with_max_solutions(self.settings.solver.max_solutions)
            .with_verification(self.settings.solver.verify_solutions)
            .run();

        log::info!(
            "{} solutions in {:.3}s",
            report.total(),
            start_time.elapsed().as_secs_f64()
        );
        report
    }

    pub fn validator(&self) -> SolutionValidator<'_> {
        SolutionValidator::new(&self.model)
    }

    pub fn encoding_statistics(&self) -> EncodingStatistics {
        self.model.statistics()
    }

    pub fn model(&self) -> &EncodedModel {
        &self.model
    }

    /// Get the problem settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
