//! Builds the complete 0/1 model for one synthesis instance

use super::constraints::{ConstraintGenerator, ConstraintSystem};
use super::objective::{target_constraints, Objective};
use super::VariableManager;
use crate::circuit::{Row, Topology};
use crate::config::{ProblemConfig, ROOT_GATE};
use crate::error::ModelError;

/// Variables, constraints and objective of an instance, ready to solve
#[derive(Debug)]
pub struct EncodedModel {
    pub variables: VariableManager,
    pub topology: Topology,
    pub rows: Vec<Row>,
    pub target: Vec<bool>,
    pub system: ConstraintSystem,
    pub objective: Objective,
}

/// Encode a validated problem configuration
pub fn encode(problem: &ProblemConfig) -> Result<EncodedModel, ModelError> {
    problem.validate()?;
    let topology = problem.topology()?;
    let variables = VariableManager::new(problem.gate_count, problem.row_count());

    let mut system = ConstraintSystem::new(variables.variable_count());
    {
        let generator = ConstraintGenerator::new(&variables, &problem.rows, &topology);
        system.extend(generator.generate_all_constraints()?);
    }
    system.extend(target_constraints(&variables, ROOT_GATE, &problem.target)?);

    let objective = Objective::gate_count(&variables);

    log::debug!(
        "encoded {} gates over {} rows: {} variables, {} constraints",
        problem.gate_count,
        problem.row_count(),
        variables.variable_count(),
        system.len()
    );

    Ok(EncodedModel {
        variables,
        topology,
        rows: problem.rows.clone(),
        target: problem.target.clone(),
        system,
        objective,
    })
}

impl EncodedModel {
    pub fn gate_count(&self) -> usize {
        self.topology.gate_count()
    }

    /// Get encoding statistics
    pub fn statistics(&self) -> EncodingStatistics {
        EncodingStatistics {
            gate_count: self.gate_count(),
            row_count: self.rows.len(),
            feed_links: self.topology.links().len(),
            leaves: self.topology.leaves().count(),
            total_variables: self.variables.variable_count(),
            total_constraints: self.system.len(),
        }
    }
}

/// Statistics about the encoding
#[derive(Debug, Clone)]
pub struct EncodingStatistics {
    pub gate_count: usize,
    pub row_count: usize,
    pub feed_links: usize,
    pub leaves: usize,
    pub total_variables: usize,
    pub total_constraints: usize,
}

impl std::fmt::Display for EncodingStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Encoding Statistics:")?;
        writeln!(f, "  Gates: {} ({} leaves)", self.gate_count, self.leaves)?;
        writeln!(f, "  Rows: {}", self.row_count)?;
        writeln!(f, "  Feed links: {}", self.feed_links)?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  Total constraints: {}", self.total_constraints)?;
        Ok(())
    }
}
