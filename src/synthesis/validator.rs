//! Independent checks of enumerated solutions

use super::Solution;
use crate::circuit::simulate;
use crate::config::ROOT_GATE;
use crate::sat::EncodedModel;
use std::collections::HashMap;

/// Re-checks solutions against the linear model and a direct simulation of
/// the wired network
pub struct SolutionValidator<'m> {
    model: &'m EncodedModel,
}

/// Result of solution validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Outputs obtained by simulating the solution's wiring
    pub simulated_outputs: Vec<Vec<bool>>,
    pub violations: Vec<String>,
}

/// Result of checking a whole catalog
#[derive(Debug, Clone)]
pub struct CatalogValidation {
    pub results: Vec<ValidationResult>,
    /// Pairs of 1-based solution indices sharing a `used` vector
    pub duplicate_used_vectors: Vec<(usize, usize)>,
    /// Indices of solutions whose objective beats the first one
    pub below_first_objective: Vec<usize>,
    /// Indices whose reported objective differs from their gate count
    pub objective_mismatches: Vec<usize>,
}

impl CatalogValidation {
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(|r| r.is_valid)
            && self.duplicate_used_vectors.is_empty()
            && self.below_first_objective.is_empty()
            && self.objective_mismatches.is_empty()
    }

    pub fn invalid_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_valid).count()
    }
}

impl<'m> SolutionValidator<'m> {
    pub fn new(model: &'m EncodedModel) -> Self {
        Self { model }
    }

    /// Validate one solution
    pub fn validate(&self, solution: &Solution) -> ValidationResult {
        let gate_count = self.model.gate_count();
        let row_count = self.model.rows.len();

        if solution.gates.len() != gate_count
            || solution.gates.iter().any(|g| g.row_outputs.len() != row_count)
        {
            return ValidationResult {
                is_valid: false,
                simulated_outputs: Vec::new(),
                violations: vec![format!(
                    "solution shape does not match {} gates over {} rows",
                    gate_count, row_count
                )],
            };
        }

        let mut violations = Vec::new();

        let assignment: HashMap<i32, bool> = solution.to_assignment(&self.model.variables);
        for constraint in self.model.system.violations(&assignment) {
            violations.push(format!(
                "violated {:?}: {}",
                constraint.kind,
                constraint.display_with(&self.model.variables)
            ));
        }

        let simulated_outputs = simulate(&solution.wiring(), &self.model.rows, &self.model.topology);
        for (gate, (simulated, assigned)) in simulated_outputs.iter().zip(&solution.gates).enumerate() {
            if simulated != &assigned.row_outputs {
                violations.push(format!(
                    "gate {} simulates to {:?} but reports {:?}",
                    gate + 1,
                    simulated,
                    assigned.row_outputs
                ));
            }
        }

        let root = &solution.gates[ROOT_GATE];
        if !root.used {
            violations.push("root gate is unused".to_string());
        }
        if root.row_outputs != self.model.target {
            violations.push(format!(
                "root outputs {:?} differ from target {:?}",
                root.row_outputs, self.model.target
            ));
        }

        let used = solution.used_gates().len();
        if used != solution.objective_value {
            violations.push(format!(
                "objective {} differs from {} used gates",
                solution.objective_value, used
            ));
        }

        ValidationResult {
            is_valid: violations.is_empty(),
            simulated_outputs,
            violations,
        }
    }

    /// Validate every solution plus the cross-solution properties
    pub fn validate_catalog(&self, solutions: &[Solution]) -> CatalogValidation {
        let results: Vec<ValidationResult> = solutions.iter().map(|s| self.validate(s)).collect();

        let mut seen: HashMap<Vec<bool>, usize> = HashMap::new();
        let mut duplicate_used_vectors = Vec::new();
        for solution in solutions {
            if let Some(&earlier) = seen.get(&solution.used_vector()) {
                duplicate_used_vectors.push((earlier, solution.index));
            } else {
                seen.insert(solution.used_vector(), solution.index);
            }
        }

        let below_first_objective = match solutions.first() {
            Some(first) => solutions
                .iter()
                .filter(|s| s.objective_value < first.objective_value)
                .map(|s| s.index)
                .collect(),
            None => Vec::new(),
        };

        let objective_mismatches = solutions
            .iter()
            .filter(|s| s.used_gates().len() != s.objective_value)
            .map(|s| s.index)
            .collect();

        CatalogValidation {
            results,
            duplicate_used_vectors,
            below_first_objective,
            objective_mismatches,
        }
    }
}
