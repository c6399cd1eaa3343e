//! Solve/exclude loop that turns one optimum into a catalog of solutions

use super::{EnumerationSummary, Solution};
use crate::error::SolverError;
use crate::sat::{
    ConstraintKind, ConstraintSystem, EncodedModel, LinearConstraint, LinearExpr, SolveOutcome,
    SolverAdapter, VariableManager,
};

/// Why the enumeration stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The adapter proved the system infeasible
    Exhausted,
    /// The configured solution cap was reached
    SolutionLimit,
    /// 2^N solutions were emitted
    IterationGuard,
    /// The adapter failed
    SolverFailure,
}

/// Solutions found plus how the run ended. Solutions recorded before a
/// failure are kept.
#[derive(Debug, Clone)]
pub struct EnumerationReport {
    pub solutions: Vec<Solution>,
    pub stop_reason: StopReason,
    pub failure: Option<SolverError>,
    /// Size of the constraint system when the run ended
    pub final_constraint_count: usize,
}

impl EnumerationReport {
    pub fn total(&self) -> usize {
        self.solutions.len()
    }

    /// Objective of the first solution, which is the optimum when the
    /// adapter proves optimality
    pub fn minimum_gates(&self) -> Option<usize> {
        self.solutions.first().map(|s| s.objective_value)
    }

    /// True when the adapter proved that no further solution exists
    pub fn is_complete(&self) -> bool {
        self.stop_reason == StopReason::Exhausted
    }

    /// Serializable view of the run
    pub fn summary(&self) -> EnumerationSummary {
        EnumerationSummary {
            total: self.total(),
            minimum_gates: self.minimum_gates(),
            complete: self.is_complete(),
            error: self.failure.as_ref().map(|e| e.to_string()),
            solutions: self.solutions.clone(),
        }
    }
}

/// Blocking cut for a found solution: at least one gate that was unused in
/// it must be used from now on.
///
/// Gates used in the prior solution are unconstrained, so two assignments
/// with the same `used` vector are never both enumerated. When every gate
/// was used the cut has no terms and is unsatisfiable.
pub fn blocking_cut(solution: &Solution, variables: &VariableManager) -> LinearConstraint {
    solution
        .gates
        .iter()
        .zip(variables.gates())
        .filter(|(gate, _)| !gate.used)
        .fold(LinearExpr::new(), |expr, (_, vars)| expr.plus(vars.used))
        .at_least(1, ConstraintKind::BlockingCut)
}

/// Upper bound on distinct `used` vectors over `gate_count` gates
pub fn iteration_limit(gate_count: usize) -> usize {
    u32::try_from(gate_count)
        .ok()
        .and_then(|shift| 1usize.checked_shl(shift))
        .unwrap_or(usize::MAX)
}

/// Drives repeated solves against an append-only constraint system.
///
/// The enumerator owns its copy of the system; the only mutation is one
/// blocking cut appended after each solution.
pub struct SolutionEnumerator<'m, A: SolverAdapter> {
    model: &'m EncodedModel,
    system: ConstraintSystem,
    adapter: A,
    max_solutions: Option<usize>,
    verify: bool,
}

impl<'m, A: SolverAdapter> SolutionEnumerator<'m, A> {
    pub fn new(model: &'m EncodedModel, adapter: A) -> Self {
        Self {
            model,
            system: model.system.clone(),
            adapter,
            max_solutions: None,
            verify: false,
        }
    }

    pub fn with_max_solutions(mut self, max_solutions: Option<usize>) -> Self {
        self.max_solutions = max_solutions;
        self
    }

    /// Re-check every returned assignment against the linear constraints
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Run until infeasible, a limit, or a solver failure
    pub fn run(mut self) -> EnumerationReport {
        let guard = iteration_limit(self.model.gate_count());
        let mut solutions: Vec<Solution> = Vec::new();
        let mut failure = None;

        let stop_reason = loop {
            if self.max_solutions.map_or(false, |max| solutions.len() >= max) {
                break StopReason::SolutionLimit;
            }
            if solutions.len() >= guard {
                log::warn!("stopping after {} solutions, the 2^N bound", guard);
                break StopReason::IterationGuard;
            }

            let outcome = match self.adapter.solve(&self.system, &self.model.objective) {
                Ok(outcome) => outcome,
                Err(err) => {
                    log::error!("solve {} failed: {}", solutions.len() + 1, err);
                    failure = Some(err);
                    break StopReason::SolverFailure;
                }
            };

            let (status, assignment, objective_value) = match outcome {
                SolveOutcome::Infeasible => break StopReason::Exhausted,
                SolveOutcome::Solved {
                    status,
                    assignment,
                    objective_value,
                } => (status, assignment, objective_value),
            };

            if self.verify {
                if let Some(violated) = self.system.violations(&assignment).first() {
                    failure = Some(SolverError::engine(format!(
                        "assignment violates {}",
                        violated.display_with(&self.model.variables)
                    )));
                    break StopReason::SolverFailure;
                }
            }

            let solution = Solution::decode(
                solutions.len() + 1,
                status,
                objective_value,
                &assignment,
                &self.model.variables,
            );
            let cut = blocking_cut(&solution, &self.model.variables);
            log::debug!(
                "solution {} uses gates {:?}; adding cut {}",
                solution.index,
                solution.used_gates(),
                cut.display_with(&self.model.variables)
            );
            self.system.push(cut);
            solutions.push(solution);
        };

        log::info!("enumeration stopped ({:?}) with {} solutions", stop_reason, solutions.len());

        EnumerationReport {
            solutions,
            stop_reason,
            failure,
            final_constraint_count: self.system.len(),
        }
    }
}
