//! Solver adapter: CaDiCaL behind an optimizing 0/1 interface

use super::cnf::{translate, Clause, UnaryCounter};
use super::constraints::ConstraintSystem;
use super::objective::Objective;
use crate::error::SolverError;
use cadical::Solver;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How a returned assignment relates to the objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// No assignment with a smaller objective exists
    Optimal,
    /// Satisfies every constraint; optimality was not established
    Feasible,
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "Optimal"),
            SolveStatus::Feasible => write!(f, "Feasible"),
        }
    }
}

/// Result of one adapter call
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Solved {
        status: SolveStatus,
        assignment: HashMap<i32, bool>,
        objective_value: usize,
    },
    Infeasible,
}

/// Anything able to minimize an objective over a constraint system.
///
/// Calls are synchronous. An adapter may keep a live model between calls,
/// but the system it receives only ever grows by appending.
pub trait SolverAdapter {
    fn solve(
        &mut self,
        system: &ConstraintSystem,
        objective: &Objective,
    ) -> Result<SolveOutcome, SolverError>;
}

impl<A: SolverAdapter + ?Sized> SolverAdapter for &mut A {
    fn solve(
        &mut self,
        system: &ConstraintSystem,
        objective: &Objective,
    ) -> Result<SolveOutcome, SolverError> {
        (**self).solve(system, objective)
    }
}

/// Thin wrapper over a CaDiCaL instance
pub struct SatSolver {
    solver: Solver,
    variable_count: usize,
    clause_count: usize,
    /// Set once an empty clause has been added
    contradictory: bool,
}

impl SatSolver {
    /// Create a new SAT solver instance
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
            contradictory: false,
        }
    }

    /// Add clauses to the solver
    pub fn add_clauses(&mut self, clauses: &[Clause]) {
        for clause in clauses {
            self.add_clause(clause);
        }
    }

    /// Add a single clause to the solver; an empty clause makes every later
    /// solve unsatisfiable
    pub fn add_clause(&mut self, clause: &Clause) {
        if clause.is_empty() {
            self.contradictory = true;
            return;
        }

        for &literal in &clause.literals {
            let var = literal.unsigned_abs() as usize;
            if var > self.variable_count {
                self.variable_count = var;
            }
        }

        self.solver.add_clause(clause.literals.iter().copied());
        self.clause_count += 1;
    }

    /// Solve under assumptions; `Ok(None)` means unsatisfiable
    pub fn solve_under(&mut self, assumptions: &[i32]) -> Result<Option<HashMap<i32, bool>>, SolverError> {
        if self.contradictory {
            return Ok(None);
        }

        match self.solver.solve_with(assumptions.iter().copied()) {
            Some(true) => Ok(Some(self.extract_assignment())),
            Some(false) => Ok(None),
            None => Err(SolverError::interrupted(
                "CaDiCaL stopped before deciding satisfiability",
            )),
        }
    }

    /// Extract variable assignment from the solver
    fn extract_assignment(&self) -> HashMap<i32, bool> {
        let mut assignment = HashMap::new();

        for var in 1..=self.variable_count as i32 {
            if let Some(value) = self.solver.value(var) {
                assignment.insert(var, value);
            }
        }

        assignment
    }

    pub fn is_contradictory(&self) -> bool {
        self.contradictory
    }

    /// Get the number of variables
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Get the number of clauses
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }
}

impl Default for SatSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimizing adapter over one CaDiCaL session.
///
/// The session is created with the adapter and released when it is dropped.
/// Constraints are loaded incrementally: `loaded` counts how many entries of
/// the system are already part of the live model.
pub struct CadicalAdapter {
    solver: SatSolver,
    loaded: usize,
    model_variables: Option<usize>,
    counter: Option<UnaryCounter>,
    next_var: i32,
    prove_optimality: bool,
    statistics: SolverStatistics,
}

impl CadicalAdapter {
    pub fn new(prove_optimality: bool) -> Self {
        Self {
            solver: SatSolver::new(),
            loaded: 0,
            model_variables: None,
            counter: None,
            next_var: 1,
            prove_optimality,
            statistics: SolverStatistics::default(),
        }
    }

    /// Bring the live model up to date with the system
    fn sync(&mut self, system: &ConstraintSystem) -> Result<(), SolverError> {
        match self.model_variables {
            None => {
                self.model_variables = Some(system.variable_count());
                self.next_var = system.variable_count() as i32 + 1;
            }
            Some(count) if count != system.variable_count() => {
                return Err(SolverError::model(format!(
                    "constraint system grew from {} to {} variables during the session",
                    count,
                    system.variable_count()
                )));
            }
            Some(_) => {}
        }

        if system.len() < self.loaded {
            return Err(SolverError::model(format!(
                "constraint system shrank from {} to {} constraints",
                self.loaded,
                system.len()
            )));
        }

        // The whole batch translates before the live model changes
        let pending = system.since(self.loaded);
        let translated = pending
            .iter()
            .map(translate)
            .collect::<Result<Vec<_>, _>>()?;
        for clauses in &translated {
            self.solver.add_clauses(clauses);
        }
        log::trace!(
            "loaded {} new constraints, {} clauses total",
            pending.len(),
            self.solver.clause_count()
        );
        self.loaded = system.len();
        Ok(())
    }

    fn counter_for(&mut self, objective: &Objective) -> Result<&UnaryCounter, SolverError> {
        if let Some(existing) = &self.counter {
            if existing.inputs() != objective.terms() {
                return Err(SolverError::model("objective changed during the session"));
            }
        } else {
            let (counter, clauses) = UnaryCounter::encode(objective.terms(), &mut self.next_var);
            self.solver.add_clauses(&clauses);
            self.counter = Some(counter);
        }
        self.counter
            .as_ref()
            .ok_or_else(|| SolverError::engine("objective counter missing"))
    }

    pub fn statistics(&self) -> SolverStatistics {
        SolverStatistics {
            variable_count: self.solver.variable_count(),
            clause_count: self.solver.clause_count(),
            ..self.statistics.clone()
        }
    }
}

impl SolverAdapter for CadicalAdapter {
    fn solve(
        &mut self,
        system: &ConstraintSystem,
        objective: &Objective,
    ) -> Result<SolveOutcome, SolverError> {
        let start_time = Instant::now();
        self.sync(system)?;

        if !self.prove_optimality {
            self.statistics.engine_calls += 1;
            let outcome = match self.solver.solve_under(&[])? {
                Some(assignment) => SolveOutcome::Solved {
                    objective_value: objective.value(&assignment),
                    status: SolveStatus::Feasible,
                    assignment,
                },
                None => SolveOutcome::Infeasible,
            };
            self.statistics.solve_time += start_time.elapsed();
            return Ok(outcome);
        }

        // Linear search upwards: the first satisfiable bound is the optimum
        let upper_bound = objective.upper_bound();
        let bounds: Vec<Option<i32>> = {
            let counter = self.counter_for(objective)?;
            (0..=upper_bound).map(|k| counter.at_most(k)).collect()
        };

        for (k, assumption) in bounds.into_iter().enumerate() {
            let assumptions: Vec<i32> = assumption.into_iter().collect();
            self.statistics.engine_calls += 1;
            if let Some(assignment) = self.solver.solve_under(&assumptions)? {
                let objective_value = objective.value(&assignment);
                log::debug!("bound {} satisfiable with objective {}", k, objective_value);
                self.statistics.solve_time += start_time.elapsed();
                return Ok(SolveOutcome::Solved {
                    status: SolveStatus::Optimal,
                    assignment,
                    objective_value,
                });
            }
            log::trace!("bound {} unsatisfiable", k);
        }

        self.statistics.solve_time += start_time.elapsed();
        Ok(SolveOutcome::Infeasible)
    }
}

/// Statistics about the solving process
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub variable_count: usize,
    pub clause_count: usize,
    pub engine_calls: usize,
    pub solve_time: Duration,
}

impl std::fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Solver Statistics:")?;
        writeln!(f, "  Variables: {}", self.variable_count)?;
        writeln!(f, "  Clauses: {}", self.clause_count)?;
        writeln!(f, "  Engine calls: {}", self.engine_calls)?;
        writeln!(f, "  Solve time: {:.3}s", self.solve_time.as_secs_f64())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::constraints::{ConstraintKind, LinearExpr};
    use crate::sat::VariableManager;

    #[test]
    fn test_solver_creation() {
        let solver = SatSolver::new();
        assert_eq!(solver.variable_count(), 0);
        assert_eq!(solver.clause_count(), 0);
        assert!(!solver.is_contradictory());
    }

    #[test]
    fn test_simple_satisfiable() {
        let mut solver = SatSolver::new();

        // (x1 or x2) and (not x1 or x2)
        solver.add_clause(&Clause::new(vec![1, 2]));
        solver.add_clause(&Clause::new(vec![-1, 2]));

        let assignment = solver.solve_under(&[]).unwrap().unwrap();
        assert_eq!(assignment.get(&2), Some(&true));
    }

    #[test]
    fn test_unsatisfiable() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::unit(1));
        solver.add_clause(&Clause::unit(-1));

        assert!(solver.solve_under(&[]).unwrap().is_none());
    }

    #[test]
    fn test_assumptions_are_temporary() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::new(vec![1, 2]));

        assert!(solver.solve_under(&[-1, -2]).unwrap().is_none());
        assert!(solver.solve_under(&[-1]).unwrap().is_some());
    }

    #[test]
    fn test_empty_clause_makes_contradiction() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::unit(1));
        solver.add_clause(&Clause::new(vec![]));

        assert!(solver.is_contradictory());
        assert_eq!(solver.clause_count(), 1);
        assert!(solver.solve_under(&[]).unwrap().is_none());
    }

    #[test]
    fn test_variable_count_tracking() {
        let mut solver = SatSolver::new();
        solver.add_clause(&Clause::new(vec![1, -5, 3]));
        assert_eq!(solver.variable_count(), 5);

        solver.add_clause(&Clause::new(vec![2, -7]));
        assert_eq!(solver.variable_count(), 7);
    }

    /// at least two of three gates used, minimized
    fn two_of_three() -> (VariableManager, ConstraintSystem, Objective) {
        let vm = VariableManager::new(3, 1);
        let mut system = ConstraintSystem::new(vm.variable_count());
        let expr = vm
            .used_variables()
            .into_iter()
            .fold(LinearExpr::new(), |e, v| e.plus(v));
        system.push(expr.at_least(2, ConstraintKind::RootUsed));
        let objective = Objective::gate_count(&vm);
        (vm, system, objective)
    }

    #[test]
    fn test_adapter_minimizes() {
        let (_, system, objective) = two_of_three();
        let mut adapter = CadicalAdapter::new(true);

        match adapter.solve(&system, &objective).unwrap() {
            SolveOutcome::Solved { status, objective_value, assignment } => {
                assert_eq!(status, SolveStatus::Optimal);
                assert_eq!(objective_value, 2);
                assert!(system.violations(&assignment).is_empty());
            }
            SolveOutcome::Infeasible => panic!("expected a solution"),
        }
        assert!(adapter.statistics().engine_calls >= 3);
    }

    #[test]
    fn test_adapter_loads_appended_constraints() {
        let (vm, mut system, objective) = two_of_three();
        let mut adapter = CadicalAdapter::new(true);
        adapter.solve(&system, &objective).unwrap();

        // Forbid the first gate: the remaining two must both be used
        system.push(LinearExpr::new().plus(vm.used(0).unwrap()).at_most(0, ConstraintKind::BlockingCut));
        match adapter.solve(&system, &objective).unwrap() {
            SolveOutcome::Solved { assignment, objective_value, .. } => {
                assert_eq!(objective_value, 2);
                assert_eq!(assignment.get(&vm.used(0).unwrap()), Some(&false));
            }
            SolveOutcome::Infeasible => panic!("expected a solution"),
        }

        system.push(LinearExpr::new().at_least(1, ConstraintKind::BlockingCut));
        assert_eq!(adapter.solve(&system, &objective).unwrap(), SolveOutcome::Infeasible);
    }

    #[test]
    fn test_adapter_without_optimality() {
        let (_, system, objective) = two_of_three();
        let mut adapter = CadicalAdapter::new(false);

        match adapter.solve(&system, &objective).unwrap() {
            SolveOutcome::Solved { status, objective_value, .. } => {
                assert_eq!(status, SolveStatus::Feasible);
                assert!(objective_value >= 2);
            }
            SolveOutcome::Infeasible => panic!("expected a solution"),
        }
    }

    #[test]
    fn test_rejected_batch_loads_nothing() {
        let vm = VariableManager::new(5, 1);
        let mut system = ConstraintSystem::new(vm.variable_count());
        system.push(LinearExpr::new().plus(1).plus(5).at_least(1, ConstraintKind::RootUsed));
        system.push(
            (2..=18)
                .fold(LinearExpr::new().add(2, 19), |e, v| e.plus(v))
                .at_most(3, ConstraintKind::FanIn),
        );
        let objective = Objective::gate_count(&vm);
        let mut adapter = CadicalAdapter::new(true);

        let err = adapter.solve(&system, &objective).unwrap_err();
        assert_eq!(err.kind, crate::error::SolverErrorKind::Model);
        assert_eq!(adapter.statistics().clause_count, 0);

        // The offending constraint is still pending on the next call
        assert!(adapter.solve(&system, &objective).is_err());
        assert_eq!(adapter.statistics().clause_count, 0);
    }

    #[test]
    fn test_adapter_rejects_shrinking_system() {
        let (_, system, objective) = two_of_three();
        let mut adapter = CadicalAdapter::new(true);
        adapter.solve(&system, &objective).unwrap();

        let empty = ConstraintSystem::new(system.variable_count());
        let err = adapter.solve(&empty, &objective).unwrap_err();
        assert_eq!(err.kind, crate::error::SolverErrorKind::Model);
    }
}
