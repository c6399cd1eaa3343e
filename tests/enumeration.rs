use gate_synth::circuit::{FeedLink, Row};
use gate_synth::config::{ProblemConfig, Settings, ROOT_GATE};
use gate_synth::error::{SolverError, SolverErrorKind};
use gate_synth::sat::{CadicalAdapter, ConstraintSystem, Objective, SolveOutcome, SolverAdapter};
use gate_synth::synthesis::{iteration_limit, StopReason, SynthesisProblem};
use std::collections::HashSet;

fn default_problem() -> SynthesisProblem {
    let _ = env_logger::builder().is_test(true).try_init();
    SynthesisProblem::new(Settings::default()).unwrap()
}

/// Delegates to CaDiCaL for a fixed number of calls, then fails
struct FailingAfter {
    inner: CadicalAdapter,
    remaining: usize,
}

impl SolverAdapter for FailingAfter {
    fn solve(
        &mut self,
        system: &ConstraintSystem,
        objective: &Objective,
    ) -> Result<SolveOutcome, SolverError> {
        if self.remaining == 0 {
            return Err(SolverError::engine("engine lost its license"));
        }
        self.remaining -= 1;
        self.inner.solve(system, objective)
    }
}

#[test]
fn default_instance_enumerates_to_exhaustion() {
    let problem = default_problem();
    let report = problem.enumerate();

    assert!(report.is_complete());
    assert!(report.failure.is_none());
    assert!(report.total() <= iteration_limit(7));
    assert_eq!(report.minimum_gates(), Some(5));
    // AND and NOR of the inputs, one under each child of the root
    assert_eq!(report.total(), 2);
    assert_eq!(
        report.final_constraint_count,
        problem.model().system.len() + report.total()
    );
}

#[test]
fn every_solution_is_sound() {
    let problem = default_problem();
    let report = problem.enumerate();
    let catalog = problem.validator().validate_catalog(&report.solutions);

    for result in &catalog.results {
        assert!(result.is_valid, "{:?}", result.violations);
    }
    assert!(catalog.is_valid());

    for solution in &report.solutions {
        let root = &solution.gates[ROOT_GATE];
        assert!(root.used);
        assert_eq!(root.row_outputs, vec![false, true, true, false]);
    }
}

#[test]
fn used_vectors_are_distinct_and_objectives_never_drop() {
    let report = default_problem().enumerate();
    let first = report.solutions[0].objective_value;

    let mut seen = HashSet::new();
    for (position, solution) in report.solutions.iter().enumerate() {
        assert_eq!(solution.index, position + 1);
        assert!(seen.insert(solution.used_vector()), "repeated pattern at {}", solution.index);
        assert!(solution.objective_value >= first);
        assert_eq!(solution.objective_value, solution.used_gates().len());
    }
    assert_eq!(seen.len(), report.total());
}

#[test]
fn leaf_root_cannot_produce_xor() {
    let mut settings = Settings::default();
    settings.problem.feed_links.clear();
    let problem = SynthesisProblem::new(settings).unwrap();

    let report = problem.enumerate();
    assert_eq!(report.total(), 0);
    assert!(report.is_complete());
    assert_eq!(report.minimum_gates(), None);
}

#[test]
fn leaf_root_produces_nor() {
    let mut settings = Settings::default();
    settings.problem = ProblemConfig {
        gate_count: 1,
        rows: Row::full_table(),
        feed_links: Vec::new(),
        target: vec![true, false, false, false],
    };
    let report = SynthesisProblem::new(settings).unwrap().enumerate();

    assert_eq!(report.total(), 1);
    let gate = &report.solutions[0].gates[0];
    assert!(gate.selector1 && gate.selector2);
}

#[test]
fn solver_failure_keeps_partial_catalog() {
    let problem = default_problem();
    let adapter = FailingAfter {
        inner: CadicalAdapter::new(true),
        remaining: 1,
    };

    let report = problem.enumerate_with(adapter);
    assert_eq!(report.total(), 1);
    assert_eq!(report.stop_reason, StopReason::SolverFailure);
    let failure = report.failure.unwrap();
    assert_eq!(failure.kind, SolverErrorKind::Engine);
    assert!(failure.to_string().contains("engine lost its license"));
}

#[test]
fn solution_cap_stops_early() {
    let mut settings = Settings::default();
    settings.solver.max_solutions = Some(1);
    let report = SynthesisProblem::new(settings).unwrap().enumerate();

    assert_eq!(report.total(), 1);
    assert_eq!(report.stop_reason, StopReason::SolutionLimit);
}

#[test]
fn feasibility_mode_still_sound() {
    let mut settings = Settings::default();
    settings.solver.prove_optimality = false;
    settings.solver.max_solutions = Some(5);
    let problem = SynthesisProblem::new(settings).unwrap();

    let report = problem.enumerate();
    assert!(report.total() > 0);
    let catalog = problem.validator().validate_catalog(&report.solutions);
    assert_eq!(catalog.invalid_count(), 0);
    assert!(catalog.duplicate_used_vectors.is_empty());
}

#[test]
fn cyclic_topology_is_rejected_before_solving() {
    let mut settings = Settings::default();
    settings.problem.feed_links = vec![FeedLink::new(0, 1, 2), FeedLink::new(1, 0, 3)];
    assert!(SynthesisProblem::new(settings).is_err());
}

#[test]
fn wide_instances_enumerate_past_the_first_cut() {
    let mut settings = Settings::default();
    settings.problem.gate_count = 24;
    settings.solver.max_solutions = Some(3);
    let problem = SynthesisProblem::new(settings).unwrap();

    let report = problem.enumerate();
    assert!(report.failure.is_none(), "{:?}", report.failure);
    assert_eq!(report.total(), 3);
    assert_eq!(report.stop_reason, StopReason::SolutionLimit);
    assert_eq!(report.minimum_gates(), Some(5));
    assert_eq!(problem.validator().validate_catalog(&report.solutions).invalid_count(), 0);
}
