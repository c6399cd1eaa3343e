//! Translation of linear 0/1 constraints into CNF clauses

use super::constraints::{LinearConstraint, Relation};
use crate::error::SolverError;
use itertools::Itertools;

/// Mixed-weight constraints over more terms than this are rejected by the
/// translator; uniform-weight constraints have no such limit
pub const MAX_TRANSLATION_ARITY: usize = 16;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub literals: Vec<i32>, // Positive for variable, negative for negation
}

impl Clause {
    /// Create a new clause from literals
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    /// Create a unit clause (single literal)
    pub fn unit(literal: i32) -> Self {
        Self {
            literals: vec![literal],
        }
    }

    /// Create a binary clause (two literals)
    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self {
            literals: vec![lit1, lit2],
        }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Check if clause is unit
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }
}

/// Translate a linear constraint into an equisatisfiable set of clauses over
/// the same variables.
///
/// Each relation is rewritten as `sum w_i * l_i <= bound` with positive
/// weights over literals; every minimal literal set whose weight exceeds the
/// bound becomes one clause forbidding it. A bound below zero yields the
/// empty clause.
pub fn translate(constraint: &LinearConstraint) -> Result<Vec<Clause>, SolverError> {
    let at_most = || normalize(constraint.expr.terms(), constraint.rhs);
    let at_least = || {
        normalize(
            constraint.expr.terms().map(|(coefficient, var)| (-coefficient, var)),
            -constraint.rhs,
        )
    };

    let forms = match constraint.relation {
        Relation::LessEq => vec![at_most()],
        Relation::GreaterEq => vec![at_least()],
        Relation::Equal => vec![at_most(), at_least()],
    };

    let mut clauses = Vec::new();
    for (literals, bound) in forms {
        clauses.extend(at_most_clauses(&literals, bound)?);
    }
    Ok(clauses)
}

/// Rewrite `sum a_i * x_i <= rhs` so every weight is positive, negating the
/// literal of each negative term and shifting the bound
fn normalize<I>(terms: I, rhs: i64) -> (Vec<(i64, i32)>, i64)
where
    I: Iterator<Item = (i64, i32)>,
{
    let mut bound = rhs;
    let literals = terms
        .map(|(coefficient, var)| {
            if coefficient < 0 {
                bound -= coefficient;
                (-coefficient, -var)
            } else {
                (coefficient, var)
            }
        })
        .collect();
    (literals, bound)
}

fn at_most_clauses(literals: &[(i64, i32)], bound: i64) -> Result<Vec<Clause>, SolverError> {
    if bound < 0 {
        return Ok(vec![Clause::new(Vec::new())]);
    }

    let total: i64 = literals.iter().map(|&(weight, _)| weight).sum();
    if total <= bound {
        return Ok(Vec::new());
    }

    let forbid = |subset: Vec<&(i64, i32)>| {
        Clause::new(subset.iter().map(|&&(_, literal)| -literal).collect())
    };

    // Equal weights: the minimal violating sets are exactly those of one size
    if let Some(&(weight, _)) = literals.first() {
        if literals.iter().all(|&(w, _)| w == weight) {
            let allowed = usize::try_from(bound / weight).unwrap_or(usize::MAX);
            return Ok(literals.iter().combinations(allowed + 1).map(forbid).collect());
        }
    }

    if literals.len() > MAX_TRANSLATION_ARITY {
        return Err(SolverError::model(format!(
            "weighted constraint over {} variables exceeds the translation limit of {}",
            literals.len(),
            MAX_TRANSLATION_ARITY
        )));
    }

    Ok(literals
        .iter()
        .powerset()
        .filter(|subset| {
            let weight: i64 = subset.iter().map(|&&(w, _)| w).sum();
            weight > bound && subset.iter().all(|&&(w, _)| weight - w <= bound)
        })
        .map(forbid)
        .collect())
}

/// Sequential counter over a set of input literals.
///
/// `outputs[c]` is implied whenever at least `c + 1` inputs are true, so
/// assuming its negation bounds the number of true inputs by `c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryCounter {
    inputs: Vec<i32>,
    outputs: Vec<i32>,
}

impl UnaryCounter {
    /// Encode a counter, allocating fresh variables from `next_var`
    pub fn encode(inputs: &[i32], next_var: &mut i32) -> (Self, Vec<Clause>) {
        let mut clauses = Vec::new();
        let mut previous: Vec<i32> = Vec::new();

        for (position, &input) in inputs.iter().enumerate() {
            let prefix_len = position + 1;
            let current: Vec<i32> = (0..prefix_len)
                .map(|_| {
                    let var = *next_var;
                    *next_var += 1;
                    var
                })
                .collect();

            for count in 1..=prefix_len {
                let here = current[count - 1];
                // At least `count` true before this input stays true here
                if count < prefix_len {
                    clauses.push(Clause::binary(-previous[count - 1], here));
                }
                if count == 1 {
                    clauses.push(Clause::binary(-input, here));
                } else {
                    clauses.push(Clause::new(vec![-previous[count - 2], -input, here]));
                }
            }

            previous = current;
        }

        let counter = Self {
            inputs: inputs.to_vec(),
            outputs: previous,
        };
        (counter, clauses)
    }

    pub fn inputs(&self) -> &[i32] {
        &self.inputs
    }

    /// Assumption literal restricting the count to at most `k`, or `None`
    /// when the bound cannot be exceeded
    pub fn at_most(&self, k: usize) -> Option<i32> {
        self.outputs.get(k).map(|&output| -output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::constraints::{ConstraintKind, LinearExpr};
    use std::collections::HashMap;

    fn clauses_hold(clauses: &[Clause], assignment: &HashMap<i32, bool>) -> bool {
        clauses.iter().all(|clause| {
            clause.literals.iter().any(|&lit| {
                let value = assignment.get(&lit.abs()).copied().unwrap_or(false);
                if lit > 0 { value } else { !value }
            })
        })
    }

    fn assignment_from_bits(vars: &[i32], bits: u32) -> HashMap<i32, bool> {
        vars.iter()
            .enumerate()
            .map(|(i, &var)| (var, bits & (1 << i) != 0))
            .collect()
    }

    /// The clauses accept exactly the assignments the constraint accepts
    fn assert_equivalent(constraint: &LinearConstraint, vars: &[i32]) {
        let clauses = translate(constraint).unwrap();
        for bits in 0..(1u32 << vars.len()) {
            let assignment = assignment_from_bits(vars, bits);
            assert_eq!(
                constraint.is_satisfied_by(&assignment),
                clauses_hold(&clauses, &assignment),
                "mismatch for {:?} under bits {:b}",
                constraint,
                bits
            );
        }
    }

    #[test]
    fn test_clause_creation() {
        let clause = Clause::new(vec![1, -2, 3]);
        assert_eq!(clause.literals, vec![1, -2, 3]);
        assert!(!clause.is_empty());
        assert!(!clause.is_unit());

        let unit_clause = Clause::unit(5);
        assert!(unit_clause.is_unit());
        assert_eq!(unit_clause.literals, vec![5]);
    }

    #[test]
    fn test_activation_is_single_implication() {
        let constraint = LinearExpr::new().plus(1).minus(2).at_least(0, ConstraintKind::Activation);
        // s1 - t1 >= 0 becomes (s1 or not t1)
        let clauses = translate(&constraint).unwrap();
        assert_eq!(clauses, vec![Clause::binary(1, -2)]);
    }

    #[test]
    fn test_model_constraint_shapes() {
        let vars = [1, 2, 3, 4, 5];
        let forced_high = LinearExpr::new()
            .plus(1)
            .plus(2)
            .plus(3)
            .plus(4)
            .minus(5)
            .at_least(0, ConstraintKind::FeedForcedHigh);
        assert_equivalent(&forced_high, &vars);

        let fan_in = LinearExpr::new()
            .plus(1)
            .plus(2)
            .plus(3)
            .plus(4)
            .at_most(2, ConstraintKind::FanIn);
        assert_equivalent(&fan_in, &vars[..4]);
        assert_eq!(translate(&fan_in).unwrap().len(), 4);

        let pinned = LinearExpr::new().plus(3).equal_to(1, ConstraintKind::Target);
        assert_eq!(translate(&pinned).unwrap(), vec![Clause::unit(3)]);
    }

    #[test]
    fn test_weighted_and_mixed_signs() {
        let constraint = LinearExpr::new()
            .add(2, 1)
            .add(-3, 2)
            .plus(3)
            .at_most(1, ConstraintKind::Exclusion);
        assert_equivalent(&constraint, &[1, 2, 3]);

        let equality = LinearExpr::new().plus(1).plus(2).minus(3).equal_to(1, ConstraintKind::Target);
        assert_equivalent(&equality, &[1, 2, 3]);
    }

    #[test]
    fn test_blocking_cut() {
        let cut = LinearExpr::new().plus(4).plus(6).at_least(1, ConstraintKind::BlockingCut);
        assert_eq!(translate(&cut).unwrap(), vec![Clause::new(vec![4, 6])]);

        let empty = LinearExpr::new().at_least(1, ConstraintKind::BlockingCut);
        let clauses = translate(&empty).unwrap();
        assert_eq!(clauses.len(), 1);
        assert!(clauses[0].is_empty());
    }

    #[test]
    fn test_trivial_constraint_has_no_clauses() {
        let constraint = LinearExpr::new().plus(1).plus(2).at_most(2, ConstraintKind::FanIn);
        assert!(translate(&constraint).unwrap().is_empty());
    }

    #[test]
    fn test_arity_limit_applies_to_weighted_constraints() {
        let expr = (1..=(MAX_TRANSLATION_ARITY as i32 + 1))
            .fold(LinearExpr::new().add(2, 100), |e, v| e.plus(v));
        let err = translate(&expr.at_most(3, ConstraintKind::FanIn)).unwrap_err();
        assert_eq!(err.kind, crate::error::SolverErrorKind::Model);
    }

    #[test]
    fn test_wide_cut_is_one_clause() {
        let vars: Vec<i32> = (1..=24).collect();
        let expr = vars.iter().fold(LinearExpr::new(), |e, &v| e.plus(v));
        let clauses = translate(&expr.at_least(1, ConstraintKind::BlockingCut)).unwrap();
        assert_eq!(clauses, vec![Clause::new(vars)]);
    }

    #[test]
    fn test_uniform_weights_use_fixed_size_subsets() {
        let at_most_one = (1..=20).fold(LinearExpr::new(), |e, v| e.plus(v)).at_most(1, ConstraintKind::FanIn);
        let clauses = translate(&at_most_one).unwrap();
        assert_eq!(clauses.len(), 190);
        assert!(clauses.iter().all(|c| c.literals.len() == 2 && c.literals.iter().all(|&l| l < 0)));

        let doubled = LinearExpr::new().add(2, 1).add(2, 2).add(2, 3).at_most(3, ConstraintKind::FanIn);
        assert_equivalent(&doubled, &[1, 2, 3]);
    }

    #[test]
    fn test_unary_counter_bounds() {
        let inputs = [1, 2, 3, 4];
        let mut next_var = 5;
        let (counter, clauses) = UnaryCounter::encode(&inputs, &mut next_var);
        let aux: Vec<i32> = (5..next_var).collect();
        assert_eq!(aux.len(), 10);
        assert_eq!(counter.at_most(4), None);

        for k in 0..4 {
            let assumption = counter.at_most(k).unwrap();
            for input_bits in 0..16u32 {
                let true_inputs = input_bits.count_ones() as usize;
                let satisfiable = (0..(1u32 << aux.len())).any(|aux_bits| {
                    let mut assignment = assignment_from_bits(&inputs, input_bits);
                    assignment.extend(assignment_from_bits(&aux, aux_bits));
                    let mut all = clauses.clone();
                    all.push(Clause::unit(assumption));
                    clauses_hold(&all, &assignment)
                });
                assert_eq!(satisfiable, true_inputs <= k, "k={} inputs={:04b}", k, input_bits);
            }
        }
    }
}
