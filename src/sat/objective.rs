//! Minimization objective and the root gate's target constraints

use super::constraints::{ConstraintKind, LinearConstraint, LinearExpr};
use super::VariableManager;
use crate::error::ModelError;
use std::collections::HashMap;

/// Minimize the number of true variables among `terms`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    terms: Vec<i32>,
}

impl Objective {
    /// Count of gates in use
    pub fn gate_count(variables: &VariableManager) -> Self {
        Self {
            terms: variables.used_variables(),
        }
    }

    pub fn terms(&self) -> &[i32] {
        &self.terms
    }

    /// Largest value the objective can take
    pub fn upper_bound(&self) -> usize {
        self.terms.len()
    }

    /// Objective value of an assignment
    pub fn value(&self, assignment: &HashMap<i32, bool>) -> usize {
        self.terms
            .iter()
            .filter(|var| assignment.get(var).copied().unwrap_or(false))
            .count()
    }
}

/// Pin `root`'s outputs to `target` and require the root to be used
pub fn target_constraints(
    variables: &VariableManager,
    root: usize,
    target: &[bool],
) -> Result<Vec<LinearConstraint>, ModelError> {
    if target.len() != variables.row_count() {
        return Err(ModelError::TargetLength {
            expected: variables.row_count(),
            actual: target.len(),
        });
    }

    let mut constraints = Vec::with_capacity(target.len() + 1);
    for (row, &bit) in target.iter().enumerate() {
        constraints.push(
            LinearExpr::new()
                .plus(variables.row_output(root, row)?)
                .equal_to(i64::from(bit), ConstraintKind::Target),
        );
    }

    constraints.push(
        LinearExpr::new()
            .plus(variables.used(root)?)
            .at_least(1, ConstraintKind::RootUsed),
    );

    Ok(constraints)
}
