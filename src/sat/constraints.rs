//! Linear 0/1 constraints and their generation for gate networks

use super::VariableManager;
use crate::circuit::{Channel, FeedLink, Row, Topology};
use crate::error::ModelError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Which family of the model a constraint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    /// A selector may only be set on a used gate
    Activation,
    /// A row output may only be asserted on a used gate
    OutputContainment,
    /// An asserted selected external signal forces the output low
    Exclusion,
    /// A used leaf with no asserted input outputs 1
    ForcedHigh,
    /// A child and its parent never both assert a row
    FeedExclusion,
    /// A used parent with no asserted input or child outputs 1
    FeedForcedHigh,
    /// A parent has at most two live sources
    FanIn,
    /// Root output pinned to the target table
    Target,
    /// Root gate must be used
    RootUsed,
    /// Excludes a previously found usage pattern
    BlockingCut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::LessEq => "<=",
            Relation::GreaterEq => ">=",
            Relation::Equal => "=",
        })
    }
}

/// Weighted sum of boolean variables; constant factors are folded into the
/// coefficients and zero terms are dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: BTreeMap<i32, i64>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `coefficient * var`
    pub fn add(mut self, coefficient: i64, var: i32) -> Self {
        let entry = self.terms.entry(var).or_insert(0);
        *entry += coefficient;
        if *entry == 0 {
            self.terms.remove(&var);
        }
        self
    }

    pub fn plus(self, var: i32) -> Self {
        self.add(1, var)
    }

    pub fn minus(self, var: i32) -> Self {
        self.add(-1, var)
    }

    /// `(coefficient, var)` pairs ordered by variable
    pub fn terms(&self) -> impl Iterator<Item = (i64, i32)> + '_ {
        self.terms.iter().map(|(&var, &coefficient)| (coefficient, var))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value under an assignment; unassigned variables count as false
    pub fn evaluate(&self, assignment: &HashMap<i32, bool>) -> i64 {
        self.terms()
            .filter(|&(_, var)| assignment.get(&var).copied().unwrap_or(false))
            .map(|(coefficient, _)| coefficient)
            .sum()
    }

    pub fn at_most(self, rhs: i64, kind: ConstraintKind) -> LinearConstraint {
        LinearConstraint::new(self, Relation::LessEq, rhs, kind)
    }

    pub fn at_least(self, rhs: i64, kind: ConstraintKind) -> LinearConstraint {
        LinearConstraint::new(self, Relation::GreaterEq, rhs, kind)
    }

    pub fn equal_to(self, rhs: i64, kind: ConstraintKind) -> LinearConstraint {
        LinearConstraint::new(self, Relation::Equal, rhs, kind)
    }
}

/// `expr (<= | >= | =) rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: i64,
    pub kind: ConstraintKind,
}

impl LinearConstraint {
    pub fn new(expr: LinearExpr, relation: Relation, rhs: i64, kind: ConstraintKind) -> Self {
        Self {
            expr,
            relation,
            rhs,
            kind,
        }
    }

    pub fn is_satisfied_by(&self, assignment: &HashMap<i32, bool>) -> bool {
        let lhs = self.expr.evaluate(assignment);
        match self.relation {
            Relation::LessEq => lhs <= self.rhs,
            Relation::GreaterEq => lhs >= self.rhs,
            Relation::Equal => lhs == self.rhs,
        }
    }

    /// Render with readable variable names
    pub fn display_with(&self, variables: &VariableManager) -> String {
        let mut out = String::new();
        for (i, (coefficient, var)) in self.expr.terms().enumerate() {
            let sign = if coefficient < 0 { "-" } else { "+" };
            if i == 0 {
                if coefficient < 0 {
                    out.push('-');
                }
            } else {
                out.push_str(&format!(" {} ", sign));
            }
            if coefficient.abs() != 1 {
                out.push_str(&format!("{}*", coefficient.abs()));
            }
            out.push_str(&variables.name(var));
        }
        if out.is_empty() {
            out.push('0');
        }
        format!("{} {} {}", out, self.relation, self.rhs)
    }
}

/// Ordered, append-only collection of linear constraints
#[derive(Debug, Clone, Default)]
pub struct ConstraintSystem {
    constraints: Vec<LinearConstraint>,
    variable_count: usize,
}

impl ConstraintSystem {
    pub fn new(variable_count: usize) -> Self {
        Self {
            constraints: Vec::new(),
            variable_count,
        }
    }

    pub fn push(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    pub fn extend<I: IntoIterator<Item = LinearConstraint>>(&mut self, constraints: I) {
        self.constraints.extend(constraints);
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Constraints appended at or after position `start`
    pub fn since(&self, start: usize) -> &[LinearConstraint] {
        &self.constraints[start.min(self.constraints.len())..]
    }

    /// Number of model variables the constraints range over
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Every constraint the assignment violates
    pub fn violations<'a>(&'a self, assignment: &HashMap<i32, bool>) -> Vec<&'a LinearConstraint> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied_by(assignment))
            .collect()
    }

    pub fn count_of(&self, kind: ConstraintKind) -> usize {
        self.constraints.iter().filter(|c| c.kind == kind).count()
    }

    pub fn statistics(&self) -> ConstraintStatistics {
        let mut by_kind: BTreeMap<ConstraintKind, usize> = BTreeMap::new();
        for constraint in &self.constraints {
            *by_kind.entry(constraint.kind).or_insert(0) += 1;
        }
        ConstraintStatistics {
            total_constraints: self.constraints.len(),
            total_variables: self.variable_count,
            by_kind: by_kind.into_iter().collect(),
        }
    }
}

/// Generates the structural constraints for every gate and feed link
pub struct ConstraintGenerator<'a> {
    variables: &'a VariableManager,
    rows: &'a [Row],
    topology: &'a Topology,
}

impl<'a> ConstraintGenerator<'a> {
    pub fn new(variables: &'a VariableManager, rows: &'a [Row], topology: &'a Topology) -> Self {
        Self {
            variables,
            rows,
            topology,
        }
    }

    /// Generate all structural constraints
    pub fn generate_all_constraints(&self) -> Result<Vec<LinearConstraint>, ModelError> {
        let mut constraints = Vec::new();

        for gate in 0..self.topology.gate_count() {
            constraints.extend(self.generate_gate_constraints(gate)?);
        }

        for link in self.topology.links() {
            constraints.extend(self.generate_feed_constraints(link)?);
        }

        Ok(constraints)
    }

    /// Activation, containment, exclusion and (for leaves) forced-high
    fn generate_gate_constraints(&self, gate: usize) -> Result<Vec<LinearConstraint>, ModelError> {
        let mut constraints = Vec::new();
        let vars = self.variables.gate(gate)?;

        for channel in Channel::ALL {
            constraints.push(
                LinearExpr::new()
                    .plus(vars.used)
                    .minus(vars.selector(channel))
                    .at_least(0, ConstraintKind::Activation),
            );
        }

        for (l, row) in self.rows.iter().enumerate() {
            let output = self.variables.row_output(gate, l)?;

            constraints.push(
                LinearExpr::new()
                    .plus(vars.used)
                    .minus(output)
                    .at_least(0, ConstraintKind::OutputContainment),
            );

            for channel in Channel::ALL {
                constraints.push(
                    LinearExpr::new()
                        .add(row.coefficient(channel), vars.selector(channel))
                        .plus(output)
                        .at_most(1, ConstraintKind::Exclusion),
                );
            }

            if self.topology.is_leaf(gate) {
                constraints.push(
                    self.external_inputs(gate, row)?
                        .plus(output)
                        .minus(vars.used)
                        .at_least(0, ConstraintKind::ForcedHigh),
                );
            }
        }

        Ok(constraints)
    }

    /// Exclusion against both children, extended forced-high, and fan-in
    fn generate_feed_constraints(&self, link: &FeedLink) -> Result<Vec<LinearConstraint>, ModelError> {
        let mut constraints = Vec::new();
        let parent = self.variables.gate(link.parent)?;

        for (l, row) in self.rows.iter().enumerate() {
            let parent_output = self.variables.row_output(link.parent, l)?;
            let mut forced = self.external_inputs(link.parent, row)?;

            for child in link.children() {
                let child_output = self.variables.row_output(child, l)?;
                constraints.push(
                    LinearExpr::new()
                        .plus(child_output)
                        .plus(parent_output)
                        .at_most(1, ConstraintKind::FeedExclusion),
                );
                forced = forced.plus(child_output);
            }

            constraints.push(
                forced
                    .plus(parent_output)
                    .minus(parent.used)
                    .at_least(0, ConstraintKind::FeedForcedHigh),
            );
        }

        constraints.push(
            LinearExpr::new()
                .plus(self.variables.used(link.left)?)
                .plus(self.variables.used(link.right)?)
                .plus(parent.selector1)
                .plus(parent.selector2)
                .at_most(2, ConstraintKind::FanIn),
        );

        Ok(constraints)
    }

    /// `ext1[l]*selector1 + ext2[l]*selector2` for a gate on a row
    fn external_inputs(&self, gate: usize, row: &Row) -> Result<LinearExpr, ModelError> {
        let mut expr = LinearExpr::new();
        for channel in Channel::ALL {
            expr = expr.add(row.coefficient(channel), self.variables.selector(gate, channel)?);
        }
        Ok(expr)
    }
}

/// Statistics about constraint generation
#[derive(Debug, Clone)]
pub struct ConstraintStatistics {
    pub total_constraints: usize,
    pub total_variables: usize,
    pub by_kind: Vec<(ConstraintKind, usize)>,
}

impl fmt::Display for ConstraintStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Constraint Statistics:")?;
        writeln!(f, "  Total constraints: {}", self.total_constraints)?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        for (kind, count) in &self.by_kind {
            writeln!(f, "  {:?}: {}", kind, count)?;
        }
        Ok(())
    }
}
