//! SAT solving components: the 0/1 constraint model and its solver adapter

pub mod cnf;
pub mod constraints;
pub mod encoder;
pub mod objective;
pub mod solver;
pub mod variables;

pub use cnf::{translate, Clause, UnaryCounter};
pub use constraints::{
    ConstraintGenerator, ConstraintKind, ConstraintSystem, LinearConstraint, LinearExpr, Relation,
};
pub use encoder::{encode, EncodedModel, EncodingStatistics};
pub use objective::{target_constraints, Objective};
pub use solver::{CadicalAdapter, SatSolver, SolveOutcome, SolveStatus, SolverAdapter};
pub use variables::{GateVariables, VariableManager, VariableType};
