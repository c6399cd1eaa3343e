//! Solve/exclude enumeration of minimal gate networks

pub mod enumerator;
pub mod problem;
pub mod solution;
pub mod validator;

pub use enumerator::{blocking_cut, iteration_limit, EnumerationReport, SolutionEnumerator, StopReason};
pub use problem::SynthesisProblem;
pub use solution::{EnumerationSummary, GateAssignment, Solution};
pub use validator::{CatalogValidation, SolutionValidator, ValidationResult};
