//! Error types for model construction and solver failures

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Defects in the problem configuration, rejected before any solve
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("gate count must be positive")]
    NoGates,

    #[error("truth table has no rows")]
    NoRows,

    #[error("target vector has {actual} entries but the truth table has {expected} rows")]
    TargetLength { expected: usize, actual: usize },

    #[error("feed link {link} references gate {gate}, but only {gate_count} gates exist")]
    GateOutOfRange {
        link: usize,
        gate: usize,
        gate_count: usize,
    },

    #[error("feed link {link} does not name three distinct gates")]
    DegenerateLink { link: usize },

    #[error("gate {gate} is the parent of more than one feed link")]
    DuplicateParent { gate: usize },

    #[error("feed links form a cycle through gate {gate}")]
    Cycle { gate: usize },

    #[error("gate {gate} out of bounds (gate count: {gate_count})")]
    UnknownGate { gate: usize, gate_count: usize },

    #[error("row {row} out of bounds (row count: {row_count})")]
    UnknownRow { row: usize, row_count: usize },
}

/// Category of a solver-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverErrorKind {
    /// The engine stopped without deciding satisfiability
    Interrupted,
    /// The constraint system handed to the adapter cannot be loaded
    Model,
    /// The engine answered, but the answer is unusable
    Engine,
}

impl fmt::Display for SolverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverErrorKind::Interrupted => "interrupted",
            SolverErrorKind::Model => "model",
            SolverErrorKind::Engine => "engine",
        };
        f.write_str(name)
    }
}

/// A failure raised by a solver adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("solver {kind} failure: {message}")]
pub struct SolverError {
    pub kind: SolverErrorKind,
    pub message: String,
}

impl SolverError {
    pub fn new(kind: SolverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn interrupted(message: impl Into<String>) -> Self {
        Self::new(SolverErrorKind::Interrupted, message)
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::new(SolverErrorKind::Model, message)
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self::new(SolverErrorKind::Engine, message)
    }
}
