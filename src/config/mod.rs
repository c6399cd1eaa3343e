//! Configuration management for the gate network synthesizer

pub mod settings;

pub use settings::{
    CliOverrides, OutputConfig, OutputFormat, ProblemConfig, Settings, SolverConfig, ROOT_GATE,
};
