//! Configuration settings for the gate network synthesizer

use crate::circuit::{FeedLink, Row, Topology};
use crate::error::ModelError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The gate whose outputs are pinned to the target truth table
pub const ROOT_GATE: usize = 0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub problem: ProblemConfig,
    pub solver: SolverConfig,
    pub output: OutputConfig,
}

/// One synthesis instance: gate slots, truth table, topology and target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemConfig {
    pub gate_count: usize,
    pub rows: Vec<Row>,
    pub feed_links: Vec<FeedLink>,
    pub target: Vec<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Stop after this many solutions (unbounded when absent)
    pub max_solutions: Option<usize>,
    /// Minimize the gate count on every solve; otherwise accept any model
    pub prove_optimality: bool,
    /// Re-check every assignment against the linear constraints
    pub verify_solutions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub output_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for ProblemConfig {
    /// Seven gates arranged as a two-level binary tree under gate 0,
    /// synthesizing XOR
    fn default() -> Self {
        Self {
            gate_count: 7,
            rows: Row::full_table(),
            feed_links: vec![
                FeedLink::new(0, 2, 1),
                FeedLink::new(1, 4, 3),
                FeedLink::new(2, 6, 5),
            ],
            target: vec![false, true, true, false],
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_solutions: None,
            prove_optimality: true,
            verify_solutions: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            output_directory: None,
        }
    }
}

impl ProblemConfig {
    /// Reject configurations that cannot describe a consistent model
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.rows.is_empty() {
            return Err(ModelError::NoRows);
        }
        if self.target.len() != self.rows.len() {
            return Err(ModelError::TargetLength {
                expected: self.rows.len(),
                actual: self.target.len(),
            });
        }
        self.topology().map(|_| ())
    }

    /// Build the validated topology for this instance
    pub fn topology(&self) -> Result<Topology, ModelError> {
        Topology::new(self.gate_count, self.feed_links.clone())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        self.problem
            .validate()
            .context("Invalid problem configuration")?;

        if self.solver.max_solutions == Some(0) {
            anyhow::bail!("Maximum solutions must be positive");
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(max_solutions) = cli_overrides.max_solutions {
            self.solver.max_solutions = Some(max_solutions);
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = Some(output_dir.clone());
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub max_solutions: Option<usize>,
    pub format: Option<OutputFormat>,
    pub output_dir: Option<PathBuf>,
}
