//! Display and output formatting utilities

use crate::circuit::{describe_gate, format_pattern, Topology};
use crate::config::OutputFormat;
use crate::synthesis::{EnumerationReport, Solution, StopReason};
use anyhow::Result;
use std::path::Path;

/// Format solutions for display
pub struct SolutionFormatter;

impl SolutionFormatter {
    /// The per-solution report block
    pub fn format_solution(solution: &Solution) -> String {
        let mut output = String::new();

        output.push_str(&format!("Solution {}:\n", solution.index));
        output.push_str(&format!("Solution status: {}\n", solution.status));
        output.push_str(&format!("Minimum number of gates: {}\n", solution.objective_value));
        for (gate, assignment) in solution.gates.iter().enumerate() {
            output.push_str(&format!(
                "Gate {} is used: {}\n",
                gate + 1,
                u8::from(assignment.used)
            ));
        }

        output
    }

    /// Closing line after all solutions
    pub fn format_total(total: usize) -> String {
        if total == 0 {
            "No feasible solution found.".to_string()
        } else {
            format!("Total number of solutions: {}", total)
        }
    }

    /// Every solution block followed by the closing line
    pub fn format_report(report: &EnumerationReport) -> String {
        let mut output = String::new();
        for solution in &report.solutions {
            output.push_str(&Self::format_solution(solution));
        }
        output.push_str(&Self::format_total(report.total()));
        output.push('\n');
        output
    }

    /// Warning for runs cut short by a limit; `None` otherwise
    pub fn format_stop_notice(report: &EnumerationReport) -> Option<String> {
        match report.stop_reason {
            StopReason::SolutionLimit => Some(format!(
                "Stopped at the solution limit after {} solutions; more may exist",
                report.total()
            )),
            StopReason::IterationGuard => Some(format!(
                "Stopped after {} solutions, the most the gate count allows",
                report.total()
            )),
            StopReason::Exhausted | StopReason::SolverFailure => None,
        }
    }

    /// Gate expressions and output patterns of one solution
    pub fn format_network(solution: &Solution, topology: &Topology) -> String {
        let wiring = solution.wiring();
        let mut output = String::new();

        for (gate, assignment) in solution.gates.iter().enumerate() {
            if !assignment.used {
                continue;
            }
            output.push_str(&format!(
                "  {:<24} {}\n",
                describe_gate(gate, &wiring, topology),
                format_pattern(&assignment.row_outputs)
            ));
        }

        output
    }

    /// One line per solution
    pub fn format_solution_summary(solutions: &[Solution]) -> String {
        let mut output = String::new();

        output.push_str("Solutions Summary:\n");
        output.push_str("#    | Gates | Status   | Used\n");
        output.push_str("-----|-------|----------|--------\n");

        for solution in solutions {
            let used = format_pattern(&solution.used_vector());
            output.push_str(&format!(
                "{:4} | {:5} | {:8} | {}\n",
                solution.index,
                solution.objective_value,
                solution.status.to_string(),
                used
            ));
        }

        output
    }

    /// Save the catalog to `output_dir` in the requested format
    pub fn save_solutions<P: AsRef<Path>>(
        report: &EnumerationReport,
        output_dir: P,
        format: OutputFormat,
    ) -> Result<()> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        match format {
            OutputFormat::Text => {
                let filepath = output_dir.join("solutions.txt");
                std::fs::write(filepath, Self::format_report(report))?;
            }
            OutputFormat::Json => {
                for solution in &report.solutions {
                    let filename = format!("solution_{:03}.json", solution.index);
                    std::fs::write(output_dir.join(filename), solution.to_json()?)?;
                }

                report
                    .summary()
                    .save_to_file(output_dir.join("solutions_summary.json"))?;
            }
        }

        Ok(())
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    /// Check if terminal supports color
    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err()
            && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    /// Format success message
    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    /// Format error message
    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    /// Format warning message
    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    /// Format info message
    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}
