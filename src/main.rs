//! Command line front end for the gate network synthesizer

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gate_synth::{
    config::{CliOverrides, OutputFormat, Settings},
    synthesis::{EnumerationSummary, SynthesisProblem},
    utils::{ColorOutput, SolutionFormatter},
};
use std::path::{Path, PathBuf};
use std::time::Instant;

const DEFAULT_CONFIG: &str = "config/default.yaml";

#[derive(Parser)]
#[command(name = "gate_synth")]
#[command(about = "Minimal NOR gate network synthesis by SAT enumeration")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate minimal networks for the configured truth table
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,

        /// Maximum solutions to find (overrides config)
        #[arg(short, long)]
        max_solutions: Option<usize>,

        /// Output format for saved solutions (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Create example configuration files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Re-check a saved JSON catalog against the model
    Validate {
        /// Configuration file path
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,

        /// Summary file written by `solve --format json`
        #[arg(short, long)]
        solutions: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Some(Commands::Solve { verbose: true, .. }));
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();

    match cli.command {
        Some(Commands::Solve {
            config,
            max_solutions,
            format,
            output,
            verbose,
        }) => {
            let overrides = CliOverrides {
                max_solutions,
                format,
                output_dir: output,
            };
            solve_command(&config, &overrides, verbose)
        }
        Some(Commands::Setup { directory, force }) => setup_command(&directory, force),
        Some(Commands::Validate { config, solutions }) => validate_command(&config, &solutions),
        None => solve_command(Path::new(DEFAULT_CONFIG), &CliOverrides::default(), false),
    }
}

/// Settings from `config_path`, or the compiled-in instance when it is absent
fn load_settings(config_path: &Path) -> Result<Settings> {
    if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        log::info!("config file {} not found, using defaults", config_path.display());
        Ok(Settings::default())
    }
}

fn solve_command(config_path: &Path, overrides: &CliOverrides, verbose: bool) -> Result<()> {
    let mut settings = load_settings(config_path)?;
    settings.merge_with_cli(overrides);

    let start_time = Instant::now();
    let problem = SynthesisProblem::new(settings.clone()).context("Failed to build synthesis problem")?;

    if verbose {
        println!("{}", ColorOutput::info("Starting gate network synthesis"));
        println!("{}", problem.encoding_statistics());
        println!("{}", problem.model().variables.statistics());
        println!("{}", problem.model().system.statistics());
    }

    let report = problem.enumerate();
    print!("{}", SolutionFormatter::format_report(&report));

    if verbose {
        for solution in &report.solutions {
            println!("\nNetwork {}:", solution.index);
            print!(
                "{}",
                SolutionFormatter::format_network(solution, &problem.model().topology)
            );
        }
        println!("\n{}", SolutionFormatter::format_solution_summary(&report.solutions));
        println!(
            "{}",
            ColorOutput::success(&format!(
                "Finished in {:.3}s ({:?})",
                start_time.elapsed().as_secs_f64(),
                report.stop_reason
            ))
        );
    }

    if let Some(output_dir) = &settings.output.output_directory {
        SolutionFormatter::save_solutions(&report, output_dir, settings.output.format)
            .context("Failed to save solutions")?;
        if verbose {
            println!("Solutions saved to {}", output_dir.display());
        }
    }

    if let Some(notice) = SolutionFormatter::format_stop_notice(&report) {
        eprintln!("{}", ColorOutput::warning(&notice));
    }

    // The partial catalog has been reported; the error follows it
    if let Some(error) = &report.failure {
        eprintln!("{}", ColorOutput::error(&format!("Error: {}", error)));
    }

    Ok(())
}

fn setup_command(directory: &Path, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up configuration files..."));

    let config_dir = directory.join("config");
    let examples_dir = config_dir.join("examples");
    std::fs::create_dir_all(&examples_dir)
        .with_context(|| format!("Failed to create directory {}", examples_dir.display()))?;

    let default_settings = Settings::default();

    // Root as a lone leaf cannot produce XOR
    let mut infeasible = Settings::default();
    infeasible.problem.feed_links.clear();

    let files = [
        (config_dir.join("default.yaml"), default_settings),
        (examples_dir.join("infeasible.yaml"), infeasible),
    ];
    for (path, settings) in &files {
        if path.exists() && !force {
            println!("Skipped: {} (already exists)", path.display());
            continue;
        }
        settings
            .to_file(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        println!("Created: {}", path.display());
    }

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit the truth table and topology in {}", config_dir.display());
    println!("2. Run: gate_synth solve --config config/default.yaml");

    Ok(())
}

fn validate_command(config_path: &Path, solutions_path: &Path) -> Result<()> {
    println!("{}", ColorOutput::info("Validating saved solutions..."));

    let settings = load_settings(config_path)?;
    let summary = EnumerationSummary::load_from_file(solutions_path)
        .with_context(|| format!("Failed to load solutions from {}", solutions_path.display()))?;

    let problem = SynthesisProblem::new(settings).context("Failed to build synthesis problem")?;
    let catalog = problem.validator().validate_catalog(&summary.solutions);

    for (solution, result) in summary.solutions.iter().zip(&catalog.results) {
        if result.is_valid {
            println!("Solution {}: valid", solution.index);
        } else {
            println!("Solution {}: invalid", solution.index);
            for violation in &result.violations {
                println!("  {}", violation);
            }
        }
    }
    for (first, second) in &catalog.duplicate_used_vectors {
        println!("Solutions {} and {} share a gate usage pattern", first, second);
    }
    for index in &catalog.below_first_objective {
        println!("Solution {} uses fewer gates than the first solution", index);
    }

    if catalog.is_valid() {
        println!(
            "{}",
            ColorOutput::success(&format!("All {} solutions are valid", summary.solutions.len()))
        );
    } else {
        println!(
            "{}",
            ColorOutput::error(&format!(
                "{} of {} solutions are invalid",
                catalog.invalid_count(),
                summary.solutions.len()
            ))
        );
    }

    Ok(())
}
