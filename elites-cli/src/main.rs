//! Command-line runner for constrained MAP-Elites benchmarks.
//!
//! Usage:
//!   elites-cli --config config.toml [-v...]
//!
//! The configuration file holds a `[mapelites]` table (the run settings) and
//! a `[problem]` table naming the benchmark function and, optionally, the bin
//! edges of each of its constraints.

mod functions;
mod problem;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use elites::{MapElites, OutputConfig, RunReport};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use functions::Benchmark;
use problem::{ConstrainedProblem, RunConfig};

/// Name under which the input configuration is copied into the run directory.
const INPUT_CONFIG_FILE: &str = "config.toml";

#[derive(Parser, Debug)]
#[command(name = "elites-cli", version, about = "Run MAP-Elites on a constrained benchmark function")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Override the benchmark function
    #[arg(short, long, value_enum)]
    function: Option<Benchmark>,

    /// Override the number of iterations
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Override the random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write results under this directory
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(function) = self.function {
            if function != config.problem.function && config.problem.bins.take().is_some() {
                // explicit bins belong to the configured function's constraints
                debug!(%function, "dropping configured bins for the overriding function");
            }
            config.problem.function = function;
        }
        if let Some(iterations) = self.iterations {
            config.mapelites.iterations = iterations;
        }
        if let Some(seed) = self.seed {
            config.mapelites.seed = Some(seed);
        }
        if let Some(output) = &self.output {
            config.mapelites.output.get_or_insert_with(OutputConfig::default).directory = output.clone();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = RunConfig::load(&cli.config)?;
    cli.apply(&mut config);
    info!(
        config = %cli.config.display(),
        function = %config.problem.function,
        iterations = config.mapelites.iterations,
        seed = ?config.mapelites.seed,
        "Configuration loaded"
    );

    let problem = ConstrainedProblem::new(config.problem.function, config.problem.bins.clone())
        .context("Failed to build the benchmark problem")?;
    let function = problem.function();

    let mut map_elites =
        MapElites::with_config(problem, config.mapelites).context("Failed to configure MAP-Elites")?;
    let report = map_elites.run().context("MAP-Elites run failed")?;

    save_input_config(&report, &cli.config)?;

    print_summary(function, &map_elites, &report);
    Ok(())
}

/// Copy the file the run was started from into its run directory, if any.
fn save_input_config(report: &RunReport, source: &Path) -> Result<Option<PathBuf>> {
    let Some(directory) = &report.run_directory else {
        debug!("no output directory configured, input configuration not copied");
        return Ok(None);
    };

    let path = directory
        .copy_in(source, INPUT_CONFIG_FILE)
        .context("Failed to copy the configuration into the run directory")?;
    info!(path = %path.display(), "Input configuration saved");
    Ok(Some(path))
}

fn print_summary(function: Benchmark, map_elites: &MapElites<ConstrainedProblem>, report: &RunReport) {
    let stats = &report.statistics;

    println!("Function:    {function}");
    println!("Iterations:  {}", stats.iterations);
    println!(
        "Solutions:   {} of {} cells ({:.1}%)",
        stats.num_solutions,
        map_elites.archive().capacity(),
        stats.coverage * 100.0
    );
    println!("Improvements: {}, rejections: {}", stats.improvements, stats.rejections);

    match map_elites.archive().best() {
        Some((cell, elite)) => println!("Best:        {:?} at {cell:?} with perf {}", elite.genome, elite.performance),
        None => println!("Best:        none"),
    }

    // the all-zero cell holds candidates satisfying every constraint
    let feasible = vec![0; map_elites.dimensions().len()];
    if let Ok(Some(elite)) = map_elites.archive().get(&feasible) {
        println!("Feasible:    {:?} with perf {}", elite.genome, elite.performance);
    }

    if let Some(directory) = &report.run_directory {
        println!("Results:     {}", directory.path().display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elites::persist;

    fn write_config(dir: &std::path::Path, output: &std::path::Path) -> PathBuf {
        let path = dir.join("config.toml");
        let content = format!(
            r#"
[mapelites]
iterations = 100
initial_population = 40
seed = 5
log_interval = 0

[mapelites.output]
directory = "{}"
heatmap = true

[problem]
function = "rosenbrock_cubic_line"
"#,
            output.display()
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn flags_override_file_settings() {
        let cli = Cli::parse_from([
            "elites-cli",
            "--config",
            "run.toml",
            "--function",
            "townsend",
            "--iterations",
            "7",
            "--seed",
            "3",
            "--output",
            "out",
        ]);
        let mut config = RunConfig::from_toml_str(
            "[problem]\nfunction = \"rosenbrock_disk\"\nbins = [[0.0, 1.0, inf]]\n",
        )
        .unwrap();

        cli.apply(&mut config);

        assert_eq!(config.problem.function, Benchmark::Townsend);
        assert!(config.problem.bins.is_none());
        assert_eq!(config.mapelites.iterations, 7);
        assert_eq!(config.mapelites.seed, Some(3));
        assert_eq!(config.mapelites.output.unwrap().directory, PathBuf::from("out"));
    }

    #[test]
    fn oversized_seed_override_fails_before_running() {
        let cli = Cli::parse_from(["elites-cli", "--seed", "18446744073709551615"]);
        let mut config = RunConfig::from_toml_str("[problem]\nfunction = \"simionescu\"\n").unwrap();
        cli.apply(&mut config);

        let problem = ConstrainedProblem::new(config.problem.function, None).unwrap();
        assert!(MapElites::with_config(problem, config.mapelites).is_err());
    }

    #[test]
    fn input_config_is_not_copied_without_output() {
        let config = RunConfig::from_toml_str(
            "[mapelites]\niterations = 1\ninitial_population = 5\nseed = 1\n\n[problem]\nfunction = \"townsend\"\n",
        )
        .unwrap();
        let problem = ConstrainedProblem::new(config.problem.function, None).unwrap();
        let report = MapElites::with_config(problem, config.mapelites).unwrap().run().unwrap();

        assert!(save_input_config(&report, Path::new("unused.toml")).unwrap().is_none());
    }

    #[test]
    fn run_writes_artifacts_and_input_copy() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("logs");
        let path = write_config(dir.path(), &output);

        let config = RunConfig::load(&path).unwrap();
        let problem = ConstrainedProblem::new(config.problem.function, config.problem.bins.clone()).unwrap();
        let mut map_elites = MapElites::with_config(problem, config.mapelites).unwrap();
        let report = map_elites.run().unwrap();

        let directory = report.run_directory.as_ref().unwrap();
        let copied = save_input_config(&report, &path).unwrap().unwrap();
        assert_eq!(copied, directory.join(INPUT_CONFIG_FILE));
        assert_eq!(std::fs::read_to_string(&copied).unwrap(), std::fs::read_to_string(&path).unwrap());

        assert!(directory.path().starts_with(&output));
        for file in [
            persist::PERFORMANCES_FILE,
            persist::SOLUTIONS_FILE,
            persist::CONFIG_FILE,
            persist::LOG_FILE,
            persist::HEATMAP_FILE,
            INPUT_CONFIG_FILE,
        ] {
            assert!(directory.join(file).is_file(), "missing {file}");
        }
        assert_eq!(report.statistics.iterations, 100);
    }
}
