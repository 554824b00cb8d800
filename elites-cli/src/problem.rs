//! Run configuration and the MAP-Elites problem built from a benchmark.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use elites::{ConfigError, FeatureDimension, Genome, MapElitesConfig, MapElitesProblem};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::functions::Benchmark;

/// Bin edges applied to every constraint without explicit bins.
pub const DEFAULT_BINS: [f64; 11] = [0.0, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, f64::INFINITY];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemConfig {
    pub function: Benchmark,
    /// Bin edges per constraint, in the benchmark's constraint order
    #[serde(default)]
    pub bins: Option<Vec<Vec<f64>>>,
}

/// Contents of the file passed with `--config`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub mapelites: MapElitesConfig,
    pub problem: ProblemConfig,
}

impl RunConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RunConfig = toml::from_str(content).context("Failed to parse run configuration")?;
        config.mapelites.validate().context("Invalid [mapelites] section")?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid configuration file {}", path.display()))
    }
}

/// A benchmark function whose constraints span the feature space.
#[derive(Debug)]
pub struct ConstrainedProblem {
    function: Benchmark,
    bins: Vec<Vec<f64>>,
}

impl ConstrainedProblem {
    pub fn new(function: Benchmark, bins: Option<Vec<Vec<f64>>>) -> Result<Self, ConfigError> {
        let constraints = function.constraints().len();
        let bins = match bins {
            Some(bins) if bins.len() != constraints => {
                return Err(ConfigError::InvalidBins {
                    name: function.to_string(),
                    reason: format!("expected {constraints} bin lists, got {}", bins.len()),
                })
            }
            Some(bins) => bins,
            None => vec![DEFAULT_BINS.to_vec(); constraints],
        };

        Ok(Self { function, bins })
    }

    pub fn function(&self) -> Benchmark {
        self.function
    }
}

impl MapElitesProblem for ConstrainedProblem {
    fn performance_measure(&self, genome: &[f64]) -> f64 {
        self.function.evaluate(genome)
    }

    fn generate_random_solution<R: Rng + ?Sized>(&self, rng: &mut R) -> Genome {
        self.function
            .bounds()
            .iter()
            .map(|&(low, high)| rng.gen_range(low..high))
            .collect()
    }

    fn generate_feature_dimensions(&self) -> Result<Vec<FeatureDimension>, ConfigError> {
        self.function
            .constraints()
            .into_iter()
            .zip(&self.bins)
            .map(|(constraint, bins)| {
                FeatureDimension::new(
                    constraint.name,
                    constraint.target,
                    constraint.measure,
                    constraint.relation,
                    bins.clone(),
                )
            })
            .collect()
    }
}
