//! Run configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::archive::Objective;
use crate::error::ConfigError;
use crate::operators::{Crossover, Mutation};

/// Where and how results are written at the end of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Parent of the timestamped run directories.
    pub directory: PathBuf,
    /// Render `heatmap.svg` for one- and two-dimensional archives.
    pub heatmap: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
            heatmap: true,
        }
    }
}

/// Configuration options for the MAP-Elites loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapElitesConfig {
    /// Number of select-mutate-place iterations after seeding
    pub iterations: usize,
    /// Minimize performance when true, maximize otherwise
    pub minimization: bool,
    /// Number of initial random solutions to generate
    pub initial_population: usize,
    /// Seed for the run's random number generator; entropy when absent
    pub seed: Option<u64>,
    /// Rejection draws per selected elite before falling back to a direct draw
    pub max_selection_attempts: usize,
    /// Progress is logged every `log_interval` iterations (0 disables it)
    pub log_interval: usize,
    pub mutation: Mutation,
    pub crossover: Crossover,
    pub output: Option<OutputConfig>,
}

impl Default for MapElitesConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            minimization: true,
            initial_population: 100,
            seed: None,
            max_selection_attempts: 10_000,
            log_interval: 100,
            mutation: Mutation::default(),
            crossover: Crossover::default(),
            output: None,
        }
    }
}

impl MapElitesConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mutation.validate()?;
        self.crossover.validate()?;
        if self.max_selection_attempts == 0 {
            return Err(ConfigError::NoSelectionAttempts);
        }
        // the snapshot written at the end of a run stores integers as i64
        if let Some(seed) = self.seed.filter(|&seed| i64::try_from(seed).is_err()) {
            return Err(ConfigError::SeedOutOfRange(seed));
        }
        Ok(())
    }

    pub fn objective(&self) -> Objective {
        Objective::from_minimization(self.minimization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_configuration() {
        let config = MapElitesConfig::from_toml_str(
            r#"
            iterations = 500
            minimization = false
            initial_population = 20
            seed = 7

            [mutation]
            type = "GAUSSIAN"
            mu = 0.0
            sigma = 0.1
            indpb = 0.3

            [crossover]
            type = "ONE_POINT"

            [output]
            directory = "runs"
            heatmap = false
            "#,
        )
        .unwrap();

        assert_eq!(config.iterations, 500);
        assert_eq!(config.objective(), Objective::Maximize);
        assert_eq!(config.initial_population, 20);
        assert_eq!(config.seed, Some(7));
        assert_eq!(
            config.mutation,
            Mutation::Gaussian {
                mu: 0.0,
                sigma: 0.1,
                indpb: 0.3
            }
        );
        assert_eq!(config.crossover, Crossover::OnePoint);
        assert_eq!(
            config.output,
            Some(OutputConfig {
                directory: PathBuf::from("runs"),
                heatmap: false
            })
        );
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = MapElitesConfig::from_toml_str("iterations = 3").unwrap();

        assert_eq!(config.iterations, 3);
        assert!(config.minimization);
        assert_eq!(config.mutation, Mutation::default());
        assert_eq!(config.output, None);
    }

    #[test]
    fn unknown_operator_is_a_parse_error() {
        let err = MapElitesConfig::from_toml_str(
            r#"
            [mutation]
            type = "POLYNOMIAL"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");

        let err = MapElitesConfig::from_toml_str(
            r#"
            [crossover]
            type = "BLEND"
            alpha = 0.5
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn invalid_parameters_fail_validation() {
        let err = MapElitesConfig::from_toml_str(
            r#"
            [mutation]
            type = "GAUSSIAN"
            mu = 0.0
            sigma = 0.1
            indpb = 2.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter { parameter: "indpb", .. }));

        let err = MapElitesConfig::from_toml_str("max_selection_attempts = 0").unwrap_err();
        assert!(matches!(err, ConfigError::NoSelectionAttempts));
    }

    #[test]
    fn misspelled_keys_are_rejected() {
        let err = MapElitesConfig::from_toml_str("initial_random_population = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");

        let err = MapElitesConfig::from_toml_str("[output]\ndir = \"runs\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn seeds_beyond_toml_integers_fail_validation() {
        let config = MapElitesConfig {
            seed: Some(u64::MAX),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::SeedOutOfRange(u64::MAX))));

        let config = MapElitesConfig {
            seed: Some(i64::MAX as u64),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.to_toml().is_ok());
    }

    #[test]
    fn snapshot_round_trips() {
        let config = MapElitesConfig {
            seed: Some(1),
            output: Some(OutputConfig::default()),
            ..Default::default()
        };

        let snapshot = config.to_toml().unwrap();
        assert_eq!(MapElitesConfig::from_toml_str(&snapshot).unwrap(), config);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = MapElitesConfig::load("/nonexistent/mapelites.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
