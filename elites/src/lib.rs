//! Map-Elites: A Quality Diversity Algorithm Implementation
//!
//! This crate keeps one elite per cell of a discretized feature space and
//! improves the archive by repeatedly selecting an elite, mutating it and
//! offering the offspring back. Feature dimensions compare a measured value
//! with a target, so candidates that violate a constraint are still placed,
//! binned by how far they miss it.
//!
//! # Example
//! ```
//! use elites::{ConfigError, FeatureDimension, Genome, MapElites, MapElitesConfig, MapElitesProblem, Relation};
//! use rand::Rng;
//!
//! // Minimize x^2 + y^2 while keeping x + y >= 1
//! struct MyProblem;
//!
//! impl MapElitesProblem for MyProblem {
//!     fn performance_measure(&self, genome: &[f64]) -> f64 {
//!         genome.iter().map(|x| x.powi(2)).sum()
//!     }
//!
//!     fn generate_random_solution<R: Rng + ?Sized>(&self, rng: &mut R) -> Genome {
//!         (0..2).map(|_| rng.gen_range(-2.0..2.0)).collect()
//!     }
//!
//!     fn generate_feature_dimensions(&self) -> Result<Vec<FeatureDimension>, ConfigError> {
//!         Ok(vec![FeatureDimension::new(
//!             "x + y >= 1",
//!             |_: &[f64]| 1.0,
//!             |x: &[f64]| x[0] + x[1],
//!             Relation::GreaterOrEqual,
//!             vec![0.0, 0.1, 0.5, 1.0, f64::INFINITY],
//!         )?])
//!     }
//! }
//!
//! let config = MapElitesConfig {
//!     iterations: 1000,
//!     seed: Some(7),
//!     ..Default::default()
//! };
//! let mut map_elites = MapElites::with_config(MyProblem, config).unwrap();
//! let report = map_elites.run().unwrap();
//! assert!(report.statistics.num_solutions > 0);
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod events;
pub mod feature;
pub mod map_elites;
pub mod operators;
pub mod persist;
pub mod plot;
pub mod selector;

use rand::Rng;

pub use archive::{Archive, Elite, Grid, Objective, Placement};
pub use config::{MapElitesConfig, OutputConfig};
pub use error::{ConfigError, MapElitesError, Result};
pub use events::{Event, EventSink, LogFile, TracingSink};
pub use feature::{FeatureDimension, Relation};
pub use map_elites::{MapElites, RunReport, Statistics};
pub use operators::{Crossover, Mutation};
pub use persist::RunDirectory;
pub use selector::Selector;

/// A candidate solution.
pub type Genome = Vec<f64>;

/// The customization surface of a MAP-Elites run.
///
/// Implementors supply the performance measure, the random solutions used
/// for seeding and the feature dimensions spanning the archive. Mapping a
/// genome to its cell delegates to the feature dimensions unless overridden.
pub trait MapElitesProblem {
    /// Performance of `genome`; lower is better when minimizing.
    fn performance_measure(&self, genome: &[f64]) -> f64;

    fn generate_random_solution<R: Rng + ?Sized>(&self, rng: &mut R) -> Genome;

    /// Called once, when the orchestrator is built. An error here aborts the
    /// run before any evaluation.
    fn generate_feature_dimensions(&self) -> std::result::Result<Vec<FeatureDimension>, ConfigError>;

    /// Cell coordinates of `genome`, one bin index per dimension.
    fn map_x_to_b(&self, genome: &[f64], dimensions: &[FeatureDimension]) -> Result<Vec<usize>> {
        feature::map_to_cell(dimensions, genome)
    }

    /// Checked before every iteration; returning true ends the run early.
    fn stopping_criteria(&self, _statistics: &Statistics) -> bool {
        false
    }
}
