//! Variation operators applied to real-valued genomes.
//!
//! Both operators are configured once, by name and parameters, and return a
//! list of offspring. The orchestrator keeps the first mutant; crossover yields
//! two children.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ConfigError;
use crate::Genome;

fn check_probability(operator: &'static str, parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidParameter {
            operator,
            parameter,
            value,
        });
    }
    Ok(())
}

fn check_finite(operator: &'static str, parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::InvalidParameter {
            operator,
            parameter,
            value,
        });
    }
    Ok(())
}

// ============================================================
// Mutation
// ============================================================

/// Mutation operator, selected by `type` in the configuration.
///
/// ```toml
/// [mutation]
/// type = "GAUSSIAN"
/// mu = 0.0
/// sigma = 0.2
/// indpb = 0.5
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mutation {
    /// Adds `mu + sigma * N(0, 1)` to each gene with probability `indpb`.
    Gaussian { mu: f64, sigma: f64, indpb: f64 },
    /// Replaces each gene with probability `indpb` by a draw from `[low, high)`.
    Uniform { low: f64, high: f64, indpb: f64 },
}

impl Default for Mutation {
    fn default() -> Self {
        Mutation::Gaussian {
            mu: 0.0,
            sigma: 0.2,
            indpb: 0.5,
        }
    }
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Gaussian { .. } => "GAUSSIAN",
            Mutation::Uniform { .. } => "UNIFORM",
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Mutation::Gaussian { mu, sigma, indpb } => {
                check_finite("gaussian mutation", "mu", mu)?;
                check_finite("gaussian mutation", "sigma", sigma)?;
                if sigma < 0.0 {
                    return Err(ConfigError::InvalidParameter {
                        operator: "gaussian mutation",
                        parameter: "sigma",
                        value: sigma,
                    });
                }
                check_probability("gaussian mutation", "indpb", indpb)
            }
            Mutation::Uniform { low, high, indpb } => {
                check_finite("uniform mutation", "low", low)?;
                check_finite("uniform mutation", "high", high)?;
                if low >= high {
                    return Err(ConfigError::InvalidParameter {
                        operator: "uniform mutation",
                        parameter: "high",
                        value: high,
                    });
                }
                check_probability("uniform mutation", "indpb", indpb)
            }
        }
    }

    /// Produce offspring of `genome`. Always returns exactly one mutant.
    #[instrument(level = "trace", skip(self, genome, rng), fields(operator = self.name(), genome_length = genome.len()))]
    pub fn mutate<R: Rng + ?Sized>(&self, genome: &[f64], rng: &mut R) -> Vec<Genome> {
        let mut mutant = genome.to_vec();

        match *self {
            Mutation::Gaussian { mu, sigma, indpb } => {
                for gene in mutant.iter_mut() {
                    if rng.gen_bool(indpb) {
                        let noise: f64 = rng.sample(StandardNormal);
                        *gene += mu + sigma * noise;
                    }
                }
            }
            Mutation::Uniform { low, high, indpb } => {
                for gene in mutant.iter_mut() {
                    if rng.gen_bool(indpb) {
                        *gene = rng.gen_range(low..high);
                    }
                }
            }
        }

        vec![mutant]
    }
}

// ============================================================
// Crossover
// ============================================================

/// Crossover operator, selected by `type` in the configuration.
///
/// Genomes of different lengths are crossed over their common prefix; the
/// tail of the longer parent stays with its own child.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Crossover {
    /// Swaps each gene position between the parents with probability `indpb`.
    Uniform { indpb: f64 },
    /// Swaps the tails after a random cut point.
    OnePoint,
}

impl Default for Crossover {
    fn default() -> Self {
        Crossover::Uniform { indpb: 0.5 }
    }
}

impl Crossover {
    pub fn name(&self) -> &'static str {
        match self {
            Crossover::Uniform { .. } => "UNIFORM",
            Crossover::OnePoint => "ONE_POINT",
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Crossover::Uniform { indpb } => check_probability("uniform crossover", "indpb", indpb),
            Crossover::OnePoint => Ok(()),
        }
    }

    /// Produce two children from `lhs` and `rhs`.
    #[instrument(level = "trace", skip(self, lhs, rhs, rng), fields(operator = self.name()))]
    pub fn crossover<R: Rng + ?Sized>(&self, lhs: &[f64], rhs: &[f64], rng: &mut R) -> Vec<Genome> {
        let mut first = lhs.to_vec();
        let mut second = rhs.to_vec();
        let common = first.len().min(second.len());

        match *self {
            Crossover::Uniform { indpb } => {
                for i in 0..common {
                    if rng.gen_bool(indpb) {
                        std::mem::swap(&mut first[i], &mut second[i]);
                    }
                }
            }
            Crossover::OnePoint => {
                if common >= 2 {
                    let point = rng.gen_range(1..common);
                    first[point..common].swap_with_slice(&mut second[point..common]);
                }
            }
        }

        vec![first, second]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn gaussian_with_zero_probability_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        let mutation = Mutation::Gaussian {
            mu: 0.0,
            sigma: 1.0,
            indpb: 0.0,
        };

        let offspring = mutation.mutate(&[1.0, 2.0, 3.0], &mut rng);
        assert_eq!(offspring, vec![vec![1.0, 2.0, 3.0]]);
    }

    #[test]
    fn gaussian_with_zero_sigma_shifts_by_mu() {
        let mut rng = StdRng::seed_from_u64(1);
        let mutation = Mutation::Gaussian {
            mu: 0.5,
            sigma: 0.0,
            indpb: 1.0,
        };

        let offspring = mutation.mutate(&[1.0, -1.0], &mut rng);
        assert_eq!(offspring, vec![vec![1.5, -0.5]]);
    }

    #[test]
    fn gaussian_noise_is_centered() {
        let mut rng = StdRng::seed_from_u64(9);
        let mutation = Mutation::Gaussian {
            mu: 0.0,
            sigma: 1.0,
            indpb: 1.0,
        };

        let genome = vec![0.0; 10_000];
        let mutant = mutation.mutate(&genome, &mut rng).remove(0);
        let mean = mutant.iter().sum::<f64>() / mutant.len() as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!(mutant.iter().any(|&g| g != 0.0));
    }

    #[test]
    fn uniform_mutation_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(2);
        let mutation = Mutation::Uniform {
            low: -1.0,
            high: 1.0,
            indpb: 1.0,
        };

        let mutant = mutation.mutate(&[100.0; 64], &mut rng).remove(0);
        assert!(mutant.iter().all(|g| (-1.0..1.0).contains(g)));
    }

    #[test]
    fn uniform_crossover_preserves_genes_per_position() {
        let mut rng = StdRng::seed_from_u64(4);
        let lhs: Vec<f64> = (0..20).map(f64::from).collect();
        let rhs: Vec<f64> = (100..120).map(f64::from).collect();

        let children = Crossover::Uniform { indpb: 0.5 }.crossover(&lhs, &rhs, &mut rng);
        assert_eq!(children.len(), 2);
        for i in 0..20 {
            let mut pair = [children[0][i], children[1][i]];
            pair.sort_by(f64::total_cmp);
            assert_eq!(pair, [lhs[i], rhs[i]]);
        }
    }

    #[test]
    fn one_point_crossover_swaps_tails() {
        let mut rng = StdRng::seed_from_u64(8);
        let lhs = vec![0.0; 6];
        let rhs = vec![1.0; 6];

        let children = Crossover::OnePoint.crossover(&lhs, &rhs, &mut rng);
        let point = children[0].iter().position(|&g| g == 1.0).unwrap();
        assert!((1..6).contains(&point));
        assert!(children[0][..point].iter().all(|&g| g == 0.0));
        assert!(children[0][point..].iter().all(|&g| g == 1.0));
        assert!(children[1][..point].iter().all(|&g| g == 1.0));
        assert!(children[1][point..].iter().all(|&g| g == 0.0));
    }

    #[test]
    fn one_point_crossover_on_short_genomes_copies_parents() {
        let mut rng = StdRng::seed_from_u64(8);

        let children = Crossover::OnePoint.crossover(&[1.0], &[2.0, 3.0], &mut rng);
        assert_eq!(children, vec![vec![1.0], vec![2.0, 3.0]]);
    }

    #[test]
    fn validation_rejects_bad_parameters() {
        let bad = [
            Mutation::Gaussian {
                mu: 0.0,
                sigma: -1.0,
                indpb: 0.5,
            },
            Mutation::Gaussian {
                mu: f64::NAN,
                sigma: 1.0,
                indpb: 0.5,
            },
            Mutation::Gaussian {
                mu: 0.0,
                sigma: 1.0,
                indpb: 1.5,
            },
            Mutation::Uniform {
                low: 1.0,
                high: 1.0,
                indpb: 0.5,
            },
        ];
        for mutation in bad {
            assert!(
                matches!(mutation.validate(), Err(ConfigError::InvalidParameter { .. })),
                "{mutation:?} accepted"
            );
        }

        assert!(Mutation::default().validate().is_ok());
        assert!(Crossover::Uniform { indpb: -0.1 }.validate().is_err());
        assert!(Crossover::OnePoint.validate().is_ok());
    }
}
