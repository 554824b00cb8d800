//! Feature dimensions: how a candidate is measured and discretized along one
//! axis of the archive.
//!
//! A dimension compares a measured value against a target with a
//! [`Relation`]. Candidates that satisfy the relation have a descriptor error
//! of zero; those that violate it are placed by how far they miss the target,
//! so infeasible points still land in the archive.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, MapElitesError, Result};

/// Comparison between the measured value and the target of a dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Equal,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Relation {
    /// Whether `measured <relation> target` holds.
    pub fn holds(self, measured: f64, target: f64) -> bool {
        match self {
            Relation::Equal => measured == target,
            Relation::Less => measured < target,
            Relation::LessOrEqual => measured <= target,
            Relation::Greater => measured > target,
            Relation::GreaterOrEqual => measured >= target,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Relation::Equal => "==",
            Relation::Less => "<",
            Relation::LessOrEqual => "<=",
            Relation::Greater => ">",
            Relation::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Relation {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "==" | "eq" | "equal" => Ok(Relation::Equal),
            "<" | "lt" | "less" => Ok(Relation::Less),
            "<=" | "le" | "less_or_equal" => Ok(Relation::LessOrEqual),
            ">" | "gt" | "greater" => Ok(Relation::Greater),
            ">=" | "ge" | "greater_or_equal" => Ok(Relation::GreaterOrEqual),
            other => Err(ConfigError::UnknownRelation(other.to_string())),
        }
    }
}

type FeatureFn = Box<dyn Fn(&[f64]) -> f64>;

/// One axis of the feature space.
pub struct FeatureDimension {
    name: String,
    target: FeatureFn,
    measure: FeatureFn,
    relation: Relation,
    bins: Vec<f64>,
}

impl FeatureDimension {
    /// Create a dimension. `bins` are the ordered edges of the half-open bins
    /// `[bins[i], bins[i + 1])`; at least two strictly increasing, non-NaN
    /// edges are required. Infinite outer edges are allowed.
    pub fn new<T, M>(
        name: impl Into<String>,
        target: T,
        measure: M,
        relation: Relation,
        bins: Vec<f64>,
    ) -> std::result::Result<Self, ConfigError>
    where
        T: Fn(&[f64]) -> f64 + 'static,
        M: Fn(&[f64]) -> f64 + 'static,
    {
        let name = name.into();
        validate_bins(&name, &bins)?;

        Ok(Self {
            name,
            target: Box::new(target),
            measure: Box::new(measure),
            relation,
            bins,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    /// Number of bins along this axis.
    pub fn len(&self) -> usize {
        self.bins.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distance of `genome` from satisfying this dimension.
    ///
    /// For [`Relation::Equal`] this is always `|measure - target|`. For the
    /// inequalities it is zero when the relation holds and the absolute gap
    /// otherwise.
    pub fn descriptor_error(&self, genome: &[f64]) -> f64 {
        let measured = (self.measure)(genome);
        let target = (self.target)(genome);

        match self.relation {
            Relation::Equal => (measured - target).abs(),
            relation if relation.holds(measured, target) => 0.0,
            _ => (measured - target).abs(),
        }
    }

    /// Index of the bin containing `value`.
    ///
    /// Fails when `value` is below the first edge, at or above the last edge,
    /// or NaN. Values are never clamped.
    pub fn discretize(&self, value: f64) -> Result<usize> {
        // number of edges <= value
        let index = self.bins.partition_point(|&edge| edge <= value);

        if index == 0 || index == self.bins.len() {
            return Err(MapElitesError::OutOfRange {
                dimension: self.name.clone(),
                value,
                low: self.bins[0],
                high: self.bins[self.bins.len() - 1],
            });
        }

        Ok(index - 1)
    }

    /// Bin index of `genome` on this axis.
    pub fn cell_index(&self, genome: &[f64]) -> Result<usize> {
        self.discretize(self.descriptor_error(genome))
    }
}

impl fmt::Debug for FeatureDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureDimension")
            .field("name", &self.name)
            .field("relation", &self.relation)
            .field("bins", &self.bins)
            .finish_non_exhaustive()
    }
}

fn validate_bins(name: &str, bins: &[f64]) -> std::result::Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidBins {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if bins.len() < 2 {
        return Err(invalid("at least two edges are required"));
    }
    if bins.iter().any(|edge| edge.is_nan()) {
        return Err(invalid("edges must not be NaN"));
    }
    if bins.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(invalid("edges must be strictly increasing"));
    }

    Ok(())
}

/// Map a genome to its archive cell, one bin index per dimension.
pub fn map_to_cell(dimensions: &[FeatureDimension], genome: &[f64]) -> Result<Vec<usize>> {
    dimensions
        .iter()
        .map(|dimension| dimension.cell_index(genome))
        .collect()
}
