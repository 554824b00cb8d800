//! Error types shared by the whole crate.

use std::path::PathBuf;

/// Problems detected while building a run, before any iteration happens.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown comparison relation `{0}`, expected one of ==, <, <=, >, >=")]
    UnknownRelation(String),
    #[error("feature dimension `{name}` has invalid bins: {reason}")]
    InvalidBins { name: String, reason: String },
    #[error("problem must define at least one feature dimension")]
    NoFeatureDimensions,
    #[error("{operator}: parameter `{parameter}` is invalid, got {value}")]
    InvalidParameter {
        operator: &'static str,
        parameter: &'static str,
        value: f64,
    },
    #[error("max_selection_attempts must be greater than 0")]
    NoSelectionAttempts,
    #[error("seed {0} does not fit a TOML integer, use at most {max}", max = i64::MAX)]
    SeedOutOfRange(u64),
    #[error("feature space of shape {shape:?} has too many cells")]
    ArchiveTooLarge { shape: Vec<usize> },
    #[error("failed to read configuration file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors raised while running the optimizer.
#[derive(Debug, thiserror::Error)]
pub enum MapElitesError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("feature dimension `{dimension}`: value {value} outside of bins [{low}, {high})")]
    OutOfRange {
        dimension: String,
        value: f64,
        low: f64,
        high: f64,
    },
    #[error("cell {cell:?} does not fit archive of shape {shape:?}")]
    InvalidCell { cell: Vec<usize>, shape: Vec<usize> },
    #[error("cannot select {requested} distinct elites from {occupied} occupied cells")]
    SelectionExhausted { requested: usize, occupied: usize },
    #[error("cell {cell:?} holds no elite")]
    EmptyCell { cell: Vec<usize> },
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize archive: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to render heatmap: {0}")]
    Plot(String),
}

impl MapElitesError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MapElitesError>;
