use std::io;
use std::path::PathBuf;

/// Errors returned by the optimization engines. Each engine call either succeeds with a
/// result or returns exactly one of these outcomes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizationError {
    /// A requested location id is not part of the dataset or the graph.
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// The search exhausted the graph without reaching the target, after the
    /// emergency to normal fallback.
    #[error("no path found from {from} to {to}")]
    NoPathFound { from: String, to: String },

    /// An input collection was too short to compute anything.
    #[error("empty input: {0}")]
    EmptyInput(String),
}

/// Errors raised while reading and validating a dataset file.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to open dataset at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse dataset at {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to write dataset to {path:?}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("unsupported dataset file {0:?}. Use `.xml` or `.xml.gz`")]
    UnsupportedFormat(PathBuf),

    #[error("location id {0} is defined more than once")]
    DuplicateLocation(String),

    #[error("{context} references unknown location {id}")]
    UnknownLocation { context: String, id: String },

    #[error("invalid {context}: {reason}")]
    InvalidRecord { context: String, reason: String },
}

/// Errors raised while reading the yaml configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to open config file at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse config at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Errors ending a command line run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Optimization(#[from] OptimizationError),

    /// The config has no `dataset` module.
    #[error("no dataset configured. Add a `dataset` module with a `path` to the config")]
    MissingDataset,

    #[error("failed to write output to {path:?}: {source}")]
    Output { path: PathBuf, source: io::Error },

    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}
