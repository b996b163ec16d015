use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the dataset. Fatal at startup: the process must
/// not serve with zero rows.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset not found: {0}")]
    NotFound(PathBuf),

    #[error("dataset is empty: {0}")]
    Empty(PathBuf),

    #[error("dataset has no data rows: {0}")]
    NoRows(PathBuf),

    #[error("dataset header has a blank column name at position {0}")]
    BlankColumn(usize),

    #[error("dataset header repeats column '{0}'")]
    DuplicateColumn(String),

    #[error("record on line {line} has {found} fields, header has {expected}")]
    InconsistentColumns {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures while reading or writing the state snapshot. Never fatal:
/// rotation and evaluation continue in memory.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum RotorError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("condition not found: {0}")]
    ConditionNotFound(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RotorError>;
