//! Error types for tensile-cycles.

use thiserror::Error;

/// Invalid or degenerate parameters supplied by the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("min_distance must be at least 1, got {0}")]
    MinDistance(usize),

    #[error("min_height must be finite, got {0}")]
    NonFiniteHeight(f64),

    #[error("need at least 2 cycle boundaries to estimate the mean period, have {found}")]
    TooFewBoundaries { found: usize },

    #[error("boundary index {index} is outside a series of {len} samples")]
    BoundaryOutOfRange { index: usize, len: usize },

    #[error("boundary indices must be strictly increasing (position {position})")]
    UnorderedBoundaries { position: usize },

    #[error("window_duration must be finite and non-negative, got {0}")]
    InvalidWindow(f64),

    #[error("cycle id 0 marks unassigned samples and cannot be calibrated")]
    UnassignedCycle,

    #[error("cannot parse configuration: {0}")]
    Parse(String),
}

/// Problems with the supplied time series itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("column '{name}' has unsupported type {found}")]
    UnsupportedType { name: String, found: String },

    #[error("column '{column}' has a null value at row {row}")]
    NullValue { column: String, row: usize },

    #[error("column '{column}' has a non-finite value at row {row}")]
    NonFinite { column: String, row: usize },

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("column '{column}' is not strictly increasing at row {row}")]
    NonMonotonicTime { column: String, row: usize },

    #[error("arrow error: {0}")]
    Arrow(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl From<arrow::error::ArrowError> for Error {
    fn from(err: arrow::error::ArrowError) -> Self {
        Error::Data(DataError::Arrow(err.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
