use thiserror::Error;

//invalid or missing strategy configuration, raised before any computation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),
    #[error("Parameter {0} must not be blank")]
    BlankParameter(String),
    #[error("Parameter {key} has the wrong type, expected {expected}")]
    WrongType { key: String, expected: &'static str },
    #[error("Parameter {key} = {value} outside allowed range [{min}, {max}]")]
    OutOfRange {
        key: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("Fee must be a finite fraction in [0, 1), got {0}")]
    InvalidFee(f64),
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),
}

//malformed or unusable price data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Price series is empty")]
    EmptySeries,
    #[error("Non-positive close price {price} at bar {index}")]
    NonPositivePrice { index: usize, price: f64 },
    #[error("Non-finite {field} value at bar {index}")]
    NonFinitePrice { index: usize, field: &'static str },
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Timestamps are not strictly increasing at bar {index}")]
    NonMonotonicTimestamps { index: usize },
    #[error("{0}")]
    InvalidDateRange(String),
}

//numeric blow-up inside the pipeline, treated as a bug signal
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationError {
    #[error("Non-finite value {value} in {stage} at bar {index}")]
    NonFinite {
        stage: &'static str,
        index: usize,
        value: f64,
    },
    #[error("{stage} produced {actual} values for {expected} bars")]
    LengthMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    #[error("Computation error: {0}")]
    Computation(#[from] ComputationError),
}

pub type BacktestOutcome<T> = Result<T, BacktestError>;

//fails with a computation error when value is nan or infinite
pub(crate) fn ensure_finite(
    stage: &'static str,
    index: usize,
    value: f64,
) -> Result<f64, ComputationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ComputationError::NonFinite {
            stage,
            index,
            value,
        })
    }
}
