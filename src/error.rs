//! Errors reported by estimator construction and merging.

use thiserror::Error;

/// Invalid estimator configuration, reported when an estimator is constructed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    #[error("precision must be in [4..=31] range, got {0}")]
    InvalidPrecision(u32),
    #[error("relative standard error {0} cannot be reached with a precision in [4..=31] range")]
    InvalidRelativeError(f64),
    #[error("max cardinality must be a positive integer, got {0}")]
    InvalidMaxCardinality(i64),
    #[error("linear counter bitmap must be at least one byte long")]
    EmptyBitmap,
    #[error("estimator needs {expected} registers, got {got}")]
    RegisterCountMismatch { expected: usize, got: usize },
    #[error("register set of {count} registers needs {expected} words, got {got}")]
    InvalidRegisterWords {
        count: usize,
        expected: usize,
        got: usize,
    },
}

/// Estimators that cannot be combined into one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("cannot merge an empty list of estimators")]
    Empty,
    #[error("cannot merge estimators of different sizes: expected {expected}, got {got}")]
    SizeMismatch { expected: usize, got: usize },
}
