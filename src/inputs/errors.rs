use thiserror::Error;

/// Errors raised while validating search parameters, before any search starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Operator set cannot be empty")]
    EmptyOperatorSet,
    #[error("Digit specification must provide at least one digit")]
    NoDigits,
    #[error("Unrecognized token: '{0}'")]
    UnknownToken(String),
    #[error("Invalid digit range: '{0}'")]
    InvalidRange(String),
    #[error("Objective must be a finite number, got {0}")]
    NonFiniteObjective(f64),
    #[error("Tolerance must be a positive finite number, got {0}")]
    InvalidTolerance(f64),
    #[error("Deadline must be a positive duration")]
    InvalidDeadline,
    #[error("Thread count must be at least 1")]
    InvalidThreadCount,
    #[error("Perturbation ratio must lie in [0, 1], got {0}")]
    InvalidPerturbationRatio(f64),
    #[error("Maximum expression size must be at least 1 node, got {0}")]
    MaxSizeTooSmall(usize),
}

/// Bookkeeping errors of the digit pool
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    #[error("Digit {0} is not a decimal digit")]
    NotADigit(u8),
    #[error("No unit of digit {0} is left in the pool")]
    Exhausted(u8),
    #[error("Restoring digit {0} would exceed its initial count")]
    Overfull(u8),
}
