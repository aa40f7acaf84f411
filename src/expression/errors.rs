use thiserror::Error;

/// Reasons an expression has no admissible value
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Square root of a negative number")]
    NegativeRadicand,
    #[error("Complex result from negative base with fractional exponent")]
    ComplexResult,
    #[error("Result is not a finite number")]
    NonFinite,
    #[error("Operator '{operator}' takes {expected} operands, got {found}")]
    ArityMismatch {
        operator: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Node {0} does not exist in the arena")]
    DanglingNode(usize),
}
