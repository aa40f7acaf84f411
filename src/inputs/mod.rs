//! Digit pool, operator registry and the input notation that builds them

mod digits;
mod errors;
mod operators;
mod parsing;

pub use digits::{DIGIT_COUNT, DigitLease, DigitPool};
pub use errors::{PoolError, ValidationError};
pub use operators::{DIVISION_EPSILON, Operator, OperatorRegistry};
pub use parsing::{SearchInputs, parse_inputs};

#[cfg(test)]
mod tests;
