use std::fmt;
use std::str::FromStr;

use crate::expression::ExpressionError;
use crate::inputs::errors::ValidationError;

/// Divisors with a smaller magnitude are rejected by the division guard
pub const DIVISION_EPSILON: f64 = f64::EPSILON;

#[inline]
fn is_zero(value: f64) -> bool {
    value.abs() < DIVISION_EPSILON
}

#[inline]
fn is_integer(value: f64) -> bool {
    if value.abs() > 2_f64.powi(52) {
        true
    } else {
        (value - value.round()).abs() < f64::EPSILON
    }
}

/// Arithmetic operators a search may combine digits with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Neg,
    Sqrt,
}

impl Operator {
    /// Every supported operator, in the order the input notation lists them
    pub const ALL: [Operator; 7] = [
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Pow,
        Operator::Neg,
        Operator::Sqrt,
    ];

    /// Symbol used both in the input notation and in rendered expressions
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Pow => "^",
            Operator::Neg => "neg",
            Operator::Sqrt => "sqrt",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Operator::Neg | Operator::Sqrt => 1,
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Pow => 2,
        }
    }

    pub fn is_unary(self) -> bool {
        self.arity() == 1
    }

    /// Apply the domain guard, then the operator, then the finiteness check.
    ///
    /// # Errors
    ///
    /// - `DivisionByZero` when the divisor magnitude is below [`DIVISION_EPSILON`]
    /// - `NegativeRadicand` for the square root of a negative number
    /// - `ComplexResult` for a negative base raised to a fractional exponent
    /// - `NonFinite` when the result overflows or is not a number
    /// - `ArityMismatch` when `operands.len()` differs from the arity
    pub fn evaluate(self, operands: &[f64]) -> Result<f64, ExpressionError> {
        let value = match (self, operands) {
            (Operator::Neg, &[x]) => -x,
            (Operator::Sqrt, &[x]) => {
                if x < 0.0 {
                    return Err(ExpressionError::NegativeRadicand);
                }
                x.sqrt()
            }
            (Operator::Add, &[a, b]) => a + b,
            (Operator::Sub, &[a, b]) => a - b,
            (Operator::Mul, &[a, b]) => a * b,
            (Operator::Div, &[a, b]) => {
                if is_zero(b) {
                    return Err(ExpressionError::DivisionByZero);
                }
                a / b
            }
            (Operator::Pow, &[a, b]) => {
                if a < 0.0 && !is_integer(b) {
                    return Err(ExpressionError::ComplexResult);
                }
                a.powf(b)
            }
            _ => {
                return Err(ExpressionError::ArityMismatch {
                    operator: self.symbol(),
                    expected: self.arity(),
                    found: operands.len(),
                });
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(ExpressionError::NonFinite)
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| ValidationError::UnknownToken(s.to_string()))
    }
}

/// Ordered, duplicate-free set of the operators enabled for one search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorRegistry {
    operators: Vec<Operator>,
    unary: Vec<Operator>,
    binary: Vec<Operator>,
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry keeping the first occurrence of every operator
    pub fn from_operators<I>(operators: I) -> Self
    where
        I: IntoIterator<Item = Operator>,
    {
        let mut registry = Self::new();
        for op in operators {
            registry.insert(op);
        }
        registry
    }

    /// Add an operator; returns `false` if it was already registered
    pub(crate) fn insert(&mut self, op: Operator) -> bool {
        if self.operators.contains(&op) {
            return false;
        }
        self.operators.push(op);
        if op.is_unary() {
            self.unary.push(op);
        } else {
            self.binary.push(op);
        }
        true
    }

    pub fn operators_by_arity(&self, arity: usize) -> &[Operator] {
        match arity {
            1 => &self.unary,
            2 => &self.binary,
            _ => &[],
        }
    }

    pub fn unary(&self) -> &[Operator] {
        &self.unary
    }

    pub fn binary(&self) -> &[Operator] {
        &self.binary
    }

    pub fn contains(&self, op: Operator) -> bool {
        self.operators.contains(&op)
    }

    pub fn iter(&self) -> impl Iterator<Item = Operator> + '_ {
        self.operators.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

#[cfg(test)]
mod tests_inner_helpers {
    use super::{is_integer, is_zero};

    #[test]
    fn test_is_zero() {
        assert!(is_zero(0.0));
        assert!(is_zero(f64::EPSILON / 2.0));
        assert!(!is_zero(f64::EPSILON * 2.0));
        assert!(!is_zero(1.0));
    }

    #[test]
    fn test_is_integer() {
        assert!(is_integer(1.0));
        assert!(is_integer(-17.0));
        assert!(!is_integer(1.5));
        assert!(is_integer(1e16));
    }
}
