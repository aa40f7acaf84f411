use log::debug;

use crate::expression::ast::Expression;
use crate::expression::errors::ExpressionError;
use crate::inputs::Operator;

impl Expression {
    /// Evaluate the tree post-order, applying every operator's domain guard.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a sub-expression, or the guard failure
    /// of the root operator (see [`Operator::evaluate`]).
    pub fn evaluate(&self) -> Result<f64, ExpressionError> {
        let result = match self {
            Expression::Digit(d) => Ok(f64::from(*d)),
            Expression::Neg(e) => Operator::Neg.evaluate(&[e.evaluate()?]),
            Expression::Sqrt(e) => Operator::Sqrt.evaluate(&[e.evaluate()?]),
            Expression::Add(l, r) => Operator::Add.evaluate(&[l.evaluate()?, r.evaluate()?]),
            Expression::Sub(l, r) => Operator::Sub.evaluate(&[l.evaluate()?, r.evaluate()?]),
            Expression::Mul(l, r) => Operator::Mul.evaluate(&[l.evaluate()?, r.evaluate()?]),
            Expression::Div(l, r) => Operator::Div.evaluate(&[l.evaluate()?, r.evaluate()?]),
            Expression::Pow(l, r) => Operator::Pow.evaluate(&[l.evaluate()?, r.evaluate()?]),
        };

        match &result {
            Ok(value) => debug!("Expression {} evaluated to: {}", self, value),
            Err(e) => debug!("Expression {} evaluation failed: {}", self, e),
        }

        result
    }
}
