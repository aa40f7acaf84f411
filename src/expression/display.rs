use std::fmt;

use crate::expression::ast::Expression;

/// Canonical, fully parenthesized form: `5`, `sqrt(x)`, `neg(x)`, `(a + b)`
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Digit(d) => write!(f, "{}", d),
            Expression::Add(l, r) => write!(f, "({} + {})", l, r),
            Expression::Sub(l, r) => write!(f, "({} - {})", l, r),
            Expression::Mul(l, r) => write!(f, "({} * {})", l, r),
            Expression::Div(l, r) => write!(f, "({} / {})", l, r),
            Expression::Pow(l, r) => write!(f, "({} ^ {})", l, r),
            Expression::Neg(e) => write!(f, "neg({})", e),
            Expression::Sqrt(e) => write!(f, "sqrt({})", e),
        }
    }
}
