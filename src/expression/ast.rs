use crate::expression::errors::ExpressionError;
use crate::inputs::Operator;

/// Represents an owned arithmetic expression built from single digits
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Digit(u8),
    Add(Box<Expression>, Box<Expression>),
    Sub(Box<Expression>, Box<Expression>),
    Mul(Box<Expression>, Box<Expression>),
    Div(Box<Expression>, Box<Expression>),
    Pow(Box<Expression>, Box<Expression>),
    Neg(Box<Expression>),
    Sqrt(Box<Expression>),
}

impl Expression {
    /// Build a node for `op`, taking ownership of exactly `op.arity()` children
    ///
    /// # Errors
    ///
    /// Returns `ArityMismatch` when the number of children is wrong.
    pub fn from_operator(op: Operator, children: Vec<Expression>) -> Result<Self, ExpressionError> {
        let found = children.len();
        let mut children = children.into_iter().map(Box::new);
        let expr = match (op, children.next(), children.next(), children.next()) {
            (Operator::Neg, Some(e), None, None) => Expression::Neg(e),
            (Operator::Sqrt, Some(e), None, None) => Expression::Sqrt(e),
            (Operator::Add, Some(l), Some(r), None) => Expression::Add(l, r),
            (Operator::Sub, Some(l), Some(r), None) => Expression::Sub(l, r),
            (Operator::Mul, Some(l), Some(r), None) => Expression::Mul(l, r),
            (Operator::Div, Some(l), Some(r), None) => Expression::Div(l, r),
            (Operator::Pow, Some(l), Some(r), None) => Expression::Pow(l, r),
            _ => {
                return Err(ExpressionError::ArityMismatch {
                    operator: op.symbol(),
                    expected: op.arity(),
                    found,
                });
            }
        };
        Ok(expr)
    }

    /// Operator at the root, `None` for a digit
    pub fn operator(&self) -> Option<Operator> {
        match self {
            Expression::Digit(_) => None,
            Expression::Add(_, _) => Some(Operator::Add),
            Expression::Sub(_, _) => Some(Operator::Sub),
            Expression::Mul(_, _) => Some(Operator::Mul),
            Expression::Div(_, _) => Some(Operator::Div),
            Expression::Pow(_, _) => Some(Operator::Pow),
            Expression::Neg(_) => Some(Operator::Neg),
            Expression::Sqrt(_) => Some(Operator::Sqrt),
        }
    }

    /// Direct children in operand order
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Digit(_) => Vec::new(),
            Expression::Neg(e) | Expression::Sqrt(e) => vec![e.as_ref()],
            Expression::Add(l, r)
            | Expression::Sub(l, r)
            | Expression::Mul(l, r)
            | Expression::Div(l, r)
            | Expression::Pow(l, r) => vec![l.as_ref(), r.as_ref()],
        }
    }

    /// Number of nodes in the tree
    pub fn size(&self) -> usize {
        1 + self.children().into_iter().map(Expression::size).sum::<usize>()
    }

    /// Digits of every leaf, left to right
    pub fn digits(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            if let Expression::Digit(d) = expr {
                out.push(*d);
            }
            stack.extend(expr.children().into_iter().rev());
        }
        out
    }
}
