use crate::expression::ast::Expression;

impl Expression {
    /// Render the expression as LaTeX for a typesetting front-end.
    /// - Uses \cdot for multiplication
    /// - Uses \frac for division
    /// - Uses \sqrt for square roots
    /// - Adds parentheses only where precedence requires them
    pub fn to_latex(&self) -> String {
        fn precedence(expr: &Expression) -> u8 {
            match expr {
                Expression::Add(_, _) | Expression::Sub(_, _) => 1,
                Expression::Mul(_, _) => 2,
                Expression::Neg(_) => 3,
                Expression::Pow(_, _) => 4,
                Expression::Digit(_) | Expression::Div(_, _) | Expression::Sqrt(_) => 5,
            }
        }

        fn wrap_parens(s: String) -> String {
            format!("\\left({}\\right)", s)
        }

        fn fmt(expr: &Expression) -> String {
            match expr {
                Expression::Digit(d) => d.to_string(),
                Expression::Add(l, r) => {
                    let rs = fmt(r);
                    // a + (-b) keeps its parentheses so the sign stays readable
                    let rs = if matches!(r.as_ref(), Expression::Neg(_)) {
                        wrap_parens(rs)
                    } else {
                        rs
                    };
                    format!("{} + {}", fmt(l), rs)
                }
                Expression::Sub(l, r) => {
                    let mut rs = fmt(r);
                    if precedence(r) <= 1 || matches!(r.as_ref(), Expression::Neg(_)) {
                        rs = wrap_parens(rs);
                    }
                    format!("{} - {}", fmt(l), rs)
                }
                Expression::Mul(l, r) => {
                    let mut ls = fmt(l);
                    let mut rs = fmt(r);
                    if precedence(l) < 2 {
                        ls = wrap_parens(ls);
                    }
                    if precedence(r) <= 3 {
                        rs = wrap_parens(rs);
                    }
                    format!("{} \\cdot {}", ls, rs)
                }
                Expression::Div(l, r) => format!("\\frac{{{}}}{{{}}}", fmt(l), fmt(r)),
                Expression::Pow(l, r) => {
                    let mut base = fmt(l);
                    if !matches!(l.as_ref(), Expression::Digit(_) | Expression::Sqrt(_)) {
                        base = wrap_parens(base);
                    }
                    format!("{}^{{{}}}", base, fmt(r))
                }
                Expression::Neg(e) => {
                    let mut inner = fmt(e);
                    if precedence(e) <= 3 {
                        inner = wrap_parens(inner);
                    }
                    format!("-{}", inner)
                }
                Expression::Sqrt(e) => format!("\\sqrt{{{}}}", fmt(e)),
            }
        }

        fmt(self)
    }
}
