use log::{debug, warn};

use crate::inputs::digits::DigitPool;
use crate::inputs::errors::ValidationError;
use crate::inputs::operators::{Operator, OperatorRegistry};

/// Validated parameters shared by every chain of one search: the digit pool
/// and the enabled operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchInputs {
    pool: DigitPool,
    operators: OperatorRegistry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputToken {
    Operator(Operator),
    Digit(u8),
    Range(u8, u8),
}

fn single_digit(s: &str) -> Option<u8> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_digit(10).and_then(|d| u8::try_from(d).ok()),
        _ => None,
    }
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn classify(token: &str) -> Result<InputToken, ValidationError> {
    if let Ok(op) = token.parse::<Operator>() {
        return Ok(InputToken::Operator(op));
    }

    if let Some(digit) = single_digit(token) {
        return Ok(InputToken::Digit(digit));
    }

    if let Some((from, to)) = token.split_once('-') {
        let (from, to) = (from.trim(), to.trim());
        return match (single_digit(from), single_digit(to)) {
            (Some(a), Some(b)) if a <= b => Ok(InputToken::Range(a, b)),
            _ if is_number(from) && is_number(to) => {
                Err(ValidationError::InvalidRange(token.to_string()))
            }
            _ => Err(ValidationError::UnknownToken(token.to_string())),
        };
    }

    Err(ValidationError::UnknownToken(token.to_string()))
}

fn add_digit(pool: &mut DigitPool, digit: u8, token: &str) -> Result<(), ValidationError> {
    pool.add_unit(digit)
        .map_err(|_| ValidationError::UnknownToken(token.to_string()))
}

/// Parse the combined notation used by the form front-end, e.g.
/// `"+,-,*,/,^,neg,sqrt,1-9"`.
///
/// Every single digit adds one unit of that digit; a range `a-b` adds one unit
/// of each digit in `a..=b`. Empty tokens are skipped.
///
/// # Errors
///
/// Token errors are reported first, in order of appearance, then an empty
/// operator set, then an empty digit pool.
pub fn parse_inputs(notation: &str) -> Result<SearchInputs, ValidationError> {
    debug!("Parsing search inputs: '{}'", notation);

    let mut pool = DigitPool::new();
    let mut operators = OperatorRegistry::new();

    for token in notation.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match classify(token) {
            Ok(InputToken::Operator(op)) => {
                operators.insert(op);
            }
            Ok(InputToken::Digit(digit)) => add_digit(&mut pool, digit, token)?,
            Ok(InputToken::Range(from, to)) => {
                for digit in from..=to {
                    add_digit(&mut pool, digit, token)?;
                }
            }
            Err(e) => {
                warn!("Rejecting search inputs: {}", e);
                return Err(e);
            }
        }
    }

    SearchInputs::new(pool, operators)
}

impl SearchInputs {
    /// # Errors
    ///
    /// Returns `EmptyOperatorSet` or `NoDigits` when either side is empty.
    pub fn new(pool: DigitPool, operators: OperatorRegistry) -> Result<Self, ValidationError> {
        if operators.is_empty() {
            warn!("Operator set is empty");
            return Err(ValidationError::EmptyOperatorSet);
        }
        if pool.is_empty() {
            warn!("Digit pool is empty");
            return Err(ValidationError::NoDigits);
        }

        debug!(
            "Inputs validated: {} operators, {} digit units",
            operators.len(),
            pool.total_units()
        );
        Ok(Self { pool, operators })
    }

    /// Build inputs from separately supplied operator symbols and digit notation
    ///
    /// # Errors
    ///
    /// Same as [`parse_inputs`]; a token in `digits` that names an operator is
    /// rejected as unknown.
    pub fn from_parts<'a, I>(operator_symbols: I, digits: &str) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut operators = OperatorRegistry::new();
        for symbol in operator_symbols {
            operators.insert(symbol.trim().parse()?);
        }

        let mut pool = DigitPool::new();
        for token in digits.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match classify(token)? {
                InputToken::Digit(digit) => add_digit(&mut pool, digit, token)?,
                InputToken::Range(from, to) => {
                    for digit in from..=to {
                        add_digit(&mut pool, digit, token)?;
                    }
                }
                InputToken::Operator(_) => {
                    return Err(ValidationError::UnknownToken(token.to_string()));
                }
            }
        }

        Self::new(pool, operators)
    }

    pub fn pool(&self) -> &DigitPool {
        &self.pool
    }

    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }
}
