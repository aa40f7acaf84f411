use std::fmt;

use crate::solver::constants::{NO_CANDIDATE, NO_VALUE};
use crate::solver::controller::{SearchState, SearchStats, TerminationReason};
use crate::solver::incumbent::Incumbent;

/// Final outcome of a search, handed to the caller exactly once
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    /// Fully parenthesized text of the best expression, or `"no candidate"`
    pub expression: String,
    /// Decimal text of its value, or `"NaN"`
    pub result: String,
    /// Absolute distance to the objective, `+inf` without a candidate
    pub distance: f64,
    pub value: Option<f64>,
    pub latex: Option<String>,
    /// `Completed` or `TimedOut`, never `Reported`
    pub state: SearchState,
    pub reason: TerminationReason,
    pub stats: SearchStats,
}

impl SearchReport {
    pub(crate) fn new(
        best: Option<Incumbent>,
        state: SearchState,
        reason: TerminationReason,
        stats: SearchStats,
    ) -> Self {
        match best {
            Some(incumbent) => Self {
                expression: incumbent.expression.to_string(),
                result: incumbent.value.to_string(),
                distance: incumbent.score.distance,
                value: Some(incumbent.value),
                latex: Some(incumbent.expression.to_latex()),
                state,
                reason,
                stats,
            },
            None => Self {
                expression: NO_CANDIDATE.to_string(),
                result: NO_VALUE.to_string(),
                distance: f64::INFINITY,
                value: None,
                latex: None,
                state,
                reason,
                stats,
            },
        }
    }

    /// True when at least one valid expression was found
    pub fn found(&self) -> bool {
        self.value.is_some()
    }

    /// True when the search stopped because the tolerance was reached
    pub fn is_exact(&self) -> bool {
        self.state == SearchState::Completed
    }

    pub fn triple(&self) -> (&str, &str, f64) {
        (&self.expression, &self.result, self.distance)
    }

    pub fn into_triple(self) -> (String, String, f64) {
        (self.expression, self.result, self.distance)
    }
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} (distance {:e})", self.expression, self.result, self.distance)
    }
}
