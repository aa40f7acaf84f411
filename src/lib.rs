//! Eureka Finder - A library for finding expressions that approximate a number
//!
//! Given a multiset of digits and a set of arithmetic operators, this library
//! runs a time-budgeted randomized search for the expression whose value is
//! closest to a real objective, and returns the best expression found when
//! the deadline expires or the requested precision is reached.

pub mod expression;
pub mod generator;
pub mod inputs;
pub mod solver;

use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::error;

// Re-export the main public API
pub use expression::{Expression, ExpressionError};
pub use inputs::{DigitPool, Operator, OperatorRegistry, SearchInputs, ValidationError, parse_inputs};
pub use solver::{
    CancellationToken, SearchConfig, SearchController, SearchError, SearchHandle, SearchReport,
    SearchState, SearchStats, TerminationReason, deadline_from_seconds, search, spawn_search,
    tolerance_from_precision,
};

use solver::constants::{NO_CANDIDATE, NO_VALUE, SEARCH_THREAD_NAME};

/// Search for an expression built from `inputs` that approaches `objective`
///
/// This is a blocking convenience function that parses the input notation,
/// runs a search with default settings and returns its report.
///
/// # Arguments
///
/// * `inputs` - Operators and digits, e.g. `"+,-,*,/,^,neg,sqrt,1-9"`
/// * `objective` - The value to approach
/// * `tolerance` - Distance at which the search may stop early
/// * `deadline` - Wall-clock budget of the search
///
/// # Errors
///
/// This function will return an error if:
/// * The input notation contains an unknown token or an invalid range
/// * No operator or no digit is given
/// * The objective, tolerance or deadline is invalid
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use eureka_finder::find_expression;
///
/// match find_expression("sqrt,5", 5f64.sqrt(), 1e-6, Duration::from_secs(1)) {
///     Ok(report) => println!("Found: {} = {}", report.expression, report.result),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub fn find_expression(
    inputs: &str,
    objective: f64,
    tolerance: f64,
    deadline: Duration,
) -> Result<SearchReport, SearchError> {
    let inputs = parse_inputs(inputs)?;
    search(inputs, SearchConfig::new(objective, tolerance, deadline))
}

/// Start a search in the background and hand its result to `callback`
///
/// `seconds` is floored to whole seconds. Parameters are validated before
/// anything is started. `callback` receives the expression text, the result
/// text and the distance exactly once, from a background thread, also when no
/// valid expression was found (`"no candidate"`, `"NaN"`, `+inf`).
///
/// # Errors
///
/// Returns `SearchError::Validation` for invalid parameters (the callback is
/// never invoked then) and `SearchError::Spawn` if the thread cannot start.
///
/// # Examples
///
/// ```
/// use eureka_finder::{find_function, tolerance_from_precision};
///
/// let handle = find_function("+,*,1-4", 10.0, tolerance_from_precision(6.0), 1.0, |expr, result, dist| {
///     println!("{} = {} (distance {})", expr, result, dist);
/// });
/// if let Ok(handle) = handle {
///     let _ = handle.join();
/// }
/// ```
pub fn find_function<F>(
    inputs: &str,
    objective: f64,
    tolerance: f64,
    seconds: f64,
    callback: F,
) -> Result<JoinHandle<()>, SearchError>
where
    F: FnOnce(String, String, f64) + Send + 'static,
{
    let inputs = parse_inputs(inputs)?;
    let config = SearchConfig::new(objective, tolerance, deadline_from_seconds(seconds));
    let search = spawn_search(inputs, config)?;
    let cancel = search.cancellation_token();

    let handle = thread::Builder::new()
        .name(format!("{}-callback", SEARCH_THREAD_NAME))
        .spawn(move || {
            let (expression, result, distance) = match search.wait() {
                Ok(report) => report.into_triple(),
                // only reachable if the search thread died
                Err(e) => {
                    error!("Search failed: {}", e);
                    (NO_CANDIDATE.to_string(), NO_VALUE.to_string(), f64::INFINITY)
                }
            };
            callback(expression, result, distance);
        })
        .inspect_err(|_| cancel.cancel())?;
    Ok(handle)
}
