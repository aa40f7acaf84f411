use std::time::Duration;

use log::debug;

use crate::generator::constants::{DEFAULT_MAX_SIZE, DEFAULT_PERTURBATION_RATIO};
use crate::inputs::ValidationError;

/// Largest precision accepted by [`tolerance_from_precision`]
const MAX_PRECISION_DIGITS: f64 = 300.0;

/// Parameters of one search run
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Value the expression should approach
    pub objective: f64,
    /// Distance at or below which the search stops early
    pub tolerance: f64,
    /// Wall-clock budget measured from the start of the run
    pub deadline: Duration,
    /// Seed of the random generators; drawn at random when `None`
    pub seed: Option<u64>,
    /// Number of independent search chains
    pub threads: usize,
    /// Probability of perturbing the incumbent instead of constructing
    pub perturbation_ratio: f64,
    /// Upper bound on the node count of a candidate
    pub max_size: usize,
    /// Optional per-chain iteration budget, reached like a deadline
    pub max_iterations: Option<u64>,
}

impl SearchConfig {
    pub fn new(objective: f64, tolerance: f64, deadline: Duration) -> Self {
        Self {
            objective,
            tolerance,
            deadline,
            seed: None,
            threads: rayon::current_num_threads(),
            perturbation_ratio: DEFAULT_PERTURBATION_RATIO,
            max_size: DEFAULT_MAX_SIZE,
            max_iterations: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_perturbation_ratio(mut self, ratio: f64) -> Self {
        self.perturbation_ratio = ratio;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    /// # Errors
    ///
    /// Returns the first invalid parameter, checked in declaration order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        debug!("Validating search configuration: {:?}", self);

        if !self.objective.is_finite() {
            return Err(ValidationError::NonFiniteObjective(self.objective));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ValidationError::InvalidTolerance(self.tolerance));
        }
        if self.deadline.is_zero() {
            return Err(ValidationError::InvalidDeadline);
        }
        if self.threads == 0 {
            return Err(ValidationError::InvalidThreadCount);
        }
        if !(0.0..=1.0).contains(&self.perturbation_ratio) {
            return Err(ValidationError::InvalidPerturbationRatio(
                self.perturbation_ratio,
            ));
        }
        if self.max_size == 0 {
            return Err(ValidationError::MaxSizeTooSmall(self.max_size));
        }
        Ok(())
    }
}

/// Tolerance for a number of correct decimal digits: `10^-floor(digits)`.
/// Negative or non-finite precisions count as zero digits.
pub fn tolerance_from_precision(digits: f64) -> f64 {
    let digits = if digits.is_finite() {
        digits.floor().clamp(0.0, MAX_PRECISION_DIGITS)
    } else {
        0.0
    };
    10f64.powf(-digits)
}

/// Deadline for a budget given in seconds, floored to whole seconds
pub fn deadline_from_seconds(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds >= 1.0 {
        Duration::try_from_secs_f64(seconds.floor()).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
