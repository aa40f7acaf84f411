// Configuration constants for the candidate generator
pub const DEFAULT_MAX_SIZE: usize = 31;
pub const DEFAULT_PERTURBATION_RATIO: f64 = 0.5;

// Relative weights of the constructive actions
pub const LEAF_WEIGHT: f64 = 1.0;
pub const BINARY_WEIGHT: f64 = 1.0;
pub const UNARY_WEIGHT: f64 = 0.3;
pub const STOP_WEIGHT: f64 = 1.0;
