use std::cmp::Ordering;

use crate::expression::ExpressionError;

/// Distance of an evaluation to the objective; `+inf` for invalid trees
#[inline]
pub fn distance(evaluation: Result<f64, ExpressionError>, objective: f64) -> f64 {
    match evaluation {
        Ok(value) => {
            let d = (value - objective).abs();
            if d.is_nan() { f64::INFINITY } else { d }
        }
        Err(_) => f64::INFINITY,
    }
}

/// Ranking key of a candidate: distance first, then node count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub distance: f64,
    pub size: usize,
}

impl Score {
    /// Score of the empty incumbent
    pub const WORST: Score = Score {
        distance: f64::INFINITY,
        size: usize::MAX,
    };

    pub fn new(distance: f64, size: usize) -> Self {
        Self { distance, size }
    }

    pub fn is_valid(&self) -> bool {
        self.distance.is_finite()
    }

    /// Strict improvement: smaller distance, or equal distance with fewer
    /// nodes. Equal scores are not an improvement, so the candidate found
    /// first keeps its place. Invalid scores never improve on anything.
    pub fn is_better_than(&self, other: &Score) -> bool {
        if !self.is_valid() {
            return false;
        }
        match self.distance.total_cmp(&other.distance) {
            Ordering::Less => true,
            Ordering::Equal => self.size < other.size,
            Ordering::Greater => false,
        }
    }

    /// True when the distance is within `tolerance`
    pub fn is_within(&self, tolerance: f64) -> bool {
        self.distance <= tolerance
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::WORST
    }
}

#[cfg(test)]
mod tests {
    use super::{Score, distance};
    use crate::expression::ExpressionError;

    #[test]
    fn test_distance() {
        assert_eq!(distance(Ok(3.0), 5.0), 2.0);
        assert_eq!(distance(Ok(-1.0), 1.0), 2.0);
        assert_eq!(
            distance(Err(ExpressionError::DivisionByZero), 0.0),
            f64::INFINITY
        );
        assert_eq!(distance(Ok(f64::MAX), -f64::MAX), f64::INFINITY);
    }

    #[test]
    fn test_smaller_distance_wins() {
        assert!(Score::new(0.1, 9).is_better_than(&Score::new(0.2, 1)));
        assert!(!Score::new(0.2, 1).is_better_than(&Score::new(0.1, 9)));
    }

    #[test]
    fn test_fewer_nodes_break_ties() {
        assert!(Score::new(0.5, 3).is_better_than(&Score::new(0.5, 5)));
        assert!(!Score::new(0.5, 5).is_better_than(&Score::new(0.5, 3)));
    }

    #[test]
    fn test_equal_scores_keep_first_found() {
        assert!(!Score::new(0.5, 3).is_better_than(&Score::new(0.5, 3)));
    }

    #[test]
    fn test_invalid_never_improves() {
        assert!(!Score::new(f64::INFINITY, 1).is_better_than(&Score::WORST));
        assert!(Score::new(1e9, 30).is_better_than(&Score::WORST));
        assert!(!Score::default().is_valid());
    }
}
