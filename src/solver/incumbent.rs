//! Shared best-so-far slot.
//!
//! Every chain publishes its improvements here. The authoritative incumbent
//! lives behind a `Mutex`; an atomic copy of its distance lets chains skip
//! the lock (and the cost of building an owned tree) for candidates that
//! cannot win. Installation is compare-and-improve: a candidate replaces the
//! incumbent only if its [`Score`] is strictly better, so concurrent chains
//! can never regress the shared result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::expression::Expression;
use crate::solver::score::Score;

/// A candidate that became the best known expression
#[derive(Debug, Clone, PartialEq)]
pub struct Incumbent {
    pub expression: Expression,
    pub value: f64,
    pub score: Score,
    /// Chain that found it
    pub chain: usize,
    /// Time since the search started
    pub found_after: Duration,
}

/// One entry of the improvement history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Improvement {
    pub score: Score,
    pub chain: usize,
    pub found_after: Duration,
}

#[derive(Debug, Default)]
struct Slot {
    best: Option<Incumbent>,
    history: Vec<Improvement>,
}

#[derive(Debug)]
pub struct SharedIncumbent {
    /// `f64` bits of the incumbent distance, `+inf` while empty
    best_distance: AtomicU64,
    slot: Mutex<Slot>,
}

impl Default for SharedIncumbent {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedIncumbent {
    pub fn new() -> Self {
        Self {
            best_distance: AtomicU64::new(f64::INFINITY.to_bits()),
            slot: Mutex::new(Slot::default()),
        }
    }

    /// Distance of the current incumbent, `+inf` when there is none
    #[inline]
    pub fn best_distance(&self) -> f64 {
        f64::from_bits(self.best_distance.load(Ordering::Relaxed))
    }

    /// Cheap pre-check without locking. A `true` answer may still lose the
    /// race in [`SharedIncumbent::try_install`].
    #[inline]
    pub fn may_improve(&self, score: &Score) -> bool {
        score.is_valid() && score.distance <= self.best_distance()
    }

    /// Install `candidate` if it is strictly better than the incumbent.
    /// Returns `true` if it was installed.
    pub fn try_install(&self, candidate: Incumbent) -> bool {
        if !self.may_improve(&candidate.score) {
            return false;
        }

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        // Another chain may have installed something better while we waited
        let current = slot.best.as_ref().map_or(Score::WORST, |b| b.score);
        if !candidate.score.is_better_than(&current) {
            return false;
        }

        self.best_distance
            .store(candidate.score.distance.to_bits(), Ordering::Relaxed);
        slot.history.push(Improvement {
            score: candidate.score,
            chain: candidate.chain,
            found_after: candidate.found_after,
        });
        slot.best = Some(candidate);
        true
    }

    /// Cloned copy of the current incumbent, if any
    pub fn snapshot(&self) -> Option<Incumbent> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .best
            .clone()
    }

    /// Every installed improvement, in installation order
    pub fn history(&self) -> Vec<Improvement> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .history
            .clone()
    }

    /// Take the incumbent and its history out of the slot
    pub fn into_parts(self) -> (Option<Incumbent>, Vec<Improvement>) {
        let slot = self
            .slot
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        (slot.best, slot.history)
    }
}

#[cfg(test)]
mod tests {
    use super::{Incumbent, SharedIncumbent};
    use crate::expression::Expression;
    use crate::solver::score::Score;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn candidate(distance: f64, size: usize, chain: usize) -> Incumbent {
        Incumbent {
            expression: Expression::Digit(1),
            value: 1.0,
            score: Score::new(distance, size),
            chain,
            found_after: Duration::ZERO,
        }
    }

    #[test]
    fn test_initial_state() {
        let inc = SharedIncumbent::new();
        assert_eq!(inc.best_distance(), f64::INFINITY);
        assert!(inc.snapshot().is_none());
        assert!(inc.history().is_empty());
    }

    #[test]
    fn test_install_better_candidate() {
        let inc = SharedIncumbent::new();
        assert!(inc.try_install(candidate(0.5, 3, 0)));
        assert_eq!(inc.best_distance(), 0.5);
        assert!(inc.try_install(candidate(0.5, 1, 1)));
        assert_eq!(inc.snapshot().map(|b| b.chain), Some(1));
    }

    #[test]
    fn test_reject_worse_equal_or_invalid() {
        let inc = SharedIncumbent::new();
        assert!(inc.try_install(candidate(0.5, 3, 0)));
        assert!(!inc.try_install(candidate(0.7, 1, 1)));
        assert!(!inc.try_install(candidate(0.5, 3, 2)));
        assert!(!inc.try_install(candidate(f64::INFINITY, 1, 3)));
        assert_eq!(inc.snapshot().map(|b| b.chain), Some(0));
        assert_eq!(inc.history().len(), 1);
    }

    #[test]
    fn test_concurrent_installs_never_regress() {
        let inc = Arc::new(SharedIncumbent::new());
        let handles: Vec<_> = (0..8)
            .map(|chain| {
                let inc = Arc::clone(&inc);
                thread::spawn(move || {
                    for step in 0..200u32 {
                        let distance = f64::from(1000 - step) + f64::from(chain as u32) / 10.0;
                        inc.try_install(candidate(distance, 5, chain));
                    }
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().is_ok());
        }

        let history = inc.history();
        assert!(!history.is_empty());
        assert!(
            history
                .windows(2)
                .all(|w| matches!(w, [a, b] if b.score.is_better_than(&a.score)))
        );
        assert_eq!(inc.best_distance(), 801.0);
    }
}
