use log::{debug, trace};

use crate::inputs::errors::PoolError;

/// Number of distinct decimal digits a pool tracks
pub const DIGIT_COUNT: usize = 10;

/// Finite multiset of digits with per-value remaining counts.
///
/// The initial counts are fixed once the pool is built; `consume` and
/// `restore` move units between "available" and "in use" and can never push
/// a count below zero or above its initial value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigitPool {
    initial: [u32; DIGIT_COUNT],
    remaining: [u32; DIGIT_COUNT],
}

#[inline]
fn slot(counts: &mut [u32; DIGIT_COUNT], digit: u8) -> Result<&mut u32, PoolError> {
    counts
        .get_mut(usize::from(digit))
        .ok_or(PoolError::NotADigit(digit))
}

impl DigitPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from explicit per-digit counts
    pub fn from_counts(counts: [u32; DIGIT_COUNT]) -> Self {
        Self {
            initial: counts,
            remaining: counts,
        }
    }

    /// Build a pool holding one unit for every listed digit
    ///
    /// # Errors
    ///
    /// Returns `PoolError::NotADigit` if any value is greater than 9.
    pub fn from_digits(digits: &[u8]) -> Result<Self, PoolError> {
        let mut pool = Self::new();
        for &digit in digits {
            pool.add_unit(digit)?;
        }
        Ok(pool)
    }

    /// Grow the pool by one unit of `digit`. Only used while building a pool.
    pub(crate) fn add_unit(&mut self, digit: u8) -> Result<(), PoolError> {
        *slot(&mut self.initial, digit)? += 1;
        *slot(&mut self.remaining, digit)? += 1;
        Ok(())
    }

    pub fn available_count(&self, digit: u8) -> u32 {
        self.remaining
            .get(usize::from(digit))
            .copied()
            .unwrap_or(0)
    }

    pub fn initial_count(&self, digit: u8) -> u32 {
        self.initial.get(usize::from(digit)).copied().unwrap_or(0)
    }

    /// Units currently available for leaf construction
    pub fn total_available(&self) -> u32 {
        self.remaining.iter().sum()
    }

    /// Units the pool was built with
    pub fn total_units(&self) -> u32 {
        self.initial.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_units() == 0
    }

    /// Distinct digits with at least one available unit, in ascending order
    pub fn available_digits(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..)
            .zip(self.remaining.iter())
            .filter(|(_, count)| **count > 0)
            .map(|(digit, _)| digit)
    }

    /// Take one unit of `digit` out of the pool
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Exhausted` if no unit is left, or
    /// `PoolError::NotADigit` for values above 9.
    pub fn consume(&mut self, digit: u8) -> Result<(), PoolError> {
        let count = slot(&mut self.remaining, digit)?;
        if *count == 0 {
            trace!("Digit {} exhausted", digit);
            return Err(PoolError::Exhausted(digit));
        }
        *count -= 1;
        Ok(())
    }

    /// Put one unit of `digit` back into the pool
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Overfull` if every unit of `digit` is already available.
    pub fn restore(&mut self, digit: u8) -> Result<(), PoolError> {
        let initial = self.initial_count(digit);
        let count = slot(&mut self.remaining, digit)?;
        if *count >= initial {
            return Err(PoolError::Overfull(digit));
        }
        *count += 1;
        Ok(())
    }

    /// True when every unit the pool was built with is available again
    pub fn is_balanced(&self) -> bool {
        self.initial == self.remaining
    }

    /// Open a scoped acquisition. Units taken through the lease are returned
    /// to the pool when it is dropped.
    pub fn lease(&mut self) -> DigitLease<'_> {
        DigitLease {
            pool: self,
            taken: Vec::new(),
        }
    }
}

/// Scoped view of a [`DigitPool`] that restores every unit it took on drop
#[derive(Debug)]
pub struct DigitLease<'a> {
    pool: &'a mut DigitPool,
    taken: Vec<u8>,
}

impl DigitLease<'_> {
    /// Consume one unit of `digit` for the lifetime of the lease
    ///
    /// # Errors
    ///
    /// Propagates `DigitPool::consume` failures; nothing is recorded then.
    pub fn take(&mut self, digit: u8) -> Result<(), PoolError> {
        self.pool.consume(digit)?;
        self.taken.push(digit);
        Ok(())
    }

    pub fn available_count(&self, digit: u8) -> u32 {
        self.pool.available_count(digit)
    }

    pub fn total_available(&self) -> u32 {
        self.pool.total_available()
    }

    pub fn available_digits(&self) -> impl Iterator<Item = u8> + '_ {
        self.pool.available_digits()
    }

    /// Digits taken so far, in acquisition order
    pub fn taken(&self) -> &[u8] {
        &self.taken
    }
}

impl Drop for DigitLease<'_> {
    fn drop(&mut self) {
        for digit in self.taken.drain(..) {
            if let Err(e) = self.pool.restore(digit) {
                debug!("Lease could not restore digit {}: {}", digit, e);
            }
        }
    }
}
