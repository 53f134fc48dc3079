//! Deduplication configuration.

use super::bloom::{MAX_FILTER_BITS, MembershipFilter};
use super::types::InsertOrdering;
use crate::{Error, Result};
use serde::Serialize;

/// Default expected number of distinct items.
pub const DEFAULT_CAPACITY: usize = 100_000;

/// Default target false-positive rate of the membership filter.
pub const DEFAULT_ERROR_RATE: f64 = 0.1;

/// Configuration for the deduplication service.
///
/// # Example
///
/// ```rust
/// use feedsift::services::deduplication::{DeduplicationConfig, InsertOrdering};
///
/// let config = DeduplicationConfig::default()
///     .with_capacity(10_000)
///     .with_error_rate(0.01)
///     .with_insert_ordering(InsertOrdering::StoreFirst);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeduplicationConfig {
    /// Expected number of distinct items the filter is sized for.
    pub capacity: usize,
    /// Target false-positive rate at capacity.
    pub error_rate: f64,
    /// Filter/store write ordering for accepted items.
    pub insert_ordering: InsertOrdering,
}

impl DeduplicationConfig {
    /// Builder method to set the filter capacity.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builder method to set the target false-positive rate.
    #[must_use]
    pub const fn with_error_rate(mut self, error_rate: f64) -> Self {
        self.error_rate = error_rate;
        self
    }

    /// Builder method to set the insert ordering.
    #[must_use]
    pub const fn with_insert_ordering(mut self, ordering: InsertOrdering) -> Self {
        self.insert_ordering = ordering;
        self
    }

    /// Checks that the filter can be sized from these values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `capacity` is zero, `error_rate`
    /// is not strictly between 0 and 1, or the resulting filter would exceed
    /// [`MAX_FILTER_BITS`].
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidInput(
                "dedup capacity must be greater than 0".to_string(),
            ));
        }
        if !(self.error_rate > 0.0 && self.error_rate < 1.0) {
            return Err(Error::InvalidInput(format!(
                "dedup error rate must be in (0, 1), got {}",
                self.error_rate
            )));
        }
        let bits = MembershipFilter::optimal_bit_len(self.capacity, self.error_rate);
        if bits > MAX_FILTER_BITS {
            return Err(Error::InvalidInput(format!(
                "dedup capacity {} at error rate {} needs {bits} filter bits, limit is {MAX_FILTER_BITS}",
                self.capacity, self.error_rate
            )));
        }
        Ok(())
    }
}

impl Default for DeduplicationConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            error_rate: DEFAULT_ERROR_RATE,
            insert_ordering: InsertOrdering::default(),
        }
    }
}
