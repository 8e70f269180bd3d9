//! Memory accounting for atom tables.
//!
//! Every entry a table creates is charged against a [`MemoryBudget`] before
//! any allocation happens. Operations that fail later release their charge,
//! so a failed intern never changes the accounted usage.

use crate::error::{AtomsError, AtomsResult};

/// Byte budget shared by all entries of one table
#[derive(Debug, Clone, Default)]
pub struct MemoryBudget {
    limit: Option<usize>,
    used: usize,
    peak: usize,
}

impl MemoryBudget {
    /// Create a budget, unlimited when `limit` is `None`
    pub const fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            used: 0,
            peak: 0,
        }
    }

    /// Charge `bytes` against the budget
    ///
    /// Fails without changing the budget if the charge would exceed the
    /// limit.
    pub fn charge(&mut self, bytes: usize) -> AtomsResult<()> {
        let Some(used) = self.used.checked_add(bytes) else {
            return Err(AtomsError::out_of_memory(bytes));
        };
        if let Some(limit) = self.limit {
            if used > limit {
                return Err(AtomsError::out_of_memory(bytes));
            }
        }
        self.used = used;
        self.peak = self.peak.max(used);
        Ok(())
    }

    /// Return `bytes` previously charged
    pub fn release(&mut self, bytes: usize) {
        debug_assert!(bytes <= self.used, "releasing more than was charged");
        self.used = self.used.saturating_sub(bytes);
    }

    /// Bytes currently charged
    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    /// Highest number of bytes charged at once
    #[inline]
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// Configured limit, if any
    #[inline]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Bytes left before the limit, `None` when unlimited
    pub fn available(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.used))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_budget() {
        let mut budget = MemoryBudget::new(None);
        budget.charge(1 << 20).unwrap();
        assert_eq!(budget.used(), 1 << 20);
        assert_eq!(budget.available(), None);
    }

    #[test]
    fn test_limit_rejects_without_charging() {
        let mut budget = MemoryBudget::new(Some(100));
        budget.charge(60).unwrap();
        assert_eq!(
            budget.charge(41),
            Err(AtomsError::OutOfMemory { requested: 41 })
        );
        assert_eq!(budget.used(), 60);
        assert_eq!(budget.available(), Some(40));
        budget.charge(40).unwrap();
        assert_eq!(budget.available(), Some(0));
    }

    #[test]
    fn test_release_and_peak() {
        let mut budget = MemoryBudget::new(Some(100));
        budget.charge(80).unwrap();
        budget.release(50);
        assert_eq!(budget.used(), 30);
        assert_eq!(budget.peak(), 80);
    }

    #[test]
    fn test_overflowing_charge() {
        let mut budget = MemoryBudget::new(None);
        budget.charge(usize::MAX).unwrap();
        assert!(budget.charge(1).is_err());
        assert_eq!(budget.used(), usize::MAX);
    }
}
