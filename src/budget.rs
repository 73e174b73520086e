//! Streaming memory budget shared by read-ahead and lookbehind.

use serde::{Deserialize, Serialize};

use crate::constants::{ENGINE_OVERHEAD_BYTES, LOOKBEHIND_BUDGET_DIVISOR};

/// How the streaming storage memory is split.
///
/// The forward read-ahead buffer and the lookbehind window draw from the same
/// `total`. Lookbehind never gets more than half of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryBudget {
    /// Total bytes the piece store may hold.
    pub total: u64,
    /// Bytes reserved for the forward read-ahead buffer.
    #[serde(default)]
    pub forward_buffer: u64,
    /// Bytes reserved for the end-of-file buffer (container indexes, trailers).
    #[serde(default)]
    pub end_buffer: u64,
}

impl MemoryBudget {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            forward_buffer: 0,
            end_buffer: 0,
        }
    }

    pub fn with_forward_buffer(mut self, bytes: u64) -> Self {
        self.forward_buffer = bytes;
        self
    }

    pub fn with_end_buffer(mut self, bytes: u64) -> Self {
        self.end_buffer = bytes;
        self
    }

    /// Hard architectural cap: half of the total budget.
    pub fn lookbehind_ceiling(&self) -> u64 {
        lookbehind_ceiling(self.total)
    }

    /// Bytes left for lookbehind once the reserved buffers and engine overhead
    /// are accounted for, never more than [`lookbehind_ceiling`](Self::lookbehind_ceiling).
    pub fn headroom(&self) -> u64 {
        let reserved = self
            .forward_buffer
            .saturating_add(self.end_buffer)
            .saturating_add(ENGINE_OVERHEAD_BYTES);
        self.total
            .saturating_sub(reserved)
            .min(self.lookbehind_ceiling())
    }
}

pub(crate) fn lookbehind_ceiling(total: u64) -> u64 {
    total / LOOKBEHIND_BUDGET_DIVISOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MIB;

    #[test]
    fn test_ceiling_is_half() {
        assert_eq!(MemoryBudget::new(200 * MIB).lookbehind_ceiling(), 100 * MIB);
        assert_eq!(MemoryBudget::new(1).lookbehind_ceiling(), 0);
    }

    #[test]
    fn test_headroom_subtracts_reserved() {
        let budget = MemoryBudget::new(200 * MIB)
            .with_forward_buffer(100 * MIB)
            .with_end_buffer(4 * MIB);
        assert_eq!(budget.headroom(), 88 * MIB);
    }

    #[test]
    fn test_headroom_capped_at_ceiling() {
        let budget = MemoryBudget::new(200 * MIB).with_forward_buffer(10 * MIB);
        assert_eq!(budget.headroom(), 100 * MIB);
    }

    #[test]
    fn test_headroom_saturates() {
        let budget = MemoryBudget::new(16 * MIB).with_forward_buffer(32 * MIB);
        assert_eq!(budget.headroom(), 0);
    }
}
