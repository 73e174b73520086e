//! Lookbehind size policy.
//!
//! Turns a retention duration into a byte budget. The raw size is
//! `bitrate * retention_seconds`; it is then capped by the configured maximum
//! and by half of the shared streaming memory budget, and only then checked
//! against the [`MIN_RETENTION_BYTES`] floor. Applying the caps first means a
//! stream with very little memory is disabled instead of being forced up to a
//! floor it cannot afford.

use tracing::{debug, warn};

use crate::budget::lookbehind_ceiling;
use crate::config::RetentionConfig;
use crate::constants::{MIB, MIN_RETENTION_BYTES};

/// Computes the lookbehind byte budget for one stream.
///
/// Returns zero when the feature should stay inert for this stream.
///
/// # Examples
///
/// ```
/// use lookbehind::policy::compute_size;
///
/// // 750 KB/s for 30 seconds fits comfortably under both caps
/// assert_eq!(compute_size(750_000, 30, 50 * 1024 * 1024, 200 * 1024 * 1024), 22_500_000);
/// ```
pub fn compute_size(bitrate: u64, retention_seconds: u32, max_bytes: u64, memory_budget: u64) -> u64 {
    let raw = bitrate.saturating_mul(u64::from(retention_seconds));
    apply_limits(raw, max_bytes, memory_budget)
}

/// Same as [`compute_size`], reading the inputs from a [`RetentionConfig`].
pub fn retention_size(config: &RetentionConfig, bitrate: u64, memory_budget: u64) -> u64 {
    if !config.enabled {
        return 0;
    }
    compute_size(bitrate, config.retention_seconds, config.max_bytes, memory_budget)
}

/// Clamps a requested size by the configured and shared ceilings, then applies
/// the floor.
pub fn apply_limits(requested: u64, max_bytes: u64, memory_budget: u64) -> u64 {
    if requested == 0 {
        return 0;
    }

    let mut size = requested;

    if size > max_bytes {
        debug!(
            "Lookbehind capped to configured maximum {} MB",
            max_bytes / MIB
        );
        size = max_bytes;
    }

    let shared_cap = lookbehind_ceiling(memory_budget);
    if size > shared_cap {
        warn!(
            "Lookbehind capped to {} MB (50% of {} MB streaming memory)",
            shared_cap / MIB,
            memory_budget / MIB
        );
        size = shared_cap;
    }

    if size > 0 && size < MIN_RETENTION_BYTES {
        let ceiling = max_bytes.min(shared_cap);
        if ceiling >= MIN_RETENTION_BYTES {
            size = MIN_RETENTION_BYTES;
        } else {
            warn!(
                "Insufficient memory for lookbehind (<{} MB), disabling for this stream",
                MIN_RETENTION_BYTES / MIB
            );
            size = 0;
        }
    }

    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitrate::estimate_bitrate;
    use crate::constants::DEFAULT_MAX_BYTES;

    #[test]
    fn test_size_unaffected_by_caps() {
        let bitrate = estimate_bitrate(2_700_000_000, 3600.0);
        let size = compute_size(bitrate, 30, 52_428_800, 200 * MIB);
        assert_eq!(size, 22_500_000);
    }

    #[test]
    fn test_size_capped_by_max_bytes() {
        let bitrate = estimate_bitrate(500_000_000, 0.0);
        assert_eq!(bitrate, 2_560_000);
        let size = compute_size(bitrate, 30, 52_428_800, 200 * MIB);
        assert_eq!(size, 52_428_800);
    }

    #[test]
    fn test_size_capped_by_shared_budget() {
        let size = compute_size(2_560_000, 30, DEFAULT_MAX_BYTES, 64 * MIB);
        assert_eq!(size, 32 * MIB);
    }

    #[test]
    fn test_zero_retention_is_inert() {
        assert_eq!(compute_size(2_560_000, 0, DEFAULT_MAX_BYTES, 200 * MIB), 0);
    }

    #[test]
    fn test_small_size_raised_to_floor() {
        // 100 KB/s * 30s = 3 MB, below the floor but the caps can afford it
        let size = compute_size(100_000, 30, DEFAULT_MAX_BYTES, 200 * MIB);
        assert_eq!(size, MIN_RETENTION_BYTES);
    }

    #[test]
    fn test_unaffordable_floor_disables() {
        let size = compute_size(2_560_000, 30, DEFAULT_MAX_BYTES, 12 * MIB);
        assert_eq!(size, 0);

        let size = compute_size(2_560_000, 30, 4 * MIB, 200 * MIB);
        assert_eq!(size, 0);
    }

    #[test]
    fn test_disabled_config_yields_zero() {
        let config = RetentionConfig::disabled();
        assert_eq!(retention_size(&config, 2_560_000, 200 * MIB), 0);
    }

    #[test]
    fn test_overflow_saturates() {
        let size = compute_size(u64::MAX, u32::MAX, DEFAULT_MAX_BYTES, u64::MAX);
        assert_eq!(size, DEFAULT_MAX_BYTES);
    }
}
