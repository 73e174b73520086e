//! Tuning constants for lookbehind protection.
//!
//! These values describe how much already-played data is kept pinned behind the
//! playback position, and how often the pinned window is allowed to move.

use std::time::Duration;

pub const MIB: u64 = 1024 * 1024;

// ============================================================================
// Retention defaults
// ============================================================================

/// Seconds of already-played content to keep resident by default
pub const DEFAULT_RETENTION_SECS: u32 = 30;

/// Default absolute ceiling for the lookbehind budget (50 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 50 * MIB;

/// Below this size a lookbehind window is not worth keeping (10 MiB)
pub const MIN_RETENTION_BYTES: u64 = 10 * MIB;

// ============================================================================
// Bitrate estimation
// ============================================================================

/// Bitrate assumed when the media duration is unknown.
/// 2.5 MiB/s is representative of typical 1080p content.
pub const FALLBACK_BITRATE: u64 = 2500 * 1024;

// ============================================================================
// Memory arbitration
// ============================================================================

/// Lookbehind may use at most 1/N of the streaming memory budget.
/// The rest is left to the forward read-ahead buffer.
pub const LOOKBEHIND_BUDGET_DIVISOR: u64 = 2;

/// Memory kept aside for engine internals when fitting lookbehind into the budget
pub const ENGINE_OVERHEAD_BYTES: u64 = 8 * MIB;

/// Extra pieces a memory store may hold beyond its byte capacity
pub const STORE_SLACK_PIECES: usize = 2;

// ============================================================================
// Position tracking
// ============================================================================

/// Minimum wall-clock interval between two accepted position updates
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(100);
