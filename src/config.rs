//! Lookbehind retention settings.
//!
//! A [`RetentionConfig`] is built once by the caller (usually from the
//! application's settings) and handed to each
//! [`LookbehindManager`](crate::LookbehindManager) explicitly. Nothing in this
//! crate reads configuration from global state.
//!
//! # Examples
//!
//! ```
//! use lookbehind::{MemoryBudget, RetentionConfig};
//!
//! let mut config = RetentionConfig::default().with_retention_seconds(45);
//!
//! // Fit the configured ceiling into a 64 MiB streaming budget
//! let budget = MemoryBudget::new(64 * 1024 * 1024).with_forward_buffer(20 * 1024 * 1024);
//! config.enforce_constraints(&budget);
//! assert!(config.max_bytes <= budget.headroom());
//! ```

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::budget::MemoryBudget;
use crate::constants::{DEFAULT_MAX_BYTES, DEFAULT_RETENTION_SECS, MIB, MIN_RETENTION_BYTES};

/// Settings controlling how much played content is protected from eviction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Master switch (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds of playback to keep behind the current position (default: 30).
    /// Zero disables sizing.
    #[serde(default = "default_retention_seconds")]
    pub retention_seconds: u32,

    /// Absolute ceiling in bytes (default: 50 MiB)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Re-derive `max_bytes` whenever the streaming memory budget changes
    /// (default: true)
    #[serde(default = "default_true")]
    pub auto_adjust: bool,
}

fn default_true() -> bool {
    true
}

fn default_retention_seconds() -> u32 {
    DEFAULT_RETENTION_SECS
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retention_seconds: DEFAULT_RETENTION_SECS,
            max_bytes: DEFAULT_MAX_BYTES,
            auto_adjust: true,
        }
    }
}

impl RetentionConfig {
    /// A configuration with lookbehind switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_retention_seconds(mut self, seconds: u32) -> Self {
        self.retention_seconds = seconds;
        self
    }

    pub fn with_max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    pub fn with_auto_adjust(mut self, auto_adjust: bool) -> Self {
        self.auto_adjust = auto_adjust;
        self
    }

    /// True when the settings can produce a nonzero budget at all.
    pub fn is_active(&self) -> bool {
        self.enabled && self.retention_seconds > 0 && self.max_bytes > 0
    }

    /// Fits `max_bytes` into the headroom left by the forward and end buffers.
    ///
    /// Caps `max_bytes` when it exceeds what the budget can spare, and turns the
    /// feature off entirely when the result drops below
    /// [`MIN_RETENTION_BYTES`]. Returns `true` if anything changed.
    pub fn enforce_constraints(&mut self, budget: &MemoryBudget) -> bool {
        if !self.enabled {
            return false;
        }

        let mut changed = false;
        let available = budget.headroom();

        if self.max_bytes > available {
            warn!(
                "Lookbehind size {} MB exceeds available {} MB, capping",
                self.max_bytes / MIB,
                available / MIB
            );
            self.max_bytes = available;
            changed = true;
        }

        if self.max_bytes < MIN_RETENTION_BYTES {
            warn!(
                "Insufficient memory for lookbehind (<{} MB), disabling",
                MIN_RETENTION_BYTES / MIB
            );
            self.enabled = false;
            changed = true;
        }

        changed
    }

    /// Hook for memory budget changes. Only acts when `auto_adjust` is set.
    pub fn on_budget_changed(&mut self, budget: &MemoryBudget) -> bool {
        if !self.auto_adjust {
            return false;
        }
        self.enforce_constraints(budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RetentionConfig::default();
        assert!(config.enabled);
        assert_eq!(config.retention_seconds, 30);
        assert_eq!(config.max_bytes, 50 * MIB);
        assert!(config.auto_adjust);
        assert!(config.is_active());
    }

    #[test]
    fn test_inactive_when_retention_zero() {
        let config = RetentionConfig::default().with_retention_seconds(0);
        assert!(!config.is_active());
        assert!(!RetentionConfig::disabled().is_active());
    }

    #[test]
    fn test_enforce_within_headroom_is_noop() {
        let mut config = RetentionConfig::default();
        let budget = MemoryBudget::new(512 * MIB).with_forward_buffer(64 * MIB);
        assert!(!config.enforce_constraints(&budget));
        assert_eq!(config.max_bytes, 50 * MIB);
        assert!(config.enabled);
    }

    #[test]
    fn test_enforce_caps_to_headroom() {
        let mut config = RetentionConfig::default();
        let budget = MemoryBudget::new(100 * MIB).with_forward_buffer(60 * MIB);
        assert!(config.enforce_constraints(&budget));
        assert_eq!(config.max_bytes, 32 * MIB);
        assert!(config.enabled);
    }

    #[test]
    fn test_enforce_disables_below_floor() {
        let mut config = RetentionConfig::default();
        let budget = MemoryBudget::new(40 * MIB).with_forward_buffer(25 * MIB);
        assert!(config.enforce_constraints(&budget));
        assert_eq!(config.max_bytes, 7 * MIB);
        assert!(!config.enabled);
    }

    #[test]
    fn test_enforce_skips_disabled_config() {
        let mut config = RetentionConfig::disabled();
        assert!(!config.enforce_constraints(&MemoryBudget::new(0)));
        assert_eq!(config.max_bytes, 50 * MIB);
    }

    #[test]
    fn test_budget_change_respects_auto_adjust() {
        let budget = MemoryBudget::new(40 * MIB);

        let mut manual = RetentionConfig::default().with_auto_adjust(false);
        assert!(!manual.on_budget_changed(&budget));
        assert_eq!(manual.max_bytes, 50 * MIB);

        let mut auto = RetentionConfig::default();
        assert!(auto.on_budget_changed(&budget));
        assert_eq!(auto.max_bytes, 20 * MIB);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: RetentionConfig =
            serde_json::from_str(r#"{"retention_seconds": 60}"#).unwrap();
        assert_eq!(config.retention_seconds, 60);
        assert!(config.enabled);
        assert_eq!(config.max_bytes, 50 * MIB);
    }
}
