use std::ops::Range;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::stats::StatsSnapshot;
use crate::bitrate::estimate_bitrate;
use crate::config::RetentionConfig;
use crate::constants::{DEBOUNCE_INTERVAL, MIB};
use crate::error::LookbehindError;
use crate::policy::{apply_limits, compute_size};
use crate::store::StoreHandle;
use crate::window::{compute_window, StreamContext};

/// Lifecycle of a [`LookbehindManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionState {
    /// No budget, switched off, or no usable store. Every call is a no-op.
    Disabled,
    /// Ready, nothing protected yet.
    Idle,
    /// A nonempty window is protected.
    Tracking,
}

struct WindowState {
    enabled: bool,
    retention_seconds: u32,
    /// Budget in bytes, before the enabled switch is applied.
    budget: u64,
    current_byte_pos: u64,
    protected: Range<u32>,
    last_update: Option<Instant>,
}

impl WindowState {
    fn is_active(&self) -> bool {
        self.enabled && self.retention_seconds > 0 && self.budget > 0
    }

    /// Whether the store may currently hold pins published by this manager.
    fn holds_pins(&self) -> bool {
        self.is_active() || !self.protected.is_empty()
    }
}

/// Keeps recently played pieces pinned in the piece store.
///
/// One manager belongs to one streaming file. Playback position updates move a
/// window of protected pieces trailing the position; the window is published
/// to the store as its pin list. All mutable state sits behind a single lock
/// held for the whole compute-and-publish step, so readers never observe a
/// half-updated window.
///
/// Nothing here fails: a missing store, an invalid [`StreamContext`] or a zero
/// budget leave the manager [`Disabled`](ProtectionState::Disabled) and every
/// call becomes a no-op.
pub struct LookbehindManager {
    context: StreamContext,
    max_bytes: u64,
    store: Option<StoreHandle>,
    state: RwLock<WindowState>,
}

impl LookbehindManager {
    pub fn new(context: StreamContext, config: RetentionConfig, store: Option<StoreHandle>) -> Self {
        let check = context.validate().and_then(|()| match &store {
            Some(_) => Ok(()),
            None => Err(LookbehindError::MissingStore),
        });
        let usable = match check {
            Ok(()) => true,
            Err(e) => {
                debug!("Lookbehind inactive: {}", e);
                false
            }
        };

        let bitrate = estimate_bitrate(context.file_size, context.duration);
        let budget = if usable {
            compute_size(
                bitrate,
                config.retention_seconds,
                config.max_bytes,
                context.memory_budget,
            )
        } else {
            0
        };

        if budget > 0 && config.enabled {
            if context.duration > 0.0 {
                info!(
                    "Lookbehind initialized: {} MB for {}s (bitrate: {:.2} MB/s)",
                    budget / MIB,
                    config.retention_seconds,
                    bitrate as f64 / MIB as f64
                );
            } else {
                info!(
                    "Lookbehind initialized: {} MB for {}s",
                    budget / MIB,
                    config.retention_seconds
                );
            }
        }

        Self {
            context,
            max_bytes: config.max_bytes,
            store: if usable { store } else { None },
            state: RwLock::new(WindowState {
                enabled: config.enabled,
                retention_seconds: config.retention_seconds,
                budget,
                current_byte_pos: 0,
                protected: 0..0,
                last_update: None,
            }),
        }
    }

    /// Moves the window to a new playback position (bytes from file start).
    ///
    /// Ignored if the previous accepted update was less than
    /// [`DEBOUNCE_INTERVAL`] ago or the position moved by less than one piece.
    pub fn update_position(&self, file_pos: u64) {
        self.update_position_at(file_pos, Instant::now());
    }

    /// [`update_position`](Self::update_position) with an explicit timestamp.
    pub fn update_position_at(&self, file_pos: u64, now: Instant) {
        let Some(store) = &self.store else {
            return;
        };

        let mut state = self.state.write();
        if !state.is_active() {
            return;
        }

        if let Some(last) = state.last_update {
            if now.saturating_duration_since(last) < DEBOUNCE_INTERVAL {
                return;
            }
        }

        if state.current_byte_pos.abs_diff(file_pos) < self.context.piece_length {
            return;
        }

        state.current_byte_pos = file_pos;
        state.last_update = Some(now);
        self.recompute_locked(&mut state, store);
    }

    /// Drops the window and all pins. Use on stop, seek reset or file switch.
    pub fn clear(&self) {
        let mut state = self.state.write();
        let held_pins = state.holds_pins();
        state.protected = 0..0;
        state.current_byte_pos = 0;
        state.last_update = None;

        // The store may be shared by several files of one torrent
        if !held_pins {
            return;
        }
        if let Some(store) = &self.store {
            store.clear_protection();
            debug!("Lookbehind buffer cleared");
        }
    }

    /// Turns protection off (publishing an empty pin list) or back on.
    ///
    /// Re-enabling recomputes the window from the last known position without
    /// waiting for the next position update.
    pub fn set_enabled(&self, enabled: bool) {
        let Some(store) = &self.store else {
            return;
        };

        let mut state = self.state.write();
        if state.enabled == enabled {
            return;
        }
        let was_active = state.holds_pins();
        state.enabled = enabled;

        if enabled {
            debug!("Lookbehind enabled");
            if state.is_active() {
                self.recompute_locked(&mut state, store);
            }
        } else {
            debug!("Lookbehind disabled");
            state.protected = 0..0;
            if was_active {
                store.clear_protection();
            }
        }
    }

    /// True unless the manager is [`Disabled`](ProtectionState::Disabled).
    pub fn is_enabled(&self) -> bool {
        self.state() != ProtectionState::Disabled
    }

    /// Replaces the byte budget and recomputes the window at the current
    /// position immediately.
    ///
    /// The new size goes through the same limits as the initial one: the
    /// configured maximum, half the memory budget and the minimum floor.
    /// Ignored when the configured retention time is zero.
    pub fn set_buffer_size(&self, bytes: u64) {
        let Some(store) = &self.store else {
            return;
        };

        let mut state = self.state.write();
        if state.retention_seconds == 0 {
            return;
        }
        let was_active = state.holds_pins();
        state.budget = apply_limits(bytes, self.max_bytes, self.context.memory_budget);
        debug!(
            "Lookbehind buffer resized to {} MB (requested {} MB)",
            state.budget / MIB,
            bytes / MIB
        );

        if state.enabled && (was_active || state.is_active()) {
            self.recompute_locked(&mut state, store);
        }
    }

    /// Current byte budget, including while switched off.
    pub fn buffer_size(&self) -> u64 {
        if self.store.is_none() {
            return 0;
        }
        self.state.read().budget
    }

    /// Budget in effect: zero whenever the manager is disabled.
    pub fn size_bytes(&self) -> u64 {
        let state = self.state.read();
        if self.store.is_none() || !state.is_active() {
            return 0;
        }
        state.budget
    }

    pub fn state(&self) -> ProtectionState {
        if self.store.is_none() {
            return ProtectionState::Disabled;
        }
        let state = self.state.read();
        if !state.is_active() {
            ProtectionState::Disabled
        } else if state.protected.is_empty() {
            ProtectionState::Idle
        } else {
            ProtectionState::Tracking
        }
    }

    /// True if the piece is protected and resident in the store.
    pub fn is_available(&self, piece: u32) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        let state = self.state.read();
        if !state.is_active() {
            return false;
        }
        store.is_piece_available(piece)
    }

    /// True if the piece falls inside the current window, resident or not.
    pub fn is_in_window(&self, piece: u32) -> bool {
        if self.store.is_none() {
            return false;
        }
        let state = self.state.read();
        state.is_active() && state.protected.contains(&piece)
    }

    /// Number of pieces in the current window.
    pub fn protected_count(&self) -> usize {
        if self.store.is_none() {
            return 0;
        }
        self.state.read().protected.len()
    }

    /// Number of protected pieces the store actually holds.
    pub fn available_count(&self) -> usize {
        match &self.store {
            Some(store) if self.is_enabled() => store.available_count(),
            _ => 0,
        }
    }

    pub fn protected_range(&self) -> Range<u32> {
        self.state.read().protected.clone()
    }

    pub fn protected_pieces(&self) -> Vec<u32> {
        self.protected_range().collect()
    }

    /// Last accepted playback position, relative to the file start.
    pub fn current_position(&self) -> u64 {
        self.state.read().current_byte_pos
    }

    /// Torrent piece holding the last accepted position.
    pub fn current_piece(&self) -> u32 {
        self.context.piece_at(self.current_position())
    }

    pub fn context(&self) -> &StreamContext {
        &self.context
    }

    pub fn stats(&self) -> StatsSnapshot {
        let Some(store) = &self.store else {
            return StatsSnapshot::default();
        };

        let state = self.state.read();
        if !state.is_active() {
            return StatsSnapshot::default();
        }

        let actual_bytes = store.memory_used_bytes();
        StatsSnapshot {
            enabled: true,
            configured_bytes: state.budget,
            configured_mb: state.budget / MIB,
            actual_bytes,
            actual_mb: actual_bytes / MIB,
            protected_pieces: store.protected_count(),
            available_pieces: store.available_count(),
            time_seconds: state.retention_seconds,
            current_piece: self.context.piece_at(state.current_byte_pos),
        }
    }

    // Caller holds the write lock. Must not call back into any locking method.
    fn recompute_locked(&self, state: &mut WindowState, store: &StoreHandle) {
        let size = if state.is_active() { state.budget } else { 0 };
        state.protected = compute_window(&self.context, size, state.current_byte_pos);
        self.publish(&state.protected, store);
    }

    fn publish(&self, window: &Range<u32>, store: &StoreHandle) {
        if window.is_empty() {
            store.clear_protection();
            return;
        }

        let pieces: Vec<u32> = window.clone().collect();
        store.set_protected_pieces(&pieces);

        debug!(
            "Lookbehind: protecting pieces {}-{} ({} pieces, {} MB)",
            window.start,
            window.end - 1,
            pieces.len(),
            pieces.len() as u64 * self.context.piece_length / MIB
        );
    }
}

impl Drop for LookbehindManager {
    fn drop(&mut self) {
        if let Some(store) = &self.store {
            if !self.state.get_mut().protected.is_empty() {
                store.clear_protection();
            }
        }
    }
}
