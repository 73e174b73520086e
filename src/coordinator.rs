//! Lookbehind protection for streaming playback.
//!
//! While a file streams, already-played pieces are prime eviction candidates in
//! a bounded memory store, yet they are exactly what a backward seek needs.
//! [`LookbehindManager`] keeps a window of the most recently played pieces
//! pinned so that seeking back a few seconds is served from memory.
//!
//! # Overview
//!
//! On each accepted position update the manager:
//!
//! 1. Converts the file position to a torrent position
//! 2. Computes the window of pieces covering the lookbehind budget, excluding
//!    the piece being played
//! 3. Replaces the store's pin list with that window
//!
//! The budget is derived once from the media bitrate and the retention time,
//! see [`policy`](crate::policy).
//!
//! # Examples
//!
//! ```
//! use lookbehind::{LookbehindManager, MemoryPieceStore, RetentionConfig, StoreHandle, StreamContext};
//!
//! const MIB: u64 = 1024 * 1024;
//!
//! let store = MemoryPieceStore::new(MIB, 2600, 200 * MIB);
//! let context = StreamContext::new(MIB, 2600, 2_700_000_000, 0)
//!     .with_duration(3600.0)
//!     .with_memory_budget(200 * MIB);
//!
//! let manager = LookbehindManager::new(
//!     context,
//!     RetentionConfig::default(),
//!     Some(store.clone() as StoreHandle),
//! );
//!
//! manager.update_position(50_000_000);
//! assert_eq!(manager.protected_range(), 26..47);
//! assert!(manager.is_in_window(30));
//! assert!(!manager.is_in_window(47));
//! ```

mod manager;
mod stats;

pub use manager::{LookbehindManager, ProtectionState};
pub use stats::StatsSnapshot;
