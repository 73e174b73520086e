//! Piece store capability consumed by lookbehind protection.
//!
//! The coordinator never looks inside the storage engine. It talks to it
//! through [`PieceStore`], addressed by an opaque [`StoreHandle`], so the same
//! coordinator works against per-torrent storage and session-level disk I/O
//! alike.
//!
//! # Components
//!
//! - [`PieceStore`] - Pin list and residency reporting
//! - [`MemoryPieceStore`] - Bounded in-memory store with pin-aware LRU eviction
//! - [`StoreRegistry`] - Session-wide map of info hash to store
//!
//! # Examples
//!
//! ```
//! use bytes::Bytes;
//! use lookbehind::store::{MemoryPieceStore, PieceStore};
//!
//! let store = MemoryPieceStore::new(16384, 100, 4 * 16384);
//! store.write_piece(3, Bytes::from(vec![0u8; 16384])).unwrap();
//!
//! store.set_protected_pieces(&[2, 3]);
//! assert!(store.is_piece_available(3));
//! assert!(!store.is_piece_available(2)); // pinned but not resident
//! ```

mod error;
mod memory;
mod piece_set;
mod registry;

use std::sync::Arc;

pub use error::StoreError;
pub use memory::MemoryPieceStore;
pub use piece_set::PieceSet;
pub use registry::StoreRegistry;

/// Pin-list interface of a bounded piece cache.
///
/// Pinned pieces are never evicted. Counts reported here are the store's own
/// view and may lag behind the pin list last published to it.
pub trait PieceStore: Send + Sync {
    /// Replaces the pinned set. An empty slice clears all pins.
    fn set_protected_pieces(&self, pieces: &[u32]);

    /// Removes every pin.
    fn clear_protection(&self) {
        self.set_protected_pieces(&[]);
    }

    /// True if the piece is pinned and its data is resident.
    fn is_piece_available(&self, piece: u32) -> bool;

    /// Number of pinned pieces.
    fn protected_count(&self) -> usize;

    /// Number of pinned pieces whose data is resident.
    fn available_count(&self) -> usize;

    /// Bytes of resident pinned data.
    fn memory_used_bytes(&self) -> u64;
}

/// Opaque per-stream handle to a piece store.
pub type StoreHandle = Arc<dyn PieceStore>;
