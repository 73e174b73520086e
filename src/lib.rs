//! lookbehind - Backward-seek protection for torrent streaming
//!
//! When a torrent is streamed for playback, downloaded pieces live in a
//! bounded-memory store that evicts under pressure. Pieces that were just
//! played are the first to go, yet they are exactly what a backward seek
//! needs. This library decides which already-played pieces to pin and
//! publishes that decision to the store.
//!
//! # Modules
//!
//! - [`bitrate`] - Media bitrate estimation
//! - [`budget`] - Streaming memory shared by read-ahead and lookbehind
//! - [`config`] - Retention settings
//! - [`policy`] - Retention time to byte budget
//! - [`window`] - Playback position to piece window
//! - [`store`] - Piece store capability, in-memory store, registry
//! - [`coordinator`] - The stateful [`LookbehindManager`]

pub mod bitrate;
pub mod budget;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod error;
pub mod policy;
pub mod store;
pub mod window;

pub use bitrate::estimate_bitrate;
pub use budget::MemoryBudget;
pub use config::RetentionConfig;
pub use coordinator::{LookbehindManager, ProtectionState, StatsSnapshot};
pub use error::LookbehindError;
pub use policy::{compute_size, retention_size};
pub use store::{MemoryPieceStore, PieceStore, StoreError, StoreHandle, StoreRegistry};
pub use window::{compute_window, StreamContext};
