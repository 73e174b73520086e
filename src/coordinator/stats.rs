use serde::Serialize;

/// Point-in-time lookbehind statistics for monitoring.
///
/// Budget and position come from the manager; piece counts and memory use are
/// the store's own view and may briefly lag the last published window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub enabled: bool,
    /// Effective lookbehind budget.
    pub configured_bytes: u64,
    pub configured_mb: u64,
    /// Bytes of protected data resident in the store.
    pub actual_bytes: u64,
    pub actual_mb: u64,
    pub protected_pieces: usize,
    pub available_pieces: usize,
    pub time_seconds: u32,
    /// Torrent piece at the last accepted position, not clamped to the piece
    /// count.
    pub current_piece: u32,
}
