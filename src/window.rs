//! Mapping playback positions to piece windows.
//!
//! A file occupies a contiguous byte range of the torrent starting at
//! [`StreamContext::file_offset`]. Positions handed to this module are relative
//! to the start of the file; the window is expressed in torrent piece indices.

use std::ops::Range;

use crate::error::LookbehindError;

/// Immutable per-file facts needed to place a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamContext {
    /// Torrent piece length in bytes.
    pub piece_length: u64,
    /// Number of pieces in the torrent.
    pub num_pieces: u32,
    /// Length of the streamed file in bytes.
    pub file_size: u64,
    /// Byte offset of the file's first byte within the torrent.
    pub file_offset: u64,
    /// Media duration in seconds, `0.0` if unknown.
    pub duration: f64,
    /// Streaming memory shared by read-ahead and lookbehind, in bytes.
    pub memory_budget: u64,
}

impl StreamContext {
    pub fn new(piece_length: u64, num_pieces: u32, file_size: u64, file_offset: u64) -> Self {
        Self {
            piece_length,
            num_pieces,
            file_size,
            file_offset,
            duration: 0.0,
            memory_budget: 0,
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_memory_budget(mut self, bytes: u64) -> Self {
        self.memory_budget = bytes;
        self
    }

    /// Total bytes addressed by the torrent's pieces.
    pub fn torrent_length(&self) -> u64 {
        self.piece_length.saturating_mul(u64::from(self.num_pieces))
    }

    pub fn validate(&self) -> Result<(), LookbehindError> {
        if self.piece_length == 0 {
            return Err(LookbehindError::ZeroPieceLength);
        }
        if self.num_pieces == 0 {
            return Err(LookbehindError::NoPieces);
        }
        let total = self.torrent_length();
        if self.file_offset >= total {
            return Err(LookbehindError::FileOffsetOutOfRange {
                offset: self.file_offset,
                total,
            });
        }
        Ok(())
    }

    /// Torrent piece holding the given file position.
    ///
    /// Not clamped to the piece count: a position past the end of the torrent
    /// maps to a piece index past the last piece.
    pub fn piece_at(&self, file_pos: u64) -> u32 {
        if self.piece_length == 0 {
            return 0;
        }
        let absolute = self.file_offset.saturating_add(file_pos);
        clamp_piece(absolute / self.piece_length, u32::MAX)
    }
}

/// Computes the pieces to protect for a playback position.
///
/// The window covers `size_bytes` of data ending at `file_pos`, never reaching
/// before the start of the file. The piece currently being played is excluded:
/// it belongs to the forward buffer. The result is clipped to the torrent's
/// piece range and may be empty.
///
/// # Examples
///
/// ```
/// use lookbehind::window::{compute_window, StreamContext};
///
/// let ctx = StreamContext::new(1_048_576, 1000, 1_000 * 1_048_576, 0);
/// assert_eq!(compute_window(&ctx, 22_500_000, 50_000_000), 26..47);
/// ```
pub fn compute_window(ctx: &StreamContext, size_bytes: u64, file_pos: u64) -> Range<u32> {
    if ctx.piece_length == 0 || ctx.num_pieces == 0 || size_bytes == 0 {
        return 0..0;
    }

    let absolute = ctx.file_offset.saturating_add(file_pos);
    let current_piece = absolute / ctx.piece_length;

    let window_start = absolute.saturating_sub(size_bytes).max(ctx.file_offset);
    let start_piece = window_start / ctx.piece_length;

    let end = clamp_piece(current_piece, ctx.num_pieces);
    let start = clamp_piece(start_piece, end);
    start..end
}

fn clamp_piece(piece: u64, limit: u32) -> u32 {
    piece.min(u64::from(limit)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIECE: u64 = 1_048_576;

    fn ctx(num_pieces: u32, file_offset: u64) -> StreamContext {
        StreamContext::new(PIECE, num_pieces, u64::from(num_pieces) * PIECE, file_offset)
    }

    #[test]
    fn test_window_mid_file() {
        let window = compute_window(&ctx(1000, 0), 22_500_000, 50_000_000);
        assert_eq!(window, 26..47);
        assert_eq!(window.len(), 21);
    }

    #[test]
    fn test_window_excludes_current_piece() {
        let window = compute_window(&ctx(1000, 0), 4 * PIECE, 10 * PIECE);
        assert_eq!(window, 6..10);
        assert!(!window.contains(&10));
    }

    #[test]
    fn test_window_clamped_to_file_start() {
        let offset = 5 * PIECE;
        let window = compute_window(&ctx(100, offset), 50 * PIECE, 3 * PIECE);
        assert_eq!(window, 5..8);
    }

    #[test]
    fn test_window_unaligned_file_offset() {
        // File starts halfway into piece 2; that piece is still protected
        let offset = 2 * PIECE + PIECE / 2;
        let window = compute_window(&ctx(100, offset), 50 * PIECE, PIECE);
        assert_eq!(window, 2..3);
    }

    #[test]
    fn test_window_empty_at_start() {
        assert!(compute_window(&ctx(100, 0), 10 * PIECE, 0).is_empty());
        assert!(compute_window(&ctx(100, 0), 10 * PIECE, PIECE - 1).is_empty());
    }

    #[test]
    fn test_window_clipped_to_piece_count() {
        let window = compute_window(&ctx(10, 0), 4 * PIECE, 20 * PIECE);
        assert!(window.is_empty());

        let window = compute_window(&ctx(10, 0), 4 * PIECE, 12 * PIECE);
        assert_eq!(window, 8..10);
    }

    #[test]
    fn test_window_zero_size() {
        assert!(compute_window(&ctx(100, 0), 0, 50 * PIECE).is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(ctx(10, 0).validate().is_ok());
        assert_eq!(
            StreamContext::new(0, 10, 100, 0).validate(),
            Err(LookbehindError::ZeroPieceLength)
        );
        assert_eq!(
            StreamContext::new(PIECE, 0, 100, 0).validate(),
            Err(LookbehindError::NoPieces)
        );
        assert!(matches!(
            ctx(10, 10 * PIECE).validate(),
            Err(LookbehindError::FileOffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn test_piece_at() {
        let ctx = ctx(10, 2 * PIECE);
        assert_eq!(ctx.piece_at(0), 2);
        assert_eq!(ctx.piece_at(PIECE + 1), 3);
        assert_eq!(ctx.piece_at(100 * PIECE), 102);
    }
}
