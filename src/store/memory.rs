use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::trace;

use super::error::StoreError;
use super::piece_set::PieceSet;
use super::PieceStore;
use crate::constants::STORE_SLACK_PIECES;

struct CachedPiece {
    data: Bytes,
    last_access: u64,
}

struct StoreState {
    pieces: HashMap<u32, CachedPiece>,
    /// Pieces pinned by lookbehind protection.
    lookbehind: PieceSet,
    /// Pieces pinned by active readers.
    reserved: PieceSet,
    clock: u64,
}

impl StoreState {
    fn touch(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn is_pinned(&self, piece: u32) -> bool {
        let idx = piece as usize;
        self.lookbehind.contains(idx) || self.reserved.contains(idx)
    }

    fn available_lookbehind(&self) -> usize {
        self.lookbehind
            .iter()
            .filter(|&i| self.pieces.contains_key(&(i as u32)))
            .count()
    }
}

/// A bounded in-memory piece store for one torrent.
///
/// Holds whole pieces up to a piece limit derived from the byte capacity. When
/// a new piece arrives and the store is full, the least recently used pieces
/// are evicted, skipping any piece pinned by lookbehind or by a reader. If
/// every held piece is pinned the store grows past its limit rather than
/// dropping pinned data.
pub struct MemoryPieceStore {
    piece_length: u64,
    num_pieces: u32,
    buffer_limit: usize,
    state: RwLock<StoreState>,
}

impl MemoryPieceStore {
    /// Creates a store for a torrent of `num_pieces` pieces.
    ///
    /// A `capacity` of zero means unbounded.
    pub fn new(piece_length: u64, num_pieces: u32, capacity: u64) -> Arc<Self> {
        let piece_count = num_pieces as usize;
        let buffer_limit = if capacity > 0 && piece_length > 0 {
            let pieces = capacity.div_ceil(piece_length) as usize + STORE_SLACK_PIECES;
            pieces.min(piece_count)
        } else {
            piece_count
        };

        Arc::new(Self {
            piece_length,
            num_pieces,
            buffer_limit,
            state: RwLock::new(StoreState {
                pieces: HashMap::new(),
                lookbehind: PieceSet::new(piece_count),
                reserved: PieceSet::new(piece_count),
                clock: 0,
            }),
        })
    }

    pub fn piece_length(&self) -> u64 {
        self.piece_length
    }

    pub fn num_pieces(&self) -> u32 {
        self.num_pieces
    }

    /// Maximum number of pieces held before eviction starts.
    pub fn buffer_limit(&self) -> usize {
        self.buffer_limit
    }

    /// Stores a complete piece, evicting older unpinned pieces if needed.
    pub fn write_piece(&self, piece: u32, data: Bytes) -> Result<(), StoreError> {
        if piece >= self.num_pieces {
            return Err(StoreError::InvalidPieceIndex(piece));
        }
        if data.len() as u64 > self.piece_length {
            return Err(StoreError::PieceTooLarge {
                piece,
                len: data.len(),
                piece_length: self.piece_length,
            });
        }

        let mut state = self.state.write();
        if !state.pieces.contains_key(&piece) && state.pieces.len() >= self.buffer_limit {
            self.trim(&mut state, piece);
        }
        let last_access = state.touch();
        state.pieces.insert(piece, CachedPiece { data, last_access });
        Ok(())
    }

    /// Returns a piece's data and marks it as recently used.
    pub fn read_piece(&self, piece: u32) -> Option<Bytes> {
        let mut state = self.state.write();
        let tick = state.touch();
        let cached = state.pieces.get_mut(&piece)?;
        cached.last_access = tick;
        Some(cached.data.clone())
    }

    pub fn has_piece(&self, piece: u32) -> bool {
        self.state.read().pieces.contains_key(&piece)
    }

    pub fn remove_piece(&self, piece: u32) -> Option<Bytes> {
        self.state.write().pieces.remove(&piece).map(|p| p.data)
    }

    /// Pins or unpins a piece on behalf of a reader.
    pub fn set_reserved(&self, piece: u32, reserved: bool) {
        let mut state = self.state.write();
        if reserved {
            state.reserved.insert(piece as usize);
        } else {
            state.reserved.remove(piece as usize);
        }
    }

    /// Number of pieces currently held.
    pub fn len(&self) -> usize {
        self.state.read().pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes held across all pieces.
    pub fn buffered_bytes(&self) -> u64 {
        self.state
            .read()
            .pieces
            .values()
            .map(|p| p.data.len() as u64)
            .sum()
    }

    fn trim(&self, state: &mut StoreState, incoming: u32) {
        while state.pieces.len() >= self.buffer_limit {
            let victim = state
                .pieces
                .iter()
                .filter(|&(&idx, _)| idx != incoming && !state.is_pinned(idx))
                .min_by_key(|&(_, p)| p.last_access)
                .map(|(&idx, _)| idx);

            let Some(victim) = victim else {
                trace!(
                    "No evictable piece, holding {} pieces over a limit of {}",
                    state.pieces.len() + 1,
                    self.buffer_limit
                );
                break;
            };

            state.pieces.remove(&victim);
            trace!("Evicted piece {}", victim);
        }
    }
}

impl PieceStore for MemoryPieceStore {
    fn set_protected_pieces(&self, pieces: &[u32]) {
        let mut state = self.state.write();
        state.lookbehind.clear();
        for &piece in pieces {
            if piece < self.num_pieces {
                state.lookbehind.insert(piece as usize);
            }
        }
    }

    fn clear_protection(&self) {
        self.state.write().lookbehind.clear();
    }

    fn is_piece_available(&self, piece: u32) -> bool {
        if piece >= self.num_pieces {
            return false;
        }
        let state = self.state.read();
        state.lookbehind.contains(piece as usize) && state.pieces.contains_key(&piece)
    }

    fn protected_count(&self) -> usize {
        self.state.read().lookbehind.count()
    }

    fn available_count(&self) -> usize {
        self.state.read().available_lookbehind()
    }

    fn memory_used_bytes(&self) -> u64 {
        self.available_count() as u64 * self.piece_length
    }
}
