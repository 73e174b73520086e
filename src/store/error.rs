use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid piece index: {0}")]
    InvalidPieceIndex(u32),

    #[error("piece {piece} is {len} bytes, larger than the piece length {piece_length}")]
    PieceTooLarge { piece: u32, len: usize, piece_length: u64 },
}
