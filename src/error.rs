use thiserror::Error;

/// Reasons a stream cannot be tracked.
///
/// These never escape [`LookbehindManager`](crate::LookbehindManager); an invalid
/// stream simply gets no lookbehind protection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookbehindError {
    #[error("piece length is zero")]
    ZeroPieceLength,

    #[error("torrent has no pieces")]
    NoPieces,

    #[error("file offset {offset} lies outside the torrent ({total} bytes)")]
    FileOffsetOutOfRange { offset: u64, total: u64 },

    #[error("no piece store attached")]
    MissingStore,
}
