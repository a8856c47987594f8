use std::path::PathBuf;

use thiserror::Error;

use crate::metainfo::MetainfoError;

/// Reasons content failed to verify. None of these are retried.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The torrent metadata is malformed.
    #[error("invalid torrent metadata: {0}")]
    Format(#[from] MetainfoError),

    /// The content root for the torrent does not exist.
    #[error("torrent data not found at {}", path.display())]
    PathNotFound { path: PathBuf },

    /// A file the torrent lists could not be opened or sized.
    #[error("file listed in torrent is missing: {}", path.display())]
    MissingFile { path: PathBuf },

    /// A piece's digest differs from the stored one.
    #[error("piece {piece} of {torrent:?} does not match its stored hash")]
    PieceMismatch { torrent: String, piece: usize },

    /// The data on disk yields a different number of pieces than the
    /// metadata lists.
    #[error("{torrent:?} lists {expected} pieces but the data on disk yields {actual}")]
    PieceCountMismatch {
        torrent: String,
        expected: usize,
        actual: usize,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl VerifyError {
    /// Index of the corrupt piece, for integrity failures.
    pub fn piece_index(&self) -> Option<usize> {
        match self {
            VerifyError::PieceMismatch { piece, .. } => Some(*piece),
            _ => None,
        }
    }
}
