use thiserror::Error;

use crate::bencode::BencodeError;

/// Errors that can occur when reading torrent metadata.
///
/// Every variant means the metadata is malformed or internally inconsistent.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// The torrent file contains invalid bencode.
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// A required field is missing from the torrent file.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field has an invalid value or type.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// A file path segment would escape the torrent directory.
    #[error("unsafe path segment in file list: {0:?}")]
    UnsafePath(String),
}
