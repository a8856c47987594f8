use std::path::{Path, PathBuf};

use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use super::error::VerifyError;
use super::pieces::PieceStream;
use crate::metainfo::TorrentMetadata;

/// Summary of a successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyReport {
    pub pieces: usize,
    pub bytes: u64,
}

/// Reads a `.torrent` file and verifies the content it describes under `root`.
pub fn verify_file(
    torrent_path: impl AsRef<Path>,
    root: impl AsRef<Path>,
) -> Result<VerifyReport, VerifyError> {
    let torrent_path = torrent_path.as_ref();
    let data = std::fs::read(torrent_path).map_err(|source| VerifyError::Io {
        path: torrent_path.to_path_buf(),
        source,
    })?;
    verify_bytes(&data, root)
}

/// Verifies content under `root` against raw torrent metadata.
pub fn verify_bytes(metadata: &[u8], root: impl AsRef<Path>) -> Result<VerifyReport, VerifyError> {
    let torrent = TorrentMetadata::from_bytes(metadata)?;
    verify(&torrent, root.as_ref())
}

/// Verifies content under `root` against parsed metadata.
///
/// # Errors
///
/// - [`VerifyError::PathNotFound`] if the content root does not exist
/// - [`VerifyError::MissingFile`] if a listed file is absent
/// - [`VerifyError::PieceMismatch`] for the first piece whose digest differs
/// - [`VerifyError::PieceCountMismatch`] if the data yields more or fewer
///   pieces than the metadata lists
pub fn verify(torrent: &TorrentMetadata, root: &Path) -> Result<VerifyReport, VerifyError> {
    let name = torrent.display_name();
    let paths = content_paths(torrent, root)?;
    let expected = torrent.piece_count();

    debug!(
        torrent = %name,
        pieces = expected,
        files = paths.len(),
        "starting verification"
    );

    let mut stream = PieceStream::from_paths(paths, torrent.piece_length)?;
    let mut produced = 0usize;

    for piece in &mut stream {
        let piece = piece?;
        let index = produced;
        produced += 1;

        // Surplus pieces are only counted.
        let Some(stored) = torrent.piece_hashes.get(index) else {
            continue;
        };

        let digest = Sha1::digest(&piece[..]);
        if !constant_time_eq(digest.as_slice(), stored) {
            warn!(torrent = %name, piece = index, "piece hash mismatch");
            return Err(VerifyError::PieceMismatch {
                torrent: name,
                piece: index,
            });
        }
    }

    if produced != expected {
        return Err(VerifyError::PieceCountMismatch {
            torrent: name,
            expected,
            actual: produced,
        });
    }

    debug!(torrent = %name, pieces = produced, "verification complete");
    Ok(VerifyReport {
        pieces: produced,
        bytes: stream.bytes_read(),
    })
}

fn content_paths(torrent: &TorrentMetadata, root: &Path) -> Result<Vec<PathBuf>, VerifyError> {
    let target = root.join(torrent.name_path());

    match &torrent.files {
        Some(files) => {
            if !target.is_dir() {
                return Err(VerifyError::PathNotFound { path: target });
            }
            Ok(files
                .iter()
                .map(|file| target.join(file.relative_path()))
                .collect())
        }
        None if target.is_file() => Ok(vec![target]),
        None if root.is_file() => Ok(vec![root.to_path_buf()]),
        // The root exists but the torrent's only file is gone.
        None if root.is_dir() => Err(VerifyError::MissingFile { path: target }),
        None => Err(VerifyError::PathNotFound { path: target }),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
