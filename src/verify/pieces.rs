use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::vec;

use bytes::{BufMut, Bytes, BytesMut};

use super::error::VerifyError;
use crate::metainfo::{FileEntry, MetainfoError};

/// Lazily cuts a sequence of files into fixed-size pieces.
///
/// Files are read back to back in list order, so a piece can contain the
/// tail of one file and the head of the next. Every piece is exactly
/// `piece_length` bytes except the last, which holds whatever remains and is
/// only produced if it is non-empty.
///
/// All files are checked when the stream is created: one that cannot be
/// sized, or is not a regular file, fails with [`VerifyError::MissingFile`]
/// before any piece is produced.
pub struct PieceStream {
    pending: vec::IntoIter<PathBuf>,
    current: Option<(PathBuf, File)>,
    piece_length: usize,
    buf: BytesMut,
    bytes_read: u64,
    done: bool,
}

/// Streams the pieces of `files`, resolved against `base`.
pub fn stream_pieces(
    files: &[FileEntry],
    base: &Path,
    piece_length: u64,
) -> Result<PieceStream, VerifyError> {
    PieceStream::new(base, files, piece_length)
}

impl PieceStream {
    pub fn new(base: &Path, files: &[FileEntry], piece_length: u64) -> Result<Self, VerifyError> {
        let paths = files
            .iter()
            .map(|file| base.join(file.relative_path()))
            .collect();
        Self::from_paths(paths, piece_length)
    }

    pub fn from_paths(paths: Vec<PathBuf>, piece_length: u64) -> Result<Self, VerifyError> {
        let piece_length = usize::try_from(piece_length)
            .ok()
            .filter(|&len| len > 0)
            .ok_or(MetainfoError::InvalidField("piece length"))?;

        for path in &paths {
            match fs::metadata(path) {
                Ok(meta) if meta.is_file() => {}
                _ => return Err(VerifyError::MissingFile { path: path.clone() }),
            }
        }

        Ok(Self {
            pending: paths.into_iter(),
            current: None,
            piece_length,
            buf: BytesMut::new(),
            bytes_read: 0,
            done: false,
        })
    }

    /// Total bytes handed out in pieces so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn open_next(&mut self) -> Result<bool, VerifyError> {
        let Some(path) = self.pending.next() else {
            return Ok(false);
        };

        let file = File::open(&path).map_err(|_| VerifyError::MissingFile {
            path: path.clone(),
        })?;
        self.current = Some((path, file));
        Ok(true)
    }

    /// Fills the buffer up to one piece. Returns `false` if the files ran
    /// out first.
    fn fill(&mut self) -> Result<bool, VerifyError> {
        self.buf.reserve(self.piece_length);

        while self.buf.len() < self.piece_length {
            if self.current.is_none() && !self.open_next()? {
                return Ok(false);
            }
            let Some((path, file)) = self.current.as_mut() else {
                return Ok(false);
            };

            let want = (self.piece_length - self.buf.len()) as u64;
            let mut chunk = Read::take(&mut *file, want);
            let copied = io::copy(&mut chunk, &mut (&mut self.buf).writer()).map_err(|source| {
                VerifyError::Io {
                    path: path.clone(),
                    source,
                }
            })?;

            if copied < want {
                self.current = None;
            }
        }

        Ok(true)
    }
}

impl Iterator for PieceStream {
    type Item = Result<Bytes, VerifyError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.fill() {
            Ok(true) => {}
            Ok(false) => {
                self.done = true;
                if self.buf.is_empty() {
                    return None;
                }
            }
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        }

        let piece = self.buf.split().freeze();
        self.bytes_read += piece.len() as u64;
        Some(Ok(piece))
    }
}
