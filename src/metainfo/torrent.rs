use super::error::MetainfoError;
use crate::bencode::{decode, Value};
use crate::constants::PIECE_HASH_LEN;
use bytes::Bytes;
use std::path::PathBuf;

/// The parts of a torrent file needed to verify its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentMetadata {
    /// Suggested file or directory name. Not guaranteed to be UTF-8.
    pub name: Bytes,
    /// Primary tracker URL, if present and textual.
    pub announce: Option<String>,
    /// Number of bytes per piece; always positive.
    pub piece_length: u64,
    /// SHA-1 digest of each piece, in content order.
    pub piece_hashes: Vec<[u8; PIECE_HASH_LEN]>,
    /// File list of a multi-file torrent; `None` for a single-file torrent.
    pub files: Option<Vec<FileEntry>>,
    /// Declared `length` of a single-file torrent, if present.
    pub length: Option<u64>,
}

/// A file within a multi-file torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path segments relative to the torrent directory.
    pub path: Vec<Bytes>,
    /// Listed size of the file in bytes.
    pub length: u64,
}

impl FileEntry {
    /// Joins the path segments into a relative filesystem path.
    pub fn relative_path(&self) -> PathBuf {
        self.path.iter().map(|s| segment_path(s)).collect()
    }

    /// Lossy `/`-joined form of the path, for messages.
    pub fn display_path(&self) -> String {
        self.path
            .iter()
            .map(|s| String::from_utf8_lossy(s))
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl TorrentMetadata {
    /// Parses torrent metadata from the raw bytes of a `.torrent` file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data is not valid bencode
    /// - `info`, `name`, `piece length` or `pieces` is missing
    /// - `piece length` is not positive, or `pieces` is not a multiple of 20 bytes
    /// - an entry of `files` lacks a non-negative `length` or a non-empty `path`,
    ///   or a path segment is empty, `.`, `..` or contains a separator
    pub fn from_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        Self::from_value(&decode(data)?)
    }

    /// Builds the metadata from an already decoded top-level dictionary.
    pub fn from_value(value: &Value) -> Result<Self, MetainfoError> {
        if value.as_dict().is_none() {
            return Err(MetainfoError::InvalidField("root"));
        }

        let info = value
            .get(b"info")
            .ok_or(MetainfoError::MissingField("info"))?;
        if info.as_dict().is_none() {
            return Err(MetainfoError::InvalidField("info"));
        }

        let announce = value
            .get(b"announce")
            .and_then(Value::as_str)
            .map(String::from);

        let name = info
            .get(b"name")
            .ok_or(MetainfoError::MissingField("name"))?
            .as_bytes()
            .ok_or(MetainfoError::InvalidField("name"))?
            .clone();
        check_segment(&name)?;

        let piece_length = info
            .get(b"piece length")
            .ok_or(MetainfoError::MissingField("piece length"))?
            .as_integer()
            .and_then(|n| u64::try_from(n).ok())
            .filter(|&n| n > 0)
            .ok_or(MetainfoError::InvalidField("piece length"))?;

        let pieces = info
            .get(b"pieces")
            .ok_or(MetainfoError::MissingField("pieces"))?
            .as_bytes()
            .ok_or(MetainfoError::InvalidField("pieces"))?;

        if pieces.len() % PIECE_HASH_LEN != 0 {
            return Err(MetainfoError::InvalidField("pieces"));
        }

        let piece_hashes = pieces
            .chunks_exact(PIECE_HASH_LEN)
            .map(|chunk| {
                let mut hash = [0u8; PIECE_HASH_LEN];
                hash.copy_from_slice(chunk);
                hash
            })
            .collect();

        let files = match info.get(b"files") {
            Some(list) => Some(parse_files(list)?),
            None => None,
        };

        let length = match info.get(b"length") {
            Some(length) => Some(
                length
                    .as_integer()
                    .and_then(|n| u64::try_from(n).ok())
                    .ok_or(MetainfoError::InvalidField("length"))?,
            ),
            None => None,
        };

        Ok(Self {
            name,
            announce,
            piece_length,
            piece_hashes,
            files,
            length,
        })
    }

    /// Returns `true` if the torrent has no `files` list.
    pub fn is_single_file(&self) -> bool {
        self.files.is_none()
    }

    /// Lossy text form of the torrent name, for logs and errors.
    pub fn display_name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    /// The torrent name as a filesystem path component.
    pub fn name_path(&self) -> PathBuf {
        segment_path(&self.name)
    }

    pub fn piece_count(&self) -> usize {
        self.piece_hashes.len()
    }

    /// Returns the content files in stream order.
    ///
    /// A single-file torrent yields one entry named after the torrent. Its
    /// length is the declared `length`, or the length implied by the piece
    /// count when that key is absent.
    pub fn file_list(&self) -> Vec<FileEntry> {
        match &self.files {
            Some(files) => files.clone(),
            None => vec![FileEntry {
                path: vec![self.name.clone()],
                length: self
                    .length
                    .unwrap_or(self.piece_count() as u64 * self.piece_length),
            }],
        }
    }

    /// Total content length across all files.
    pub fn total_length(&self) -> u64 {
        match &self.files {
            Some(files) => files.iter().map(|f| f.length).sum(),
            None => self
                .length
                .unwrap_or(self.piece_count() as u64 * self.piece_length),
        }
    }

    /// Number of pieces the listed file lengths imply.
    pub fn expected_piece_count(&self) -> usize {
        self.total_length().div_ceil(self.piece_length) as usize
    }

    /// Length of piece `index`, based on the listed total length.
    ///
    /// Every piece but the last is exactly `piece_length` long.
    pub fn piece_len(&self, index: usize) -> Option<u64> {
        let total = self.total_length();
        let start = (index as u64).checked_mul(self.piece_length)?;
        if start >= total {
            return None;
        }
        Some((total - start).min(self.piece_length))
    }
}

fn parse_files(value: &Value) -> Result<Vec<FileEntry>, MetainfoError> {
    let list = value
        .as_list()
        .ok_or(MetainfoError::InvalidField("files"))?;

    list.iter()
        .map(|item| {
            if item.as_dict().is_none() {
                return Err(MetainfoError::InvalidField("files"));
            }

            let length = item
                .get(b"length")
                .ok_or(MetainfoError::MissingField("file length"))?
                .as_integer()
                .and_then(|n| u64::try_from(n).ok())
                .ok_or(MetainfoError::InvalidField("file length"))?;

            let segments = item
                .get(b"path")
                .ok_or(MetainfoError::MissingField("file path"))?
                .as_list()
                .filter(|segments| !segments.is_empty())
                .ok_or(MetainfoError::InvalidField("file path"))?;

            let path = segments
                .iter()
                .map(|segment| {
                    let segment = segment
                        .as_bytes()
                        .ok_or(MetainfoError::InvalidField("file path"))?;
                    check_segment(segment)?;
                    Ok(segment.clone())
                })
                .collect::<Result<Vec<_>, MetainfoError>>()?;

            Ok(FileEntry { path, length })
        })
        .collect()
}

fn check_segment(segment: &[u8]) -> Result<(), MetainfoError> {
    let unsafe_segment = segment.is_empty()
        || segment == b"."
        || segment == b".."
        || segment.iter().any(|&b| b == b'/' || b == b'\\' || b == 0);

    if unsafe_segment {
        return Err(MetainfoError::UnsafePath(
            String::from_utf8_lossy(segment).into_owned(),
        ));
    }
    Ok(())
}

#[cfg(unix)]
fn segment_path(segment: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(segment))
}

#[cfg(not(unix))]
fn segment_path(segment: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(segment).into_owned())
}
