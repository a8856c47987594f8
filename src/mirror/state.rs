use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What is already on disk at a destination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalState {
    /// Nothing at the path.
    Absent,
    /// A file whose size differs from the remote one. Usually smaller;
    /// a larger file is downloaded again.
    Partial(u64),
    /// A file of exactly the remote size.
    Complete,
}

impl LocalState {
    /// Sizes the local file at `path` against `remote_size`.
    pub fn probe(path: &Path, remote_size: u64) -> io::Result<Self> {
        match fs::metadata(path) {
            Ok(meta) if meta.len() == remote_size => Ok(LocalState::Complete),
            Ok(meta) => Ok(LocalState::Partial(meta.len())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(LocalState::Absent),
            Err(err) => Err(err),
        }
    }
}

/// How a single file will be brought up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPlan {
    /// The local copy is already complete.
    Skip,
    /// Download from byte 0, replacing any local content.
    Fresh,
    /// Keep the first `offset` bytes and fetch the rest.
    Resume { offset: u64 },
}

impl TransferPlan {
    pub fn decide(local: LocalState, remote_size: u64, resume: bool) -> Self {
        match local {
            LocalState::Complete => TransferPlan::Skip,
            LocalState::Partial(size) if resume && size > 0 && size < remote_size => {
                TransferPlan::Resume { offset: size }
            }
            LocalState::Absent | LocalState::Partial(_) => TransferPlan::Fresh,
        }
    }

    pub fn resume_offset(&self) -> Option<u64> {
        match self {
            TransferPlan::Resume { offset } => Some(*offset),
            TransferPlan::Skip | TransferPlan::Fresh => None,
        }
    }
}

/// One file in flight.
///
/// `resume_offset` is `None` for a whole-file download and is re-based
/// after every transport fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferState {
    pub remote_path: String,
    pub local_path: PathBuf,
    pub expected_size: u64,
    pub resume_offset: Option<u64>,
    /// Bytes received for this file, re-fetched bytes included.
    pub bytes_received: u64,
}

impl TransferState {
    pub fn new(
        remote_path: impl Into<String>,
        local_path: impl Into<PathBuf>,
        expected_size: u64,
        resume_offset: Option<u64>,
    ) -> Self {
        Self {
            remote_path: remote_path.into(),
            local_path: local_path.into(),
            expected_size,
            resume_offset,
            bytes_received: 0,
        }
    }

    /// Moves the resume point `backoff` bytes before what is on disk.
    pub fn rebase(&mut self, on_disk: u64, backoff: u64) -> u64 {
        let offset = on_disk.min(self.expected_size).saturating_sub(backoff);
        self.resume_offset = Some(offset);
        offset
    }
}

/// Splits `[start, end)` into consecutive `(offset, len)` read windows of at
/// most `window` bytes.
pub fn windows(start: u64, end: u64, window: u32) -> impl Iterator<Item = (u64, u32)> {
    let step = u64::from(window.max(1));
    let mut offset = start;
    std::iter::from_fn(move || {
        if offset >= end {
            return None;
        }
        let len = (end - offset).min(step);
        let current = offset;
        offset += len;
        Some((current, len as u32))
    })
}
