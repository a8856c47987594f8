use std::path::PathBuf;

use thiserror::Error;

use crate::remote::RemoteError;

/// Errors that end a mirror run.
#[derive(Debug, Error)]
pub enum TransferError {
    /// A transport fault that could not be recovered: resume is off, or the
    /// fault is not one a reconnect can fix.
    #[error("transfer of {path} failed: {source}")]
    Fatal { path: String, source: RemoteError },

    /// The remote tree could not be listed.
    #[error("failed to list {path}: {source}")]
    Listing { path: String, source: RemoteError },

    /// Creating, writing or sizing a local file failed.
    #[error("local i/o error on {}: {source}", path.display())]
    Local {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The run was cancelled; the local file was truncated to `offset`.
    #[error("transfer of {path} cancelled at byte {offset}")]
    Cancelled { path: String, offset: u64 },

    /// The session could not be opened or re-established.
    #[error("session error: {0}")]
    Session(#[source] RemoteError),
}

impl TransferError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransferError::Cancelled { .. })
    }
}
