use std::io::ErrorKind;

use thiserror::Error;

/// Errors reported by the remote transport.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The transport timed out waiting for the server.
    #[error("connection timed out")]
    Timeout,

    /// The server answered with a protocol-level failure.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server rejected the credentials.
    #[error("authentication failed for {username}@{host}")]
    Auth { username: String, host: String },

    /// The remote path does not exist.
    #[error("no such remote path: {0}")]
    NotFound(String),

    /// The remote file ended before, or ran past, the size it was listed with.
    #[error("remote file {path} has {actual} bytes, listed as {expected}")]
    SizeMismatch {
        path: String,
        expected: u64,
        actual: u64,
    },

    /// The caller asked the transport to stop.
    #[error("transfer aborted")]
    Aborted,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    /// Returns `true` for faults that a reconnect and resume can recover from.
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Timeout | RemoteError::Protocol(_) => true,
            RemoteError::Io(err) => matches!(
                err.kind(),
                ErrorKind::TimedOut
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
                    | ErrorKind::UnexpectedEof
            ),
            RemoteError::Auth { .. }
            | RemoteError::NotFound(_)
            | RemoteError::SizeMismatch { .. }
            | RemoteError::Aborted => false,
        }
    }
}
