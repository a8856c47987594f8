use std::fmt;
use std::ops::ControlFlow;
use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use super::entry::FileAttributes;
use super::error::RemoteError;
use crate::constants::{DEFAULT_KEEPALIVE, DEFAULT_PORT};

/// Arguments used to open a session, kept so the session can be re-opened
/// with exactly the same settings after a fault.
#[derive(Clone)]
pub struct ConnectParams {
    pub host: String,
    pub username: String,
    pub password: Option<String>,
    pub port: u16,
    /// Socket timeout; `None` leaves the transport's default.
    pub timeout: Option<Duration>,
    pub keepalive: Duration,
}

impl ConnectParams {
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: None,
            port: DEFAULT_PORT,
            timeout: None,
            keepalive: DEFAULT_KEEPALIVE,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .field("keepalive", &self.keepalive)
            .finish()
    }
}

/// Opens authenticated sessions to a remote host.
pub trait Connector {
    type Session: RemoteSession;

    fn connect(&self, params: &ConnectParams) -> Result<Self::Session, RemoteError>;
}

/// An open, authenticated file-transfer session.
///
/// Relative paths are resolved against the session's working directory.
pub trait RemoteSession {
    type Reader: RangedRead;

    /// Lists one directory, without `.` and `..`.
    fn list_directory(&mut self, path: &str) -> Result<Vec<FileAttributes>, RemoteError>;

    /// Opens a remote file for reads at arbitrary offsets.
    fn open_for_ranged_read(&mut self, path: &str) -> Result<Self::Reader, RemoteError>;

    /// Copies a whole remote file to `local_path`, truncating it first.
    ///
    /// `progress` is called with the number of bytes written so far. When it
    /// returns [`ControlFlow::Break`] the transport stops and returns
    /// [`RemoteError::Aborted`], leaving what was written in place.
    fn get_whole_file(
        &mut self,
        remote_path: &str,
        local_path: &Path,
        progress: &mut dyn FnMut(u64) -> ControlFlow<()>,
    ) -> Result<u64, RemoteError>;

    fn change_working_directory(&mut self, path: &str) -> Result<(), RemoteError>;

    /// Current working directory, if the session has one set.
    fn working_directory(&mut self) -> Result<Option<String>, RemoteError>;

    fn close(&mut self) -> Result<(), RemoteError>;
}

/// A remote file open for ranged reads.
pub trait RangedRead {
    /// Reads up to `len` bytes starting at `offset`.
    ///
    /// A result shorter than `len` means the file ended.
    fn read_at(&mut self, offset: u64, len: u32) -> Result<Bytes, RemoteError>;
}

/// A live session together with the connector and parameters that opened it.
///
/// [`reconnect`](Self::reconnect) replaces the session with a fresh one and
/// restores the remembered working directory.
pub struct SessionLink<C: Connector> {
    connector: C,
    params: ConnectParams,
    session: C::Session,
    working_dir: Option<String>,
    reconnects: u64,
}

impl<C: Connector> SessionLink<C> {
    pub fn open(connector: C, params: ConnectParams) -> Result<Self, RemoteError> {
        let session = connector.connect(&params)?;
        debug!(host = %params.host, port = params.port, "connected");

        Ok(Self {
            connector,
            params,
            session,
            working_dir: None,
            reconnects: 0,
        })
    }

    pub fn session(&mut self) -> &mut C::Session {
        &mut self.session
    }

    pub fn params(&self) -> &ConnectParams {
        &self.params
    }

    /// Number of times the session has been re-established.
    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// Records the session's current working directory so a reconnect can
    /// return to it.
    pub fn remember_working_directory(&mut self) -> Result<Option<&str>, RemoteError> {
        self.working_dir = self.session.working_directory()?;
        Ok(self.working_dir.as_deref())
    }

    pub fn reconnect(&mut self) -> Result<(), RemoteError> {
        debug!(host = %self.params.host, "re-establishing connection");
        let mut session = self.connector.connect(&self.params)?;

        if let Some(dir) = &self.working_dir {
            session.change_working_directory(dir)?;
        }

        let mut stale = std::mem::replace(&mut self.session, session);
        if let Err(err) = stale.close() {
            debug!(%err, "closing stale session failed");
        }

        self.reconnects += 1;
        Ok(())
    }

    pub fn close(mut self) -> Result<(), RemoteError> {
        self.session.close()
    }
}
