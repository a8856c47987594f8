use std::fs::{self, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::ops::ControlFlow;
use std::path::Path;

use tracing::{debug, error, info, warn};

use super::cancel::CancelToken;
use super::error::TransferError;
use super::options::MirrorOptions;
use super::progress::ProgressLog;
use super::state::{windows, TransferState};
use crate::remote::{Connector, RangedRead, RemoteError, RemoteSession, SessionLink};

/// Why one attempt at a file stopped early.
enum Interrupted {
    Remote(RemoteError),
    Local(io::Error),
    Cancelled { confirmed: u64 },
}

/// Drives a single file to completion, reconnecting and resuming after
/// transport faults when resume is enabled.
pub(crate) struct TransferResumer<'a, C: Connector> {
    link: &'a mut SessionLink<C>,
    options: &'a MirrorOptions,
    cancel: &'a CancelToken,
}

impl<'a, C: Connector> TransferResumer<'a, C> {
    pub(crate) fn new(
        link: &'a mut SessionLink<C>,
        options: &'a MirrorOptions,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            link,
            options,
            cancel,
        }
    }

    pub(crate) fn run(&mut self, state: &mut TransferState) -> Result<(), TransferError> {
        loop {
            let attempt = match state.resume_offset {
                None => self.fetch_whole(state),
                Some(offset) => self.fetch_range(state, offset),
            };

            let err = match attempt {
                Ok(()) => return Ok(()),
                Err(Interrupted::Cancelled { confirmed }) => {
                    return Err(self.cancelled(state, confirmed));
                }
                Err(Interrupted::Local(source)) => {
                    return Err(TransferError::Local {
                        path: state.local_path.clone(),
                        source,
                    });
                }
                Err(Interrupted::Remote(err)) => err,
            };

            if !self.options.resume || !err.is_transient() {
                debug!(
                    path = %state.remote_path,
                    resume = self.options.resume,
                    %err,
                    "not resuming"
                );
                return Err(TransferError::Fatal {
                    path: state.remote_path.clone(),
                    source: err,
                });
            }

            let on_disk = local_len(&state.local_path);
            let offset = state.rebase(on_disk, self.options.backoff_bytes);
            error!(path = %state.remote_path, %err, "transfer interrupted");
            info!(path = %state.remote_path, offset, "resuming at offset");

            self.reconnect(state)?;
        }
    }

    /// Downloads the whole file through the transport's own copy.
    fn fetch_whole(&mut self, state: &mut TransferState) -> Result<(), Interrupted> {
        info!(
            remote = %state.remote_path,
            local = %state.local_path.display(),
            "downloading"
        );

        let cancel = self.cancel;
        let mut progress = ProgressLog::new(
            &state.remote_path,
            0,
            state.expected_size,
            self.options.progress_interval,
        );
        let mut confirmed = 0u64;

        let result = self.link.session().get_whole_file(
            &state.remote_path,
            &state.local_path,
            &mut |done| {
                confirmed = done;
                progress.update(done);
                if cancel.is_cancelled() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );

        match result {
            Ok(written) => {
                state.bytes_received += written;
                if written != state.expected_size {
                    return Err(Interrupted::Remote(RemoteError::SizeMismatch {
                        path: state.remote_path.clone(),
                        expected: state.expected_size,
                        actual: written,
                    }));
                }
                progress.finish(written);
                Ok(())
            }
            Err(RemoteError::Aborted) if cancel.is_cancelled() => {
                state.bytes_received += confirmed;
                Err(Interrupted::Cancelled { confirmed })
            }
            Err(err) => {
                state.bytes_received += confirmed;
                Err(Interrupted::Remote(err))
            }
        }
    }

    /// Fetches `[offset, expected_size)` in windows, writing each one in
    /// request order after the first `offset` bytes of the local file.
    fn fetch_range(&mut self, state: &mut TransferState, offset: u64) -> Result<(), Interrupted> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&state.local_path)
            .map_err(Interrupted::Local)?;
        file.set_len(offset).map_err(Interrupted::Local)?;
        file.seek(SeekFrom::Start(offset))
            .map_err(Interrupted::Local)?;

        if self.cancel.is_cancelled() {
            return Err(Interrupted::Cancelled { confirmed: offset });
        }

        let mut reader = self
            .link
            .session()
            .open_for_ranged_read(&state.remote_path)
            .map_err(Interrupted::Remote)?;

        let mut progress = ProgressLog::new(
            &state.remote_path,
            offset,
            state.expected_size,
            self.options.progress_interval,
        );
        let mut confirmed = offset;

        for (start, len) in windows(offset, state.expected_size, self.options.window_size) {
            if self.cancel.is_cancelled() {
                return Err(Interrupted::Cancelled { confirmed });
            }

            let chunk = reader.read_at(start, len).map_err(Interrupted::Remote)?;
            file.write_all(&chunk).map_err(Interrupted::Local)?;
            confirmed += chunk.len() as u64;
            state.bytes_received += chunk.len() as u64;
            progress.update(confirmed);

            // A short read means the remote file ended.
            if chunk.len() < len as usize {
                return Err(Interrupted::Remote(RemoteError::SizeMismatch {
                    path: state.remote_path.clone(),
                    expected: state.expected_size,
                    actual: confirmed,
                }));
            }
        }

        file.sync_all().map_err(Interrupted::Local)?;
        progress.finish(confirmed);
        Ok(())
    }

    /// Re-establishes the session. Transient failures are retried without
    /// limit; only cancellation or a permanent failure stops the loop.
    fn reconnect(&mut self, state: &TransferState) -> Result<(), TransferError> {
        loop {
            if self.cancel.is_cancelled() {
                let offset = state.resume_offset.unwrap_or(0);
                return Err(self.cancelled(state, offset));
            }

            match self.link.reconnect() {
                Ok(()) => {
                    info!(reconnects = self.link.reconnects(), "reconnected");
                    return Ok(());
                }
                Err(err) if err.is_transient() => {
                    warn!(%err, "reconnect failed, retrying");
                }
                Err(err) => return Err(TransferError::Session(err)),
            }
        }
    }

    /// Truncates the local file to `offset` and builds the cancellation error.
    fn cancelled(&self, state: &TransferState, offset: u64) -> TransferError {
        if let Err(source) = truncate(&state.local_path, offset) {
            return TransferError::Local {
                path: state.local_path.clone(),
                source,
            };
        }
        info!(path = %state.remote_path, offset, "transfer cancelled");
        TransferError::Cancelled {
            path: state.remote_path.clone(),
            offset,
        }
    }
}

fn local_len(path: &Path) -> u64 {
    fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}

fn truncate(path: &Path, len: u64) -> io::Result<()> {
    match OpenOptions::new().write(true).open(path) {
        Ok(file) => file.set_len(len),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
