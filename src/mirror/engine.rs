use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::cancel::CancelToken;
use super::dircache::DirectoryCache;
use super::error::TransferError;
use super::options::MirrorOptions;
use super::resume::TransferResumer;
use super::state::{LocalState, TransferPlan, TransferState};
use crate::remote::{ConnectParams, Connector, RecursiveListing, RemoteEntry, SessionLink};

/// Counts from one [`MirrorEngine::mirror`] run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MirrorReport {
    /// Files actually downloaded, fully or in part.
    pub transferred: usize,
    /// Files left alone: already complete, shadowed by a local directory,
    /// or with an unusable path.
    pub skipped: usize,
    /// Transfers that continued an existing partial file.
    pub resumed: usize,
    /// Bytes received, including any fetched twice after a fault.
    pub bytes: u64,
}

/// Mirrors remote directory trees to local disk over one session.
///
/// Files are processed one at a time in listing order. A partial local file
/// is continued when [`MirrorOptions::resume`] is set; transport faults then
/// trigger a reconnect and a resume a few bytes before the end of what is on
/// disk.
pub struct MirrorEngine<C: Connector> {
    link: SessionLink<C>,
    options: MirrorOptions,
    cancel: CancelToken,
}

impl<C: Connector> MirrorEngine<C> {
    /// Opens a session with `params` and keeps them for reconnects.
    pub fn connect(
        connector: C,
        params: ConnectParams,
        options: MirrorOptions,
    ) -> Result<Self, TransferError> {
        let link = SessionLink::open(connector, params).map_err(TransferError::Session)?;
        Ok(Self {
            link,
            options,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// A handle that cancels this engine's runs.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn options(&self) -> &MirrorOptions {
        &self.options
    }

    /// The live session, for operations outside a mirror run.
    pub fn session(&mut self) -> &mut C::Session {
        self.link.session()
    }

    /// Number of reconnects so far.
    pub fn reconnects(&self) -> u64 {
        self.link.reconnects()
    }

    /// Mirrors every file below `remote_path` into `dest_root`.
    ///
    /// The remote path is kept in the local layout: `remote_path/a/b` lands
    /// at `dest_root/remote_path/a/b`.
    pub fn mirror(
        &mut self,
        remote_path: &str,
        dest_root: &Path,
    ) -> Result<MirrorReport, TransferError> {
        let cwd = self
            .link
            .remember_working_directory()
            .map_err(TransferError::Session)?
            .map(str::to_owned);
        info!(
            remote = remote_path,
            local = %dest_root.display(),
            cwd = ?cwd,
            resume = self.options.resume,
            "mirror started"
        );

        let mut dirs = DirectoryCache::new();
        let mut report = MirrorReport::default();
        let mut listing = RecursiveListing::new(remote_path, self.options.strict_listing);

        while let Some(entry) = listing.next_entry(self.link.session()) {
            let entry = entry.map_err(|source| TransferError::Listing {
                path: remote_path.to_string(),
                source,
            })?;
            self.mirror_entry(&entry, dest_root, &mut dirs, &mut report)?;
        }

        info!(
            transferred = report.transferred,
            skipped = report.skipped,
            resumed = report.resumed,
            bytes = report.bytes,
            "mirror finished"
        );
        Ok(report)
    }

    fn mirror_entry(
        &mut self,
        entry: &RemoteEntry,
        dest_root: &Path,
        dirs: &mut DirectoryCache,
        report: &mut MirrorReport,
    ) -> Result<(), TransferError> {
        let Some(local_path) = local_path_for(dest_root, &entry.path) else {
            warn!(path = %entry.path, "skipping path that leaves the destination");
            report.skipped += 1;
            return Ok(());
        };

        if let Some(parent) = local_path.parent() {
            dirs.ensure(parent).map_err(|source| TransferError::Local {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        if local_path.is_dir() {
            debug!(path = %local_path.display(), "local directory in the way, skipping");
            report.skipped += 1;
            return Ok(());
        }

        let local =
            LocalState::probe(&local_path, entry.size).map_err(|source| TransferError::Local {
                path: local_path.clone(),
                source,
            })?;

        match TransferPlan::decide(local, entry.size, self.options.resume) {
            TransferPlan::Skip => {
                debug!(path = %entry.path, "already complete");
                report.skipped += 1;
            }
            plan => {
                if let Some(offset) = plan.resume_offset() {
                    info!(path = %local_path.display(), offset, "resuming file");
                }

                let mut state = TransferState::new(
                    entry.path.as_str(),
                    local_path.as_path(),
                    entry.size,
                    plan.resume_offset(),
                );
                TransferResumer::new(&mut self.link, &self.options, &self.cancel)
                    .run(&mut state)?;

                report.transferred += 1;
                report.bytes += state.bytes_received;
                if plan.resume_offset().is_some() {
                    report.resumed += 1;
                }
            }
        }

        restore_metadata(&local_path, entry, &self.options);
        Ok(())
    }

    /// Closes the session.
    pub fn close(self) -> Result<(), TransferError> {
        self.link.close().map_err(TransferError::Session)
    }
}

/// Maps a `/`-separated remote path below `root`. Returns `None` if the
/// path has a `..` segment.
fn local_path_for(root: &Path, remote: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in remote.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            segment => path.push(segment),
        }
    }
    Some(path)
}

/// Applies the remote times and permission bits. Failures are logged only.
fn restore_metadata(path: &Path, entry: &RemoteEntry, options: &MirrorOptions) {
    if options.keep_times {
        if let Err(err) = set_times(path, entry) {
            warn!(path = %path.display(), %err, "could not restore file times");
        }
    }
    if options.keep_modes {
        if let Err(err) = set_mode(path, entry.permissions()) {
            warn!(path = %path.display(), %err, "could not restore file mode");
        }
    }
}

fn set_times(path: &Path, entry: &RemoteEntry) -> io::Result<()> {
    let times = FileTimes::new()
        .set_accessed(entry.accessed())
        .set_modified(entry.modified());
    File::open(path)?.set_times(times)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(mode & 0o222 == 0);
    fs::set_permissions(path, permissions)
}
