use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::constants::{OWNER_RWX, PERMISSION_BITS, S_IFDIR, S_IFMT};

/// Attributes of one directory entry, as returned by the remote listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttributes {
    pub filename: String,
    pub size: u64,
    /// POSIX mode: permission bits, plus file-type bits when the server sends them.
    pub mode: u32,
    /// Modification time, seconds since the Unix epoch.
    pub mtime: u64,
    /// Access time, seconds since the Unix epoch.
    pub atime: u64,
}

impl FileAttributes {
    pub fn is_directory(&self) -> bool {
        mode_is_directory(self.mode)
    }
}

/// Decides whether a remote mode describes a directory.
///
/// ```
/// use seedsync::remote::mode_is_directory;
///
/// assert!(mode_is_directory(0o040_755));
/// assert!(!mode_is_directory(0o100_755));
/// // No file-type bits: fall back to the owner rwx convention.
/// assert!(mode_is_directory(0o755));
/// assert!(!mode_is_directory(0o644));
/// ```
pub fn mode_is_directory(mode: u32) -> bool {
    if mode & S_IFMT != 0 {
        mode & S_IFMT == S_IFDIR
    } else {
        mode & OWNER_RWX == OWNER_RWX
    }
}

/// A remote file found by [`RecursiveListing`](super::RecursiveListing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Path relative to the listing's start, `/`-separated.
    pub path: String,
    pub size: u64,
    pub mode: u32,
    pub mtime: u64,
    pub atime: u64,
    pub is_directory: bool,
}

impl RemoteEntry {
    pub fn from_attributes(parent: &str, attrs: FileAttributes) -> Self {
        let is_directory = attrs.is_directory();
        Self {
            path: join_remote(parent, &attrs.filename),
            size: attrs.size,
            mode: attrs.mode,
            mtime: attrs.mtime,
            atime: attrs.atime,
            is_directory,
        }
    }

    /// Permission bits to apply to the local copy.
    pub fn permissions(&self) -> u32 {
        self.mode & PERMISSION_BITS
    }

    pub fn modified(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.mtime)
    }

    pub fn accessed(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.atime)
    }
}

/// Joins a remote directory and an entry name with `/`.
///
/// `.` and the empty string denote the working directory and are dropped.
pub fn join_remote(parent: &str, name: &str) -> String {
    match parent {
        "" | "." => name.to_string(),
        p if p.ends_with('/') => format!("{p}{name}"),
        p => format!("{p}/{name}"),
    }
}
