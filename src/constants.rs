//! Protocol constants and tuning parameters.
//!
//! Values that come from the torrent format or the remote transport are
//! fixed; the mirror tunables here are the defaults used by
//! [`MirrorOptions`](crate::mirror::MirrorOptions).

use std::time::Duration;

// ============================================================================
// Torrent metadata
// ============================================================================

/// Length of a v1 piece digest (SHA-1) in bytes.
pub const PIECE_HASH_LEN: usize = 20;

/// Maximum nesting depth accepted by the bencode decoder.
pub const MAX_BENCODE_DEPTH: usize = 64;

// ============================================================================
// Remote transfer
// ============================================================================

/// Largest read a single request may ask the remote for.
///
/// Matches the SFTP maximum request size most servers accept (32 KiB).
pub const MAX_PACKET_SIZE: u32 = 32 * 1024;

/// Bytes re-fetched before the end of the local file after a transport fault.
///
/// The last write before a fault may have been only partially flushed, so
/// the resume point is moved back by this margin.
pub const RESUME_BACKOFF_BYTES: u64 = 10;

/// Default SSH/SFTP port.
pub const DEFAULT_PORT: u16 = 22;

/// Keepalive interval requested from the transport.
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(5);

/// Minimum time between two progress log lines for one transfer.
pub const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(60);

// ============================================================================
// Remote file modes
// ============================================================================

/// Mask selecting the file-type bits of a POSIX mode.
pub const S_IFMT: u32 = 0o170_000;

/// File-type bits of a directory.
pub const S_IFDIR: u32 = 0o040_000;

/// Owner read/write/execute bits.
///
/// Servers that omit the file-type bits mark directories with this pattern.
pub const OWNER_RWX: u32 = 0o700;

/// Mask of the permission bits restored on local files.
pub const PERMISSION_BITS: u32 = 0o7777;
