//! Remote side of a mirror: the capability interfaces the transfer engine
//! consumes and the recursive directory lister built on them.
//!
//! The transport itself (SSH/SFTP, authentication, keepalives) is supplied by
//! the caller through [`Connector`] and [`RemoteSession`]. The interface is
//! deliberately narrow: list a directory, open a file for ranged reads, fetch
//! a whole file, change and query the working directory, close.
//!
//! # Components
//!
//! - [`Connector`] / [`RemoteSession`] / [`RangedRead`] - transport capabilities
//! - [`SessionLink`] - a session plus what is needed to re-establish it
//! - [`RecursiveListing`] - lazy depth-first listing of a remote tree
//! - [`TorrentManager`] - the torrent client API consumed after a mirror run
//!
//! # Directory detection
//!
//! Entries are classified by their mode. When the server sends file-type
//! bits, `S_IFDIR` decides; otherwise an owner `rwx` pattern (`0o700`) marks
//! a directory, which is the convention of the seedbox servers this targets.

mod entry;
mod error;
mod listing;
mod session;
mod torrents;

pub use entry::{join_remote, mode_is_directory, FileAttributes, RemoteEntry};
pub use error::RemoteError;
pub use listing::{list_recursive, Entries, RecursiveListing};
pub use session::{ConnectParams, Connector, RangedRead, RemoteSession, SessionLink};
pub use torrents::{select_by_path_prefix, settle, SettleReport, TorrentManager, TorrentRecord};
