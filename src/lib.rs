//! seedsync - torrent content verification and resumable remote mirroring
//!
//! Two pieces of a seedbox workflow: pull completed downloads from a remote
//! host with transfers that survive dropped connections, then prove the local
//! copy is intact by checking it against the torrent's piece hashes.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 bencode decoding
//! - [`metainfo`] - torrent metadata needed for verification
//! - [`verify`] - piece streaming and SHA-1 piece verification
//! - [`remote`] - remote transport capabilities, recursive listing, torrent client API
//! - [`mirror`] - resumable mirroring of a remote tree to local disk
//! - [`constants`] - protocol constants and tuning defaults
//!
//! Everything is synchronous and single-threaded. The library emits
//! [`tracing`] events and leaves installing a subscriber to the caller.

pub mod bencode;
pub mod constants;
pub mod metainfo;
pub mod mirror;
pub mod remote;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;

pub use bencode::{decode, decode_prefix, BencodeError, Value};
pub use metainfo::{FileEntry, MetainfoError, TorrentMetadata};
pub use mirror::{
    CancelToken, DirectoryCache, LocalState, MirrorEngine, MirrorOptions, MirrorReport,
    TransferError, TransferPlan, TransferState,
};
pub use remote::{
    ConnectParams, Connector, RangedRead, RecursiveListing, RemoteEntry, RemoteError,
    RemoteSession, SessionLink, TorrentManager,
};
pub use verify::{
    stream_pieces, verify, verify_bytes, verify_file, PieceStream, VerifyError, VerifyReport,
};
