//! Torrent metainfo handling ([BEP-3]).
//!
//! A `.torrent` file is a bencoded dictionary whose `info` entry describes
//! the content: a suggested `name`, the `piece length`, the concatenated
//! SHA-1 digests of every piece in `pieces`, and either a `files` list
//! (multi-file torrent) or nothing more (single-file torrent).
//!
//! [`TorrentMetadata`] is the immutable view of that dictionary needed to
//! check content on disk. It is built once per verification from raw bytes.
//!
//! ```
//! use seedsync::metainfo::TorrentMetadata;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = b"d8:announce15:http://test.com4:infod6:lengthi3e4:name5:a.txt\
//!              12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee";
//! let torrent = TorrentMetadata::from_bytes(data)?;
//!
//! assert!(torrent.is_single_file());
//! assert_eq!(torrent.display_name(), "a.txt");
//! assert_eq!(torrent.piece_count(), 1);
//! assert_eq!(torrent.total_length(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod error;
mod torrent;

pub use error::MetainfoError;
pub use torrent::{FileEntry, TorrentMetadata};
