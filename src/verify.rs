//! Checking on-disk content against a torrent's piece hashes.
//!
//! Files are read in the order the torrent lists them and cut into pieces
//! of `piece length` bytes; a piece may span several files. Each piece is
//! hashed with SHA-1 and compared, in constant time, with the stored digest.
//! Verification stops at the first mismatch.
//!
//! Memory use is bounded by one piece: [`PieceStream`] hands out each piece
//! as it fills and reuses the allocation once the piece is dropped.
//!
//! # Examples
//!
//! ```no_run
//! use seedsync::verify::{verify_file, VerifyError};
//!
//! match verify_file("ubuntu.torrent", "/srv/downloads") {
//!     Ok(report) => println!("{} pieces ok", report.pieces),
//!     Err(VerifyError::PieceMismatch { piece, .. }) => eprintln!("piece {piece} is corrupt"),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```
//!
//! # Content location
//!
//! For a multi-file torrent the content lives in the directory
//! `root/<name>`. For a single-file torrent it is the file `root/<name>`,
//! or `root` itself when the caller points directly at the file.

mod error;
mod pieces;
mod verifier;

pub use error::VerifyError;
pub use pieces::{stream_pieces, PieceStream};
pub use verifier::{verify, verify_bytes, verify_file, VerifyReport};
