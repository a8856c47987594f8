//! Bencode decoding ([BEP-3]).
//!
//! Torrent metadata is stored as bencode, a length-prefixed binary tree of
//! four value kinds:
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! Only decoding is provided. The decoder is lenient about what follows the
//! outer value: [`decode`] consumes exactly one value and ignores any
//! trailing bytes, and [`decode_prefix`] additionally reports how many bytes
//! that value occupied.
//!
//! ```
//! use seedsync::bencode::{decode, decode_prefix};
//!
//! let value = decode(b"d3:cow3:mooe").unwrap();
//! assert_eq!(value.get(b"cow").and_then(|v| v.as_str()), Some("moo"));
//!
//! let (value, used) = decode_prefix(b"i42etrailing").unwrap();
//! assert_eq!(value.as_integer(), Some(42));
//! assert_eq!(used, 4);
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod error;
mod value;

pub use decode::{decode, decode_prefix};
pub use error::BencodeError;
pub use value::Value;
