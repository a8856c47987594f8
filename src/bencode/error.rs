use thiserror::Error;

/// Errors produced while decoding bencode.
///
/// Every variant carries the byte offset at which decoding stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BencodeError {
    /// Input ended inside a value, including an unterminated list or dictionary.
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof { offset: usize },

    /// An integer token was empty, non-numeric, had leading zeros, or overflowed.
    #[error("invalid integer {token:?} at byte {offset}")]
    InvalidInteger { token: String, offset: usize },

    /// A byte-string length prefix was not a decimal number.
    #[error("invalid string length at byte {offset}")]
    InvalidLength { offset: usize },

    /// A byte string declared more bytes than the input holds.
    #[error("byte string at {offset} declares {declared} bytes but only {available} remain")]
    Truncated {
        offset: usize,
        declared: usize,
        available: usize,
    },

    /// A byte that cannot start a value.
    #[error("unexpected byte 0x{byte:02x} at {offset}")]
    UnexpectedByte { byte: u8, offset: usize },

    /// A dictionary key that is not a byte string.
    #[error("dictionary key at byte {offset} is not a byte string")]
    NonStringKey { offset: usize },

    #[error("nesting deeper than {max} levels at byte {offset}")]
    NestingTooDeep { max: usize, offset: usize },
}

impl BencodeError {
    /// Byte offset in the input where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            BencodeError::UnexpectedEof { offset }
            | BencodeError::InvalidInteger { offset, .. }
            | BencodeError::InvalidLength { offset }
            | BencodeError::Truncated { offset, .. }
            | BencodeError::UnexpectedByte { offset, .. }
            | BencodeError::NonStringKey { offset }
            | BencodeError::NestingTooDeep { offset, .. } => *offset,
        }
    }
}
