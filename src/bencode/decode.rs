use super::error::BencodeError;
use super::value::Value;
use crate::constants::MAX_BENCODE_DEPTH;
use bytes::Bytes;
use std::collections::BTreeMap;

/// Decodes the first bencode value in `data`.
///
/// Bytes after the first complete value are ignored.
///
/// # Errors
///
/// Fails if the value is truncated, an integer or length token is not
/// numeric, a list or dictionary is never terminated, or nesting exceeds
/// [`MAX_BENCODE_DEPTH`].
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    decode_prefix(data).map(|(value, _)| value)
}

/// Decodes the first bencode value in `data` and returns it together with
/// the number of bytes it occupied.
pub fn decode_prefix(data: &[u8]) -> Result<(Value, usize), BencodeError> {
    let mut decoder = Decoder { data, pos: 0 };
    let value = decoder.value(0)?;
    Ok((value, decoder.pos))
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn peek(&self) -> Result<u8, BencodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(BencodeError::UnexpectedEof { offset: self.pos })
    }

    fn value(&mut self, depth: usize) -> Result<Value, BencodeError> {
        if depth > MAX_BENCODE_DEPTH {
            return Err(BencodeError::NestingTooDeep {
                max: MAX_BENCODE_DEPTH,
                offset: self.pos,
            });
        }

        match self.peek()? {
            b'i' => self.integer().map(Value::Integer),
            b'l' => self.list(depth),
            b'd' => self.dict(depth),
            b'0'..=b'9' => self.byte_string().map(Value::Bytes),
            byte => Err(BencodeError::UnexpectedByte {
                byte,
                offset: self.pos,
            }),
        }
    }

    /// Returns the bytes up to `terminator` and moves past the terminator.
    fn token(&mut self, terminator: u8) -> Result<&'a [u8], BencodeError> {
        let data: &'a [u8] = self.data;
        let rest = &data[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == terminator)
            .ok_or(BencodeError::UnexpectedEof { offset: data.len() })?;

        self.pos += len + 1;
        Ok(&rest[..len])
    }

    fn integer(&mut self) -> Result<i64, BencodeError> {
        let offset = self.pos;
        self.pos += 1;

        let token = self.token(b'e')?;
        parse_integer(token).ok_or_else(|| BencodeError::InvalidInteger {
            token: String::from_utf8_lossy(token).into_owned(),
            offset,
        })
    }

    fn byte_string(&mut self) -> Result<Bytes, BencodeError> {
        let offset = self.pos;
        let token = self.token(b':')?;

        let declared: usize = std::str::from_utf8(token)
            .ok()
            .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|s| s.parse().ok())
            .ok_or(BencodeError::InvalidLength { offset })?;

        let available = self.data.len() - self.pos;
        if declared > available {
            return Err(BencodeError::Truncated {
                offset,
                declared,
                available,
            });
        }

        let bytes = Bytes::copy_from_slice(&self.data[self.pos..self.pos + declared]);
        self.pos += declared;
        Ok(bytes)
    }

    fn list(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut items = Vec::new();

        while self.peek()? != b'e' {
            items.push(self.value(depth + 1)?);
        }

        self.pos += 1;
        Ok(Value::List(items))
    }

    fn dict(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut entries = BTreeMap::new();

        loop {
            match self.peek()? {
                b'e' => break,
                b'0'..=b'9' => {
                    let key = self.byte_string()?;
                    let value = self.value(depth + 1)?;
                    entries.insert(key, value);
                }
                _ => return Err(BencodeError::NonStringKey { offset: self.pos }),
            }
        }

        self.pos += 1;
        Ok(Value::Dict(entries))
    }
}

/// Parses a bencode integer body: optional `-`, then digits with no leading
/// zeros. `-0` is rejected.
fn parse_integer(token: &[u8]) -> Option<i64> {
    let digits = token.strip_prefix(b"-").unwrap_or(token);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }

    let negative = digits.len() != token.len();
    if digits[0] == b'0' && (digits.len() > 1 || negative) {
        return None;
    }

    std::str::from_utf8(token).ok()?.parse().ok()
}
