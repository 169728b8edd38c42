// ABOUTME: Implements the encoded-string-value type: raw text bytes tagged with an IANA charset
// ABOUTME: Equality and hashing cover both the bytes and the charset

use bytes::Bytes;
use std::fmt;

/// IANA MIBenum charset codes used by MMS text headers.
pub mod charset {
    pub const US_ASCII: u16 = 3;
    pub const ISO_8859_1: u16 = 4;
    pub const UTF_8: u16 = 106;
    pub const UCS2: u16 = 1000;
    pub const UTF_16: u16 = 1015;
}

/// Text bytes plus the charset they are encoded in.
///
/// The bytes are owned by the value. Constructing from a borrowed slice copies
/// it, so later changes to the caller's buffer never leak into the value, and
/// [`EncodedStringValue::bytes`] hands back a cheap clone of the immutable
/// backing buffer rather than a view the caller could mutate. An empty value is
/// an empty buffer, never an absent one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedStringValue {
    charset: u16,
    data: Bytes,
}

impl EncodedStringValue {
    /// Build a value from bytes already encoded in `charset`.
    pub fn new(charset: u16, data: &[u8]) -> Self {
        Self {
            charset,
            data: Bytes::copy_from_slice(data),
        }
    }

    /// Build a UTF-8 value from a Rust string.
    pub fn from_text(text: &str) -> Self {
        Self::new(charset::UTF_8, text.as_bytes())
    }

    pub fn charset(&self) -> u16 {
        self.charset
    }

    /// The encoded bytes. The returned handle shares the immutable buffer.
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Decode the bytes according to the charset.
    ///
    /// UCS-2 and UTF-16 are read big-endian. Unknown charsets fall back to a
    /// lossy UTF-8 decode.
    pub fn string(&self) -> String {
        match self.charset {
            charset::ISO_8859_1 => self.data.iter().map(|&b| b as char).collect(),
            charset::UCS2 | charset::UTF_16 => {
                let units: Vec<u16> = self
                    .data
                    .chunks(2)
                    .map(|pair| match pair {
                        [hi, lo] => u16::from_be_bytes([*hi, *lo]),
                        [single] => *single as u16,
                        _ => 0,
                    })
                    .collect();
                String::from_utf16_lossy(&units)
            }
            _ => String::from_utf8_lossy(&self.data).into_owned(),
        }
    }
}

impl Default for EncodedStringValue {
    fn default() -> Self {
        Self {
            charset: charset::UTF_8,
            data: Bytes::new(),
        }
    }
}

impl From<&str> for EncodedStringValue {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl From<String> for EncodedStringValue {
    fn from(text: String) -> Self {
        Self {
            charset: charset::UTF_8,
            data: Bytes::from(text.into_bytes()),
        }
    }
}

impl fmt::Debug for EncodedStringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedStringValue")
            .field("charset", &self.charset)
            .field("text", &self.string())
            .finish()
    }
}

impl fmt::Display for EncodedStringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string())
    }
}
