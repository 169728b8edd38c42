// WAP-MMS wire primitives
//
// This module holds the value encodings every PDU is built from (octet,
// text-string, uintvar, encoded-string-value, long-integer), the shared
// `CodecError`, and `HeaderSet`, the decoded form of a PDU header section.
// The composer and parser are thin layers over these functions.

use crate::datatypes::{EncodedStringValue, HeaderField, MessageType, PduBody, ValueKind};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;
use thiserror::Error;

/// Largest value the two-octet uintvar form can carry (14 bits)
pub const MAX_UINTVAR: u32 = 0x3FFF;

/// Largest part count the composer accepts (a single uintvar octet)
pub const MAX_BODY_PARTS: usize = 127;

/// Codec errors with enough context to point at the offending field
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Incomplete PDU: input ended while reading {0}")]
    Incomplete(&'static str),

    #[error("Empty input")]
    Empty,

    #[error("PDU does not start with a Message-Type header")]
    MissingMessageType,

    #[error("Unregistered message type: {0:#x}")]
    UnknownMessageType(u8),

    #[error("Message type {0:?} has no PDU representation")]
    UnsupportedMessageType(MessageType),

    #[error("Mandatory header {0:?} is missing")]
    MissingHeader(HeaderField),

    #[error("Unregistered header field: {0:#x}")]
    UnknownHeaderField(u8),

    #[error("Invalid value {value:#x} for header {field:?}")]
    InvalidFieldValue { field: HeaderField, value: u8 },

    #[error("Text-string for '{0}' is missing its 0x00 terminator")]
    MissingTerminator(&'static str),

    #[error("Text for '{0}' contains an embedded 0x00 byte")]
    EmbeddedNul(&'static str),

    #[error("uintvar value {0} exceeds the two-octet maximum of {MAX_UINTVAR}")]
    UintvarOverflow(u32),

    #[error("Body has {0} parts, at most {MAX_BODY_PARTS} are supported")]
    TooManyParts(usize),

    #[error("Body part {0} has no content type")]
    MissingPartContentType(usize),

    #[error("Body declares {0} parts but parts carry no length on the wire")]
    AmbiguousBody(u32),

    #[error("{remaining} unexpected trailing bytes after {message_type:?} headers")]
    TrailingBytes {
        message_type: MessageType,
        remaining: usize,
    },

    #[error("UTF-8 decoding error in field '{field}': {source}")]
    Utf8Error {
        field: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Trait for PDUs that can be written to the wire
pub trait Encodable {
    /// Encode the complete PDU (headers, then body if the type carries one)
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError>;

    /// Convenience wrapper returning the frozen buffer
    fn to_bytes(&self) -> Result<Bytes, CodecError> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// Trait for PDUs that can be built from a decoded header section
pub trait Decodable: Sized {
    /// The message type this PDU is registered under
    fn message_type() -> MessageType;

    /// Build the PDU from its headers and (possibly empty) body
    fn decode(headers: &HeaderSet, body: PduBody) -> Result<Self, CodecError>;
}

/// Encode a single octet
pub fn encode_octet(buf: &mut BytesMut, value: u8) {
    buf.put_u8(value);
}

/// Encode raw bytes followed by a 0x00 terminator
pub fn encode_text_string(
    buf: &mut BytesMut,
    text: &[u8],
    field: &'static str,
) -> Result<(), CodecError> {
    if text.contains(&0) {
        return Err(CodecError::EmbeddedNul(field));
    }
    buf.put_slice(text);
    buf.put_u8(0);
    Ok(())
}

/// Encode a uintvar in the simplified form: one octet below 128, otherwise
/// two octets with the continuation bit on the first.
pub fn encode_uintvar(buf: &mut BytesMut, value: u32) -> Result<(), CodecError> {
    if value < 0x80 {
        buf.put_u8(value as u8);
    } else if value <= MAX_UINTVAR {
        buf.put_u8(0x80 | ((value >> 8) & 0x7F) as u8);
        buf.put_u8((value & 0xFF) as u8);
    } else {
        return Err(CodecError::UintvarOverflow(value));
    }
    Ok(())
}

/// Encode the charset as a uintvar, then the text bytes as a text-string
pub fn encode_encoded_string(
    buf: &mut BytesMut,
    value: &EncodedStringValue,
    field: &'static str,
) -> Result<(), CodecError> {
    encode_uintvar(buf, value.charset() as u32)?;
    encode_text_string(buf, value.as_bytes(), field)
}

/// Encode the lower 32 bits of `value`, big-endian
pub fn encode_long_integer(buf: &mut BytesMut, value: u64) {
    buf.put_u32(value as u32);
}

/// Decode a single octet
pub fn decode_octet(buf: &mut Cursor<&[u8]>, field: &'static str) -> Result<u8, CodecError> {
    if !buf.has_remaining() {
        return Err(CodecError::Incomplete(field));
    }
    Ok(buf.get_u8())
}

/// Decode bytes up to (and consuming) the next 0x00
pub fn decode_text_string(
    buf: &mut Cursor<&[u8]>,
    field: &'static str,
) -> Result<Bytes, CodecError> {
    let end = buf
        .chunk()
        .iter()
        .position(|&b| b == 0)
        .ok_or(CodecError::MissingTerminator(field))?;
    let text = buf.copy_to_bytes(end);
    buf.advance(1);
    Ok(text)
}

/// Decode a text-string and require it to be valid UTF-8
pub fn decode_text(buf: &mut Cursor<&[u8]>, field: &'static str) -> Result<String, CodecError> {
    let raw = decode_text_string(buf, field)?;
    String::from_utf8(raw.to_vec()).map_err(|source| CodecError::Utf8Error { field, source })
}

/// Decode the simplified uintvar written by [`encode_uintvar`]
pub fn decode_uintvar(buf: &mut Cursor<&[u8]>, field: &'static str) -> Result<u32, CodecError> {
    let first = decode_octet(buf, field)?;
    if first & 0x80 == 0 {
        return Ok(first as u32);
    }
    let second = decode_octet(buf, field)?;
    Ok((((first & 0x7F) as u32) << 8) | second as u32)
}

/// Decode a uintvar charset followed by a text-string
pub fn decode_encoded_string(
    buf: &mut Cursor<&[u8]>,
    field: &'static str,
) -> Result<EncodedStringValue, CodecError> {
    let charset = decode_uintvar(buf, field)?;
    let text = decode_text_string(buf, field)?;
    Ok(EncodedStringValue::new(charset as u16, &text))
}

/// Decode a fixed four-octet big-endian integer
pub fn decode_long_integer(
    buf: &mut Cursor<&[u8]>,
    field: &'static str,
) -> Result<u64, CodecError> {
    if buf.remaining() < 4 {
        return Err(CodecError::Incomplete(field));
    }
    Ok(buf.get_u32() as u64)
}

/// A decoded header value, shaped by its field's [`ValueKind`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderValue {
    Octet(u8),
    Text(String),
    Encoded(EncodedStringValue),
    Long(u64),
}

impl HeaderValue {
    /// Decode the value that follows `field` on the wire
    pub fn decode(field: HeaderField, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let name = field.name();
        Ok(match field.value_kind() {
            ValueKind::Octet => HeaderValue::Octet(decode_octet(buf, name)?),
            ValueKind::TextString => HeaderValue::Text(decode_text(buf, name)?),
            ValueKind::EncodedString => HeaderValue::Encoded(decode_encoded_string(buf, name)?),
            ValueKind::LongInteger => HeaderValue::Long(decode_long_integer(buf, name)?),
        })
    }
}

/// Ordered header section of a PDU.
///
/// Repeated fields (To, Cc, Bcc may legitimately repeat) are kept in order;
/// single-valued lookups return the first occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(HeaderField, HeaderValue)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: HeaderField, value: HeaderValue) {
        self.entries.push((field, value));
    }

    pub fn get(&self, field: HeaderField) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v)
    }

    pub fn get_all(&self, field: HeaderField) -> impl Iterator<Item = &HeaderValue> {
        self.entries
            .iter()
            .filter(move |(f, _)| *f == field)
            .map(|(_, v)| v)
    }

    pub fn octet(&self, field: HeaderField) -> Option<u8> {
        match self.get(field)? {
            HeaderValue::Octet(v) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, field: HeaderField) -> Option<String> {
        match self.get(field)? {
            HeaderValue::Text(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn encoded(&self, field: HeaderField) -> Option<EncodedStringValue> {
        match self.get(field)? {
            HeaderValue::Encoded(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn long(&self, field: HeaderField) -> Option<u64> {
        match self.get(field)? {
            HeaderValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Decode an enumerated octet header, rejecting values outside the enum
    pub fn typed<T>(&self, field: HeaderField) -> Result<Option<T>, CodecError>
    where
        T: TryFrom<u8>,
    {
        match self.octet(field) {
            None => Ok(None),
            Some(raw) => T::try_from(raw)
                .map(Some)
                .map_err(|_| CodecError::InvalidFieldValue { field, value: raw }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
