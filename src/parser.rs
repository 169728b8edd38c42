// ABOUTME: Decodes WAP-MMS binary octets into PDU variants
// ABOUTME: A registry maps each message type to the constructor of its concrete variant

use crate::codec::{
    CodecError, Decodable, HeaderSet, HeaderValue, decode_octet, decode_text, decode_uintvar,
};
use crate::datatypes::{HeaderField, MessageType, PduBody, PduPart};
use crate::pdu::{GenericPdu, NotificationInd, RetrieveConf, SendConf, SendReq};
use bytes::{Buf, Bytes};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::LazyLock;
use tracing::{debug, warn};

static REGISTRY: LazyLock<PduRegistry> = LazyLock::new(PduRegistry::new);

/// Parse `bytes` into a PDU.
///
/// Empty input, an unregistered message type, a registered type with no
/// concrete variant, and malformed octets all yield `None`.
pub fn parse(bytes: &[u8]) -> Option<GenericPdu> {
    match try_parse(bytes) {
        Ok(pdu) => Some(pdu),
        Err(e) => {
            warn!(len = bytes.len(), error = %e, "failed to parse PDU");
            None
        }
    }
}

/// Parse `bytes`, reporting why they do not form a PDU.
pub fn try_parse(bytes: &[u8]) -> Result<GenericPdu, CodecError> {
    REGISTRY.parse(bytes)
}

type DecoderFn = Box<dyn Fn(&HeaderSet, PduBody) -> Result<GenericPdu, CodecError> + Send + Sync>;

/// Registry of PDU decoders keyed by message type
pub struct PduRegistry {
    decoders: HashMap<MessageType, DecoderFn>,
}

impl PduRegistry {
    /// Create a registry with every concrete variant registered
    pub fn new() -> Self {
        let mut registry = Self {
            decoders: HashMap::new(),
        };

        registry.register_pdu::<SendReq, _>(GenericPdu::SendReq);
        registry.register_pdu::<SendConf, _>(GenericPdu::SendConf);
        registry.register_pdu::<NotificationInd, _>(GenericPdu::NotificationInd);
        registry.register_pdu::<RetrieveConf, _>(GenericPdu::RetrieveConf);

        registry
    }

    fn register_pdu<T, F>(&mut self, constructor: F)
    where
        T: Decodable + 'static,
        F: Fn(T) -> GenericPdu + Send + Sync + 'static,
    {
        let decoder = Box::new(move |headers: &HeaderSet, body: PduBody| {
            let pdu = T::decode(headers, body)?;
            Ok(constructor(pdu))
        });
        self.decoders.insert(T::message_type(), decoder);
    }

    pub fn is_registered(&self, message_type: MessageType) -> bool {
        self.decoders.contains_key(&message_type)
    }

    /// Decode a complete PDU
    pub fn parse(&self, bytes: &[u8]) -> Result<GenericPdu, CodecError> {
        if bytes.is_empty() {
            return Err(CodecError::Empty);
        }
        let mut buf = Cursor::new(bytes);

        let message_type = read_message_type(&mut buf)?;
        let decoder = self
            .decoders
            .get(&message_type)
            .ok_or(CodecError::UnsupportedMessageType(message_type))?;

        let headers = parse_headers(&mut buf, message_type)?;

        let body = if message_type.has_body() {
            parse_body(&mut buf, message_type)?
        } else if buf.has_remaining() {
            return Err(CodecError::TrailingBytes {
                message_type,
                remaining: buf.remaining(),
            });
        } else {
            PduBody::new()
        };

        debug!(
            ?message_type,
            headers = headers.len(),
            parts = body.len(),
            "parsed PDU"
        );
        decoder(&headers, body)
    }
}

impl Default for PduRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The first header must be Message-Type.
fn read_message_type(buf: &mut Cursor<&[u8]>) -> Result<MessageType, CodecError> {
    let field = decode_octet(buf, "Message-Type")?;
    if field != HeaderField::MessageType as u8 {
        return Err(CodecError::MissingMessageType);
    }
    let raw = decode_octet(buf, "Message-Type")?;
    MessageType::try_from(raw).map_err(|_| CodecError::UnknownMessageType(raw))
}

/// Read `field value` pairs until the input ends or an octet below 0x80
/// announces the body section.
fn parse_headers(
    buf: &mut Cursor<&[u8]>,
    message_type: MessageType,
) -> Result<HeaderSet, CodecError> {
    let mut headers = HeaderSet::new();
    headers.push(HeaderField::MessageType, HeaderValue::Octet(message_type as u8));

    while buf.has_remaining() {
        let code = buf.chunk()[0];
        if code < 0x80 {
            break;
        }
        buf.advance(1);
        let field = HeaderField::try_from(code).map_err(|_| CodecError::UnknownHeaderField(code))?;
        let value = HeaderValue::decode(field, buf)?;
        headers.push(field, value);
    }
    Ok(headers)
}

/// Decode the simplified body form.
///
/// Parts carry no length on the wire, so only a single part can be
/// delimited: its content type is a text-string and the payload is
/// everything after it.
fn parse_body(
    buf: &mut Cursor<&[u8]>,
    message_type: MessageType,
) -> Result<PduBody, CodecError> {
    let mut body = PduBody::new();
    if !buf.has_remaining() {
        return Ok(body);
    }

    let count = decode_uintvar(buf, "part count")?;
    match count {
        0 if buf.has_remaining() => Err(CodecError::TrailingBytes {
            message_type,
            remaining: buf.remaining(),
        }),
        0 => Ok(body),
        1 => {
            let content_type = decode_text(buf, "Content-Type")?;
            let payload: Bytes = buf.copy_to_bytes(buf.remaining());
            let data = (!payload.is_empty()).then_some(payload);
            body.add_part(PduPart::new().content_type(Some(content_type)).data(data));
            Ok(body)
        }
        n => Err(CodecError::AmbiguousBody(n)),
    }
}
