// ABOUTME: Serializes PDU variants into WAP-MMS binary octets
// ABOUTME: Public entry points never panic; failures become None or a CodecError

use crate::codec::{
    CodecError, Encodable, MAX_BODY_PARTS, encode_encoded_string, encode_long_integer,
    encode_octet, encode_text_string, encode_uintvar,
};
use crate::datatypes::{
    CURRENT_MMS_VERSION, EncodedStringValue, HeaderField, MessageType, PduBody,
};
use crate::pdu::GenericPdu;
use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, warn};

/// Compose `pdu` into its binary form.
///
/// Returns `None` when the PDU cannot be represented in the wire format
/// (see [`try_compose`] for the reason).
pub fn compose(pdu: &GenericPdu) -> Option<Bytes> {
    match try_compose(pdu) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!(message_type = ?pdu.message_type(), error = %e, "failed to compose PDU");
            None
        }
    }
}

/// Compose `pdu`, reporting why it could not be encoded.
pub fn try_compose(pdu: &GenericPdu) -> Result<Bytes, CodecError> {
    let mut buf = BytesMut::new();
    match pdu {
        GenericPdu::SendReq(p) => p.encode(&mut buf)?,
        GenericPdu::SendConf(p) => p.encode(&mut buf)?,
        GenericPdu::NotificationInd(p) => p.encode(&mut buf)?,
        GenericPdu::RetrieveConf(p) => p.encode(&mut buf)?,
    }
    debug!(message_type = ?pdu.message_type(), len = buf.len(), "composed PDU");
    Ok(buf.freeze())
}

/// Writes `field value` pairs into a PDU buffer.
///
/// Construction writes the Message-Type and MMS-Version pair every PDU
/// starts with; the caller then appends its type-specific headers in order.
pub(crate) struct HeaderWriter<'a> {
    buf: &'a mut BytesMut,
}

impl<'a> HeaderWriter<'a> {
    pub(crate) fn start(buf: &'a mut BytesMut, message_type: MessageType) -> Self {
        encode_octet(buf, HeaderField::MessageType as u8);
        encode_octet(buf, message_type as u8);
        encode_octet(buf, HeaderField::MmsVersion as u8);
        encode_octet(buf, CURRENT_MMS_VERSION);
        Self { buf }
    }

    pub(crate) fn octet(&mut self, field: HeaderField, value: u8) {
        encode_octet(self.buf, field as u8);
        encode_octet(self.buf, value);
    }

    pub(crate) fn long(&mut self, field: HeaderField, value: u64) {
        encode_octet(self.buf, field as u8);
        encode_long_integer(self.buf, value);
    }

    pub(crate) fn text(&mut self, field: HeaderField, value: &str) -> Result<(), CodecError> {
        encode_octet(self.buf, field as u8);
        encode_text_string(self.buf, value.as_bytes(), field.name())
    }

    pub(crate) fn encoded(
        &mut self,
        field: HeaderField,
        value: &EncodedStringValue,
    ) -> Result<(), CodecError> {
        encode_octet(self.buf, field as u8);
        encode_encoded_string(self.buf, value, field.name())
    }

    pub(crate) fn optional_octet(&mut self, field: HeaderField, value: Option<u8>) {
        if let Some(v) = value {
            self.octet(field, v);
        }
    }

    pub(crate) fn optional_long(&mut self, field: HeaderField, value: Option<u64>) {
        if let Some(v) = value {
            self.long(field, v);
        }
    }

    pub(crate) fn optional_text(
        &mut self,
        field: HeaderField,
        value: Option<&str>,
    ) -> Result<(), CodecError> {
        match value {
            Some(v) => self.text(field, v),
            None => Ok(()),
        }
    }

    pub(crate) fn optional_encoded(
        &mut self,
        field: HeaderField,
        value: Option<&EncodedStringValue>,
    ) -> Result<(), CodecError> {
        match value {
            Some(v) => self.encoded(field, v),
            None => Ok(()),
        }
    }

    /// Append the body section. An empty body writes nothing.
    pub(crate) fn body(self, body: &PduBody) -> Result<(), CodecError> {
        encode_body(self.buf, body)
    }
}

/// Part count as a uintvar, then for each part its content type as a
/// text-string followed by the raw payload. Parts carry no length prefix.
pub fn encode_body(buf: &mut BytesMut, body: &PduBody) -> Result<(), CodecError> {
    if body.is_empty() {
        return Ok(());
    }
    if body.len() > MAX_BODY_PARTS {
        return Err(CodecError::TooManyParts(body.len()));
    }

    encode_uintvar(buf, body.len() as u32)?;
    for (index, part) in body.iter().enumerate() {
        let content_type = part
            .content_type
            .as_deref()
            .ok_or(CodecError::MissingPartContentType(index))?;
        encode_text_string(buf, content_type.as_bytes(), "Content-Type")?;
        buf.put_slice(part.payload());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::{PduPart, Priority, ReportFlag};
    use crate::pdu::{NotificationInd, RetrieveConf, SendConf, SendReq};

    fn scenario_send_req() -> SendReq {
        SendReq::new()
            .transaction_id(Some("T1".into()))
            .from(Some("+15555550100".into()))
            .subject(Some("Hi".into()))
            .priority(Priority::High)
            .delivery_report(ReportFlag::Yes)
    }

    #[test]
    fn send_req_starts_with_message_type_then_version() {
        let bytes = compose(&scenario_send_req().into()).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(&bytes[..2], &[0x8C, 0x80]);
        assert!(bytes.windows(2).any(|w| w == [0x8D, 0x12]));
    }

    #[test]
    fn send_req_headers_follow_fixed_order() {
        let pdu = scenario_send_req().date(0x0102_0304);
        let bytes = compose(&pdu.into()).unwrap();

        let mut expected = vec![0x8C, 0x80, 0x8D, 0x12];
        expected.extend_from_slice(&[0x98, b'T', b'1', 0]);
        expected.push(0x89);
        expected.push(106);
        expected.extend_from_slice(b"+15555550100\0");
        expected.extend_from_slice(&[0x85, 0x01, 0x02, 0x03, 0x04]);
        expected.extend_from_slice(&[0x8F, 0x82]);
        expected.extend_from_slice(&[0x86, 0x80]);
        expected.extend_from_slice(&[0x90, 0x81]);
        expected.extend_from_slice(&[0x96, 106, b'H', b'i', 0]);
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn send_conf_layout() {
        let pdu = SendConf::new(0x80)
            .transaction_id(Some("T9".into()))
            .message_id(Some("M1".into()));
        let bytes = compose(&pdu.into()).unwrap();
        assert_eq!(
            &bytes[..],
            &[0x8C, 0x81, 0x8D, 0x12, 0x98, b'T', b'9', 0, 0x8B, b'M', b'1', 0, 0x92, 0x80]
        );
    }

    #[test]
    fn notification_ind_layout() {
        let pdu = NotificationInd::new()
            .transaction_id(Some("N1".into()))
            .content_location(Some("http://x/1".into()))
            .message_size(Some(300))
            .expiry(Some(3600));
        let bytes = compose(&pdu.into()).unwrap();

        let mut expected = vec![0x8C, 0x82, 0x8D, 0x12, 0x98, b'N', b'1', 0, 0x83];
        expected.extend_from_slice(b"http://x/1\0");
        expected.extend_from_slice(&[0x8E, 0, 0, 0x01, 0x2C]);
        expected.extend_from_slice(&[0x88, 0, 0, 0x0E, 0x10]);
        assert_eq!(&bytes[..], &expected[..]);
    }

    #[test]
    fn retrieve_conf_body_follows_headers() {
        let mut pdu = RetrieveConf::new()
            .message_id(Some("M2".into()))
            .content_type(Some("application/vnd.wap.multipart.related".into()));
        pdu.body.add_part(PduPart::with_data("text/plain", "hello"));
        let bytes = compose(&pdu.into()).unwrap();

        let tail: Vec<u8> = [&[0x01][..], b"text/plain\0", b"hello"].concat();
        assert!(bytes.ends_with(&tail));
    }

    #[test]
    fn embedded_nul_in_transaction_id_fails() {
        let pdu = SendReq::new().transaction_id(Some("T\01".into()));
        assert!(compose(&pdu.clone().into()).is_none());
        assert!(matches!(
            try_compose(&pdu.into()),
            Err(CodecError::EmbeddedNul("Transaction-ID"))
        ));
    }

    #[test]
    fn part_without_content_type_fails() {
        let mut pdu = SendReq::new();
        pdu.body.add_part(PduPart::new().data(Some(Bytes::from_static(b"x"))));
        assert!(matches!(
            try_compose(&pdu.into()),
            Err(CodecError::MissingPartContentType(0))
        ));
    }

    #[test]
    fn oversized_charset_fails() {
        let pdu = SendReq::new().subject(Some(EncodedStringValue::new(0x4000, b"x")));
        assert!(matches!(
            try_compose(&pdu.into()),
            Err(CodecError::UintvarOverflow(0x4000))
        ));
    }

    #[test]
    fn too_many_parts_fails() {
        let body: PduBody = (0..=MAX_BODY_PARTS)
            .map(|_| PduPart::with_data("text/plain", "x"))
            .collect();
        let pdu = SendReq::new().body(body);
        assert!(matches!(
            try_compose(&pdu.into()),
            Err(CodecError::TooManyParts(128))
        ));
    }
}
