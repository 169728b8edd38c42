use crate::codec::{CodecError, Decodable, Encodable, HeaderSet};
use crate::composer::HeaderWriter;
use crate::datatypes::{EncodedStringValue, HeaderField, MessageType, PduBody, ResponseStatus};
use crate::macros::{builder_setters, impl_pdu_variant};
use bytes::BytesMut;

/// M-Send.conf: the MMSC's verdict on a `SendReq`.
///
/// The status is kept as the raw octet because MMSCs may answer with codes
/// outside the registered set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendConf {
    pub transaction_id: Option<String>,
    pub message_id: Option<String>,
    pub response_status: u8,
    pub response_text: Option<EncodedStringValue>,
}

impl_pdu_variant!(SendConf, MessageType::SendConf);

impl SendConf {
    pub fn new(response_status: u8) -> Self {
        Self {
            transaction_id: None,
            message_id: None,
            response_status,
            response_text: None,
        }
    }

    builder_setters! {
        transaction_id: Option<String>,
        message_id: Option<String>,
        response_text: Option<EncodedStringValue>,
    }

    pub fn is_successful(&self) -> bool {
        self.response_status == ResponseStatus::Ok as u8
    }

    /// Typed view of the status, `None` for unregistered codes
    pub fn status(&self) -> Option<ResponseStatus> {
        ResponseStatus::try_from(self.response_status).ok()
    }
}

impl Encodable for SendConf {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let mut w = HeaderWriter::start(buf, Self::MESSAGE_TYPE);
        w.optional_text(HeaderField::TransactionId, self.transaction_id.as_deref())?;
        w.optional_text(HeaderField::MessageId, self.message_id.as_deref())?;
        w.octet(HeaderField::ResponseStatus, self.response_status);
        w.optional_encoded(HeaderField::ResponseText, self.response_text.as_ref())
    }
}

impl Decodable for SendConf {
    fn message_type() -> MessageType {
        Self::MESSAGE_TYPE
    }

    fn decode(headers: &HeaderSet, _body: PduBody) -> Result<Self, CodecError> {
        let response_status = headers
            .octet(HeaderField::ResponseStatus)
            .ok_or(CodecError::MissingHeader(HeaderField::ResponseStatus))?;
        Ok(SendConf {
            transaction_id: headers.text(HeaderField::TransactionId),
            message_id: headers.text(HeaderField::MessageId),
            response_status,
            response_text: headers.encoded(HeaderField::ResponseText),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::HeaderValue;

    #[test]
    fn only_ok_is_successful() {
        assert!(SendConf::new(0x80).is_successful());
        assert!(!SendConf::new(0x86).is_successful());
        assert_eq!(SendConf::new(0x86).status(), Some(ResponseStatus::ErrorNetworkProblem));
        assert_eq!(SendConf::new(0xC0).status(), None);
    }

    #[test]
    fn response_status_is_mandatory() {
        let mut headers = HeaderSet::new();
        headers.push(HeaderField::TransactionId, HeaderValue::Text("T1".into()));
        assert!(matches!(
            SendConf::decode(&headers, PduBody::new()),
            Err(CodecError::MissingHeader(HeaderField::ResponseStatus))
        ));

        headers.push(HeaderField::ResponseStatus, HeaderValue::Octet(0x81));
        let conf = SendConf::decode(&headers, PduBody::new()).unwrap();
        assert_eq!(conf.transaction_id.as_deref(), Some("T1"));
        assert_eq!(conf.response_status, 0x81);
    }
}
