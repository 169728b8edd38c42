use crate::codec::{CodecError, Decodable, Encodable, HeaderSet};
use crate::composer::HeaderWriter;
use crate::datatypes::{
    EncodedStringValue, HeaderField, MessageType, PduBody, Priority, ReportFlag,
};
use crate::macros::{builder_setters, impl_pdu_variant};
use bytes::BytesMut;

/// M-Retrieve.conf: the full message fetched from a notification's content location.
///
/// The report flags are read when present but are not written back; the
/// composed header set stops at Content-Type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RetrieveConf {
    pub transaction_id: Option<String>,
    pub message_id: Option<String>,
    pub content_type: Option<String>,
    pub date: u64,
    pub from: Option<EncodedStringValue>,
    pub subject: Option<EncodedStringValue>,
    pub priority: Priority,
    pub delivery_report: ReportFlag,
    pub read_report: ReportFlag,
    pub body: PduBody,
}

impl_pdu_variant!(RetrieveConf, MessageType::RetrieveConf);

impl RetrieveConf {
    pub fn new() -> Self {
        Self::default()
    }

    builder_setters! {
        transaction_id: Option<String>,
        message_id: Option<String>,
        content_type: Option<String>,
        date: u64,
        from: Option<EncodedStringValue>,
        subject: Option<EncodedStringValue>,
        priority: Priority,
        delivery_report: ReportFlag,
        read_report: ReportFlag,
        body: PduBody,
    }
}

impl Encodable for RetrieveConf {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let mut w = HeaderWriter::start(buf, Self::MESSAGE_TYPE);
        w.optional_text(HeaderField::TransactionId, self.transaction_id.as_deref())?;
        w.optional_text(HeaderField::MessageId, self.message_id.as_deref())?;
        w.long(HeaderField::Date, self.date);
        w.optional_encoded(HeaderField::From, self.from.as_ref())?;
        w.optional_encoded(HeaderField::Subject, self.subject.as_ref())?;
        w.octet(HeaderField::Priority, self.priority as u8);
        w.optional_text(HeaderField::ContentType, self.content_type.as_deref())?;
        w.body(&self.body)
    }
}

impl Decodable for RetrieveConf {
    fn message_type() -> MessageType {
        Self::MESSAGE_TYPE
    }

    fn decode(headers: &HeaderSet, body: PduBody) -> Result<Self, CodecError> {
        Ok(RetrieveConf {
            transaction_id: headers.text(HeaderField::TransactionId),
            message_id: headers.text(HeaderField::MessageId),
            content_type: headers.text(HeaderField::ContentType),
            date: headers.long(HeaderField::Date).unwrap_or_default(),
            from: headers.encoded(HeaderField::From),
            subject: headers.encoded(HeaderField::Subject),
            priority: headers.typed(HeaderField::Priority)?.unwrap_or_default(),
            delivery_report: headers.typed(HeaderField::DeliveryReport)?.unwrap_or_default(),
            read_report: headers.typed(HeaderField::ReadReport)?.unwrap_or_default(),
            body,
        })
    }
}
