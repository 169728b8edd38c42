use crate::codec::{CodecError, Decodable, Encodable, HeaderSet};
use crate::composer::HeaderWriter;
use crate::datatypes::{
    EncodedStringValue, HeaderField, MessageType, PduBody, Priority, ReportFlag, SenderVisibility,
};
use crate::macros::{builder_setters, impl_pdu_variant};
use bytes::BytesMut;

/// M-Send.req: an outbound message handed to the MMSC.
///
/// `date` and `expiry` are seconds since the Unix epoch; only the lower 32
/// bits survive encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SendReq {
    pub transaction_id: Option<String>,
    pub from: Option<EncodedStringValue>,
    pub date: u64,
    pub priority: Priority,
    pub delivery_report: ReportFlag,
    pub read_report: ReportFlag,
    pub expiry: Option<u64>,
    pub subject: Option<EncodedStringValue>,
    /// Written only when set; the MMSC shows the sender otherwise
    pub sender_visibility: Option<SenderVisibility>,
    pub body: PduBody,
}

impl_pdu_variant!(SendReq, MessageType::SendReq);

impl SendReq {
    pub fn new() -> Self {
        Self::default()
    }

    builder_setters! {
        transaction_id: Option<String>,
        from: Option<EncodedStringValue>,
        date: u64,
        priority: Priority,
        delivery_report: ReportFlag,
        read_report: ReportFlag,
        expiry: Option<u64>,
        subject: Option<EncodedStringValue>,
        sender_visibility: Option<SenderVisibility>,
        body: PduBody,
    }
}

impl Encodable for SendReq {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let mut w = HeaderWriter::start(buf, Self::MESSAGE_TYPE);
        w.optional_text(HeaderField::TransactionId, self.transaction_id.as_deref())?;
        w.optional_encoded(HeaderField::From, self.from.as_ref())?;
        w.long(HeaderField::Date, self.date);
        w.octet(HeaderField::Priority, self.priority as u8);
        w.octet(HeaderField::DeliveryReport, self.delivery_report as u8);
        w.octet(HeaderField::ReadReport, self.read_report as u8);
        w.optional_long(HeaderField::Expiry, self.expiry);
        w.optional_encoded(HeaderField::Subject, self.subject.as_ref())?;
        w.optional_octet(
            HeaderField::SenderVisibility,
            self.sender_visibility.map(|v| v as u8),
        );
        w.body(&self.body)
    }
}

impl Decodable for SendReq {
    fn message_type() -> MessageType {
        Self::MESSAGE_TYPE
    }

    fn decode(headers: &HeaderSet, body: PduBody) -> Result<Self, CodecError> {
        Ok(SendReq {
            transaction_id: headers.text(HeaderField::TransactionId),
            from: headers.encoded(HeaderField::From),
            date: headers.long(HeaderField::Date).unwrap_or_default(),
            priority: headers.typed(HeaderField::Priority)?.unwrap_or_default(),
            delivery_report: headers.typed(HeaderField::DeliveryReport)?.unwrap_or_default(),
            read_report: headers.typed(HeaderField::ReadReport)?.unwrap_or_default(),
            expiry: headers.long(HeaderField::Expiry),
            subject: headers.encoded(HeaderField::Subject),
            sender_visibility: headers.typed(HeaderField::SenderVisibility)?,
            body,
        })
    }
}
