use crate::codec::{CodecError, Decodable, Encodable, HeaderSet};
use crate::composer::HeaderWriter;
use crate::datatypes::{EncodedStringValue, HeaderField, MessageClass, MessageType, PduBody};
use crate::macros::{builder_setters, impl_pdu_variant};
use bytes::BytesMut;

/// M-Notification.ind: the MMSC announcing a message waiting at `content_location`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotificationInd {
    pub transaction_id: Option<String>,
    pub content_location: Option<String>,
    pub from: Option<EncodedStringValue>,
    pub subject: Option<EncodedStringValue>,
    pub expiry: Option<u64>,
    pub message_size: Option<u64>,
    pub message_class: Option<MessageClass>,
}

impl_pdu_variant!(NotificationInd, MessageType::NotificationInd);

impl NotificationInd {
    pub fn new() -> Self {
        Self::default()
    }

    builder_setters! {
        transaction_id: Option<String>,
        content_location: Option<String>,
        from: Option<EncodedStringValue>,
        subject: Option<EncodedStringValue>,
        expiry: Option<u64>,
        message_size: Option<u64>,
        message_class: Option<MessageClass>,
    }
}

impl Encodable for NotificationInd {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let mut w = HeaderWriter::start(buf, Self::MESSAGE_TYPE);
        w.optional_text(HeaderField::TransactionId, self.transaction_id.as_deref())?;
        w.optional_text(HeaderField::ContentLocation, self.content_location.as_deref())?;
        w.optional_long(HeaderField::MessageSize, self.message_size);
        w.optional_long(HeaderField::Expiry, self.expiry);
        w.optional_encoded(HeaderField::From, self.from.as_ref())?;
        w.optional_encoded(HeaderField::Subject, self.subject.as_ref())?;
        w.optional_octet(HeaderField::MessageClass, self.message_class.map(|c| c as u8));
        Ok(())
    }
}

impl Decodable for NotificationInd {
    fn message_type() -> MessageType {
        Self::MESSAGE_TYPE
    }

    fn decode(headers: &HeaderSet, _body: PduBody) -> Result<Self, CodecError> {
        Ok(NotificationInd {
            transaction_id: headers.text(HeaderField::TransactionId),
            content_location: headers.text(HeaderField::ContentLocation),
            from: headers.encoded(HeaderField::From),
            subject: headers.encoded(HeaderField::Subject),
            expiry: headers.long(HeaderField::Expiry),
            message_size: headers.long(HeaderField::MessageSize),
            message_class: headers.typed(HeaderField::MessageClass)?,
        })
    }
}
