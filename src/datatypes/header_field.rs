// ABOUTME: Defines the closed set of MMS header field codes and the value shape each one carries
// ABOUTME: Field codes live in the 0x81-0x98 range with the high bit set on the wire

use num_enum::TryFromPrimitive;

/// MMS header field codes.
///
/// On the wire every header is a single field-code octet followed by a value
/// whose shape is fixed by the field (see [`ValueKind`]). Because every code
/// has its high bit set, an octet below 0x80 where a field code is expected
/// marks the start of the body section.
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HeaderField {
    Bcc = 0x81,
    Cc = 0x82,
    ContentLocation = 0x83,
    ContentType = 0x84,
    Date = 0x85,
    DeliveryReport = 0x86,
    DeliveryTime = 0x87,
    Expiry = 0x88,
    From = 0x89,
    MessageClass = 0x8A,
    MessageId = 0x8B,
    MessageType = 0x8C,
    MmsVersion = 0x8D,
    MessageSize = 0x8E,
    Priority = 0x8F,
    ReadReport = 0x90,
    // 0x91 (Report-Allowed) is not part of the registry
    ResponseStatus = 0x92,
    ResponseText = 0x93,
    SenderVisibility = 0x94,
    Status = 0x95,
    Subject = 0x96,
    To = 0x97,
    TransactionId = 0x98,
}

/// Wire shape of a header value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// A single octet
    Octet,
    /// Raw bytes terminated by 0x00
    TextString,
    /// uintvar charset followed by a text-string
    EncodedString,
    /// Four big-endian bytes
    LongInteger,
}

impl HeaderField {
    /// Canonical display name
    pub fn name(self) -> &'static str {
        match self {
            HeaderField::Bcc => "BCC",
            HeaderField::Cc => "CC",
            HeaderField::ContentLocation => "Content-Location",
            HeaderField::ContentType => "Content-Type",
            HeaderField::Date => "Date",
            HeaderField::DeliveryReport => "Delivery-Report",
            HeaderField::DeliveryTime => "Delivery-Time",
            HeaderField::Expiry => "Expiry",
            HeaderField::From => "From",
            HeaderField::MessageClass => "Message-Class",
            HeaderField::MessageId => "Message-ID",
            HeaderField::MessageType => "Message-Type",
            HeaderField::MmsVersion => "MMS-Version",
            HeaderField::MessageSize => "Message-Size",
            HeaderField::Priority => "Priority",
            HeaderField::ReadReport => "Read-Report",
            HeaderField::ResponseStatus => "Response-Status",
            HeaderField::ResponseText => "Response-Text",
            HeaderField::SenderVisibility => "Sender-Visibility",
            HeaderField::Status => "Status",
            HeaderField::Subject => "Subject",
            HeaderField::To => "To",
            HeaderField::TransactionId => "Transaction-ID",
        }
    }

    /// The value shape that follows this field code on the wire.
    pub fn value_kind(self) -> ValueKind {
        match self {
            HeaderField::MessageType
            | HeaderField::MmsVersion
            | HeaderField::Priority
            | HeaderField::DeliveryReport
            | HeaderField::ReadReport
            | HeaderField::ResponseStatus
            | HeaderField::MessageClass
            | HeaderField::SenderVisibility
            | HeaderField::Status => ValueKind::Octet,
            HeaderField::TransactionId
            | HeaderField::MessageId
            | HeaderField::ContentLocation
            | HeaderField::ContentType => ValueKind::TextString,
            HeaderField::From
            | HeaderField::Subject
            | HeaderField::To
            | HeaderField::Cc
            | HeaderField::Bcc
            | HeaderField::ResponseText => ValueKind::EncodedString,
            HeaderField::Date
            | HeaderField::Expiry
            | HeaderField::MessageSize
            | HeaderField::DeliveryTime => ValueKind::LongInteger,
        }
    }
}
