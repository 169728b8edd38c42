mod encoded_string_value;
mod header_field;
mod message_class;
mod message_type;
mod pdu_body;
mod pdu_part;
mod priority;
mod report_flag;
mod response_status;

pub use encoded_string_value::{EncodedStringValue, charset};
pub use header_field::{HeaderField, ValueKind};
pub use message_class::{MessageClass, SenderVisibility};
pub use message_type::MessageType;
pub use pdu_body::PduBody;
pub use pdu_part::PduPart;
pub use priority::Priority;
pub use report_flag::ReportFlag;
pub use response_status::ResponseStatus;

/// MMS protocol version written by the composer (1.2, major in the high nibble)
pub const CURRENT_MMS_VERSION: u8 = 0x12;

/// MIME type of a binary-encoded MMS PDU on the HTTP transport
pub const CONTENT_TYPE_MMS: &str = "application/vnd.wap.mms-message";
