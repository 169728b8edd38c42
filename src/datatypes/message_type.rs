use num_enum::TryFromPrimitive;

/// X-Mms-Message-Type values (field 0x8C).
///
/// Only `SendReq`, `SendConf`, `NotificationInd` and `RetrieveConf` have a
/// concrete PDU shape in this crate. The remaining codes are registered so
/// that the registry can name them, but parsing them yields no PDU.
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MessageType {
    SendReq = 0x80,
    SendConf = 0x81,
    NotificationInd = 0x82,
    NotifyRespInd = 0x83,
    RetrieveConf = 0x84,
    AcknowledgeInd = 0x85,
    DeliveryInd = 0x86,
}

impl MessageType {
    /// Every registered message type, in code order.
    pub const ALL: [MessageType; 7] = [
        MessageType::SendReq,
        MessageType::SendConf,
        MessageType::NotificationInd,
        MessageType::NotifyRespInd,
        MessageType::RetrieveConf,
        MessageType::AcknowledgeInd,
        MessageType::DeliveryInd,
    ];

    /// Canonical display name
    pub fn name(self) -> &'static str {
        match self {
            MessageType::SendReq => "Send-Request",
            MessageType::SendConf => "Send-Confirmation",
            MessageType::NotificationInd => "Notification-Indication",
            MessageType::NotifyRespInd => "Notify-Response-Indication",
            MessageType::RetrieveConf => "Retrieve-Confirmation",
            MessageType::AcknowledgeInd => "Acknowledge-Indication",
            MessageType::DeliveryInd => "Delivery-Indication",
        }
    }

    /// Whether PDUs of this type carry a multipart body section.
    pub fn has_body(self) -> bool {
        matches!(self, MessageType::SendReq | MessageType::RetrieveConf)
    }
}
