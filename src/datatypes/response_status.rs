use num_enum::TryFromPrimitive;

/// X-Mms-Response-Status values carried by a `SendConf`.
///
/// MMSCs are free to return codes outside this set, so PDUs keep the raw
/// octet and only convert when a typed view is wanted.
#[derive(TryFromPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    /// Accepted by the MMSC
    Ok = 0x80,
    ErrorUnspecified = 0x81,
    ErrorServiceDenied = 0x82,
    ErrorMessageFormatCorrupt = 0x83,
    ErrorSendingAddressUnresolved = 0x84,
    ErrorMessageNotFound = 0x85,
    /// The only status worth retrying: the MMSC could not reach its network
    ErrorNetworkProblem = 0x86,
    ErrorContentNotAccepted = 0x87,
    ErrorUnsupportedMessage = 0x88,
}

impl ResponseStatus {
    pub fn name(self) -> &'static str {
        match self {
            ResponseStatus::Ok => "OK",
            ResponseStatus::ErrorUnspecified => "Error-Unspecified",
            ResponseStatus::ErrorServiceDenied => "Error-Service-Denied",
            ResponseStatus::ErrorMessageFormatCorrupt => "Error-Message-Format-Corrupt",
            ResponseStatus::ErrorSendingAddressUnresolved => "Error-Sending-Address-Unresolved",
            ResponseStatus::ErrorMessageNotFound => "Error-Message-Not-Found",
            ResponseStatus::ErrorNetworkProblem => "Error-Network-Problem",
            ResponseStatus::ErrorContentNotAccepted => "Error-Content-Not-Accepted",
            ResponseStatus::ErrorUnsupportedMessage => "Error-Unsupported-Message",
        }
    }

    /// True when a later attempt may succeed without changing the message.
    pub fn is_transient(self) -> bool {
        self == ResponseStatus::ErrorNetworkProblem
    }
}
