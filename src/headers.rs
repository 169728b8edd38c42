// ABOUTME: Display-name lookups over the closed header registry
// ABOUTME: Unregistered codes map to "Unknown-<code>" instead of failing

use crate::datatypes::{HeaderField, MessageType, ResponseStatus};

fn unknown(code: u32) -> String {
    format!("Unknown-{code}")
}

/// Name of a header field code, e.g. `0x98` -> `"Transaction-ID"`.
pub fn header_name(code: u32) -> String {
    u8::try_from(code)
        .ok()
        .and_then(|c| HeaderField::try_from(c).ok())
        .map(|field| field.name().to_string())
        .unwrap_or_else(|| unknown(code))
}

/// Name of an X-Mms-Message-Type value, e.g. `0x80` -> `"Send-Request"`.
pub fn message_type_name(code: u32) -> String {
    u8::try_from(code)
        .ok()
        .and_then(|c| MessageType::try_from(c).ok())
        .map(|message_type| message_type.name().to_string())
        .unwrap_or_else(|| unknown(code))
}

/// Name of an X-Mms-Response-Status value, e.g. `0x80` -> `"OK"`.
pub fn response_status_name(code: u32) -> String {
    u8::try_from(code)
        .ok()
        .and_then(|c| ResponseStatus::try_from(c).ok())
        .map(|status| status.name().to_string())
        .unwrap_or_else(|| unknown(code))
}
