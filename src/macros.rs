// ABOUTME: This module provides macros to reduce boilerplate in MMS PDU implementations
// ABOUTME: Includes macros for builder setters and for wiring variants into GenericPdu

/// Macro for generating builder setter methods
///
/// This macro generates fluent setter methods for builder patterns,
/// where each method takes a value, sets the corresponding field,
/// and returns self for method chaining.
///
/// # Arguments
/// * `$($field:ident: $type:ty),*` - Field name and type pairs
///
/// # Generated code
/// For each field, generates:
/// ```rust,ignore
/// pub fn $field(mut self, $field: $type) -> Self {
///     self.$field = $field;
///     self
/// }
/// ```
macro_rules! builder_setters {
    ($($field:ident: $type:ty),* $(,)?) => {
        $(
            pub fn $field(mut self, $field: $type) -> Self {
                self.$field = $field;
                self
            }
        )*
    };
}

/// Macro for binding a PDU struct to its fixed message type
///
/// Every concrete PDU reports the same X-Mms-Message-Type for its whole
/// lifetime, so the binding lives in the type rather than in a field that
/// could be overwritten.
///
/// # Arguments
/// * `$pdu_type` - The PDU struct name (e.g., SendReq)
/// * `$message_type` - The MessageType variant (e.g., MessageType::SendReq)
///
/// # Generated code
/// - `MESSAGE_TYPE` associated constant and `message_type()` accessor
/// - `From<$pdu_type> for GenericPdu`
macro_rules! impl_pdu_variant {
    ($pdu_type:ident, $message_type:expr) => {
        impl $pdu_type {
            pub const MESSAGE_TYPE: $crate::datatypes::MessageType = $message_type;

            pub fn message_type(&self) -> $crate::datatypes::MessageType {
                Self::MESSAGE_TYPE
            }
        }

        impl From<$pdu_type> for $crate::pdu::GenericPdu {
            fn from(pdu: $pdu_type) -> Self {
                $crate::pdu::GenericPdu::$pdu_type(pdu)
            }
        }
    };
}

// Make macros available to the rest of the crate
pub(crate) use {builder_setters, impl_pdu_variant};
