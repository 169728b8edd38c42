// ABOUTME: Declares the four concrete MMS PDU shapes and the GenericPdu sum type over them
// ABOUTME: Each variant's message type is fixed by its Rust type, not stored in a field

mod notification_ind;
mod retrieve_conf;
mod send_conf;
mod send_req;

pub use notification_ind::NotificationInd;
pub use retrieve_conf::RetrieveConf;
pub use send_conf::SendConf;
pub use send_req::SendReq;

use crate::datatypes::{EncodedStringValue, MessageType, PduBody};

/// Any PDU this crate can compose or parse.
///
/// Composer and parser match on this exhaustively, so adding a variant is a
/// compile error until both sides handle it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenericPdu {
    SendReq(SendReq),
    SendConf(SendConf),
    NotificationInd(NotificationInd),
    RetrieveConf(RetrieveConf),
}

impl GenericPdu {
    pub fn message_type(&self) -> MessageType {
        match self {
            GenericPdu::SendReq(_) => SendReq::MESSAGE_TYPE,
            GenericPdu::SendConf(_) => SendConf::MESSAGE_TYPE,
            GenericPdu::NotificationInd(_) => NotificationInd::MESSAGE_TYPE,
            GenericPdu::RetrieveConf(_) => RetrieveConf::MESSAGE_TYPE,
        }
    }

    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            GenericPdu::SendReq(p) => p.transaction_id.as_deref(),
            GenericPdu::SendConf(p) => p.transaction_id.as_deref(),
            GenericPdu::NotificationInd(p) => p.transaction_id.as_deref(),
            GenericPdu::RetrieveConf(p) => p.transaction_id.as_deref(),
        }
    }

    /// The From header, for the variants that carry one
    pub fn sender(&self) -> Option<&EncodedStringValue> {
        match self {
            GenericPdu::SendReq(p) => p.from.as_ref(),
            GenericPdu::SendConf(_) => None,
            GenericPdu::NotificationInd(p) => p.from.as_ref(),
            GenericPdu::RetrieveConf(p) => p.from.as_ref(),
        }
    }

    /// The multipart body, for the variants that carry one
    pub fn body(&self) -> Option<&PduBody> {
        match self {
            GenericPdu::SendReq(p) => Some(&p.body),
            GenericPdu::RetrieveConf(p) => Some(&p.body),
            GenericPdu::SendConf(_) | GenericPdu::NotificationInd(_) => None,
        }
    }

    pub fn as_send_req(&self) -> Option<&SendReq> {
        match self {
            GenericPdu::SendReq(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_send_conf(&self) -> Option<&SendConf> {
        match self {
            GenericPdu::SendConf(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_notification_ind(&self) -> Option<&NotificationInd> {
        match self {
            GenericPdu::NotificationInd(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_retrieve_conf(&self) -> Option<&RetrieveConf> {
        match self {
            GenericPdu::RetrieveConf(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_message_types_are_fixed() {
        assert_eq!(GenericPdu::from(SendReq::new()).message_type(), MessageType::SendReq);
        assert_eq!(GenericPdu::from(SendConf::new(0x80)).message_type(), MessageType::SendConf);
        assert_eq!(
            GenericPdu::from(NotificationInd::new()).message_type(),
            MessageType::NotificationInd
        );
        assert_eq!(
            GenericPdu::from(RetrieveConf::new()).message_type(),
            MessageType::RetrieveConf
        );
    }

    #[test]
    fn only_send_req_and_retrieve_conf_expose_bodies() {
        assert!(GenericPdu::from(SendReq::new()).body().is_some());
        assert!(GenericPdu::from(RetrieveConf::new()).body().is_some());
        assert!(GenericPdu::from(SendConf::new(0x80)).body().is_none());
        assert!(GenericPdu::from(NotificationInd::new()).body().is_none());
    }

    #[test]
    fn accessors_reach_through_variants() {
        let pdu = GenericPdu::from(SendReq::new().transaction_id(Some("T1".into())));
        assert_eq!(pdu.transaction_id(), Some("T1"));
        assert!(pdu.as_send_req().is_some());
        assert!(pdu.as_send_conf().is_none());
    }
}
