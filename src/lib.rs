pub mod codec;
pub mod composer;
pub mod connection;
pub mod datatypes;
pub mod gateway;
pub mod headers;
pub mod http;
mod macros;
pub mod parser;
pub mod pdu;
pub mod transaction;

#[cfg(test)]
mod testing;

// Codec entry points
pub use codec::{CodecError, Decodable, Encodable};
pub use composer::{compose, try_compose};
pub use parser::{PduRegistry, parse, try_parse};

pub use datatypes::{CONTENT_TYPE_MMS, CURRENT_MMS_VERSION, EncodedStringValue, PduBody, PduPart};
pub use pdu::{GenericPdu, NotificationInd, RetrieveConf, SendConf, SendReq};

// Transaction engine
pub use transaction::{
    NotificationTransaction, SendTransaction, Transaction, TransactionConfig, TransactionService,
    TransactionState,
};

/// Error returned by the demo and other application-level glue.
///
/// Library code returns the specific error enums ([`CodecError`],
/// [`http::HttpError`], [`transaction::TransactionError`]); this boxed form
/// is only a convenience for callers combining several of them.
///
/// # Examples
///
/// ## Composing and parsing a PDU
///
/// ```rust
/// use mms::datatypes::{Priority, ReportFlag};
/// use mms::{GenericPdu, SendReq, compose, parse};
///
/// let req = SendReq::new()
///     .transaction_id(Some("T1".into()))
///     .from(Some("+15555550100".into()))
///     .subject(Some("Hi".into()))
///     .priority(Priority::High)
///     .delivery_report(ReportFlag::Yes);
///
/// let bytes = compose(&GenericPdu::from(req.clone())).unwrap();
/// assert_eq!(&bytes[..2], &[0x8C, 0x80]);
///
/// let parsed = parse(&bytes).unwrap();
/// assert_eq!(parsed.as_send_req().unwrap().subject, req.subject);
/// ```
///
/// ## Sending through the worker service
///
/// ```rust,no_run
/// use mms::gateway::{CarrierConfigResolver, Folder, HttpNetworkGateway, MemoryPersister, OperatorInfo};
/// use mms::http::HttpConfig;
/// use mms::transaction::{ServiceConfig, TransactionService};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> mms::Result<()> {
///     let resolver = CarrierConfigResolver::new(OperatorInfo::new("310260", "T-Mobile"));
///     let network = Arc::new(HttpNetworkGateway::new(HttpConfig::default(), resolver));
///     let store = Arc::new(MemoryPersister::new());
///
///     let service = TransactionService::new(store, network, ServiceConfig::default());
///     let state = service.send(Folder::Outbox.uri().child(1))?.join().await?;
///     println!("finished as {}", state.state());
///     Ok(())
/// }
/// ```
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// A specialized `Result` type for application-level glue.
pub type Result<T> = std::result::Result<T, Error>;
