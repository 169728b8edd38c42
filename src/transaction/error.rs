// ABOUTME: Error types for the transaction engine and its worker service
// ABOUTME: Each failure knows whether a later attempt could succeed

use crate::codec::CodecError;
use crate::datatypes::{MessageType, ResponseStatus};
use crate::gateway::MessageUri;
use crate::headers::response_status_name;
use crate::transaction::TransactionKey;
use crate::transaction::state::State;
use thiserror::Error;

/// Why an attempt did not reach SUCCESS
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("No message stored at {0}")]
    LoadFailed(MessageUri),

    #[error("Expected {expected:?} but found {actual:?}")]
    WrongPduType {
        expected: MessageType,
        actual: MessageType,
    },

    #[error("Failed to compose PDU: {0}")]
    Compose(#[source] CodecError),

    #[error("Failed to parse PDU: {0}")]
    Parse(#[source] CodecError),

    #[error("No MMSC configuration available")]
    NoCarrierConfig,

    #[error("Transport to {url} failed")]
    Transport { url: String },

    #[error("MMSC rejected the message: {}", response_status_name(*status as u32))]
    Rejected { status: u8 },

    #[error("Notification has no content location")]
    MissingContentLocation,

    #[error("Failed to persist message into {0}")]
    Persist(MessageUri),

    /// The MMSC already accepted the message, so this is never retried.
    #[error("Failed to move {from} to {to}")]
    Move { from: MessageUri, to: MessageUri },

    #[error("Transaction cancelled")]
    Cancelled,

    #[error("Invalid transition: cannot {action} from {from}")]
    InvalidTransition { from: State, action: &'static str },

    #[error("Retry budget exhausted after {retries} retries")]
    RetryBudgetExhausted { retries: u32 },
}

impl TransactionError {
    /// True when the same request may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            TransactionError::NoCarrierConfig
            | TransactionError::Transport { .. }
            | TransactionError::Persist(_) => true,
            TransactionError::Rejected { status } => ResponseStatus::try_from(*status)
                .map(ResponseStatus::is_transient)
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// Errors from the worker service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Transaction {0} is already queued")]
    AlreadyQueued(TransactionKey),

    #[error("Transaction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
