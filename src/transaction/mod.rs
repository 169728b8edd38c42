//! Transaction engine.
//!
//! A transaction is one bounded attempt to send, notify or retrieve a single
//! message. Each one owns a [`TransactionState`] and is driven by exactly one
//! task at a time; [`TransactionService`] runs many of them concurrently and
//! re-queues transient failures with exponential backoff.
//!
//! # Example
//!
//! ```rust,no_run
//! use mms::gateway::{
//!     CarrierConfigResolver, Folder, HttpNetworkGateway, MemoryPersister, OperatorInfo,
//! };
//! use mms::http::HttpConfig;
//! use mms::transaction::{ServiceConfig, TransactionService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = CarrierConfigResolver::new(OperatorInfo::new("310260", "T-Mobile"));
//!     let network = Arc::new(HttpNetworkGateway::new(HttpConfig::default(), resolver));
//!     let store = Arc::new(MemoryPersister::new());
//!
//!     let service = TransactionService::new(store, network, ServiceConfig::default());
//!     let handle = service.send(Folder::Outbox.uri().child(1))?;
//!     let state = handle.join().await?;
//!     println!("send finished in {}", state.state());
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod notification;
mod send;
mod service;
mod state;

pub use config::{
    AutoDownload, DEFAULT_EXPIRY, DEFAULT_MAX_RETRY_COUNT, ServiceConfig, TransactionConfig,
};
pub use error::{ServiceError, TransactionError};
pub use notification::NotificationTransaction;
pub use send::SendTransaction;
pub use service::{TransactionHandle, TransactionService};
pub use state::{State, TransactionState};

use crate::gateway::MessageUri;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Kind of work a transaction performs
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransactionType {
    Send = 1,
    Notification = 2,
    Retrieve = 3,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionType::Send => "send",
            TransactionType::Notification => "notification",
            TransactionType::Retrieve => "retrieve",
        })
    }
}

/// Identity of a transaction: the message it works on and what it does
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransactionKey {
    pub uri: MessageUri,
    pub kind: TransactionType,
}

impl TransactionKey {
    pub fn new(uri: MessageUri, kind: TransactionType) -> Self {
        Self { uri, kind }
    }
}

impl fmt::Display for TransactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.uri, self.kind as u8)
    }
}

/// Shared cancellation flag.
///
/// Clones observe the same flag. Cancelling is idempotent and can happen
/// from any task; transactions check the flag around every gateway call.
#[derive(Clone, Debug)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Completes once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns once the flag is set.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    pub fn check(&self) -> Result<(), TransactionError> {
        if self.is_cancelled() {
            Err(TransactionError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Run `fut` unless the token is cancelled first.
    ///
    /// A cancelled token drops `fut` and yields [`TransactionError::Cancelled`].
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, TransactionError> {
        self.check()?;
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(TransactionError::Cancelled),
            output = fut => Ok(output),
        }
    }
}

/// State every transaction carries: identity, lifecycle, cancellation and settings
#[derive(Debug)]
pub struct TransactionCore {
    key: TransactionKey,
    state: TransactionState,
    token: CancelToken,
    config: TransactionConfig,
}

impl TransactionCore {
    pub fn new(uri: MessageUri, kind: TransactionType, config: TransactionConfig) -> Self {
        Self {
            key: TransactionKey::new(uri, kind),
            state: TransactionState::new(config.max_retry_count),
            token: CancelToken::new(),
            config,
        }
    }

    /// Continue a transaction that already used `retry_count` retries.
    pub fn resumed(mut self, retry_count: u32) -> Self {
        self.state = TransactionState::resumed(retry_count, self.config.max_retry_count);
        self
    }

    pub fn key(&self) -> &TransactionKey {
        &self.key
    }

    pub fn uri(&self) -> &MessageUri {
        &self.key.uri
    }

    pub fn state(&self) -> &TransactionState {
        &self.state
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// Apply the outcome of one attempt to the state machine.
    fn finish(&mut self, outcome: Result<MessageUri, TransactionError>) -> State {
        let result = match outcome {
            Ok(uri) => {
                info!(key = %self.key, %uri, "transaction succeeded");
                self.state.succeed(uri)
            }
            Err(TransactionError::Cancelled) => {
                info!(key = %self.key, "transaction cancelled");
                self.state.cancel();
                Ok(())
            }
            Err(e) if e.is_transient() && self.state.can_retry() => {
                warn!(
                    key = %self.key,
                    retry = self.state.retry_count() + 1,
                    max = self.state.max_retry_count(),
                    error = %e,
                    "transaction attempt failed, will retry"
                );
                self.state.retry(e.to_string())
            }
            Err(e) => {
                warn!(key = %self.key, retry = self.state.retry_count(), error = %e, "transaction failed");
                self.state.fail(e.to_string())
            }
        };
        if let Err(e) = result {
            warn!(key = %self.key, error = %e, "unexpected transaction state");
        }
        self.state.state()
    }
}

/// A unit of work driven through the [`TransactionState`] machine.
///
/// Implementors supply [`attempt`](Transaction::attempt), the I/O of one
/// try; [`process`](Transaction::process) wraps it with the state handling.
pub trait Transaction: Send {
    fn core(&self) -> &TransactionCore;

    fn core_mut(&mut self) -> &mut TransactionCore;

    /// Perform one attempt, returning the resulting content URI.
    fn attempt(&mut self) -> impl Future<Output = Result<MessageUri, TransactionError>> + Send;

    fn key(&self) -> &TransactionKey {
        self.core().key()
    }

    fn state(&self) -> &TransactionState {
        self.core().state()
    }

    fn can_retry(&self) -> bool {
        self.core().state().can_retry()
    }

    /// Cancel now. In-flight gateway calls of other clones of the token are
    /// abandoned at their next await point.
    fn cancel(&mut self) -> bool {
        let core = self.core_mut();
        core.token.cancel();
        core.state.cancel()
    }

    fn mark_failed(&mut self, reason: &str) -> bool {
        let core = self.core_mut();
        warn!(key = %core.key, reason, "transaction marked failed");
        core.state.mark_failed(reason)
    }

    /// Run one attempt and return the resulting state.
    ///
    /// A completed transaction or one past its retry budget is left as is
    /// and no I/O happens. After a transient failure with budget left the
    /// state is back at INITIALIZED and `process` may be called again.
    fn process(&mut self) -> impl Future<Output = State> + Send {
        async move {
            let core = self.core_mut();
            if !core.state.can_process() {
                warn!(
                    key = %core.key,
                    state = %core.state.state(),
                    retry = core.state.retry_count(),
                    "refusing to process transaction"
                );
                return core.state.state();
            }
            if core.token.is_cancelled() {
                core.state.cancel();
                return core.state.state();
            }
            if let Err(e) = core.state.begin() {
                warn!(key = %core.key, error = %e, "cannot start transaction");
                return core.state.state();
            }
            info!(key = %core.key, retry = core.state.retry_count(), "processing transaction");

            let outcome = self.attempt().await;
            self.core_mut().finish(outcome)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Folder;
    use std::time::Duration;

    /// Fails transiently `failures` times, then succeeds.
    struct Flaky {
        core: TransactionCore,
        failures: u32,
        attempts: u32,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                core: TransactionCore::new(
                    Folder::Outbox.uri().child(1),
                    TransactionType::Send,
                    TransactionConfig::default(),
                ),
                failures,
                attempts: 0,
            }
        }
    }

    impl Transaction for Flaky {
        fn core(&self) -> &TransactionCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut TransactionCore {
            &mut self.core
        }

        async fn attempt(&mut self) -> Result<MessageUri, TransactionError> {
            self.attempts += 1;
            if self.attempts <= self.failures {
                Err(TransactionError::Transport {
                    url: "http://mmsc".into(),
                })
            } else {
                Ok(Folder::Sent.uri().child(1))
            }
        }
    }

    #[test]
    fn key_display_joins_uri_and_type() {
        let key = TransactionKey::new(Folder::Inbox.uri().child(3), TransactionType::Notification);
        assert_eq!(key.to_string(), "content://mms/inbox/3_2");
    }

    #[tokio::test]
    async fn transient_failures_go_back_to_initialized() {
        let mut tx = Flaky::new(2);
        assert_eq!(tx.process().await, State::Initialized);
        assert_eq!(tx.state().retry_count(), 1);
        assert_eq!(tx.process().await, State::Initialized);
        assert_eq!(tx.process().await, State::Success);
        assert_eq!(tx.state().retry_count(), 2);
        assert_eq!(tx.state().content_uri(), Some(&Folder::Sent.uri().child(1)));
    }

    #[tokio::test]
    async fn budget_exhaustion_fails_after_four_attempts() {
        let mut tx = Flaky::new(u32::MAX);
        let mut states = Vec::new();
        while !tx.state().is_completed() {
            states.push(tx.process().await);
        }
        assert_eq!(tx.attempts, 4);
        assert_eq!(states.last(), Some(&State::Failed));
        assert_eq!(tx.state().retry_count(), 3);
        assert!(!tx.can_retry());
    }

    #[tokio::test]
    async fn completed_transactions_do_no_io() {
        let mut tx = Flaky::new(0);
        assert_eq!(tx.process().await, State::Success);
        assert_eq!(tx.process().await, State::Success);
        assert_eq!(tx.attempts, 1);

        let mut cancelled = Flaky::new(0);
        assert!(cancelled.cancel());
        assert_eq!(cancelled.process().await, State::Cancelled);
        assert_eq!(cancelled.attempts, 0);
    }

    #[tokio::test]
    async fn overrun_retry_count_is_refused() {
        let mut tx = Flaky::new(0);
        tx.core = TransactionCore::new(
            Folder::Outbox.uri().child(1),
            TransactionType::Send,
            TransactionConfig::default(),
        )
        .resumed(4);
        assert_eq!(tx.process().await, State::Initialized);
        assert_eq!(tx.attempts, 0);
        assert!(tx.mark_failed("retry budget exhausted"));
        assert_eq!(tx.state().state(), State::Failed);
    }

    #[tokio::test]
    async fn external_cancel_is_seen_before_io() {
        let mut tx = Flaky::new(0);
        tx.core().token().clone().cancel();
        assert_eq!(tx.process().await, State::Cancelled);
        assert_eq!(tx.attempts, 0);
    }

    #[tokio::test]
    async fn guard_abandons_pending_future() {
        let token = CancelToken::new();
        let remote = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            remote.cancel();
        });
        let result = token.guard(std::future::pending::<()>()).await;
        assert!(matches!(result, Err(TransactionError::Cancelled)));
        assert!(token.is_cancelled());
        assert!(token.check().is_err());
    }

    #[tokio::test]
    async fn guard_passes_output_through() {
        let token = CancelToken::default();
        assert_eq!(token.guard(async { 7 }).await.unwrap(), 7);
    }
}
