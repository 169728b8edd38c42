// ABOUTME: Bounded worker pool that drives queued transactions to a terminal state
// ABOUTME: Transient failures are re-queued with exponential backoff until the retry budget runs out

use crate::gateway::{MessageUri, NetworkGateway, PersistenceGateway};
use crate::transaction::{
    CancelToken, NotificationTransaction, SendTransaction, ServiceConfig, ServiceError,
    Transaction, TransactionKey, TransactionState,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type ActiveMap = Arc<Mutex<HashMap<TransactionKey, CancelToken>>>;

/// Runs transactions concurrently, at most `max_concurrent` at a time.
///
/// Each transaction is owned by its own task, so its state is only ever
/// mutated by one worker. A key can be queued again once its previous
/// transaction finished.
pub struct TransactionService<P, N> {
    persister: Arc<P>,
    network: Arc<N>,
    config: ServiceConfig,
    permits: Arc<Semaphore>,
    active: ActiveMap,
}

/// Handle to a queued transaction
#[derive(Debug)]
pub struct TransactionHandle {
    key: TransactionKey,
    token: CancelToken,
    task: JoinHandle<TransactionState>,
}

impl TransactionHandle {
    pub fn key(&self) -> &TransactionKey {
        &self.key
    }

    /// Request cancellation; takes effect at the next await point.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the transaction to reach its final state.
    pub async fn join(self) -> Result<TransactionState, ServiceError> {
        Ok(self.task.await?)
    }
}

impl<P, N> TransactionService<P, N>
where
    P: PersistenceGateway + 'static,
    N: NetworkGateway + 'static,
{
    pub fn new(persister: Arc<P>, network: Arc<N>, config: ServiceConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        Self {
            persister,
            network,
            config,
            permits,
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Queue sending the draft at `uri`.
    pub fn send(&self, uri: MessageUri) -> Result<TransactionHandle, ServiceError> {
        self.submit(SendTransaction::new(
            uri,
            self.persister.clone(),
            self.network.clone(),
            self.config.transaction.clone(),
        ))
    }

    /// Queue handling of the notification stored at `uri`.
    pub fn notify(&self, uri: MessageUri) -> Result<TransactionHandle, ServiceError> {
        self.submit(NotificationTransaction::new(
            uri,
            self.persister.clone(),
            self.network.clone(),
            self.config.transaction.clone(),
        ))
    }

    /// Queue a user-requested download of the notification stored at `uri`.
    pub fn retrieve(&self, uri: MessageUri) -> Result<TransactionHandle, ServiceError> {
        self.submit(NotificationTransaction::retrieve(
            uri,
            self.persister.clone(),
            self.network.clone(),
            self.config.transaction.clone(),
        ))
    }

    /// Queue any transaction. Fails when one with the same key is still active.
    pub fn submit<T>(&self, transaction: T) -> Result<TransactionHandle, ServiceError>
    where
        T: Transaction + 'static,
    {
        let key = transaction.key().clone();
        let token = transaction.core().token().clone();
        {
            let mut active = lock(&self.active);
            if active.contains_key(&key) {
                warn!(%key, "transaction already queued");
                return Err(ServiceError::AlreadyQueued(key));
            }
            active.insert(key.clone(), token.clone());
        }
        debug!(%key, "transaction queued");

        let permits = self.permits.clone();
        let active = self.active.clone();
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            let state = drive(transaction, permits).await;
            lock(&active).remove(&task_key);
            info!(key = %task_key, state = %state.state(), retries = state.retry_count(), "transaction finished");
            state
        });

        Ok(TransactionHandle { key, token, task })
    }

    /// Cancel the active transaction for `key`, if any.
    pub fn cancel(&self, key: &TransactionKey) -> bool {
        match lock(&self.active).get(key) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for token in lock(&self.active).values() {
            token.cancel();
        }
    }

    pub fn is_active(&self, key: &TransactionKey) -> bool {
        lock(&self.active).contains_key(key)
    }

    pub fn active_count(&self) -> usize {
        lock(&self.active).len()
    }
}

fn lock(active: &ActiveMap) -> MutexGuard<'_, HashMap<TransactionKey, CancelToken>> {
    active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drive `transaction` until it reaches a terminal state.
async fn drive<T: Transaction>(mut transaction: T, permits: Arc<Semaphore>) -> TransactionState {
    let token = transaction.core().token().clone();
    loop {
        let permit = tokio::select! {
            biased;
            _ = token.cancelled() => {
                transaction.cancel();
                break;
            }
            permit = permits.clone().acquire_owned() => permit,
        };
        let Ok(permit) = permit else {
            transaction.mark_failed("worker pool closed");
            break;
        };

        let state = transaction.process().await;
        if state.is_terminal() {
            break;
        }
        if !transaction.state().can_process() {
            transaction.mark_failed("retry budget exhausted");
            break;
        }
        drop(permit);

        let delay = transaction
            .core()
            .config()
            .backoff_delay(transaction.state().retry_count());
        debug!(key = %transaction.key(), ?delay, "backing off before retry");
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                transaction.cancel();
                break;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
    transaction.state().clone()
}
