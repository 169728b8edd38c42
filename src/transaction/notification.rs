// ABOUTME: Handles an incoming notification by fetching the announced message into the inbox
// ABOUTME: The auto-download policy may leave the message pending at the MMSC instead

use crate::datatypes::{CONTENT_TYPE_MMS, MessageType};
use crate::gateway::{Folder, MessageUri, NetworkGateway, PersistFlags, PersistenceGateway};
use crate::http::HttpMethod;
use crate::parser::try_parse;
use crate::pdu::{GenericPdu, NotificationInd};
use crate::transaction::{
    AutoDownload, Transaction, TransactionConfig, TransactionCore, TransactionError,
    TransactionType,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Inbound message transaction.
///
/// Created as [`TransactionType::Notification`] when a notification arrives,
/// which honours the auto-download policy, or as
/// [`TransactionType::Retrieve`] when the user asks for a pending message.
pub struct NotificationTransaction<P, N> {
    core: TransactionCore,
    persister: Arc<P>,
    network: Arc<N>,
}

impl<P, N> NotificationTransaction<P, N>
where
    P: PersistenceGateway,
    N: NetworkGateway,
{
    pub fn new(uri: MessageUri, persister: Arc<P>, network: Arc<N>, config: TransactionConfig) -> Self {
        Self::with_kind(TransactionType::Notification, uri, persister, network, config)
    }

    /// User-initiated download; ignores the auto-download policy.
    pub fn retrieve(
        uri: MessageUri,
        persister: Arc<P>,
        network: Arc<N>,
        config: TransactionConfig,
    ) -> Self {
        Self::with_kind(TransactionType::Retrieve, uri, persister, network, config)
    }

    fn with_kind(
        kind: TransactionType,
        uri: MessageUri,
        persister: Arc<P>,
        network: Arc<N>,
        config: TransactionConfig,
    ) -> Self {
        Self {
            core: TransactionCore::new(uri, kind, config),
            persister,
            network,
        }
    }

    /// Continue after `retry_count` earlier retries.
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.core = self.core.resumed(retry_count);
        self
    }

    fn download_deferred(&self) -> bool {
        self.core.key().kind == TransactionType::Notification
            && self.core.config().download_policy == AutoDownload::Never
    }

    async fn load_notification(&self) -> Result<NotificationInd, TransactionError> {
        let uri = self.core.uri();
        let pdu = self
            .core
            .token()
            .guard(self.persister.load(uri))
            .await?
            .ok_or_else(|| TransactionError::LoadFailed(uri.clone()))?;
        match pdu {
            GenericPdu::NotificationInd(ind) => Ok(ind),
            other => Err(TransactionError::WrongPduType {
                expected: MessageType::NotificationInd,
                actual: other.message_type(),
            }),
        }
    }

    async fn fetch(&self, location: &str) -> Result<GenericPdu, TransactionError> {
        let uri = self.core.uri();
        debug!(%uri, location, "fetching message");
        let response = self
            .core
            .token()
            .guard(self.network.http_connection(
                uri.id().unwrap_or(0),
                location,
                None,
                CONTENT_TYPE_MMS,
                HttpMethod::Get,
            ))
            .await?
            .ok_or_else(|| TransactionError::Transport {
                url: location.to_string(),
            })?;

        let pdu = try_parse(&response).map_err(TransactionError::Parse)?;
        if pdu.message_type() != MessageType::RetrieveConf {
            return Err(TransactionError::WrongPduType {
                expected: MessageType::RetrieveConf,
                actual: pdu.message_type(),
            });
        }
        debug!(%uri, len = response.len(), "retrieved message");
        Ok(pdu)
    }

    async fn run(&self) -> Result<MessageUri, TransactionError> {
        let uri = self.core.uri();
        if self.download_deferred() {
            info!(%uri, "auto download disabled, leaving message pending");
            return Ok(uri.clone());
        }

        let ind = self.load_notification().await?;
        let location = ind
            .content_location
            .filter(|l| !l.trim().is_empty())
            .ok_or(TransactionError::MissingContentLocation)?;
        let pdu = self.fetch(&location).await?;

        let mut flags = PersistFlags::default().with_thread_id();
        if let Some(line) = &self.core.config().line_number {
            flags = flags.with_excluded_number(line.clone());
        }
        let inbox = Folder::Inbox.uri();
        let stored = self
            .core
            .token()
            .guard(self.persister.persist(&pdu, &inbox, &flags))
            .await?
            .ok_or(TransactionError::Persist(inbox))?;

        // The message is already stored; cancellation no longer applies.
        if !self.persister.delete(uri).await {
            warn!(%uri, "failed to delete consumed notification");
        }
        Ok(stored)
    }
}

impl<P, N> Transaction for NotificationTransaction<P, N>
where
    P: PersistenceGateway,
    N: NetworkGateway,
{
    fn core(&self) -> &TransactionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TransactionCore {
        &mut self.core
    }

    async fn attempt(&mut self) -> Result<MessageUri, TransactionError> {
        self.run().await
    }
}
