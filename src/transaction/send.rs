// ABOUTME: Sends a stored draft to the MMSC and files it under Sent on acceptance
// ABOUTME: Falls back to the platform send path when the direct HTTP post yields nothing

use crate::composer::try_compose;
use crate::datatypes::{CONTENT_TYPE_MMS, EncodedStringValue, MessageType};
use crate::gateway::{Folder, MessageUri, NetworkGateway, PersistenceGateway};
use crate::http::HttpMethod;
use crate::parser::try_parse;
use crate::pdu::{GenericPdu, SendReq};
use crate::transaction::{
    Transaction, TransactionConfig, TransactionCore, TransactionError, TransactionType,
};
use bytes::Bytes;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Outbound message transaction.
///
/// One attempt loads the draft at the transaction URI, fills in missing
/// headers, posts it and moves the message into the Sent folder.
pub struct SendTransaction<P, N> {
    core: TransactionCore,
    persister: Arc<P>,
    network: Arc<N>,
}

impl<P, N> SendTransaction<P, N>
where
    P: PersistenceGateway,
    N: NetworkGateway,
{
    pub fn new(uri: MessageUri, persister: Arc<P>, network: Arc<N>, config: TransactionConfig) -> Self {
        Self {
            core: TransactionCore::new(uri, TransactionType::Send, config),
            persister,
            network,
        }
    }

    /// Continue after `retry_count` earlier retries.
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.core = self.core.resumed(retry_count);
        self
    }

    async fn load_draft(&self) -> Result<SendReq, TransactionError> {
        let uri = self.core.uri();
        let pdu = self
            .core
            .token()
            .guard(self.persister.load(uri))
            .await?
            .ok_or_else(|| TransactionError::LoadFailed(uri.clone()))?;
        match pdu {
            GenericPdu::SendReq(req) => Ok(req),
            other => Err(TransactionError::WrongPduType {
                expected: MessageType::SendReq,
                actual: other.message_type(),
            }),
        }
    }

    /// Fill the headers a draft usually leaves empty.
    fn fill_defaults(&self, req: &mut SendReq) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let config = self.core.config();

        if req.date == 0 {
            req.date = now.as_secs();
        }
        if req.from.is_none() {
            req.from = config.line_number.as_deref().map(EncodedStringValue::from);
        }
        if req.transaction_id.is_none() {
            req.transaction_id = Some(format!("T{}", now.as_millis()));
        }
        if req.expiry.is_none() {
            req.expiry = now.checked_add(config.default_expiry).map(|at| at.as_secs());
        }
    }

    /// Post `pdu` over HTTP, then try the platform path if that yielded nothing.
    async fn transmit(&self, pdu: &[u8]) -> Result<Bytes, TransactionError> {
        let token = self.core.token();
        let uri = self.core.uri();
        let mms_config = token.guard(self.network.carrier_config()).await?;

        let primary = match &mms_config {
            Some(mms) => {
                debug!(%uri, url = %mms.mmsc_url, len = pdu.len(), "posting PDU");
                token
                    .guard(self.network.http_connection(
                        uri.id().unwrap_or(0),
                        &mms.mmsc_url,
                        Some(pdu),
                        CONTENT_TYPE_MMS,
                        HttpMethod::Post,
                    ))
                    .await?
            }
            None => {
                warn!(%uri, "no carrier configuration, skipping direct post");
                None
            }
        };
        if let Some(response) = primary {
            return Ok(response);
        }

        info!(%uri, "trying platform send path");
        match token.guard(self.network.send_via_platform(uri, pdu)).await? {
            Some(response) => Ok(response),
            None => Err(match mms_config {
                Some(mms) => TransactionError::Transport { url: mms.mmsc_url },
                None => TransactionError::NoCarrierConfig,
            }),
        }
    }

    /// An empty response is a bare acknowledgement; anything else must be an accepting M-Send.conf.
    fn check_response(&self, response: &[u8]) -> Result<(), TransactionError> {
        if response.is_empty() {
            debug!(uri = %self.core.uri(), "empty send response, treating as accepted");
            return Ok(());
        }
        let pdu = try_parse(response).map_err(TransactionError::Parse)?;
        let conf = pdu.as_send_conf().ok_or(TransactionError::WrongPduType {
            expected: MessageType::SendConf,
            actual: pdu.message_type(),
        })?;
        if !conf.is_successful() {
            return Err(TransactionError::Rejected {
                status: conf.response_status,
            });
        }
        debug!(uri = %self.core.uri(), message_id = ?conf.message_id, "MMSC accepted message");
        Ok(())
    }

    async fn run(&self) -> Result<MessageUri, TransactionError> {
        let uri = self.core.uri();
        let mut req = self.load_draft().await?;
        self.fill_defaults(&mut req);

        let pdu = try_compose(&GenericPdu::SendReq(req)).map_err(TransactionError::Compose)?;
        let response = self.transmit(&pdu).await?;
        self.check_response(&response)?;

        // Accepted by the MMSC: filing under Sent runs even if cancelled meanwhile,
        // and a failure here must not lead to the draft being posted again.
        let sent = Folder::Sent.uri();
        match self.persister.move_to(uri, &sent).await {
            Some(moved) => Ok(moved),
            None => {
                warn!(%uri, "message accepted but could not be moved to Sent");
                Err(TransactionError::Move {
                    from: uri.clone(),
                    to: sent,
                })
            }
        }
    }
}

impl<P, N> Transaction for SendTransaction<P, N>
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
