// ABOUTME: Persistence gateway contract plus an in-memory implementation
// ABOUTME: Messages are addressed by opaque URIs grouped under symbolic folders

use crate::pdu::GenericPdu;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

const CONTENT_ROOT: &str = "content://mms";

/// Opaque address of a stored message or folder
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageUri(String);

impl MessageUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Address of `id` inside this folder URI
    pub fn child(&self, id: impl fmt::Display) -> MessageUri {
        MessageUri(format!("{}/{}", self.0.trim_end_matches('/'), id))
    }

    /// Trailing numeric row id, if the URI ends in one
    pub fn id(&self) -> Option<u64> {
        self.0.rsplit('/').next().and_then(|s| s.parse().ok())
    }

    /// Folder the URI lives in, judged by its path
    pub fn folder(&self) -> Option<Folder> {
        let path = self.0.strip_prefix(CONTENT_ROOT)?;
        Folder::ALL
            .into_iter()
            .find(|f| path.split('/').any(|segment| segment == f.segment()))
    }
}

impl fmt::Display for MessageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageUri {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

/// Symbolic message folders
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Folder {
    Inbox,
    Outbox,
    Sent,
    Drafts,
}

impl Folder {
    pub const ALL: [Folder; 4] = [Folder::Inbox, Folder::Outbox, Folder::Sent, Folder::Drafts];

    fn segment(self) -> &'static str {
        match self {
            Folder::Inbox => "inbox",
            Folder::Outbox => "outbox",
            Folder::Sent => "sent",
            Folder::Drafts => "drafts",
        }
    }

    pub fn uri(self) -> MessageUri {
        MessageUri(format!("{CONTENT_ROOT}/{}", self.segment()))
    }
}

/// Options for [`PersistenceGateway::persist`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistFlags {
    /// Assign the message to a conversation thread
    pub create_thread_id: bool,
    /// Treat all recipients as one group conversation
    pub group_mms: bool,
    /// Addresses (normally the local line) left out of the recipient set
    pub excluded_numbers: Vec<String>,
}

impl PersistFlags {
    pub fn with_thread_id(mut self) -> Self {
        self.create_thread_id = true;
        self
    }

    pub fn with_group_mms(mut self, group_mms: bool) -> Self {
        self.group_mms = group_mms;
        self
    }

    pub fn with_excluded_number(mut self, number: impl Into<String>) -> Self {
        self.excluded_numbers.push(number.into());
        self
    }
}

/// Storage collaborator for the transaction engine.
///
/// Every operation fails closed: a denied or failed write returns `None`
/// (or `false`) rather than an error.
pub trait PersistenceGateway: Send + Sync {
    /// Read the PDU stored at `uri`
    fn load(&self, uri: &MessageUri) -> impl Future<Output = Option<GenericPdu>> + Send;

    /// Store `pdu` under the folder `target`, returning its new address
    fn persist(
        &self,
        pdu: &GenericPdu,
        target: &MessageUri,
        flags: &PersistFlags,
    ) -> impl Future<Output = Option<MessageUri>> + Send;

    /// Move the message at `from` into the folder `to`, returning its new address
    fn move_to(
        &self,
        from: &MessageUri,
        to: &MessageUri,
    ) -> impl Future<Output = Option<MessageUri>> + Send;

    /// Remove the message at `uri`
    fn delete(&self, uri: &MessageUri) -> impl Future<Output = bool> + Send;
}

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct MemoryPersister {
    messages: Mutex<HashMap<MessageUri, GenericPdu>>,
    next_id: AtomicU64,
}

impl MemoryPersister {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Store `pdu` at exactly `uri`, replacing whatever was there
    pub fn insert(&self, uri: MessageUri, pdu: GenericPdu) {
        self.lock().insert(uri, pdu);
    }

    pub fn get(&self, uri: &MessageUri) -> Option<GenericPdu> {
        self.lock().get(uri).cloned()
    }

    pub fn contains(&self, uri: &MessageUri) -> bool {
        self.lock().contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Every stored URI inside `folder`, sorted
    pub fn uris_in(&self, folder: Folder) -> Vec<MessageUri> {
        let mut uris: Vec<MessageUri> = self
            .lock()
            .keys()
            .filter(|uri| uri.folder() == Some(folder))
            .cloned()
            .collect();
        uris.sort();
        uris
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<MessageUri, GenericPdu>> {
        self.messages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed).max(1)
    }
}

impl PersistenceGateway for MemoryPersister {
    async fn load(&self, uri: &MessageUri) -> Option<GenericPdu> {
        let pdu = self.get(uri);
        if pdu.is_none() {
            debug!(%uri, "no message stored");
        }
        pdu
    }

    async fn persist(
        &self,
        pdu: &GenericPdu,
        target: &MessageUri,
        flags: &PersistFlags,
    ) -> Option<MessageUri> {
        if target.folder().is_none() {
            warn!(%target, "refusing to persist outside a known folder");
            return None;
        }
        let uri = target.child(self.allocate_id());
        self.insert(uri.clone(), pdu.clone());
        debug!(%uri, thread = flags.create_thread_id, "persisted message");
        Some(uri)
    }

    async fn move_to(&self, from: &MessageUri, to: &MessageUri) -> Option<MessageUri> {
        if to.folder().is_none() {
            warn!(%from, %to, "refusing to move outside a known folder");
            return None;
        }
        let mut messages = self.lock();
        let pdu = messages.remove(from)?;
        let id = match from.id() {
            Some(id) => id,
            None => self.allocate_id(),
        };
        let uri = to.child(id);
        messages.insert(uri.clone(), pdu);
        debug!(%from, %uri, "moved message");
        Some(uri)
    }

    async fn delete(&self, uri: &MessageUri) -> bool {
        self.lock().remove(uri).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::{NotificationInd, SendReq};

    #[test]
    fn folder_uris_and_classification() {
        assert_eq!(Folder::Inbox.uri().as_str(), "content://mms/inbox");
        assert_eq!(Folder::Drafts.uri().as_str(), "content://mms/drafts");

        let uri = Folder::Sent.uri().child(42);
        assert_eq!(uri.as_str(), "content://mms/sent/42");
        assert_eq!(uri.folder(), Some(Folder::Sent));
        assert_eq!(uri.id(), Some(42));
        assert_eq!(MessageUri::from("content://sms/1").folder(), None);
    }

    #[tokio::test]
    async fn persist_then_load() {
        let store = MemoryPersister::new();
        let pdu = GenericPdu::from(NotificationInd::new().transaction_id(Some("N1".into())));

        let uri = store
            .persist(&pdu, &Folder::Inbox.uri(), &PersistFlags::default().with_thread_id())
            .await
            .unwrap();
        assert_eq!(uri.folder(), Some(Folder::Inbox));
        assert_eq!(store.load(&uri).await, Some(pdu));
    }

    #[tokio::test]
    async fn persist_fails_closed_for_unknown_target() {
        let store = MemoryPersister::new();
        let pdu = GenericPdu::from(SendReq::new());
        let target = MessageUri::new("content://sms/inbox-ish");
        assert!(store.persist(&pdu, &target, &PersistFlags::default()).await.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn move_keeps_row_id() {
        let store = MemoryPersister::new();
        let draft = Folder::Drafts.uri().child(7);
        store.insert(draft.clone(), SendReq::new().into());

        let sent = store.move_to(&draft, &Folder::Sent.uri()).await.unwrap();
        assert_eq!(sent.as_str(), "content://mms/sent/7");
        assert!(!store.contains(&draft));
        assert_eq!(store.uris_in(Folder::Sent), vec![sent]);
    }

    #[tokio::test]
    async fn move_and_delete_of_missing_message() {
        let store = MemoryPersister::new();
        let missing = Folder::Outbox.uri().child(1);
        assert!(store.move_to(&missing, &Folder::Sent.uri()).await.is_none());
        assert!(!store.delete(&missing).await);
    }
}
