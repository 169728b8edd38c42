// ABOUTME: Scripted gateway doubles shared by the unit tests
// ABOUTME: The network mock replays queued responses; the store double can fail moves on demand

use crate::gateway::{
    MemoryPersister, MessageUri, MmsConfig, NetworkGateway, PersistFlags, PersistenceGateway,
};
use crate::http::HttpMethod;
use crate::pdu::GenericPdu;
use bytes::Bytes;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub(crate) const MMSC_URL: &str = "http://mmsc.test/mms";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HttpCall {
    pub url: String,
    pub method: HttpMethod,
    pub body: Option<Vec<u8>>,
    pub content_type: String,
}

/// Network gateway that answers from queues.
///
/// An exhausted queue answers `None`, like a failed exchange.
#[derive(Debug, Default)]
pub(crate) struct MockNetwork {
    config: Option<MmsConfig>,
    responses: Mutex<VecDeque<Option<Bytes>>>,
    platform: Mutex<VecDeque<Option<Bytes>>>,
    calls: Mutex<Vec<HttpCall>>,
    platform_calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockNetwork {
    /// A gateway with a usable MMSC configuration
    pub fn new() -> Self {
        Self {
            config: Some(MmsConfig::new(MMSC_URL)),
            ..Default::default()
        }
    }

    /// A gateway with no carrier configuration at all
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Answer the next exchange with `body`
    pub fn respond(self, body: impl AsRef<[u8]>) -> Self {
        lock(&self.responses).push_back(Some(Bytes::copy_from_slice(body.as_ref())));
        self
    }

    /// Fail the next exchange
    pub fn fail_next(self) -> Self {
        lock(&self.responses).push_back(None);
        self
    }

    /// Answer the next platform send with `body`
    pub fn respond_via_platform(self, body: impl AsRef<[u8]>) -> Self {
        lock(&self.platform).push_back(Some(Bytes::copy_from_slice(body.as_ref())));
        self
    }

    /// Hold every HTTP exchange open for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<HttpCall> {
        lock(&self.calls).clone()
    }

    pub fn platform_calls(&self) -> usize {
        self.platform_calls.load(Ordering::SeqCst)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl NetworkGateway for MockNetwork {
    async fn http_connection(
        &self,
        _token: u64,
        url: &str,
        body: Option<&[u8]>,
        content_type: &str,
        method: HttpMethod,
    ) -> Option<Bytes> {
        lock(&self.calls).push(HttpCall {
            url: url.to_string(),
            method,
            body: body.map(<[u8]>::to_vec),
            content_type: content_type.to_string(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        lock(&self.responses).pop_front().flatten()
    }

    async fn carrier_config(&self) -> Option<MmsConfig> {
        self.config.clone()
    }

    async fn send_via_platform(&self, _uri: &MessageUri, _pdu: &[u8]) -> Option<Bytes> {
        self.platform_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.platform).pop_front().flatten()
    }
}

/// In-memory store whose first `failures` moves fail closed.
#[derive(Debug, Default)]
pub(crate) struct FlakyStore {
    inner: MemoryPersister,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn failing_moves(failures: usize) -> Self {
        Self {
            inner: MemoryPersister::new(),
            failures: AtomicUsize::new(failures),
        }
    }

    pub fn inner(&self) -> &MemoryPersister {
        &self.inner
    }
}

impl PersistenceGateway for FlakyStore {
    async fn load(&self, uri: &MessageUri) -> Option<GenericPdu> {
        self.inner.load(uri).await
    }

    async fn persist(
        &self,
        pdu: &GenericPdu,
        target: &MessageUri,
        flags: &PersistFlags,
    ) -> Option<MessageUri> {
        self.inner.persist(pdu, target, flags).await
    }

    async fn move_to(&self, from: &MessageUri, to: &MessageUri) -> Option<MessageUri> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return None;
        }
        self.inner.move_to(from, to).await
    }

    async fn delete(&self, uri: &MessageUri) -> bool {
        self.inner.delete(uri).await
    }
}

/// Accept one connection, read one full request and answer with `chunks`.
///
/// The chunks are written with a short pause between them and the socket
/// is closed afterwards. The task yields the raw request bytes.
pub(crate) async fn serve_once(chunks: &[&[u8]]) -> (SocketAddr, JoinHandle<Vec<u8>>) {
    serve_owned(chunks.iter().map(|c| c.to_vec()).collect()).await
}

pub(crate) async fn serve_owned(chunks: Vec<Vec<u8>>) -> (SocketAddr, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        for chunk in chunks {
            socket.write_all(&chunk).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let _ = socket.shutdown().await;
        request
    });
    (addr, server)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Vec<u8> {
    let mut request = Vec::new();
    let mut scratch = [0u8; 2048];
    loop {
        let n = socket.read(&mut scratch).await.unwrap();
        request.extend_from_slice(&scratch[..n]);
        if n == 0 {
            return request;
        }
        let text = String::from_utf8_lossy(&request).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|l| l.strip_prefix("Content-Length: "))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= end + 4 + length {
                return request;
            }
        }
    }
}
