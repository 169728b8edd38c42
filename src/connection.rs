// ABOUTME: Provides TCP connection management for HTTP exchanges with an MMSC or its proxy
// ABOUTME: Drives a hyper HTTP/1.1 client connection and buffers each response body under a size limit

use crate::http::{HttpError, HttpResponse};
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::Request;
use hyper::client::conn::http1::{self, SendRequest};
use hyper_util::rt::TokioIo;
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

/// One HTTP/1.1 connection.
///
/// The hyper connection future runs on its own task for as long as the
/// peer keeps the socket open. Header names go out title-cased, since
/// some MMSCs match them case-sensitively.
#[derive(Debug)]
pub struct Connection {
    sender: SendRequest<Full<Bytes>>,
}

impl Connection {
    /// Open a TCP connection to `addr` and complete the HTTP/1.1 handshake.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Connection, HttpError> {
        let socket = TcpStream::connect(addr).await?;
        Connection::new(socket).await
    }

    /// Create a new `Connection`, backed by `socket`.
    pub async fn new(socket: TcpStream) -> Result<Connection, HttpError> {
        let (sender, connection) = http1::Builder::new()
            .title_case_headers(true)
            .handshake(TokioIo::new(socket))
            .await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!(error = %e, "HTTP connection ended with an error");
            }
        });
        Ok(Connection { sender })
    }

    /// Send `request` and buffer the whole response.
    ///
    /// A body longer than `limit` bytes fails with `HttpError::TooLarge`.
    pub async fn send(
        &mut self,
        request: Request<Full<Bytes>>,
        limit: usize,
    ) -> Result<HttpResponse, HttpError> {
        let method = request.method().clone();
        let target = request.uri().clone();

        self.sender.ready().await?;
        let response = self.sender.send_request(request).await?;
        let status = response.status().as_u16();

        let body = Limited::new(response.into_body(), limit)
            .collect()
            .await
            .map_err(body_error)?
            .to_bytes();
        debug!(%method, %target, status, len = body.len(), "exchange complete");

        Ok(HttpResponse { status, body })
    }
}

fn body_error(e: Box<dyn std::error::Error + Send + Sync>) -> HttpError {
    if e.is::<LengthLimitError>() {
        return HttpError::TooLarge;
    }
    match e.downcast::<hyper::Error>() {
        Ok(e) => HttpError::Hyper(*e),
        Err(e) => HttpError::Body(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MAX_RESPONSE_SIZE;
    use crate::testing::serve_once;

    fn post(target: &str, body: &'static [u8]) -> Request<Full<Bytes>> {
        Request::post(target)
            .header("Host", "localhost")
            .body(Full::new(Bytes::from_static(body)))
            .unwrap()
    }

    #[tokio::test]
    async fn exchanges_request_and_split_response() {
        let (addr, server) = serve_once(&[
            b"HTTP/1.1 200 OK\r\nContent-",
            b"Length: 2\r\n\r\nok",
        ])
        .await;

        let mut connection = Connection::connect(addr).await.unwrap();
        let response = connection
            .send(post("/send", b"pdu"), MAX_RESPONSE_SIZE)
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], b"ok");

        let received = server.await.unwrap();
        assert!(received.starts_with(b"POST /send HTTP/1.1\r\n"));
        assert!(received.windows(17).any(|w| w == b"Content-Length: 3"));
        assert!(received.ends_with(b"\r\n\r\npdu"));
    }

    #[tokio::test]
    async fn chunked_response_is_reassembled() {
        let (addr, _server) = serve_once(&[
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n",
            b"5\r\npedia\r\n0\r\n\r\n",
        ])
        .await;

        let mut connection = Connection::connect(addr).await.unwrap();
        let response = connection.send(post("/m", b""), MAX_RESPONSE_SIZE).await.unwrap();
        assert_eq!(&response.body[..], b"Wikipedia");
    }

    #[tokio::test]
    async fn close_delimited_response_ends_at_eof() {
        let (addr, _server) = serve_once(&[b"HTTP/1.0 200 OK\r\n\r\nbody-bytes"]).await;

        let mut connection = Connection::connect(addr).await.unwrap();
        let response = connection.send(post("/m/1", b""), MAX_RESPONSE_SIZE).await.unwrap();
        assert_eq!(&response.body[..], b"body-bytes");
    }

    #[tokio::test]
    async fn truncated_response_is_an_error() {
        let (addr, _server) =
            serve_once(&[b"HTTP/1.1 200 OK\r\nContent-Length: 50\r\n\r\nshort"]).await;

        let mut connection = Connection::connect(addr).await.unwrap();
        assert!(connection.send(post("/m/2", b""), MAX_RESPONSE_SIZE).await.is_err());
    }

    #[tokio::test]
    async fn absurd_content_length_is_an_error() {
        let (addr, _server) = serve_once(&[
            b"HTTP/1.1 200 OK\r\nContent-Length: 18446744073709551615\r\n\r\nab",
        ])
        .await;

        let mut connection = Connection::connect(addr).await.unwrap();
        assert!(connection.send(post("/m/3", b""), MAX_RESPONSE_SIZE).await.is_err());
    }

    #[tokio::test]
    async fn body_over_limit_is_too_large() {
        let (addr, _server) =
            serve_once(&[b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n0123456789"]).await;

        let mut connection = Connection::connect(addr).await.unwrap();
        assert!(matches!(
            connection.send(post("/m/4", b""), 4).await,
            Err(HttpError::TooLarge)
        ));
    }
}
