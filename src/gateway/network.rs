// ABOUTME: Network gateway contract and its HTTP implementation for MMSC exchanges
// ABOUTME: Transport failures of any kind surface as None after being logged

use crate::connection::Connection;
use crate::datatypes::CONTENT_TYPE_MMS;
use crate::gateway::carrier::{CarrierConfigResolver, MmsConfig};
use crate::gateway::persistence::MessageUri;
use crate::http::{HttpConfig, HttpError, HttpMethod, HttpResponse};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Method, Request, header};
use std::future::Future;
use tracing::{debug, info, warn};
use url::Url;

/// Transport collaborator for the transaction engine.
pub trait NetworkGateway: Send + Sync {
    /// Perform one HTTP exchange.
    ///
    /// `token` identifies the message the exchange belongs to and is only
    /// used for logging. `body` is posted with `content_type` when present.
    /// Only a 200 response yields bytes.
    fn http_connection(
        &self,
        token: u64,
        url: &str,
        body: Option<&[u8]>,
        content_type: &str,
        method: HttpMethod,
    ) -> impl Future<Output = Option<Bytes>> + Send;

    /// Resolve the MMSC endpoint for the serving operator.
    fn carrier_config(&self) -> impl Future<Output = Option<MmsConfig>> + Send;

    /// Secondary send path (e.g. a platform messaging service).
    ///
    /// Returns the MMSC's response, which may be empty when the platform
    /// only acknowledges acceptance. Unavailable by default.
    fn send_via_platform(
        &self,
        _uri: &MessageUri,
        _pdu: &[u8],
    ) -> impl Future<Output = Option<Bytes>> + Send {
        async { None }
    }
}

/// HTTP/1.1 over TCP, optionally through the carrier's MMS proxy.
///
/// Only `http` URLs are supported; MMSCs are reached in the clear, usually
/// through a carrier proxy.
#[derive(Debug, Clone)]
pub struct HttpNetworkGateway {
    config: HttpConfig,
    resolver: CarrierConfigResolver,
}

impl HttpNetworkGateway {
    pub fn new(config: HttpConfig, resolver: CarrierConfigResolver) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Build the request for `url`, in absolute form when going through a proxy.
    pub fn build_request(
        &self,
        url: &Url,
        via_proxy: bool,
        body: Option<&[u8]>,
        content_type: &str,
        method: HttpMethod,
    ) -> Result<Request<Full<Bytes>>, HttpError> {
        let host = url.host_str().ok_or_else(|| HttpError::InvalidUrl {
            url: url.to_string(),
            reason: "missing host".to_string(),
        })?;
        let host_header = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let target = if via_proxy {
            url.as_str().to_string()
        } else {
            let mut target = url.path().to_string();
            if let Some(query) = url.query() {
                target.push('?');
                target.push_str(query);
            }
            target
        };

        let mut builder = Request::builder()
            .method(Method::from(method))
            .uri(target)
            .header(header::HOST, host_header)
            .header(header::ACCEPT, CONTENT_TYPE_MMS)
            .header(header::USER_AGENT, self.config.user_agent.as_str())
            .header(header::ACCEPT_LANGUAGE, self.config.accept_language.as_str())
            .header(header::CONNECTION, "close");
        let payload = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, content_type);
                Bytes::copy_from_slice(body)
            }
            None => Bytes::new(),
        };
        builder
            .body(Full::new(payload))
            .map_err(|e| HttpError::InvalidRequest(e.to_string()))
    }

    /// Run one exchange and return the buffered response.
    pub async fn exchange(
        &self,
        url: &str,
        body: Option<&[u8]>,
        content_type: &str,
        method: HttpMethod,
    ) -> Result<HttpResponse, HttpError> {
        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" {
            return Err(HttpError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        let proxy = self.resolver.resolve().and_then(|c| c.proxy);
        let request = self.build_request(&parsed, proxy.is_some(), body, content_type, method)?;
        let (host, port) = match &proxy {
            Some(proxy) => (proxy.host.clone(), proxy.port),
            None => (
                parsed.host_str().unwrap_or_default().to_string(),
                parsed.port_or_known_default().unwrap_or(80),
            ),
        };

        let timeout = self.config.timeout_for(method);
        let limit = self.config.max_response_size;
        let exchange = async {
            let mut connection = Connection::connect((host.as_str(), port)).await?;
            connection.send(request, limit).await
        };
        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| HttpError::Timeout(timeout))?
    }
}

impl NetworkGateway for HttpNetworkGateway {
    async fn http_connection(
        &self,
        token: u64,
        url: &str,
        body: Option<&[u8]>,
        content_type: &str,
        method: HttpMethod,
    ) -> Option<Bytes> {
        debug!(token, url, method = method.as_str(), "starting MMSC exchange");
        match self.exchange(url, body, content_type, method).await {
            Ok(response) if response.is_ok() => {
                info!(token, len = response.body.len(), "MMSC exchange succeeded");
                Some(response.body)
            }
            Ok(response) => {
                warn!(token, status = response.status, reason = response.reason(), "MMSC returned an error status");
                None
            }
            Err(e) => {
                warn!(token, url, error = %e, "MMSC exchange failed");
                None
            }
        }
    }

    async fn carrier_config(&self) -> Option<MmsConfig> {
        self.resolver.resolve()
    }
}
