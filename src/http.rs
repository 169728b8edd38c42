// ABOUTME: Transport settings, request methods and errors for HTTP exchanges with an MMSC
// ABOUTME: Wire framing is left to hyper; this module only decides what an exchange may do

use bytes::Bytes;
use hyper::Method;
use std::time::Duration;
use thiserror::Error;

/// Default upper bound on a buffered response body
pub const MAX_RESPONSE_SIZE: usize = 4 * 1024 * 1024;

/// Transport configuration for MMSC exchanges
///
/// # Example
///
/// ```rust
/// use mms::http::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::default()
///     .with_post_timeout(Duration::from_secs(90))
///     .with_user_agent("Carrier MMS/2.0");
/// assert_eq!(config.get_timeout, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Deadline for a whole POST exchange (default: 60 seconds)
    pub post_timeout: Duration,
    /// Deadline for a whole GET exchange (default: 30 seconds)
    pub get_timeout: Duration,
    pub user_agent: String,
    pub accept_language: String,
    /// Largest response body accepted before the exchange is abandoned
    pub max_response_size: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            post_timeout: Duration::from_secs(60),
            get_timeout: Duration::from_secs(30),
            user_agent: "Android MMS/1.0".to_string(),
            accept_language: "en-US".to_string(),
            max_response_size: MAX_RESPONSE_SIZE,
        }
    }
}

impl HttpConfig {
    pub fn with_post_timeout(mut self, timeout: Duration) -> Self {
        self.post_timeout = timeout;
        self
    }

    pub fn with_get_timeout(mut self, timeout: Duration) -> Self {
        self.get_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_accept_language(mut self, language: impl Into<String>) -> Self {
        self.accept_language = language.into();
        self
    }

    pub fn with_max_response_size(mut self, limit: usize) -> Self {
        self.max_response_size = limit;
        self
    }

    pub fn timeout_for(&self, method: HttpMethod) -> Duration {
        match method {
            HttpMethod::Get => self.get_timeout,
            HttpMethod::Post => self.post_timeout,
        }
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("HTTP exchange failed: {0}")]
    Hyper(#[from] hyper::Error),

    #[error("Cannot build request: {0}")]
    InvalidRequest(String),

    #[error("Response body exceeds the configured limit")]
    TooLarge,

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Exchange timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The two methods an MMS client needs
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }
}

/// A complete, buffered response
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn reason(&self) -> &'static str {
        hyper::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown")
    }
}
