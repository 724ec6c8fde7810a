//! Outbound HTTP transport capability.
//!
//! # Responsibilities
//! - Execute one outbound exchange per forwarded request
//! - Classify wire-level failures (timeout, connect, protocol)
//!
//! # Design Decisions
//! - The coordinator depends on the `Transport` trait, not on a concrete
//!   client; the production implementation wraps one shared pooled
//!   reqwest client acquired at startup
//! - Dropping the in-flight future aborts the outbound request

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use url::Url;

/// Wire-level request handed to the transport.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Backend reply as seen by the gateway.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Failure to complete the network exchange itself, as opposed to a
/// backend answering with an error status.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream connection failed: {0}")]
    Connect(String),

    #[error("upstream exchange failed: {0}")]
    Exchange(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else {
            TransportError::Exchange(error.to_string())
        }
    }
}

/// Injected HTTP-client capability: exactly one send per forward attempt.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, TransportError>;
}

/// Production transport over a shared, connection-pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the shared client with keep-alive pooling and a bounded total
    /// timeout covering connect, send and response read.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, TransportError> {
        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        // A failure while draining the body is still a wire-level failure
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}
