//! The transport seam: one trait, a reqwest-backed base implementation, and
//! the request/response value types that cross it.
//!
//! Adapters (caching, retry) implement [`Transport`] by wrapping another
//! `Transport`, so the facade only ever talks to the outermost layer of the
//! chain. The chain is assembled once at construction and shared across all
//! calls on a facade.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use http::{HeaderMap, Method, StatusCode};
use url::Url;

use crate::correlation::CorrelationId;
use crate::{Error, Result};

/// Boxed future used at the dyn-safe seams of this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A fully resolved outgoing request.
///
/// Headers here are final: defaults, per-call headers, and any injected
/// bearer token have already been merged by the facade.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: Method,
    /// The absolute target URL, query parameters included.
    pub url: Url,
    /// The complete header set for this request.
    pub headers: HeaderMap,
    /// JSON body, if the verb carries one.
    pub body: Option<serde_json::Value>,
    /// Per-request timeout, if configured on the facade.
    pub timeout: Option<Duration>,
    /// Id tagging this request's log events, assigned at the outbound stage.
    pub correlation_id: CorrelationId,
}

/// A raw response as seen by the transport layer, before deserialization.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// The HTTP status code. Always 2xx; non-2xx statuses surface as errors.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The raw response body.
    pub body: String,
}

/// The underlying HTTP-call-issuing component the facade decorates.
///
/// Implementations must be safe for concurrent use; one instance is shared
/// by every call on a facade. Failures are reported as [`Error::Transport`]
/// values so the facade can classify and log them uniformly.
pub trait Transport: Send + Sync {
    /// Issues one request and resolves to its response or failure.
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse>>;
}

/// The base transport adapter, backed by a pooled [`reqwest::Client`].
///
/// Non-2xx statuses are turned into transport failures carrying the response
/// parts; connection pooling, TLS, and redirects are reqwest's business.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport with a fresh reqwest client.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Builds a transport around an existing reqwest client, keeping its
    /// pool and TLS configuration.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse>> {
        Box::pin(async move {
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                correlation_id = %request.correlation_id,
                "executing HTTP request"
            );

            let mut builder = self
                .client
                .request(request.method.clone(), request.url.clone());

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }

            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response.text().await?;

            tracing::debug!(
                status = status.as_u16(),
                correlation_id = %request.correlation_id,
                "received HTTP response"
            );

            if !status.is_success() {
                return Err(Error::status(status, body));
            }

            Ok(TransportResponse {
                status,
                headers,
                body,
            })
        })
    }
}
