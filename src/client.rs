//! The request facade: verb methods, header merging, and the paired
//! outbound/inbound log events.
//!
//! [`Facade`] is the main entry point. Use [`FacadeBuilder`] to configure
//! the transport chain, token resolver, and log sink, then reuse one facade
//! across requests; it is cheap to clone and safe to share.

use std::sync::Arc;
use std::time::{Duration, Instant};

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::cache::{CacheAdapter, CacheOptions};
use crate::correlation::{CorrelationId, IdGenerator, UuidGenerator};
use crate::headers::{resolve_headers, TokenResolver};
use crate::log::{
    LogEvent, LogLevel, LogSink, TracingSink, TITLE_REQUEST, TITLE_RESPONSE_ERROR,
    TITLE_TOKEN_ERROR,
};
use crate::retry::{RetryAdapter, RetryOptions};
use crate::transport::{HttpTransport, Transport, TransportRequest};
use crate::{Error, Response, Result};

/// Per-call configuration: extra headers and query parameters.
///
/// Per-call headers take precedence over the facade's default headers; the
/// merged set is what token injection runs against.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
}

impl CallOptions {
    /// Creates empty call options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header to this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a query parameter to this call.
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }
}

/// An instrumented HTTP request facade.
///
/// Wraps a transport (optionally composed with caching and retry adapters),
/// injects bearer tokens from a configured resolver, and tags each
/// request/response cycle's log events with a fresh correlation id.
///
/// # Examples
///
/// ```no_run
/// use courier::{CallOptions, Facade, RetryOptions, TokenError};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), courier::Error> {
/// let client = Facade::builder()
///     .token_resolver(|| async { Ok::<_, TokenError>("secret".to_string()) })
///     .enable_retry(RetryOptions::default())
///     .build()?;
///
/// let user = client
///     .get::<User>("https://api.example.com/users/123", CallOptions::new())
///     .await?;
/// println!("User: {}", user.data.name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Facade {
    inner: Arc<FacadeInner>,
}

struct FacadeInner {
    transport: Arc<dyn Transport>,
    token_resolver: Option<Box<dyn TokenResolver>>,
    log_sink: Box<dyn LogSink>,
    id_generator: Box<dyn IdGenerator>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl Facade {
    /// Creates a new [`FacadeBuilder`].
    pub fn builder() -> FacadeBuilder {
        FacadeBuilder::new()
    }

    /// Makes a typed request with an explicit method.
    ///
    /// The seven verb methods all route through here. The flow per call:
    /// merge default and per-call headers, resolve the bearer token, emit the
    /// outbound log event, delegate to the transport chain, then either
    /// deserialize the response or classify, log, and re-raise the failure.
    pub async fn request<Req, Res>(
        &self,
        method: Method,
        url: impl AsRef<str>,
        body: Option<&Req>,
        options: CallOptions,
    ) -> Result<Response<Res>>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        // Header resolution happens before anything is logged; a conflict or
        // resolver failure must precede all network activity.
        let mut merged = self.inner.default_headers.clone();
        for (name, value) in &options.headers {
            merged.insert(name, value.clone());
        }
        let headers = resolve_headers(self.inner.token_resolver.as_deref(), &merged).await?;

        let body = match body {
            Some(b) => Some(
                serde_json::to_value(b).map_err(|e| Error::Serialization(e.to_string()))?,
            ),
            None => None,
        };

        let correlation_id = self.inner.id_generator.generate();
        let url_ref = url.as_ref();

        self.inner.log_sink.emit(&LogEvent::request(
            correlation_id.clone(),
            method.clone(),
            url_ref.to_string(),
        ));

        if url_ref.trim().is_empty() {
            return Err(Error::MissingUrl);
        }

        let mut target = match Url::parse(url_ref) {
            Ok(url) => url,
            Err(e) => {
                self.inner.log_sink.emit(&LogEvent::failure(
                    TITLE_REQUEST,
                    LogLevel::Warn,
                    correlation_id,
                    e.to_string(),
                ));
                return Err(Error::InvalidUrl(e));
            }
        };
        for (key, value) in &options.query_params {
            target.query_pairs_mut().append_pair(key, value);
        }

        let request = TransportRequest {
            method,
            url: target,
            headers,
            body,
            timeout: self.inner.timeout,
            correlation_id: correlation_id.clone(),
        };

        let start = Instant::now();
        let response = match self.inner.transport.send(request).await {
            Ok(response) => response,
            Err(e) => return Err(self.fail_inbound(correlation_id, e)),
        };
        let latency = start.elapsed();

        // An empty body deserializes as JSON null so that `()` and
        // `Option<T>` payloads work for bodyless responses.
        let parsed = {
            let source = if response.body.trim().is_empty() {
                "null"
            } else {
                response.body.as_str()
            };
            serde_json::from_str::<Res>(source)
        };

        match parsed {
            Ok(data) => Ok(Response::new(
                data,
                response.body,
                response.status,
                response.headers,
                latency,
            )),
            Err(e) => {
                let error = Error::Deserialization {
                    serde_error: e.to_string(),
                    status: response.status,
                    raw_response: response.body,
                };
                Err(self.fail_inbound(correlation_id, error))
            }
        }
    }

    /// Classifies a failed call, emits the inbound log event, and hands the
    /// error back for propagation. Never swallows.
    fn fail_inbound(&self, correlation_id: CorrelationId, error: Error) -> Error {
        let message = error.to_string();
        let title = if message == "Invalid token" {
            TITLE_TOKEN_ERROR
        } else {
            TITLE_RESPONSE_ERROR
        };
        self.inner.log_sink.emit(&LogEvent::failure(
            title,
            LogLevel::Info,
            correlation_id,
            message,
        ));
        error
    }

    /// Makes a GET request, parsing the response body as JSON.
    pub async fn get<Res>(
        &self,
        url: impl AsRef<str>,
        options: CallOptions,
    ) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        self.request::<(), Res>(Method::GET, url, None, options).await
    }

    /// Makes a POST request with a JSON body.
    pub async fn post<Req, Res>(
        &self,
        url: impl AsRef<str>,
        body: &Req,
        options: CallOptions,
    ) -> Result<Response<Res>>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        self.request(Method::POST, url, Some(body), options).await
    }

    /// Makes a PUT request with a JSON body.
    pub async fn put<Req, Res>(
        &self,
        url: impl AsRef<str>,
        body: &Req,
        options: CallOptions,
    ) -> Result<Response<Res>>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        self.request(Method::PUT, url, Some(body), options).await
    }

    /// Makes a PATCH request with a JSON body.
    pub async fn patch<Req, Res>(
        &self,
        url: impl AsRef<str>,
        body: &Req,
        options: CallOptions,
    ) -> Result<Response<Res>>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        self.request(Method::PATCH, url, Some(body), options).await
    }

    /// Makes a DELETE request.
    pub async fn delete<Res>(
        &self,
        url: impl AsRef<str>,
        options: CallOptions,
    ) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        self.request::<(), Res>(Method::DELETE, url, None, options)
            .await
    }

    /// Makes a HEAD request.
    pub async fn head<Res>(
        &self,
        url: impl AsRef<str>,
        options: CallOptions,
    ) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        self.request::<(), Res>(Method::HEAD, url, None, options)
            .await
    }

    /// Makes an OPTIONS request.
    pub async fn options<Res>(
        &self,
        url: impl AsRef<str>,
        options: CallOptions,
    ) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        self.request::<(), Res>(Method::OPTIONS, url, None, options)
            .await
    }
}

/// Builder for configuring and creating a [`Facade`].
///
/// # Examples
///
/// ```no_run
/// use courier::{CacheOptions, Facade, RetryOptions};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), courier::Error> {
/// let client = Facade::builder()
///     .timeout(Duration::from_secs(30))
///     .default_header("User-Agent", "my-app/1.0")?
///     .enable_cache(CacheOptions::default())
///     .enable_retry(RetryOptions::default())
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct FacadeBuilder {
    transport: Option<Arc<dyn Transport>>,
    token_resolver: Option<Box<dyn TokenResolver>>,
    log_sink: Option<Box<dyn LogSink>>,
    id_generator: Option<Box<dyn IdGenerator>>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    cache: Option<CacheOptions>,
    retry: Option<RetryOptions>,
}

impl FacadeBuilder {
    /// Creates a new `FacadeBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            transport: None,
            token_resolver: None,
            log_sink: None,
            id_generator: None,
            default_headers: HeaderMap::new(),
            timeout: None,
            cache: None,
            retry: None,
        }
    }

    /// Supplies a pre-built transport, used verbatim.
    ///
    /// When set, [`enable_cache`](Self::enable_cache) and
    /// [`enable_retry`](Self::enable_retry) are ignored; the caller owns the
    /// adapter composition.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Configures automatic bearer-token injection.
    pub fn token_resolver(mut self, resolver: impl TokenResolver + 'static) -> Self {
        self.token_resolver = Some(Box::new(resolver));
        self
    }

    /// Sets the sink receiving the facade's structured log events.
    ///
    /// Defaults to [`TracingSink`].
    pub fn log_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.log_sink = Some(Box::new(sink));
        self
    }

    /// Sets the correlation-id generator. Defaults to random v4 UUIDs.
    pub fn id_generator(mut self, generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Some(Box::new(generator));
        self
    }

    /// Adds a default header included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Configuration(format!("invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Configuration(format!("invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wraps the base transport with the caching adapter.
    pub fn enable_cache(mut self, options: CacheOptions) -> Self {
        self.cache = Some(options);
        self
    }

    /// Wraps the (possibly cache-wrapped) transport with the retry adapter.
    pub fn enable_retry(mut self, options: RetryOptions) -> Self {
        self.retry = Some(options);
        self
    }

    /// Builds the configured [`Facade`].
    ///
    /// Composes the adapter chain base -> cache -> retry, in that fixed
    /// order, so retried attempts can still be answered from cache. Makes no
    /// network calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn build(self) -> Result<Facade> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let base = HttpTransport::new()?;
                match (self.cache, self.retry) {
                    (None, None) => Arc::new(base),
                    (Some(cache), None) => Arc::new(CacheAdapter::new(base, cache)),
                    (None, Some(retry)) => Arc::new(RetryAdapter::new(base, retry)),
                    (Some(cache), Some(retry)) => {
                        Arc::new(RetryAdapter::new(CacheAdapter::new(base, cache), retry))
                    }
                }
            }
        };

        Ok(Facade {
            inner: Arc::new(FacadeInner {
                transport,
                token_resolver: self.token_resolver,
                log_sink: self.log_sink.unwrap_or_else(|| Box::new(TracingSink)),
                id_generator: self.id_generator.unwrap_or_else(|| Box::new(UuidGenerator)),
                default_headers: self.default_headers,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for FacadeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
