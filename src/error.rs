//! Error types for the request facade.
//!
//! Transport-level failures are normalized before they reach the caller: the
//! underlying message is preserved, and any response the server did send is
//! retained separately as [`ResponseParts`] rather than woven into the error
//! text. Configuration mistakes (conflicting authorization sources, missing
//! URLs) get their own variants because they are programmer errors, not
//! runtime conditions.

use http::StatusCode;

/// Distinguishes what layer a transport failure came from.
///
/// Retry predicates use this to decide whether a failure is worth another
/// attempt without having to parse error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// A network-level failure: connection refused, DNS failure, TLS error.
    Connect,
    /// The request exceeded its configured timeout.
    Timeout,
    /// The server answered with a non-2xx status.
    Status,
    /// A failure raised by a transport adapter rather than the wire.
    Other,
}

/// The pieces of a response that accompanied a failed call.
///
/// Produced by [`Error::response_parts`] when the server actually answered.
/// A `None` from that method means no response reached this layer at all
/// (connection error, timeout, or a failure before the network call).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseParts {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The canonical reason phrase for the status, e.g. `"Not Found"`.
    pub status_text: String,
    /// The raw response body.
    pub body: String,
}

/// The main error type for facade calls.
///
/// # Examples
///
/// ```no_run
/// use courier::{Facade, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Facade::builder().build()?;
///
/// match client.get::<serde_json::Value>("https://api.example.com/endpoint", Default::default()).await {
///     Ok(response) => println!("Success: {:?}", response.data),
///     Err(e) => {
///         eprintln!("Call failed: {}", e);
///         if let Some(parts) = e.response_parts() {
///             eprintln!("Server said {} {}: {}", parts.status, parts.status_text, parts.body);
///         }
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Both a token resolver and an explicit `Authorization` header were
    /// supplied for the same call.
    ///
    /// The facade refuses to pick a winner. Raised before the resolver is
    /// invoked and before any network activity.
    #[error(
        "an Authorization header was supplied while a token resolver is configured; \
         omit the header or drop the resolver"
    )]
    AuthorizationConflict,

    /// The outgoing request has no target URL.
    ///
    /// Raised at the outbound boundary; the transport is never reached.
    #[error("request has no URL")]
    MissingUrl,

    /// The caller-supplied token resolver failed.
    ///
    /// The resolver's own message is surfaced unchanged.
    #[error("{0}")]
    TokenResolution(String),

    /// The network call or one of its transport adapters failed.
    ///
    /// Only the message survives into `Display`; if the server sent a
    /// response before the failure, its pieces are available through
    /// [`Error::response_parts`].
    #[error("{message}")]
    Transport {
        /// The underlying failure message.
        message: String,
        /// Which layer produced the failure.
        kind: TransportErrorKind,
        /// The response that accompanied the failure, if one was received.
        parts: Option<ResponseParts>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("failed to deserialize response (status {status}): {serde_error}")]
    Deserialization {
        /// The raw response body that failed to deserialize.
        raw_response: String,
        /// The serde error message.
        serde_error: String,
        /// The HTTP status code of the response.
        status: StatusCode,
    },

    /// The request body could not be serialized to JSON.
    #[error("failed to serialize request body: {0}")]
    Serialization(String),

    /// Invalid facade or per-call configuration, such as a bad header name.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An invalid URL was provided.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Builds a transport failure from an adapter-level message.
    ///
    /// Intended for custom [`Transport`](crate::transport::Transport)
    /// implementations and adapters that fail for reasons other than the
    /// wire itself.
    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport {
            message: message.into(),
            kind: TransportErrorKind::Other,
            parts: None,
        }
    }

    pub(crate) fn timeout() -> Self {
        Error::Transport {
            message: "request timed out".to_string(),
            kind: TransportErrorKind::Timeout,
            parts: None,
        }
    }

    /// Builds a transport failure for a non-2xx response.
    ///
    /// The response pieces are retained for [`Error::response_parts`]; the
    /// `Display` output carries the status and body. Useful for custom
    /// [`Transport`](crate::transport::Transport) implementations that
    /// follow the non-2xx-is-an-error convention.
    pub fn status(status: StatusCode, body: String) -> Self {
        let status_text = status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string();
        Error::Transport {
            message: format!("HTTP error {}: {}", status, body),
            kind: TransportErrorKind::Status,
            parts: Some(ResponseParts {
                status,
                status_text,
                body,
            }),
        }
    }

    /// Returns the response pieces that accompanied this failure, if the
    /// server answered before things went wrong.
    ///
    /// Returns `None` for failures where no response was received: connection
    /// errors, timeouts, token-resolution failures, and configuration errors.
    pub fn response_parts(&self) -> Option<ResponseParts> {
        match self {
            Error::Transport { parts, .. } => parts.clone(),
            Error::Deserialization {
                raw_response,
                status,
                ..
            } => Some(ResponseParts {
                status: *status,
                status_text: status
                    .canonical_reason()
                    .unwrap_or("Unknown Status")
                    .to_string(),
                body: raw_response.clone(),
            }),
            _ => None,
        }
    }

    /// Returns `true` if this error is potentially retryable.
    ///
    /// Connection failures, timeouts, and 5xx or 429 statuses are considered
    /// retryable. Everything else, including configuration and
    /// deserialization errors, is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport { kind, parts, .. } => match kind {
                TransportErrorKind::Connect | TransportErrorKind::Timeout => true,
                TransportErrorKind::Status => parts
                    .as_ref()
                    .map(|p| p.status.is_server_error() || p.status.as_u16() == 429)
                    .unwrap_or(false),
                TransportErrorKind::Other => false,
            },
            _ => false,
        }
    }

    /// Returns the HTTP status code if this error carries one.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Error::Transport { parts, .. } => parts.as_ref().map(|p| p.status),
            Error::Deserialization { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Error::timeout();
        }
        Error::Transport {
            message: source.to_string(),
            kind: TransportErrorKind::Connect,
            parts: None,
        }
    }
}

/// A specialized `Result` type for facade calls.
pub type Result<T> = std::result::Result<T, Error>;
