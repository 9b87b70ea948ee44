//! Structured log events and the sink they are delivered to.
//!
//! The facade emits exactly two kinds of events per call: one when the
//! request goes out, and one if it comes back as a failure. Events are
//! produced, handed to the configured [`LogSink`], and forgotten; persistence
//! and formatting are the sink's business. The default sink forwards to
//! [`tracing`].

use http::Method;

use crate::correlation::CorrelationId;

/// Title of the event emitted when a request is sent.
pub const TITLE_REQUEST: &str = "HTTP Request";
/// Title of the event emitted for a generic transport failure.
pub const TITLE_RESPONSE_ERROR: &str = "HTTP Response Error";
/// Title of the event emitted when a call failed with the token sentinel.
pub const TITLE_TOKEN_ERROR: &str = "HTTP call skipped due to a token error";

/// Severity of a [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
}

/// One structured event in a request/response cycle.
#[derive(Debug, Clone)]
pub struct LogEvent {
    /// Human-readable event title.
    pub title: &'static str,
    /// Event severity.
    pub level: LogLevel,
    /// Id shared by the events of one request/response pair.
    pub correlation_id: CorrelationId,
    /// HTTP method, present on request events.
    pub method: Option<Method>,
    /// Target URL, present on request events.
    pub url: Option<String>,
    /// Failure message, present on error events.
    pub error: Option<String>,
}

impl LogEvent {
    pub(crate) fn request(correlation_id: CorrelationId, method: Method, url: String) -> Self {
        Self {
            title: TITLE_REQUEST,
            level: LogLevel::Info,
            correlation_id,
            method: Some(method),
            url: Some(url),
            error: None,
        }
    }

    pub(crate) fn failure(
        title: &'static str,
        level: LogLevel,
        correlation_id: CorrelationId,
        error: String,
    ) -> Self {
        Self {
            title,
            level,
            correlation_id,
            method: None,
            url: None,
            error: Some(error),
        }
    }
}

/// Destination for the facade's structured log events.
///
/// Implement this to route events into your own logging pipeline, or rely on
/// the default [`TracingSink`]. Closures work too:
///
/// ```
/// use courier::{Facade, LogEvent};
///
/// # fn example() -> Result<(), courier::Error> {
/// let client = Facade::builder()
///     .log_sink(|event: &LogEvent| eprintln!("{}: {}", event.correlation_id, event.title))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub trait LogSink: Send + Sync {
    /// Delivers one event. Must not block for long; called on the request path.
    fn emit(&self, event: &LogEvent);
}

impl<F> LogSink for F
where
    F: Fn(&LogEvent) + Send + Sync,
{
    fn emit(&self, event: &LogEvent) {
        self(event)
    }
}

/// Default sink forwarding events to the `tracing` ecosystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, event: &LogEvent) {
        match event.level {
            LogLevel::Info => tracing::info!(
                correlation_id = %event.correlation_id,
                method = event.method.as_ref().map(|m| m.as_str()),
                url = event.url.as_deref(),
                error = event.error.as_deref(),
                "{}",
                event.title
            ),
            LogLevel::Warn => tracing::warn!(
                correlation_id = %event.correlation_id,
                method = event.method.as_ref().map(|m| m.as_str()),
                url = event.url.as_deref(),
                error = event.error.as_deref(),
                "{}",
                event.title
            ),
        }
    }
}
