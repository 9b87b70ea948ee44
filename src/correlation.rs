//! Correlation identifiers for pairing request and response log events.
//!
//! Every facade call gets a fresh id at the start of the outbound stage. The
//! id travels with the request itself, so the failure log for a call always
//! carries the id that call was sent with, no matter how many other requests
//! are in flight at the same time.

use std::fmt;

/// An identifier grouping the log events of one request/response cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Wraps an already-generated identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of correlation ids, injectable for deterministic tests.
pub trait IdGenerator: Send + Sync {
    /// Produces a fresh identifier for one outgoing request.
    fn generate(&self) -> CorrelationId;
}

/// Default generator producing random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> CorrelationId {
        CorrelationId::new(uuid::Uuid::new_v4().to_string())
    }
}
