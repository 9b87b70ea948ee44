//! # Courier - an instrumented HTTP request facade
//!
//! Courier wraps an HTTP transport with structured request/response logging,
//! automatic bearer-token injection, and optional caching and retry behavior
//! composed as transport-level adapters. It is built on top of `reqwest` and
//! logs through `tracing` by default.
//!
//! ## Quick Start
//!
//! ```no_run
//! use courier::{CallOptions, Facade, RetryOptions, TokenError};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct CreateUser {
//!     name: String,
//!     email: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), courier::Error> {
//!     // Tokens are fetched on demand, at most once per call.
//!     let client = Facade::builder()
//!         .token_resolver(|| async { Ok::<_, TokenError>("secret-token".to_string()) })
//!         .enable_retry(RetryOptions::default())
//!         .build()?;
//!
//!     // GET request; the bearer token is injected automatically.
//!     let user = client
//!         .get::<User>("https://api.example.com/users/123", CallOptions::new())
//!         .await?;
//!     println!("User: {}", user.data.name);
//!
//!     // POST request with a JSON body.
//!     let new_user = CreateUser {
//!         name: "Alice".to_string(),
//!         email: "alice@example.com".to_string(),
//!     };
//!     let created = client
//!         .post::<_, User>("https://api.example.com/users", &new_user, CallOptions::new())
//!         .await?;
//!     println!("Created user with ID: {}", created.data.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## How a call flows
//!
//! Every verb method runs the same pipeline:
//!
//! 1. Default and per-call headers are merged; if a token resolver is
//!    configured, it is invoked once and `Authorization: Bearer <token>` is
//!    injected. Supplying your own `Authorization` header alongside a
//!    resolver is rejected as a configuration conflict before anything else
//!    happens.
//! 2. A fresh correlation id is generated and an `"HTTP Request"` event is
//!    emitted to the configured [`LogSink`].
//! 3. The request is handed to the transport chain. With caching and retry
//!    enabled the chain is base transport, wrapped by the cache adapter,
//!    wrapped by the retry adapter, so a retried attempt can still be served
//!    from cache.
//! 4. On success the JSON body is deserialized into your type. On failure
//!    the error is classified, logged under the same correlation id, and
//!    re-raised with its message intact; the raw response pieces stay
//!    reachable through [`Error::response_parts`].
//!
//! ## Errors
//!
//! ```no_run
//! use courier::{CallOptions, Facade, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Facade::builder().build()?;
//! match client.get::<serde_json::Value>("https://api.example.com/endpoint", CallOptions::new()).await {
//!     Ok(response) => println!("Success: {:?}", response.data),
//!     Err(Error::AuthorizationConflict) => {
//!         eprintln!("Drop the Authorization header or the token resolver");
//!     }
//!     Err(e) => {
//!         eprintln!("Call failed: {}", e);
//!         if let Some(parts) = e.response_parts() {
//!             eprintln!("Server answered {}: {}", parts.status, parts.body);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Seven verb methods** - GET/POST/PUT/PATCH/DELETE/HEAD/OPTIONS, generic
//!   over the JSON payload type
//! - **Bearer-token injection** - pluggable async [`TokenResolver`], invoked
//!   at most once per call, with conflict detection
//! - **Paired log events** - request and failure events share a per-call
//!   correlation id, safe under concurrency
//! - **Adapter composition** - caching and retry are decorators around the
//!   transport, not logic inside the facade
//! - **Pluggable transport** - supply your own [`Transport`] to stub the
//!   wire entirely

mod client;
mod correlation;
mod error;
mod headers;
mod response;

pub mod cache;
pub mod log;
pub mod retry;
pub mod transport;

pub use cache::CacheOptions;
pub use client::{CallOptions, Facade, FacadeBuilder};
pub use correlation::{CorrelationId, IdGenerator, UuidGenerator};
pub use error::{Error, ResponseParts, Result, TransportErrorKind};
pub use headers::{TokenError, TokenResolver};
pub use log::{LogEvent, LogLevel, LogSink, TracingSink};
pub use response::Response;
pub use retry::{RetryOptions, RetryPredicate, RetryStrategy};
pub use transport::{Transport, TransportRequest, TransportResponse};
