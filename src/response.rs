//! Response wrapper pairing the deserialized payload with the raw HTTP
//! details.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A successful response from the transport.
///
/// Carries the deserialized payload plus the status, headers, and raw body
/// as they came off the wire, so callers never have to choose between typed
/// access and debuggability.
///
/// # Examples
///
/// ```no_run
/// use courier::Facade;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), courier::Error> {
/// let client = Facade::builder().build()?;
///
/// let response = client
///     .get::<User>("https://api.example.com/users/123", Default::default())
///     .await?;
///
/// println!("User: {}", response.data.name);
/// println!("Status: {}", response.status);
/// println!("Took {:?}", response.latency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The deserialized response payload.
    pub data: T,

    /// The raw response body as a string.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from sending the request until the response body was received,
    /// including any adapter-level retries.
    pub latency: Duration,
}

impl<T> Response<T> {
    pub(crate) fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
        }
    }

    /// Maps the payload to a different type, preserving the HTTP details.
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            raw_body: self.raw_body,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
        }
    }

    /// Returns a response header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
