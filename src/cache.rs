//! Response caching as a transport adapter.
//!
//! [`CacheAdapter`] wraps another [`Transport`] and serves repeated
//! idempotent requests from an in-process store. It sits directly around the
//! base transport, underneath the retry adapter, so a retried call can still
//! hit cache on its later attempts.
//!
//! Only successful responses to GET and HEAD requests are stored, keyed by
//! method and full URL. Entries expire after the configured TTL; when the
//! store is full, expired entries are dropped first and the oldest entry
//! after that. There is no smarter eviction policy here.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use http::Method;

use crate::transport::{BoxFuture, Transport, TransportRequest, TransportResponse};
use crate::Result;

/// Configuration for the caching adapter.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// How long a stored response stays servable.
    pub ttl: Duration,
    /// Upper bound on stored entries.
    pub max_entries: usize,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_entries: 1024,
        }
    }
}

struct CacheEntry {
    response: TransportResponse,
    stored_at: Instant,
}

/// A decorator transport that answers repeated idempotent requests from
/// memory before delegating to the wrapped transport.
pub struct CacheAdapter {
    inner: Box<dyn Transport>,
    options: CacheOptions,
    store: Mutex<HashMap<String, CacheEntry>>,
}

impl CacheAdapter {
    /// Wraps `inner` with a cache configured by `options`.
    pub fn new(inner: impl Transport + 'static, options: CacheOptions) -> Self {
        Self {
            inner: Box::new(inner),
            options,
            store: Mutex::new(HashMap::new()),
        }
    }

    fn cache_key(request: &TransportRequest) -> String {
        format!("{} {}", request.method, request.url)
    }

    fn lookup(&self, key: &str) -> Option<TransportResponse> {
        let mut store = self.store.lock().expect("cache store poisoned");
        match store.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.options.ttl => {
                Some(entry.response.clone())
            }
            Some(_) => {
                store.remove(key);
                None
            }
            None => None,
        }
    }

    fn insert(&self, key: String, response: TransportResponse) {
        let mut store = self.store.lock().expect("cache store poisoned");
        if store.len() >= self.options.max_entries && !store.contains_key(&key) {
            let ttl = self.options.ttl;
            store.retain(|_, entry| entry.stored_at.elapsed() < ttl);
            if store.len() >= self.options.max_entries {
                // Still full after dropping expired entries: drop the oldest.
                if let Some(oldest) = store
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(k, _)| k.clone())
                {
                    store.remove(&oldest);
                }
            }
        }
        store.insert(
            key,
            CacheEntry {
                response,
                stored_at: Instant::now(),
            },
        );
    }
}

impl Transport for CacheAdapter {
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse>> {
        Box::pin(async move {
            if request.method != Method::GET && request.method != Method::HEAD {
                return self.inner.send(request).await;
            }

            let key = Self::cache_key(&request);
            if let Some(hit) = self.lookup(&key) {
                tracing::debug!(
                    key = %key,
                    correlation_id = %request.correlation_id,
                    "serving response from cache"
                );
                return Ok(hit);
            }

            let response = self.inner.send(request).await?;
            if response.status.is_success() {
                self.insert(key, response.clone());
            }
            Ok(response)
        })
    }
}
