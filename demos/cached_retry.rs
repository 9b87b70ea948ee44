//! Example composing the caching and retry adapters with token injection.
//!
//! This example shows how to:
//! - Enable the cache adapter so repeated GETs skip the network
//! - Enable the retry adapter with exponential backoff
//! - Inject a bearer token from an async resolver
//! - Route the facade's structured log events into a custom sink
//!
//! Run with: `cargo run --example cached_retry`

use courier::{
    CacheOptions, CallOptions, Error, Facade, LogEvent, RetryOptions, RetryStrategy, TokenError,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("courier=debug,cached_retry=info")
        .init();

    let client = Facade::builder()
        .token_resolver(|| async {
            // A real resolver would hit a token endpoint or a vault here.
            Ok::<_, TokenError>("demo-token".to_string())
        })
        .enable_cache(CacheOptions {
            ttl: Duration::from_secs(30),
            max_entries: 256,
        })
        .enable_retry(RetryOptions {
            strategy: RetryStrategy::ExponentialBackoff {
                initial_delay: Duration::from_millis(100),
                max_delay: Duration::from_secs(5),
                max_retries: 3,
                jitter: true,
            },
            ..Default::default()
        })
        .log_sink(|event: &LogEvent| {
            println!(
                "[{}] {} {:?} {:?}",
                event.correlation_id,
                event.title,
                event.method,
                event.url.as_deref().or(event.error.as_deref())
            );
        })
        .timeout(Duration::from_secs(10))
        .build()?;

    println!("=== First GET (goes to the network) ===");
    let first = client
        .get::<serde_json::Value>(
            "https://jsonplaceholder.typicode.com/todos/1",
            CallOptions::new(),
        )
        .await?;
    println!("status={} latency={:?}", first.status, first.latency);

    println!("=== Second GET (served from cache) ===");
    let second = client
        .get::<serde_json::Value>(
            "https://jsonplaceholder.typicode.com/todos/1",
            CallOptions::new(),
        )
        .await?;
    println!("status={} latency={:?}", second.status, second.latency);

    Ok(())
}
