//! Header resolution with optional bearer-token injection.
//!
//! The contract is deliberately strict: when a token resolver is configured
//! and the caller also supplies an `Authorization` header, the call fails
//! before the resolver runs and before any network activity. Ambiguous
//! precedence is rejected, not silently resolved.

use std::future::Future;

use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};

use crate::transport::BoxFuture;
use crate::{Error, Result};

/// Errors a token resolver may fail with.
pub type TokenError = Box<dyn std::error::Error + Send + Sync>;

/// A caller-supplied source of bearer tokens.
///
/// Invoked at most once per outgoing call, with no retry and no timeout
/// imposed by this layer. Closures returning futures implement it directly:
///
/// ```
/// use courier::{Facade, TokenError};
///
/// # fn example() -> Result<(), courier::Error> {
/// let client = Facade::builder()
///     .token_resolver(|| async { Ok::<_, TokenError>("secret-token".to_string()) })
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub trait TokenResolver: Send + Sync {
    /// Produces a bearer token for one outgoing call.
    fn resolve_token(&self) -> BoxFuture<'_, std::result::Result<String, TokenError>>;
}

impl<F, Fut> TokenResolver for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<String, TokenError>> + Send + 'static,
{
    fn resolve_token(&self) -> BoxFuture<'_, std::result::Result<String, TokenError>> {
        Box::pin(self())
    }
}

/// Merges an optional resolved bearer token into the caller's headers.
///
/// With no resolver configured the input is returned unchanged, even if it
/// already contains `Authorization`. With a resolver configured, an existing
/// `Authorization` header is a configuration conflict; otherwise the resolver
/// is invoked exactly once and its token is injected as
/// `Authorization: Bearer <token>`. Performs no logging.
pub(crate) async fn resolve_headers(
    resolver: Option<&dyn TokenResolver>,
    headers: &HeaderMap,
) -> Result<HeaderMap> {
    let Some(resolver) = resolver else {
        return Ok(headers.clone());
    };

    if headers.contains_key(AUTHORIZATION) {
        return Err(Error::AuthorizationConflict);
    }

    let token = resolver
        .resolve_token()
        .await
        .map_err(|e| Error::TokenResolution(e.to_string()))?;

    let value = HeaderValue::try_from(format!("Bearer {}", token))
        .map_err(|e| Error::Configuration(format!("resolved token is not a valid header value: {}", e)))?;

    let mut resolved = headers.clone();
    resolved.insert(AUTHORIZATION, value);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingResolver {
        calls: Arc<AtomicUsize>,
        token: &'static str,
    }

    impl TokenResolver for CountingResolver {
        fn resolve_token(&self) -> BoxFuture<'_, std::result::Result<String, TokenError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let token = self.token.to_string();
            Box::pin(async move { Ok(token) })
        }
    }

    #[tokio::test]
    async fn no_resolver_returns_input_unchanged() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer caller"));
        headers.insert("x-custom", HeaderValue::from_static("1"));

        let resolved = resolve_headers(None, &headers).await.unwrap();
        assert_eq!(resolved, headers);
    }

    #[tokio::test]
    async fn resolver_injects_exactly_one_bearer_header() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = CountingResolver {
            calls: calls.clone(),
            token: "tok-123",
        };
        let mut headers = HeaderMap::new();
        headers.insert("x-custom", HeaderValue::from_static("1"));

        let resolved = resolve_headers(Some(&resolver), &headers).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolved.len(), headers.len() + 1);
        assert_eq!(
            resolved.get(AUTHORIZATION).unwrap(),
            &HeaderValue::from_static("Bearer tok-123")
        );
        assert_eq!(resolved.get("x-custom"), headers.get("x-custom"));
    }

    #[tokio::test]
    async fn existing_authorization_conflicts_without_invoking_resolver() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = CountingResolver {
            calls: calls.clone(),
            token: "tok-123",
        };
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer caller"));

        let err = resolve_headers(Some(&resolver), &headers).await.unwrap_err();
        assert!(matches!(err, Error::AuthorizationConflict));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resolver_failure_surfaces_unchanged() {
        let resolver = || async {
            Err::<String, TokenError>("vault sealed".into())
        };
        let headers = HeaderMap::new();

        let err = resolve_headers(Some(&resolver), &headers).await.unwrap_err();
        match err {
            Error::TokenResolution(message) => assert_eq!(message, "vault sealed"),
            other => panic!("expected TokenResolution, got {:?}", other),
        }
    }
}
