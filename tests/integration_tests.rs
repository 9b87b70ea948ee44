//! Integration tests using wiremock to simulate HTTP servers.

use courier::{
    CacheOptions, CallOptions, Error, Facade, LogEvent, RetryOptions, RetryStrategy, TokenError,
    Transport, TransportRequest, TransportResponse,
};
use courier::transport::BoxFuture;
use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestData {
    a: u32,
}

fn url(server: &MockServer, p: &str) -> String {
    format!("{}{}", server.uri(), p)
}

#[tokio::test]
async fn successful_get_returns_parsed_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&TestData { a: 1 }))
        .mount(&mock_server)
        .await;

    let client = Facade::builder().build().unwrap();

    let response = client
        .get::<TestData>(url(&mock_server, "/x"), CallOptions::new())
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 200);
    assert_eq!(response.data, TestData { a: 1 });
    assert!(response.raw_body.contains("\"a\":1"));
}

#[tokio::test]
async fn resolver_token_reaches_the_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/secure"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&TestData { a: 1 }))
        .expect(1)
        .mount(&mock_server)
        .await;

    let resolver_calls = Arc::new(AtomicUsize::new(0));
    let calls = resolver_calls.clone();
    let client = Facade::builder()
        .token_resolver(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, TokenError>("tok-123".to_string()) }
        })
        .build()
        .unwrap();

    let response = client
        .get::<TestData>(url(&mock_server, "/secure"), CallOptions::new())
        .await
        .unwrap();

    assert_eq!(response.data.a, 1);
    assert_eq!(resolver_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn conflicting_authorization_fails_before_the_network() {
    let mock_server = MockServer::start().await;

    // Any request reaching the server fails the test via expect(0).
    Mock::given(method("POST"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let resolver_calls = Arc::new(AtomicUsize::new(0));
    let calls = resolver_calls.clone();
    let client = Facade::builder()
        .token_resolver(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, TokenError>("tok".to_string()) }
        })
        .build()
        .unwrap();

    let options = CallOptions::new()
        .header("Authorization", "Bearer z")
        .unwrap();
    let result = client
        .post::<_, TestData>(url(&mock_server, "/x"), &serde_json::json!({"y": 2}), options)
        .await;

    assert!(matches!(result, Err(Error::AuthorizationConflict)));
    assert_eq!(resolver_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn without_a_resolver_caller_authorization_passes_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .and(header("authorization", "Bearer caller"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&TestData { a: 1 }))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Facade::builder().build().unwrap();

    let options = CallOptions::new()
        .header("Authorization", "Bearer caller")
        .unwrap();
    let response = client
        .get::<TestData>(url(&mock_server, "/x"), options)
        .await
        .unwrap();

    assert_eq!(response.data.a, 1);
}

#[tokio::test]
async fn post_sends_the_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/x"))
        .and(body_json(serde_json::json!({"y": 2})))
        .respond_with(ResponseTemplate::new(201).set_body_json(&TestData { a: 2 }))
        .mount(&mock_server)
        .await;

    let client = Facade::builder().build().unwrap();

    let response = client
        .post::<_, TestData>(
            url(&mock_server, "/x"),
            &serde_json::json!({"y": 2}),
            CallOptions::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 201);
    assert_eq!(response.data.a, 2);
}

#[tokio::test]
async fn http_error_preserves_message_and_parts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&mock_server)
        .await;

    let client = Facade::builder().build().unwrap();

    let err = client
        .get::<TestData>(url(&mock_server, "/x"), CallOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP error 404 Not Found: Not found");
    let parts = err.response_parts().unwrap();
    assert_eq!(parts.status.as_u16(), 404);
    assert_eq!(parts.status_text, "Not Found");
    assert_eq!(parts.body, "Not found");
}

#[tokio::test]
async fn deserialization_failure_keeps_the_raw_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&mock_server)
        .await;

    let client = Facade::builder().build().unwrap();

    let err = client
        .get::<TestData>(url(&mock_server, "/x"), CallOptions::new())
        .await
        .unwrap_err();

    match err {
        Error::Deserialization {
            raw_response,
            status,
            ..
        } => {
            assert_eq!(status.as_u16(), 200);
            assert_eq!(raw_response, "invalid json");
        }
        other => panic!("expected Deserialization, got {:?}", other),
    }
}

#[tokio::test]
async fn cached_get_hits_the_server_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&TestData { a: 1 }))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Facade::builder()
        .enable_cache(CacheOptions::default())
        .build()
        .unwrap();

    let target = url(&mock_server, "/x");
    let first = client
        .get::<TestData>(&target, CallOptions::new())
        .await
        .unwrap();
    let second = client
        .get::<TestData>(&target, CallOptions::new())
        .await
        .unwrap();

    assert_eq!(first.data, second.data);
}

#[tokio::test]
async fn transient_failures_are_retried_to_success() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    // First two requests fail with 500, third succeeds.
    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(move |_req: &wiremock::Request| {
            let count = attempt_count_clone.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                ResponseTemplate::new(500).set_body_string("Server error")
            } else {
                ResponseTemplate::new(200).set_body_json(&TestData { a: 1 })
            }
        })
        .mount(&mock_server)
        .await;

    let client = Facade::builder()
        .enable_retry(RetryOptions {
            strategy: RetryStrategy::Linear {
                delay: Duration::from_millis(10),
                max_retries: 3,
            },
            ..Default::default()
        })
        .build()
        .unwrap();

    let response = client
        .get::<TestData>(url(&mock_server, "/x"), CallOptions::new())
        .await
        .unwrap();

    assert_eq!(response.data.a, 1);
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
}

struct CountingStub {
    calls: Arc<AtomicUsize>,
    result: fn() -> Result<TransportResponse, Error>,
}

impl Transport for CountingStub {
    fn send(
        &self,
        _request: TransportRequest,
    ) -> BoxFuture<'_, Result<TransportResponse, Error>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = (self.result)();
        Box::pin(async move { result })
    }
}

#[tokio::test]
async fn prebuilt_transport_is_used_verbatim_without_adapters() {
    // A caller-supplied transport disables cache/retry composition entirely.
    let get_calls = Arc::new(AtomicUsize::new(0));
    let client = Facade::builder()
        .transport(CountingStub {
            calls: get_calls.clone(),
            result: || {
                Ok(TransportResponse {
                    status: StatusCode::OK,
                    headers: HeaderMap::new(),
                    body: r#"{"a":1}"#.to_string(),
                })
            },
        })
        .enable_cache(CacheOptions::default())
        .enable_retry(RetryOptions::default())
        .build()
        .unwrap();

    // Cache not applied: the same idempotent GET reaches the transport twice.
    let target = "https://api.example/x";
    let _ = client
        .get::<TestData>(target, CallOptions::new())
        .await
        .unwrap();
    let _ = client
        .get::<TestData>(target, CallOptions::new())
        .await
        .unwrap();
    assert_eq!(get_calls.load(Ordering::SeqCst), 2);

    // Retry not applied: a retryable 500 produces exactly one attempt.
    let fail_calls = Arc::new(AtomicUsize::new(0));
    let failing = Facade::builder()
        .transport(CountingStub {
            calls: fail_calls.clone(),
            result: || {
                Err(Error::status(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server error".to_string(),
                ))
            },
        })
        .enable_retry(RetryOptions::default())
        .build()
        .unwrap();

    let err = failing
        .get::<TestData>(target, CallOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(fail_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn retry_wraps_cache_so_recovered_responses_are_cached() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    // First attempt fails with 500; the retry succeeds and the cache keeps
    // the recovered response for the second call.
    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(move |_req: &wiremock::Request| {
            let count = attempt_count_clone.fetch_add(1, Ordering::SeqCst);
            if count == 0 {
                ResponseTemplate::new(500).set_body_string("Server error")
            } else {
                ResponseTemplate::new(200).set_body_json(&TestData { a: 1 })
            }
        })
        .mount(&mock_server)
        .await;

    let client = Facade::builder()
        .enable_cache(CacheOptions::default())
        .enable_retry(RetryOptions {
            strategy: RetryStrategy::Linear {
                delay: Duration::from_millis(10),
                max_retries: 3,
            },
            ..Default::default()
        })
        .build()
        .unwrap();

    let target = url(&mock_server, "/x");
    let first = client
        .get::<TestData>(&target, CallOptions::new())
        .await
        .unwrap();
    assert_eq!(first.data.a, 1);
    assert_eq!(attempt_count.load(Ordering::SeqCst), 2);

    let second = client
        .get::<TestData>(&target, CallOptions::new())
        .await
        .unwrap();
    assert_eq!(second.data.a, 1);
    // No new server hit: the cached response answered the retry-wrapped call.
    assert_eq!(attempt_count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn exhausted_retries_surface_the_underlying_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server error"))
        .mount(&mock_server)
        .await;

    let client = Facade::builder()
        .enable_retry(RetryOptions {
            strategy: RetryStrategy::Linear {
                delay: Duration::from_millis(10),
                max_retries: 2,
            },
            ..Default::default()
        })
        .build()
        .unwrap();

    let err = client
        .get::<TestData>(url(&mock_server, "/x"), CallOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.status_code().map(|s| s.as_u16()), Some(500));
    assert_eq!(err.to_string(), "HTTP error 500 Internal Server Error: Server error");
}

#[tokio::test]
async fn bodyless_responses_parse_into_unit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = Facade::builder().build().unwrap();

    let response = client
        .delete::<()>(url(&mock_server, "/x"), CallOptions::new())
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 204);
}

#[tokio::test]
async fn all_verbs_reach_their_handlers() {
    let mock_server = MockServer::start().await;
    let body = TestData { a: 1 };

    for verb in ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"] {
        Mock::given(method(verb))
            .and(path("/x"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("HEAD"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = Facade::builder().build().unwrap();
    let target = url(&mock_server, "/x");

    let _ = client
        .get::<TestData>(&target, CallOptions::new())
        .await
        .unwrap();
    let _ = client
        .post::<_, TestData>(&target, &body, CallOptions::new())
        .await
        .unwrap();
    let _ = client
        .put::<_, TestData>(&target, &body, CallOptions::new())
        .await
        .unwrap();
    let _ = client
        .patch::<_, TestData>(&target, &body, CallOptions::new())
        .await
        .unwrap();
    let _ = client
        .delete::<TestData>(&target, CallOptions::new())
        .await
        .unwrap();
    let _ = client
        .head::<()>(&target, CallOptions::new())
        .await
        .unwrap();
    let _ = client
        .options::<TestData>(&target, CallOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn query_parameters_are_appended() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .and(wiremock::matchers::query_param("page", "1"))
        .and(wiremock::matchers::query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&TestData { a: 1 }))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Facade::builder().build().unwrap();

    let options = CallOptions::new()
        .query_param("page", "1")
        .query_param("limit", "10");
    let response = client
        .get::<TestData>(url(&mock_server, "/x"), options)
        .await
        .unwrap();

    assert_eq!(response.data.a, 1);
}

#[tokio::test]
async fn failure_log_events_pair_up_with_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&mock_server)
        .await;

    let events: Arc<Mutex<Vec<LogEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink_events = events.clone();
    let client = Facade::builder()
        .log_sink(move |event: &LogEvent| sink_events.lock().unwrap().push(event.clone()))
        .build()
        .unwrap();

    let _ = client
        .get::<TestData>(url(&mock_server, "/x"), CallOptions::new())
        .await
        .unwrap_err();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].title, "HTTP Request");
    assert_eq!(events[1].title, "HTTP Response Error");
    assert_eq!(events[0].correlation_id, events[1].correlation_id);
}

#[tokio::test]
async fn default_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .and(header("user-agent", "test-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&TestData { a: 1 }))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Facade::builder()
        .default_header("User-Agent", "test-agent")
        .unwrap()
        .build()
        .unwrap();

    let _ = client
        .get::<TestData>(url(&mock_server, "/x"), CallOptions::new())
        .await
        .unwrap();
}
