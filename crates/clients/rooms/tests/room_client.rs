//! Room client tests against an in-process mock of the platform API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use spark_core::RequestContext;
use spark_oauth::{ClientCredentials, HttpTokenIssuer, TokenCache};
use spark_rooms::{RoomClient, RoomError};

#[derive(Debug, Clone, PartialEq)]
struct Recorded {
    method: &'static str,
    path: Vec<String>,
    authorization: Option<String>,
    body: Option<Value>,
}

#[derive(Clone, Default)]
struct MockPlatform {
    token_calls: Arc<AtomicUsize>,
    fail_tokens: Arc<std::sync::atomic::AtomicBool>,
    reject_first_token: Arc<std::sync::atomic::AtomicBool>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockPlatform {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn record(
        &self,
        method: &'static str,
        path: Vec<String>,
        headers: &HeaderMap,
        body: Option<Value>,
    ) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(Recorded {
            method,
            path,
            authorization,
            body,
        });
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if self.reject_first_token.load(Ordering::SeqCst) {
            return token == "Bearer token-2";
        }
        token.starts_with("Bearer token-")
    }
}

async fn token(State(mock): State<MockPlatform>) -> Result<Json<Value>, StatusCode> {
    if mock.fail_tokens.load(Ordering::SeqCst) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    let n = mock.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
    Ok(Json(json!({ "access_token": format!("token-{n}"), "token_type": "Bearer" })))
}

async fn send(
    State(mock): State<MockPlatform>,
    Path((room_id, event_type)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    mock.record("POST", vec![room_id, event_type], &headers, Some(body));
    if !mock.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad token" })));
    }
    (StatusCode::OK, Json(json!({ "event_id": "$new" })))
}

async fn state(
    State(mock): State<MockPlatform>,
    Path((room_id, event_type, state_key)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    mock.record("PUT", vec![room_id, event_type, state_key], &headers, Some(body));
    StatusCode::OK
}

async fn event(
    State(mock): State<MockPlatform>,
    Path((room_id, event_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    mock.record("GET", vec![room_id.clone(), event_id.clone()], &headers, None);
    match event_id.as_str() {
        "$missing" => Err(StatusCode::NOT_FOUND),
        "$slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(StatusCode::GATEWAY_TIMEOUT)
        }
        _ => Ok(Json(json!({
            "event_id": event_id,
            "room_id": room_id,
            "type": "m.room.message",
            "sender": "@alice:example.org",
            "content": { "body": "hello" },
            "origin_server_ts": 1700000000000u64,
        }))),
    }
}

async fn start(mock: MockPlatform) -> String {
    let router = Router::new()
        .route("/auth/token", post(token))
        .route("/api/rooms/{room_id}/send/{event_type}", post(send))
        .route("/api/rooms/{room_id}/state/{event_type}/{state_key}", put(state))
        .route("/api/rooms/{room_id}/event/{event_id}", get(event))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str) -> RoomClient {
    let issuer = HttpTokenIssuer::new(format!("{base}/auth"));
    let cache = Arc::new(TokenCache::new(Arc::new(issuer)));
    RoomClient::new(
        format!("{base}/api"),
        ClientCredentials::new("plugin", "secret"),
        cache,
    )
}

fn ctx() -> RequestContext {
    RequestContext::with_timeout(Duration::from_secs(10))
}

#[tokio::test]
async fn test_send_event_posts_with_bearer_token() {
    let mock = MockPlatform::default();
    let rooms = client(&start(mock.clone()).await);

    rooms
        .send_event(&ctx(), "!abc:example.org", "m.room.message", &json!({ "body": "hi" }))
        .await
        .unwrap();
    rooms
        .send_event(&ctx(), "!abc:example.org", "m.room.message", &json!({ "body": "again" }))
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0],
        Recorded {
            method: "POST",
            path: vec!["!abc:example.org".to_string(), "m.room.message".to_string()],
            authorization: Some("Bearer token-1".to_string()),
            body: Some(json!({ "body": "hi" })),
        }
    );
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer token-1"));

    // The second call reused the cached token.
    assert_eq!(mock.token_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_update_state_puts_state_key() {
    let mock = MockPlatform::default();
    let rooms = client(&start(mock.clone()).await);

    rooms
        .update_state(
            &ctx(),
            "!abc:example.org",
            "com.example.badge",
            "user/1",
            &json!({ "count": 3 }),
        )
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(
        requests[0].path,
        vec!["!abc:example.org", "com.example.badge", "user/1"]
    );
    assert_eq!(requests[0].body, Some(json!({ "count": 3 })));
}

#[tokio::test]
async fn test_get_event_returns_parsed_body() {
    let mock = MockPlatform::default();
    let rooms = client(&start(mock.clone()).await);

    let event = rooms.get_event(&ctx(), "!abc:example.org", "$e1").await.unwrap();
    assert_eq!(event.event_id.as_deref(), Some("$e1"));
    assert_eq!(event.event_type.as_deref(), Some("m.room.message"));
    assert_eq!(event.sender.as_deref(), Some("@alice:example.org"));
    assert_eq!(event.content, json!({ "body": "hello" }));
    assert_eq!(event.extra["origin_server_ts"], json!(1700000000000u64));
}

#[tokio::test]
async fn test_error_status_is_surfaced() {
    let mock = MockPlatform::default();
    let rooms = client(&start(mock.clone()).await);

    let err = rooms
        .get_event(&ctx(), "!abc:example.org", "$missing")
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_token_failure_is_auth_error() {
    let mock = MockPlatform::default();
    mock.fail_tokens.store(true, Ordering::SeqCst);
    let rooms = client(&start(mock.clone()).await);

    let err = rooms
        .send_event(&ctx(), "!abc:example.org", "m.room.message", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::Auth(_)));
    assert!(mock.requests().is_empty());

    // Nothing was cached, so the next call reaches the issuer again.
    mock.fail_tokens.store(false, Ordering::SeqCst);
    rooms
        .send_event(&ctx(), "!abc:example.org", "m.room.message", &json!({}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rejected_token_is_refreshed_once() {
    let mock = MockPlatform::default();
    mock.reject_first_token.store(true, Ordering::SeqCst);
    let rooms = client(&start(mock.clone()).await);

    rooms
        .send_event(&ctx(), "!abc:example.org", "m.room.message", &json!({}))
        .await
        .unwrap();

    let auth: Vec<_> = mock
        .requests()
        .into_iter()
        .map(|r| r.authorization.unwrap_or_default())
        .collect();
    assert_eq!(auth, vec!["Bearer token-1", "Bearer token-2"]);
    assert_eq!(mock.token_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unreachable_api_is_transport_error() {
    let mock = MockPlatform::default();
    let base = start(mock.clone()).await;

    // Tokens come from the mock, room calls go to a closed port.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let closed = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let issuer = HttpTokenIssuer::new(format!("{base}/auth"));
    let rooms = RoomClient::new(
        closed,
        ClientCredentials::new("plugin", "secret"),
        Arc::new(TokenCache::new(Arc::new(issuer))),
    );

    let err = rooms
        .send_event(&ctx(), "!abc:example.org", "m.room.message", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_stalled_call_respects_request_deadline() {
    let mock = MockPlatform::default();
    let rooms = client(&start(mock.clone()).await);

    let ctx = RequestContext::with_timeout(Duration::from_millis(200));
    let err = rooms
        .get_event(&ctx, "!abc:example.org", "$slow")
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::DeadlineExceeded));
}
