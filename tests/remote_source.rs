//! Remote data source tests against a local stub backend.
//!
//! Each test starts an axum server on an ephemeral port and points the
//! API client at it, so retries, status mapping and headers are observed
//! on the wire.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use codequest_rewards::api::client::IDEMPOTENCY_HEADER;
use codequest_rewards::api::{ApiClient, RemoteDataSource};
use codequest_rewards::config::{ApiConfig, RetryPolicy};
use codequest_rewards::store::FixtureStore;
use codequest_rewards::{AppError, Services};

/// Requests seen by the stub: attempt count plus the headers of each call.
#[derive(Clone, Default)]
struct Recorder {
    attempts: Arc<AtomicUsize>,
    idempotency_keys: Arc<Mutex<Vec<String>>>,
    authorization: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn record(&self, headers: &HeaderMap) -> usize {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        if let Some(key) = header(IDEMPOTENCY_HEADER) {
            self.idempotency_keys.lock().unwrap().push(key);
        }
        if let Some(auth) = header("authorization") {
            self.authorization.lock().unwrap().push(auth);
        }
        self.attempts.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn keys(&self) -> Vec<String> {
        self.idempotency_keys.lock().unwrap().clone()
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn config(base_url: String, retry: RetryPolicy) -> ApiConfig {
    ApiConfig {
        base_url: Some(base_url),
        timeout_ms: 2_000,
        retry,
        auth_token: Some("test-token".to_string()),
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        retry_delay_ms: 1,
        ..RetryPolicy::default()
    }
}

/// Fails the first two claim attempts with 503, then acknowledges.
async fn flaky_claim(State(recorder): State<Recorder>, headers: HeaderMap) -> Response {
    if recorder.record(&headers) <= 2 {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    Json(json!({ "success": true, "bugId": "bug-1", "points": 20, "xp": 15 })).into_response()
}

async fn always_unavailable(State(recorder): State<Recorder>, headers: HeaderMap) -> StatusCode {
    recorder.record(&headers);
    StatusCode::SERVICE_UNAVAILABLE
}

async fn unauthorized(State(recorder): State<Recorder>, headers: HeaderMap) -> StatusCode {
    recorder.record(&headers);
    StatusCode::UNAUTHORIZED
}

async fn bad_request(State(recorder): State<Recorder>, headers: HeaderMap) -> Response {
    recorder.record(&headers);
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": "Unknown status filter" })),
    )
        .into_response()
}

#[tokio::test]
async fn test_claim_retries_with_stable_idempotency_key() {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/merge-requests/MR-1423/bugs/bug-1/claim", post(flaky_claim))
        .with_state(recorder.clone());
    let base_url = serve(app).await;

    let client = ApiClient::new(&config(base_url, fast_retry()), Some("test-token")).unwrap();
    let services = Services::new(
        Arc::new(RemoteDataSource::new(client)),
        FixtureStore::new().unwrap(),
    );

    // The detail GET is a 404 on the stub, so the merge request comes
    // from the local fixtures while the claim itself goes to the backend.
    let result = services
        .merge_requests
        .claim_bug("MR-1423", "bug-1")
        .await
        .unwrap();
    assert_eq!(result.points, 20);
    assert_eq!(result.xp, 15);

    assert_eq!(recorder.attempts(), 3);
    let keys = recorder.keys();
    assert_eq!(keys.len(), 3);
    assert!(!keys[0].is_empty());
    assert!(keys.iter().all(|k| k == &keys[0]));
    assert!(recorder
        .authorization
        .lock()
        .unwrap()
        .iter()
        .all(|auth| auth == "Bearer test-token"));

    let mr = services
        .merge_requests
        .get_merge_request_by_id("MR-1423")
        .await
        .unwrap();
    assert_eq!(mr.bug_counts(), (1, 4));
}

#[tokio::test]
async fn test_separate_posts_use_distinct_keys() {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/rewards/redeem", post(always_unavailable))
        .with_state(recorder.clone());
    let base_url = serve(app).await;

    let client = ApiClient::new(&config(base_url, RetryPolicy::disabled()), None).unwrap();
    let body = json!({ "rewardId": "reward-12" });
    let _ = client.post::<Value, _>("/rewards/redeem", Some(&body)).await;
    let _ = client.post::<Value, _>("/rewards/redeem", Some(&body)).await;

    let keys = recorder.keys();
    assert_eq!(keys.len(), 2);
    assert_ne!(keys[0], keys[1]);
    assert!(recorder.authorization.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_status() {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/rewards/categories", get(always_unavailable))
        .with_state(recorder.clone());
    let base_url = serve(app).await;

    let retry = RetryPolicy {
        max_retries: 2,
        ..fast_retry()
    };
    let client = ApiClient::new(&config(base_url, retry), None).unwrap();
    let err = client
        .get::<Value, ()>("/rewards/categories", None)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(503));
    assert_eq!(recorder.attempts(), 3);
    // GETs carry no idempotency key.
    assert!(recorder.keys().is_empty());
}

#[tokio::test]
async fn test_retry_disabled_makes_one_attempt() {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/rewards/categories", get(always_unavailable))
        .with_state(recorder.clone());
    let base_url = serve(app).await;

    let client = ApiClient::new(&config(base_url, RetryPolicy::disabled()), None).unwrap();
    let err = client
        .get::<Value, ()>("/rewards/categories", None)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(503));
    assert_eq!(recorder.attempts(), 1);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/merge-requests", get(bad_request))
        .with_state(recorder.clone());
    let base_url = serve(app).await;

    let client = ApiClient::new(&config(base_url, fast_retry()), None).unwrap();
    let err = client
        .get::<Value, ()>("/merge-requests", None)
        .await
        .unwrap_err();

    assert_eq!(recorder.attempts(), 1);
    match err {
        AppError::Api {
            message,
            status_code,
            endpoint,
        } => {
            assert_eq!(message, "Unknown status filter");
            assert_eq!(status_code, Some(400));
            assert_eq!(endpoint.as_deref(), Some("/merge-requests"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_maps_to_expired_session() {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/users/me", get(unauthorized))
        .with_state(recorder.clone());
    let base_url = serve(app).await;

    let cfg = config(base_url, fast_retry());
    let client = ApiClient::new(&cfg, cfg.auth_token.as_deref()).unwrap();
    let services = Services::new(
        Arc::new(RemoteDataSource::new(client)),
        FixtureStore::new().unwrap(),
    );

    let err = services.user.get_current_user().await.unwrap_err();
    assert!(matches!(err, AppError::AuthenticationExpired { .. }));
    assert_eq!(recorder.attempts(), 1);
}

#[tokio::test]
async fn test_not_found_is_none() {
    let base_url = serve(Router::new()).await;

    let client = ApiClient::new(&config(base_url, fast_retry()), None).unwrap();
    let missing = client
        .get_optional::<Value, ()>("/users/me/stats", None)
        .await
        .unwrap();
    assert!(missing.is_none());

    let err = client
        .get::<Value, ()>("/users/me/stats", None)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}

#[test]
fn test_missing_base_url_is_configuration_error() {
    let err = ApiClient::new(&ApiConfig::default(), None).unwrap_err();
    assert!(matches!(err, AppError::Configuration { .. }));
}
