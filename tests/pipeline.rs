//! End-to-end tests against in-process sign-in and GraphQL endpoints

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

use profile_insight::{
    basic_credentials, load_profile, AuthClient, LoginError, MemorySlot, ProfileMetrics,
    ProfileOutcome, QueryClient, QueryError, Redirect, SessionGuard, SessionState,
};

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
struct Endpoints {
    token: String,
    hits: Arc<AtomicUsize>,
}

fn token_expiring_at(exp: i64) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(json!({ "exp": exp, "sub": "4242" }).to_string())
    )
}

fn fresh_token() -> String {
    token_expiring_at(chrono::Utc::now().timestamp() + 3600)
}

async fn signin(State(state): State<Endpoints>, headers: HeaderMap) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(basic_credentials("alice", "correct horse").as_str());
    let json_body = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        == Some("application/json");

    if authorized && json_body {
        // The platform answers with a JSON string literal
        (StatusCode::OK, format!("\"{}\"", state.token))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            "User does not exist or password incorrect".to_string(),
        )
    }
}

async fn broken_signin(State(state): State<Endpoints>) -> StatusCode {
    state.hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn graphql(
    State(state): State<Endpoints>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let bearer = format!("Bearer {}", state.token);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(bearer.as_str());
    let has_query = body["query"]
        .as_str()
        .is_some_and(|q| q.contains("transaction_aggregate"));

    if !authorized || !has_query {
        return Json(json!({
            "errors": [{ "message": "Could not verify JWT: JWSInvalidSignature" }]
        }));
    }

    Json(json!({
        "data": {
            "user": [{
                "auditRatio": 1.26,
                "email": "alice@example.com",
                "firstName": "Alice",
                "lastName": "Liddell",
                "login": "alice",
                "totalDown": 500000,
                "totalUp": 630000
            }],
            "audit": [
                { "auditorLogin": "bob", "closureType": "succeeded", "result": { "path": "/bahrain/bh-module/ascii-art" } },
                { "auditorLogin": "carol", "closureType": "succeeded", "result": { "path": "/bahrain/bh-module/ascii-art" } },
                { "auditorLogin": "dave", "closureType": "failed", "result": { "path": "/bahrain/bh-module/go-reloaded" } },
                { "auditorLogin": "alice", "closureType": "failed", "result": { "path": "/bahrain/bh-module/net-cat" } },
                { "auditorLogin": "erin", "closureType": "expired", "result": { "path": "/bahrain/bh-module/lem-in" } },
                { "auditorLogin": "frank", "closureType": "succeeded", "result": null }
            ],
            "event_user": [
                { "level": 9, "userId": 2, "userLogin": "bob", "eventId": 72 },
                { "level": 14, "userId": 1, "userLogin": "alice", "eventId": 72 }
            ],
            "transaction": [
                { "amount": 9000, "path": "/bahrain/bh-module/go-reloaded", "type": "xp", "userLogin": "alice", "eventId": 72 },
                { "amount": 24500, "path": "/bahrain/bh-module/ascii-art", "type": "xp", "userLogin": "alice", "eventId": 72 },
                { "amount": 1000, "path": "/bahrain/bh-module/go-reloaded", "type": "xp", "userLogin": "alice", "eventId": 72 },
                { "amount": 70000, "path": "/bahrain/bh-module/ascii-art", "type": "up", "userLogin": "alice", "eventId": 72 }
            ],
            "transaction_aggregate": { "aggregate": { "sum": { "amount": 612500 } } }
        }
    }))
}

async fn spawn_endpoints(token: String) -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let state = Endpoints {
        token,
        hits: hits.clone(),
    };
    let app = Router::new()
        .route("/api/auth/signin", post(signin))
        .route("/api/auth/broken", post(broken_signin))
        .route("/v1/graphql", post(graphql))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, hits)
}

#[tokio::test]
async fn test_login_then_profile() {
    let token = fresh_token();
    let (addr, _) = spawn_endpoints(token.clone()).await;
    let auth = AuthClient::new(&format!("http://{}/api/auth/signin", addr), TIMEOUT);
    let query = QueryClient::new(&format!("http://{}/v1/graphql", addr), TIMEOUT);
    let guard = SessionGuard::new(MemorySlot::new());

    assert_eq!(guard.login_entry(chrono::Utc::now().timestamp()).unwrap(), None);

    let issued = assert_ok!(auth.login(&guard, "alice", "correct horse").await);
    assert_eq!(issued.as_str(), token);
    let raw = assert_ok!(auth.request_token("alice", "correct horse").await);
    assert_eq!(raw.as_str(), format!("\"{}\"", token));

    let now = chrono::Utc::now().timestamp();
    assert_eq!(guard.login_entry(now).unwrap(), Some(Redirect::Profile));

    let session = match guard.require_valid_session(now).unwrap() {
        SessionState::Active(session) => session,
        other => panic!("expected an active session, got {:?}", other),
    };
    assert_eq!(session.as_str(), token);

    let data = assert_ok!(query.fetch_profile(&session).await);
    let metrics = ProfileMetrics::from_profile(&data);

    assert_eq!(metrics.user.as_ref().unwrap().login, "alice");
    assert_eq!(metrics.audits.pass_count, 1);
    assert_eq!(metrics.audits.fail_count, 1);
    assert_eq!(metrics.level.to_string(), "14");
    let ranked: Vec<(&str, f64)> = metrics
        .projects
        .iter()
        .map(|p| (p.project.as_str(), p.amount))
        .collect();
    assert_eq!(ranked, vec![("ascii-art", 24500.0), ("go-reloaded", 10000.0)]);
    assert_eq!(metrics.total_xp_kb, 613);
    assert!(metrics.milestone_reached);
}

#[tokio::test]
async fn test_wrong_password_and_server_error_look_the_same() {
    let (addr, hits) = spawn_endpoints(fresh_token()).await;
    let guard = SessionGuard::new(MemorySlot::new());

    let unauthorized = AuthClient::new(&format!("http://{}/api/auth/signin", addr), TIMEOUT);
    let err = assert_err!(unauthorized.login(&guard, "alice", "wrong").await);
    assert!(matches!(err, LoginError::InvalidCredentials));

    let broken = AuthClient::new(&format!("http://{}/api/auth/broken", addr), TIMEOUT);
    let err = assert_err!(broken.login(&guard, "alice", "correct horse").await);
    assert!(matches!(err, LoginError::InvalidCredentials));

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(guard.current_token().unwrap(), None);
}

#[tokio::test]
async fn test_empty_credentials_never_reach_the_server() {
    let (addr, hits) = spawn_endpoints(fresh_token()).await;
    let auth = AuthClient::new(&format!("http://{}/api/auth/signin", addr), TIMEOUT);
    let guard = SessionGuard::new(MemorySlot::new());

    let err = assert_err!(auth.login(&guard, "", "correct horse").await);
    assert!(matches!(err, LoginError::EmptyIdentifier));
    let err = assert_err!(auth.login(&guard, "alice", "").await);
    assert!(matches!(err, LoginError::EmptyPassword));

    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_query_errors_are_reported() {
    let (addr, _) = spawn_endpoints(fresh_token()).await;
    let query = QueryClient::new(&format!("http://{}/v1/graphql", addr), TIMEOUT);

    let stranger = profile_insight::SessionToken::new(fresh_token() + "x");
    let err = assert_err!(query.fetch_profile(&stranger).await);
    match err {
        QueryError::Rejected(messages) => {
            assert_eq!(messages, vec!["Could not verify JWT: JWSInvalidSignature"]);
        }
        other => panic!("expected a rejected query, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_query_response() {
    let (addr, _) = spawn_endpoints(fresh_token()).await;
    // The sign-in route answers 401 with a plain-text body
    let query = QueryClient::new(&format!("http://{}/api/auth/signin", addr), TIMEOUT);

    let err = assert_err!(query.fetch_profile(&profile_insight::SessionToken::new("a.b.c")).await);
    assert!(matches!(err, QueryError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_expired_session_redirects_and_clears() {
    let expired = token_expiring_at(chrono::Utc::now().timestamp() - 60);
    let guard = SessionGuard::new(MemorySlot::with_value(format!("\"{}\"", expired)));

    let now = chrono::Utc::now().timestamp();
    assert_eq!(guard.login_entry(now).unwrap(), None);
    assert_eq!(
        guard.require_valid_session(now).unwrap(),
        SessionState::Redirect(Redirect::Login)
    );
    assert_eq!(guard.current_token().unwrap(), None);
}

#[tokio::test]
async fn test_profile_flow_gates_before_querying() {
    let (addr, hits) = spawn_endpoints(fresh_token()).await;
    let query = QueryClient::new(&format!("http://{}/v1/graphql", addr), TIMEOUT);
    let now = chrono::Utc::now().timestamp();

    let expired = SessionGuard::new(MemorySlot::with_value(token_expiring_at(now - 1)));
    let outcome = assert_ok!(load_profile(&expired, &query, now).await);
    assert!(matches!(outcome, ProfileOutcome::Redirect(Redirect::Login)));
    assert_eq!(expired.current_token().unwrap(), None);

    let malformed = SessionGuard::new(MemorySlot::with_value("\"not-a-token\""));
    let outcome = assert_ok!(load_profile(&malformed, &query, now).await);
    assert!(matches!(outcome, ProfileOutcome::Redirect(Redirect::Login)));
    assert_eq!(malformed.current_token().unwrap(), None);

    let empty = SessionGuard::new(MemorySlot::new());
    let outcome = assert_ok!(load_profile(&empty, &query, now).await);
    assert!(matches!(outcome, ProfileOutcome::Redirect(Redirect::Login)));

    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_profile_flow_rejected_query_is_unavailable() {
    let (addr, hits) = spawn_endpoints(fresh_token()).await;
    let query = QueryClient::new(&format!("http://{}/v1/graphql", addr), TIMEOUT);
    // Locally valid, but not the token the endpoint issued
    let guard = SessionGuard::new(MemorySlot::with_value(fresh_token() + "x"));

    let outcome = assert_ok!(load_profile(&guard, &query, chrono::Utc::now().timestamp()).await);
    match outcome {
        ProfileOutcome::Unavailable(QueryError::Rejected(messages)) => {
            assert_eq!(messages, vec!["Could not verify JWT: JWSInvalidSignature"]);
        }
        other => panic!("expected unavailable profile data, got {:?}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    // The server's verdict does not clear the slot
    assert!(guard.current_token().unwrap().is_some());
}

#[tokio::test]
async fn test_profile_flow_loads_metrics() {
    let token = fresh_token();
    let (addr, hits) = spawn_endpoints(token.clone()).await;
    let query = QueryClient::new(&format!("http://{}/v1/graphql", addr), TIMEOUT);
    let guard = SessionGuard::new(MemorySlot::with_value(format!("\"{}\"", token)));

    let outcome = assert_ok!(load_profile(&guard, &query, chrono::Utc::now().timestamp()).await);
    let metrics = match outcome {
        ProfileOutcome::Loaded(metrics) => metrics,
        other => panic!("expected loaded metrics, got {:?}", other),
    };
    assert_eq!(metrics.level.to_string(), "14");
    assert_eq!(metrics.total_xp_kb, 613);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
