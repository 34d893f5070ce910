//! Authorized request client and auth flow tests against an in-process mock
//! API server bound to an ephemeral localhost port.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::task::JoinHandle;

use bazaar::api::{self, ApiClient, NETWORK_ERROR_MSG};
use bazaar::session::{CredentialStore, Identity, SessionController, SessionState};

const BOOTSTRAP_ADMIN: &str = "admin@example.com";

fn identity(email: &str) -> Identity {
    serde_json::from_value(json!({"id": 1, "email": email, "role": "user"})).unwrap()
}

// Ensure the server task dies with the test no matter how it exits.
struct ServerGuard(JoinHandle<()>);
impl Drop for ServerGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn start_server(app: Router) -> (String, ServerGuard) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind 127.0.0.1:0");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("mock api server error: {e:?}");
        }
    });
    (format!("http://{addr}"), ServerGuard(handle))
}

fn client_in(tmp: &TempDir, base: Option<&str>) -> ApiClient {
    ApiClient::new(base, CredentialStore::new(tmp.path()))
}

#[tokio::test]
async fn missing_token_sends_no_auth_header_and_401_maps_to_uniform_failure() {
    async fn posts(headers: HeaderMap) -> (StatusCode, Json<Value>) {
        assert!(headers.get("authorization").is_none(), "no token stored, no header expected");
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"})))
    }
    let (base, _guard) = start_server(Router::new().route("/api/posts", get(posts))).await;

    let tmp = tempfile::tempdir().unwrap();
    let resp = client_in(&tmp, Some(&base)).get("/api/posts").await;
    assert!(!resp.success);
    assert!(resp.data.is_none());
    assert_eq!(resp.error.as_deref(), Some("unauthorized"));
}

#[tokio::test]
async fn stored_token_is_attached_as_bearer_on_every_verb() {
    async fn echo_auth(headers: HeaderMap) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        Json(json!({"auth": auth}))
    }
    let app = Router::new()
        .route("/api/echo", get(echo_auth).post(echo_auth).put(echo_auth).delete(echo_auth));
    let (base, _guard) = start_server(app).await;

    let tmp = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(tmp.path());
    store.write("abc", &identity("a@b.com")).unwrap();
    let client = ApiClient::new(Some(&base), store.clone());

    for resp in [
        client.get("/api/echo").await,
        client.post("/api/echo", &json!({"k": 1})).await,
        client.put("/api/echo", &json!({"k": 2})).await,
        client.delete("/api/echo").await,
    ] {
        assert!(resp.success);
        let auth = resp.data.unwrap()["auth"].as_str().unwrap().to_string();
        assert_eq!(auth, "Bearer abc");
    }

    // token is read per call: after a clear the very next request is anonymous
    store.clear().unwrap();
    let resp = client.get("/api/echo").await;
    assert_eq!(resp.data.unwrap()["auth"].as_str(), Some(""));
}

#[tokio::test]
async fn success_returns_parsed_body() {
    async fn listing() -> Json<Value> {
        Json(json!({"posts": [{"id": 1, "title": "bike"}]}))
    }
    let (base, _guard) = start_server(Router::new().route("/api/posts", get(listing))).await;

    let tmp = tempfile::tempdir().unwrap();
    let resp = client_in(&tmp, Some(&base)).get("/api/posts").await;
    assert!(resp.success);
    assert!(resp.error.is_none());
    assert_eq!(resp.data.unwrap()["posts"][0]["title"].as_str(), Some("bike"));
}

#[tokio::test]
async fn failure_without_server_message_gets_generic_error() {
    async fn boom() -> (StatusCode, Json<Value>) {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "not the error field"})))
    }
    let (base, _guard) = start_server(Router::new().route("/api/posts", get(boom))).await;

    let tmp = tempfile::tempdir().unwrap();
    let resp = client_in(&tmp, Some(&base)).get("/api/posts").await;
    assert!(!resp.success);
    assert_eq!(resp.error.as_deref(), Some("Request failed with status 500"));
}

#[tokio::test]
async fn transport_failure_maps_to_generic_network_error() {
    // Reserve a port, then close it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let tmp = tempfile::tempdir().unwrap();
    let resp = client_in(&tmp, Some(&base)).get("/api/posts").await;
    assert!(!resp.success);
    assert_eq!(resp.error.as_deref(), Some(NETWORK_ERROR_MSG));
}

#[tokio::test]
async fn missing_base_url_fails_the_request_not_the_constructor() {
    let tmp = tempfile::tempdir().unwrap();
    let client = client_in(&tmp, None);
    let resp = client.get("/api/posts").await;
    assert!(!resp.success);
    assert_eq!(resp.error.as_deref(), Some("API base URL is not configured"));

    let invalid = client_in(&tmp, Some("not a url"));
    let resp = invalid.get("/api/posts").await;
    assert!(!resp.success);
}

#[tokio::test]
async fn login_flow_commits_token_and_identity() {
    async fn login_ok(Json(body): Json<Value>) -> Json<Value> {
        assert_eq!(body["email"].as_str(), Some("a@b.com"));
        Json(json!({
            "token": "tok-login",
            "user": {"id": 1, "email": "a@b.com", "full_name": "Ada", "role": "user"}
        }))
    }
    let (base, _guard) = start_server(Router::new().route(api::LOGIN_PATH, post(login_ok))).await;

    let tmp = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(tmp.path());
    let controller = SessionController::new(store.clone(), BOOTSTRAP_ADMIN);
    controller.init();
    let client = ApiClient::new(Some(&base), store.clone());

    let resp = api::login(&client, &controller, "a@b.com", "pw").await;
    assert!(resp.success);
    assert!(controller.is_authenticated());
    assert_eq!(controller.display_name(), "Ada");
    let (token, _) = store.read().unwrap().expect("session persisted");
    assert_eq!(token, "tok-login");
}

#[tokio::test]
async fn login_failure_surfaces_server_message_and_leaves_session_alone() {
    async fn login_bad() -> (StatusCode, Json<Value>) {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid email or password"})))
    }
    let (base, _guard) = start_server(Router::new().route(api::LOGIN_PATH, post(login_bad))).await;

    let tmp = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(tmp.path());
    let controller = SessionController::new(store.clone(), BOOTSTRAP_ADMIN);
    controller.init();
    let client = ApiClient::new(Some(&base), store);

    let resp = api::login(&client, &controller, "a@b.com", "wrong").await;
    assert!(!resp.success);
    assert_eq!(resp.error.as_deref(), Some("Invalid email or password"));
    assert_eq!(controller.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn register_performs_follow_up_login() {
    // Registration answers with a token of its own; the committed session
    // must come from the follow-up login call instead.
    async fn register_ok() -> Json<Value> {
        Json(json!({"token": "tok-register", "user": {"id": 9, "email": "new@b.com", "role": "user"}}))
    }
    async fn login_ok() -> Json<Value> {
        Json(json!({"token": "tok-login", "user": {"id": 9, "email": "new@b.com", "role": "user"}}))
    }
    let app = Router::new()
        .route(api::REGISTER_PATH, post(register_ok))
        .route(api::LOGIN_PATH, post(login_ok));
    let (base, _guard) = start_server(app).await;

    let tmp = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(tmp.path());
    let controller = SessionController::new(store.clone(), BOOTSTRAP_ADMIN);
    controller.init();
    let client = ApiClient::new(Some(&base), store.clone());

    let resp = api::register(&client, &controller, "new@b.com", "pw").await;
    assert!(resp.success);
    let (token, _) = store.read().unwrap().expect("session persisted");
    assert_eq!(token, "tok-login");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sign_out_never_waits_for_a_hanging_remote() {
    #[derive(Clone, Default)]
    struct Hits(Arc<Mutex<u32>>);

    async fn hang(State(hits): State<Hits>) -> Json<Value> {
        *hits.0.lock() += 1;
        // never answers
        std::future::pending::<()>().await;
        Json(json!({}))
    }
    let hits = Hits::default();
    let app = Router::new().route(api::SIGNOUT_PATH, post(hang)).with_state(hits.clone());
    let (base, _guard) = start_server(app).await;

    let tmp = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(tmp.path());
    let controller = SessionController::new(store.clone(), BOOTSTRAP_ADMIN);
    controller.init();
    controller.login_commit("abc", identity("a@b.com"));
    let client = ApiClient::new(Some(&base), store.clone());

    api::sign_out(&client, &controller);

    // local logout completed without waiting on the remote call
    assert_eq!(controller.state(), SessionState::Unauthenticated);
    assert!(store.read().unwrap().is_none());

    // give the detached request a moment to reach the server; it hanging
    // there must change nothing locally
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(*hits.0.lock(), 1);
    assert_eq!(controller.state(), SessionState::Unauthenticated);
}
