use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use core_admin::models::{
    ClientSettings, Credentials, OutputTarget, OutputType, Platform, StreamDraft,
};
use core_admin::services::{
    ApiError, BuildError, BuilderOptions, CoreClient, CredentialStore, DashboardPoller,
    DashboardState, FnSessionListener, MemoryCredentialStore, Session,
};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    query: Option<String>,
    authorization: Option<String>,
    accept: Option<String>,
    body: String,
}

/// Canned responses keyed by method and path; everything else is a 404
#[derive(Default)]
struct MockCore {
    responses: Mutex<HashMap<(String, String), (u16, String)>>,
    requests: Mutex<Vec<Recorded>>,
}

impl MockCore {
    fn respond(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.into()));
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn last(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }
}

async fn handle(
    State(mock): State<Arc<MockCore>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    mock.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_value(header::AUTHORIZATION),
        accept: header_value(header::ACCEPT),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let canned = mock
        .responses
        .lock()
        .unwrap()
        .get(&(method.to_string(), uri.path().to_string()))
        .cloned();

    match canned {
        Some((status, body)) => (
            StatusCode::from_u16(status).unwrap(),
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, r#"{"code":404,"message":"not found"}"#).into_response(),
    }
}

async fn start_mock() -> (Arc<MockCore>, String) {
    let mock = Arc::new(MockCore::default());
    let app = Router::new().fallback(handle).with_state(mock.clone());

    let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (mock, format!("http://{addr}/api"))
}

struct Harness {
    client: CoreClient,
    store: Arc<MemoryCredentialStore>,
    routes: Arc<Mutex<Vec<String>>>,
}

fn harness(base_url: &str, credentials: Credentials) -> Harness {
    let store = Arc::new(MemoryCredentialStore::with_credentials(credentials));
    let routes = Arc::new(Mutex::new(Vec::new()));

    let seen = routes.clone();
    let listener = FnSessionListener(move |route: &str| seen.lock().unwrap().push(route.to_string()));

    let settings = ClientSettings {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
        ..Default::default()
    };
    let client = CoreClient::new(&settings, Session::new(store.clone(), Arc::new(listener))).unwrap();

    Harness { client, store, routes }
}

fn full_credentials() -> Credentials {
    Credentials {
        auth_token: Some("stale-token".to_string()),
        auth_username: Some("admin".to_string()),
        auth_password: Some("secret".to_string()),
    }
}

fn restream_draft() -> StreamDraft {
    StreamDraft {
        name: "Evening Show".to_string(),
        input_url: "rtmp://src.example/live/in".to_string(),
        outputs: vec![OutputTarget::network(
            OutputType::Rtmp,
            Platform::Youtube,
            "rtmp://a.rtmp.youtube.com/live2/abcd-1234",
        )],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_notifies() {
    let (mock, base_url) = start_mock().await;
    mock.respond("GET", "/api/v3/process", 401, r#"{"code":401,"message":"unauthorized"}"#);
    let h = harness(&base_url, full_credentials());

    let err = h.client.list_processes().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert!(h.store.load().unwrap().is_empty());
    assert_eq!(h.routes.lock().unwrap().as_slice(), ["/login"]);
    assert_eq!(mock.last().authorization.as_deref(), Some("Bearer stale-token"));
}

#[tokio::test]
async fn test_unauthorized_on_mutation_also_purges() {
    let (mock, base_url) = start_mock().await;
    mock.respond("DELETE", "/api/v3/process/evening_show", 401, "");
    let h = harness(&base_url, full_credentials());

    let err = h.client.delete_process("evening_show").await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(h.store.load().unwrap(), Credentials::default());
    assert_eq!(h.routes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_anonymous_requests_carry_no_authorization() {
    let (mock, base_url) = start_mock().await;
    mock.respond("GET", "/api/v3/metrics", 200, r#"{"metrics":[]}"#);
    let h = harness(&base_url, Credentials::default());

    let metrics = h.client.metrics().await.unwrap();

    assert_eq!(metrics, json!({"metrics": []}));
    let request = mock.last();
    assert_eq!(request.authorization, None);
    assert_eq!(request.accept.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_login_stores_basic_credentials() {
    let (mock, base_url) = start_mock().await;
    mock.respond("GET", "/api/v3", 200, r#"{"app":"datarhei-core"}"#);
    mock.respond("GET", "/api/v3/process", 200, "[]");
    let h = harness(&base_url, Credentials::default());

    let about = h.client.login("admin", "secret").await.unwrap();
    assert_eq!(about["app"], "datarhei-core");

    let stored = h.store.load().unwrap();
    assert_eq!(stored.auth_username.as_deref(), Some("admin"));
    assert_eq!(stored.auth_password.as_deref(), Some("secret"));
    assert_eq!(stored.auth_token, None);

    h.client.list_processes().await.unwrap();
    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    for request in requests {
        assert_eq!(request.authorization.as_deref(), Some("Basic YWRtaW46c2VjcmV0"));
    }
}

#[tokio::test]
async fn test_basic_login_replaces_stored_token() {
    let (mock, base_url) = start_mock().await;
    mock.respond("GET", "/api/v3", 200, "{}");
    mock.respond("GET", "/api/v3/process", 200, "[]");
    let h = harness(
        &base_url,
        Credentials {
            auth_token: Some("alice-token".to_string()),
            ..Default::default()
        },
    );

    h.client.login("bob", "pw").await.unwrap();
    h.client.list_processes().await.unwrap();

    assert_eq!(mock.last().authorization.as_deref(), Some("Basic Ym9iOnB3"));
    assert_eq!(h.store.load().unwrap(), Credentials::basic("bob", "pw"));
}

#[tokio::test]
async fn test_failed_login_stores_nothing() {
    let (mock, base_url) = start_mock().await;
    mock.respond("GET", "/api/v3", 401, "");
    let h = harness(&base_url, Credentials::default());

    let err = h.client.login("admin", "wrong").await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(err.user_message(), "Invalid username or password");
    assert!(h.store.load().unwrap().is_empty());
}

#[tokio::test]
async fn test_bearer_token_takes_precedence_after_jwt_login() {
    let (mock, base_url) = start_mock().await;
    mock.respond("GET", "/api/v3", 200, "{}");
    mock.respond(
        "POST",
        "/api/v3/login",
        200,
        r#"{"access_token":"jwt-abc","refresh_token":"jwt-def"}"#,
    );
    mock.respond("GET", "/api/v3/skills", 200, r#"{"ffmpeg":{}}"#);
    let h = harness(&base_url, Credentials::default());

    h.client.login("admin", "secret").await.unwrap();
    let login = h.client.login_jwt("admin", "secret").await.unwrap();
    assert_eq!(login.refresh_token.as_deref(), Some("jwt-def"));

    let login_request = mock.last();
    let body: Value = serde_json::from_str(&login_request.body).unwrap();
    assert_eq!(body, json!({"username": "admin", "password": "secret"}));

    h.client.skills().await.unwrap();
    assert_eq!(mock.last().authorization.as_deref(), Some("Bearer jwt-abc"));
    assert_eq!(h.store.load().unwrap().auth_token.as_deref(), Some("jwt-abc"));
}

#[tokio::test]
async fn test_logout_clears_store_without_notifying() {
    let (_mock, base_url) = start_mock().await;
    let h = harness(&base_url, full_credentials());

    h.client.logout().unwrap();

    assert!(h.store.load().unwrap().is_empty());
    assert!(h.routes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_forbidden_keeps_session() {
    let (mock, base_url) = start_mock().await;
    mock.respond("GET", "/api/v3/config", 403, r#"{"code":403,"message":"no access"}"#);
    let h = harness(&base_url, full_credentials());

    let err = h.client.config().await.unwrap_err();

    match &err {
        ApiError::Forbidden(message) => assert_eq!(message, "no access"),
        other => panic!("expected Forbidden, got {other:?}"),
    }
    assert_eq!(err.user_message(), "Access denied");
    assert_eq!(h.store.load().unwrap(), full_credentials());
    assert!(h.routes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_server_error_message_is_surfaced() {
    let (mock, base_url) = start_mock().await;
    mock.respond(
        "PUT",
        "/api/v3/process/evening_show/command",
        400,
        r#"{"code":400,"message":"unknown process"}"#,
    );
    let h = harness(&base_url, Credentials::default());

    let err = h
        .client
        .command("evening_show", core_admin::models::ProcessCommand::Start)
        .await
        .unwrap_err();

    match &err {
        ApiError::Http { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message, "unknown process");
        }
        other => panic!("expected Http, got {other:?}"),
    }
    let body: Value = serde_json::from_str(&mock.last().body).unwrap();
    assert_eq!(body, json!({"command": "start"}));
}

#[tokio::test]
async fn test_unreachable_server_is_connectivity_error() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let h = harness(&format!("http://{addr}/api"), full_credentials());
    let err = h.client.info().await.unwrap_err();

    assert!(matches!(err, ApiError::Connectivity(_)));
    assert_eq!(
        err.user_message(),
        "Unable to connect to server. Please check your connection."
    );
    assert_eq!(h.store.load().unwrap(), full_credentials());
}

#[tokio::test]
async fn test_create_restream_posts_descriptor() {
    let (mock, base_url) = start_mock().await;
    mock.respond("POST", "/api/v3/process", 200, r#"{"id":"evening_show"}"#);
    let h = harness(&base_url, Credentials::default());

    let result = h
        .client
        .create_restream(&restream_draft(), &BuilderOptions::default())
        .await
        .unwrap();

    assert_eq!(result.descriptor.id, "evening_show");
    assert_eq!(result.response, json!({"id": "evening_show"}));

    let request = mock.last();
    assert_eq!(request.method, "POST");
    let body: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["id"], "evening_show");
    assert_eq!(body["reference"], "Evening Show");
    assert_eq!(body["input"][0]["address"], "rtmp://src.example/live/in");
    assert_eq!(
        body["output"][0]["address"],
        "rtmp://a.rtmp.youtube.com/live2/abcd-1234"
    );
    assert_eq!(body["stale_timeout_seconds"], 30);
    assert_eq!(body["autostart"], true);
}

#[tokio::test]
async fn test_invalid_draft_sends_nothing() {
    let (mock, base_url) = start_mock().await;
    let h = harness(&base_url, Credentials::default());

    let draft = StreamDraft {
        name: "  ".to_string(),
        ..restream_draft()
    };
    let err = h
        .client
        .create_restream(&draft, &BuilderOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Build(BuildError::MissingName)));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_devices_swallow_errors_except_unauthorized() {
    let (mock, base_url) = start_mock().await;
    mock.respond("GET", "/api/v3/device", 500, r#"{"message":"boom"}"#);
    let h = harness(&base_url, full_credentials());

    assert!(h.client.devices().await.unwrap().is_empty());
    assert_eq!(h.store.load().unwrap(), full_credentials());

    mock.respond("GET", "/api/v3/device", 401, "");
    let err = h.client.devices().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert!(h.store.load().unwrap().is_empty());
    assert_eq!(h.routes.lock().unwrap().as_slice(), ["/login"]);
}

#[tokio::test]
async fn test_session_collectors_query() {
    let (mock, base_url) = start_mock().await;
    mock.respond("GET", "/api/v3/session/active", 200, "{}");
    mock.respond("GET", "/api/v3/session", 200, "{}");
    let h = harness(&base_url, Credentials::default());

    h.client
        .active_sessions(&["hls".to_string(), "rtmp".to_string()])
        .await
        .unwrap();
    assert_eq!(mock.last().query.as_deref(), Some("collectors=hls%2Crtmp"));

    h.client.sessions(&[]).await.unwrap();
    let request = mock.last();
    assert_eq!(request.path, "/api/v3/session");
    assert_eq!(request.query, None);
}

#[tokio::test]
async fn test_prometheus_metrics_request_text() {
    let (mock, base_url) = start_mock().await;
    mock.respond("GET", "/api/metrics", 200, "# HELP ffmpeg_process 1\nffmpeg_process 1\n");
    let h = harness(&base_url, Credentials::default());

    let text = h.client.prometheus_metrics().await.unwrap();

    assert!(text.starts_with("# HELP ffmpeg_process"));
    assert_eq!(mock.last().accept.as_deref(), Some("text/plain"));
}

#[tokio::test]
async fn test_path_segments_are_encoded() {
    let (mock, base_url) = start_mock().await;
    mock.respond("GET", "/api/v3/metadata/my%20key", 200, r#""value""#);
    let h = harness(&base_url, Credentials::default());

    let value = h.client.metadata_get("my key").await.unwrap();

    assert_eq!(value, json!("value"));
    assert_eq!(mock.last().path, "/api/v3/metadata/my%20key");
}

#[tokio::test]
async fn test_widget_create_and_update() {
    let (mock, base_url) = start_mock().await;
    mock.respond("POST", "/api/v3/widget/evening_show", 200, r#"{"title":"Evening"}"#);
    mock.respond("PUT", "/api/v3/widget/evening_show", 200, r#"{"title":"Late"}"#);
    let h = harness(&base_url, Credentials::default());

    let created = h
        .client
        .create_widget("evening_show", &json!({"title": "Evening", "share": true}))
        .await
        .unwrap();
    assert_eq!(created, json!({"title": "Evening"}));
    let request = mock.last();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/v3/widget/evening_show");
    let body: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, json!({"title": "Evening", "share": true}));

    h.client
        .update_widget("evening_show", &json!({"title": "Late"}))
        .await
        .unwrap();
    let request = mock.last();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.path, "/api/v3/widget/evening_show");
    let body: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, json!({"title": "Late"}));
}

#[tokio::test]
async fn test_dashboard_poller_stops_on_unauthorized() {
    let (mock, base_url) = start_mock().await;
    for path in ["/api/v3", "/api/v3/process", "/api/v3/metrics", "/api/v3/session/summary"] {
        mock.respond("GET", path, 401, "");
    }
    let h = harness(&base_url, full_credentials());

    let state = Arc::new(DashboardState::new(10));
    let poller = DashboardPoller::new();
    poller
        .start(h.client.clone(), state.clone(), Duration::from_millis(50))
        .await;

    let mut stopped = false;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(25)).await;
        if !poller.is_running() {
            stopped = true;
            break;
        }
    }
    poller.shutdown().await;

    assert!(stopped);
    assert!(h.store.load().unwrap().is_empty());
    assert!(!h.routes.lock().unwrap().is_empty());
    assert!(state.snapshot().await.system_info.is_none());
}

#[tokio::test]
async fn test_dashboard_refresh_all_fills_slots() {
    let (mock, base_url) = start_mock().await;
    mock.respond("GET", "/api/v3", 200, r#"{"version":{"number":"16.13.0"}}"#);
    mock.respond(
        "GET",
        "/api/v3/process",
        200,
        r#"[{"id":"evening_show","state":{"exec":"running"}}]"#,
    );
    mock.respond("GET", "/api/v3/metrics", 200, r#"{"metrics":[]}"#);
    let h = harness(&base_url, Credentials::default());

    let state = DashboardState::new(10);
    let failures = state.refresh_all(&h.client).await;

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "sessions");

    let snapshot = state.snapshot().await;
    assert_eq!(snapshot.counts.running, 1);
    assert_eq!(snapshot.metrics_samples, 1);
    assert!(snapshot.session_summary.is_none());
}
