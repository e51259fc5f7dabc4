//! Integration tests: the HTTP surface driven in-process against a stub
//! command runner.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use lockgate_core::{CommandInvocation, CommandTemplate};
use lockgate_executor::{CommandRunner, ExecutorError};
use lockgate_gateway::routes::{create_router, AppState};
use tower::ServiceExt;

const CREATE_BODY: &str = r#"{"code":"123456","username":"user1","device_id":1}"#;
const SUCCESS: &str = r#"{"result":"success"}"#;

/// Returns a canned result and records every invocation it receives.
struct StubRunner {
    response: Result<Vec<u8>, ExecutorError>,
    calls: Mutex<Vec<CommandInvocation>>,
}

impl StubRunner {
    fn new(response: Result<Vec<u8>, ExecutorError>) -> Arc<Self> {
        Arc::new(Self { response, calls: Mutex::new(Vec::new()) })
    }

    fn succeeding(output: &str) -> Arc<Self> {
        Self::new(Ok(output.as_bytes().to_vec()))
    }

    fn exiting(output: &str) -> Arc<Self> {
        let output = output.as_bytes().to_vec();
        Self::new(Err(ExecutorError::NonZeroExit { code: Some(1), output }))
    }

    fn calls(&self) -> Vec<CommandInvocation> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn only_call_args(&self) -> Vec<String> {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one invocation, got {calls:?}");
        calls[0].args().to_vec()
    }
}

#[async_trait]
impl CommandRunner for StubRunner {
    async fn run(&self, invocation: &CommandInvocation) -> Result<Vec<u8>, ExecutorError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(invocation.clone());
        self.response.clone()
    }
}

fn app(runner: &Arc<StubRunner>) -> Router {
    let runner: Arc<dyn CommandRunner> = Arc::clone(runner) as Arc<dyn CommandRunner>;
    create_router(AppState::new(runner, CommandTemplate::with_hub("10.0.0.5")))
}

struct Reply {
    status: StatusCode,
    content_type: Option<String>,
    body: String,
}

async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> Reply {
    let body = body.map_or_else(Body::empty, |b| Body::from(b.to_owned()));
    let req = match Request::builder().method(method).uri(uri).body(body) {
        Ok(r) => r,
        Err(e) => panic!("failed to build request: {e}"),
    };
    let resp = match app.oneshot(req).await {
        Ok(r) => r,
        Err(e) => panic!("handler error: {e}"),
    };
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = match axum::body::to_bytes(resp.into_body(), 64 * 1024).await {
        Ok(b) => b,
        Err(e) => panic!("failed to read body: {e}"),
    };
    Reply { status, content_type, body: String::from_utf8_lossy(&bytes).into_owned() }
}

fn expected_prefix(action: &str) -> Vec<String> {
    ["-m", "hubitat_lock_manager.cli", "--hub-ip", "10.0.0.5", "--action", action]
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

// ── create ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_success_relays_tool_output_as_json() {
    let runner = StubRunner::succeeding(SUCCESS);
    let reply = send(app(&runner), Method::POST, "/create_key_code", Some(CREATE_BODY)).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type.as_deref(), Some("application/json"));
    assert_eq!(reply.body, SUCCESS);

    let mut expected = expected_prefix("create");
    expected.extend(
        ["--username", "user1", "--code", "123456", "--device-id", "1"].map(str::to_owned),
    );
    assert_eq!(runner.only_call_args(), expected);
}

#[tokio::test]
async fn create_failure_returns_500_with_captured_output() {
    let runner = StubRunner::exiting("");
    let reply = send(app(&runner), Method::POST, "/create_key_code", Some(CREATE_BODY)).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body, "");
}

#[tokio::test]
async fn create_invalid_json_returns_400_without_invoking_tool() {
    let runner = StubRunner::succeeding(SUCCESS);
    let body = r#"{"invalid_json}"#;
    let reply = send(app(&runner), Method::POST, "/create_key_code", Some(body)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(runner.calls().is_empty(), "executor must not be called");
}

#[tokio::test]
async fn create_without_code_returns_400() {
    let runner = StubRunner::succeeding(SUCCESS);
    let reply =
        send(app(&runner), Method::POST, "/create_key_code", Some(r#"{"username":"user1"}"#)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body.contains("code"), "body should name the field: {}", reply.body);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn create_with_zero_device_id_omits_device_flag() {
    let runner = StubRunner::succeeding(SUCCESS);
    let body = r#"{"code":"1111","username":"user1","device_id":0}"#;
    let reply = send(app(&runner), Method::POST, "/create_key_code", Some(body)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let args = runner.only_call_args();
    assert!(!args.iter().any(|a| a == "--device-id"), "unexpected device flag in {args:?}");
}

#[tokio::test]
async fn identical_creates_invoke_tool_twice() {
    let runner = StubRunner::succeeding(SUCCESS);
    for _ in 0..2 {
        let reply = send(app(&runner), Method::POST, "/create_key_code", Some(CREATE_BODY)).await;
        assert_eq!(reply.status, StatusCode::OK);
    }
    assert_eq!(runner.calls().len(), 2);
}

// ── delete ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_without_device_targets_all_devices() {
    let runner = StubRunner::succeeding(SUCCESS);
    let body = r#"{"username":"user1"}"#;
    let reply = send(app(&runner), Method::DELETE, "/delete_key_code", Some(body)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type.as_deref(), Some("application/json"));
    assert_eq!(reply.body, SUCCESS);

    let mut expected = expected_prefix("delete");
    expected.extend(["--username", "user1"].map(str::to_owned));
    assert_eq!(runner.only_call_args(), expected);
}

#[tokio::test]
async fn delete_failure_passes_diagnostic_through() {
    let runner = StubRunner::exiting("Username is required\n");
    let body = r#"{"username":"user1","device_id":1}"#;
    let reply = send(app(&runner), Method::DELETE, "/delete_key_code", Some(body)).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body, "Username is required\n");
}

#[tokio::test]
async fn null_fields_are_treated_as_absent() {
    let runner = StubRunner::succeeding(SUCCESS);
    let body = r#"{"username":null,"code":"1234"}"#;
    let reply = send(app(&runner), Method::POST, "/create_key_code", Some(body)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, "username is required");
    assert!(runner.calls().is_empty());

    let body = r#"{"username":"user1","code":null,"device_id":null}"#;
    let reply = send(app(&runner), Method::DELETE, "/delete_key_code", Some(body)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let mut expected = expected_prefix("delete");
    expected.extend(["--username", "user1"].map(str::to_owned));
    assert_eq!(runner.only_call_args(), expected);
}

#[tokio::test]
async fn delete_invalid_json_returns_400() {
    let runner = StubRunner::succeeding(SUCCESS);
    let reply = send(app(&runner), Method::DELETE, "/delete_key_code", Some("not json")).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(runner.calls().is_empty());
}

// ── list_devices ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_devices_sends_only_action() {
    let runner = StubRunner::succeeding(r#"{"devices":[]}"#);
    let reply = send(app(&runner), Method::GET, "/list_devices", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type.as_deref(), Some("application/json"));
    assert_eq!(reply.body, r#"{"devices":[]}"#);
    assert_eq!(runner.only_call_args(), expected_prefix("list_devices"));
}

#[tokio::test]
async fn list_devices_launch_failure_returns_502() {
    let runner = StubRunner::new(Err(ExecutorError::LaunchFailed {
        program: "python3".to_owned(),
        reason: "No such file or directory".to_owned(),
    }));
    let reply = send(app(&runner), Method::GET, "/list_devices", None).await;
    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    assert!(reply.body.contains("python3"), "diagnostic missing: {}", reply.body);
}

// ── list_key_codes ────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_key_codes_without_device_id_returns_400() {
    let runner = StubRunner::succeeding(SUCCESS);
    let reply = send(app(&runner), Method::GET, "/list_key_codes", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body.contains("device_id"), "body should mention device_id: {}", reply.body);
    assert!(runner.calls().is_empty(), "executor must not be called");
}

#[tokio::test]
async fn list_key_codes_with_empty_or_bad_device_id_returns_400() {
    for query in ["", "front", "0"] {
        let uri = format!("/list_key_codes?device_id={query}");
        let runner = StubRunner::succeeding(SUCCESS);
        let reply = send(app(&runner), Method::GET, &uri, None).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(runner.calls().is_empty(), "{uri} must not reach the executor");
    }
}

#[tokio::test]
async fn list_key_codes_passes_device_id() {
    let runner = StubRunner::succeeding(r#"{"key_codes":{}}"#);
    let reply = send(app(&runner), Method::GET, "/list_key_codes?device_id=12", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type.as_deref(), Some("application/json"));
    assert_eq!(reply.body, r#"{"key_codes":{}}"#);

    let mut expected = expected_prefix("list");
    expected.extend(["--device-id", "12"].map(str::to_owned));
    assert_eq!(runner.only_call_args(), expected);
}

// ── get / update ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_key_code_builds_username_and_device_flags() {
    let runner = StubRunner::succeeding(SUCCESS);
    let reply =
        send(app(&runner), Method::GET, "/get_key_code?username=user1&device_id=4", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type.as_deref(), Some("application/json"));

    let mut expected = expected_prefix("get");
    expected.extend(["--username", "user1", "--device-id", "4"].map(str::to_owned));
    assert_eq!(runner.only_call_args(), expected);
}

#[tokio::test]
async fn get_key_code_without_username_returns_400() {
    let runner = StubRunner::succeeding(SUCCESS);
    let reply = send(app(&runner), Method::GET, "/get_key_code?device_id=4", None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn update_key_code_uses_put() {
    let runner = StubRunner::succeeding(SUCCESS);
    let body = r#"{"code":"654321","username":"user1"}"#;
    let reply = send(app(&runner), Method::PUT, "/update_key_code", Some(body)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.content_type.as_deref(), Some("application/json"));

    let mut expected = expected_prefix("update");
    expected.extend(["--username", "user1", "--code", "654321"].map(str::to_owned));
    assert_eq!(runner.only_call_args(), expected);
}

// ── cross-cutting ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn every_operation_relays_executor_output_on_failure() {
    let requests: [(Method, &str, Option<&str>); 6] = [
        (Method::POST, "/create_key_code", Some(CREATE_BODY)),
        (Method::DELETE, "/delete_key_code", Some(r#"{"username":"u"}"#)),
        (Method::GET, "/list_devices", None),
        (Method::GET, "/list_key_codes?device_id=1", None),
        (Method::GET, "/get_key_code?username=u", None),
        (Method::PUT, "/update_key_code", Some(r#"{"username":"u","code":"1"}"#)),
    ];

    for (method, uri, body) in requests {
        let runner = StubRunner::exiting("hub unreachable");
        let reply = send(app(&runner), method, uri, body).await;
        assert!(
            matches!(reply.status, StatusCode::INTERNAL_SERVER_ERROR | StatusCode::BAD_GATEWAY),
            "{uri}: unexpected status {}",
            reply.status
        );
        assert_eq!(reply.body, "hub unreachable", "{uri}");
        assert_eq!(runner.calls().len(), 1, "{uri}");
    }
}

#[tokio::test]
async fn timed_out_invocation_returns_500_with_partial_output() {
    let runner = StubRunner::new(Err(ExecutorError::TimedOut {
        after: Duration::from_secs(30),
        output: b"connecting to hub...".to_vec(),
    }));
    let reply = send(app(&runner), Method::GET, "/list_devices", None).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body, "connecting to hub...");
}

#[tokio::test]
async fn every_operation_keeps_timeout_within_executor_statuses() {
    let requests: [(Method, &str, Option<&str>); 6] = [
        (Method::POST, "/create_key_code", Some(CREATE_BODY)),
        (Method::DELETE, "/delete_key_code", Some(r#"{"username":"u"}"#)),
        (Method::GET, "/list_devices", None),
        (Method::GET, "/list_key_codes?device_id=1", None),
        (Method::GET, "/get_key_code?username=u", None),
        (Method::PUT, "/update_key_code", Some(r#"{"username":"u","code":"1"}"#)),
    ];

    for (method, uri, body) in requests {
        let runner = StubRunner::new(Err(ExecutorError::TimedOut {
            after: Duration::from_secs(30),
            output: b"x".to_vec(),
        }));
        let reply = send(app(&runner), method, uri, body).await;
        assert!(
            matches!(reply.status, StatusCode::INTERNAL_SERVER_ERROR | StatusCode::BAD_GATEWAY),
            "{uri}: unexpected status {}",
            reply.status
        );
        assert_eq!(reply.body, "x", "{uri}");
    }
}

#[tokio::test]
async fn success_body_is_not_reencoded() {
    // Non-canonical JSON from the tool must come back byte for byte.
    let raw = "{ \"result\" : \"success\" ,\n  \"extra\": [1,2] }\n";
    let runner = StubRunner::succeeding(raw);
    let reply = send(app(&runner), Method::GET, "/list_devices", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, raw);
}
