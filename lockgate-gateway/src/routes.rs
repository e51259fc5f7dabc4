//! Axum route handlers for the lockgate API.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use lockgate_core::{CommandTemplate, KeyCodeRequest, Operation};
use lockgate_executor::CommandRunner;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::error::GatewayError;

// ── Shared state ─────────────────────────────────────────────────────────────

/// State shared by every handler: the runner seam and the command prefix.
#[derive(Clone)]
pub struct AppState {
    runner: Arc<dyn CommandRunner>,
    template: Arc<CommandTemplate>,
}

impl AppState {
    #[must_use]
    pub fn new(runner: Arc<dyn CommandRunner>, template: CommandTemplate) -> Self {
        Self { runner, template: Arc::new(template) }
    }

    /// Build, run, and relay exactly one lock tool invocation.
    async fn execute(&self, op: &Operation) -> Result<Response, GatewayError> {
        let invocation = self.template.build(op);
        tracing::info!(action = %op.action(), "invoking lock tool");
        let output = self.runner.run(&invocation).await?;
        Ok(([(header::CONTENT_TYPE, "application/json")], output).into_response())
    }
}

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeviceQuery {
    pub device_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetKeyCodeQuery {
    pub username: Option<String>,
    pub device_id: Option<String>,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/create_key_code", post(create_key_code))
        .route("/delete_key_code", delete(delete_key_code))
        .route("/list_devices", get(list_devices))
        .route("/list_key_codes", get(list_key_codes))
        .route("/get_key_code", get(get_key_code))
        .route("/update_key_code", put(update_key_code))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health` — liveness probe. Never touches the lock tool.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// `POST /create_key_code` — add a key code for a user.
///
/// # Errors
/// Returns [`GatewayError::InvalidRequest`] if the body is not valid JSON,
/// [`GatewayError::Validation`] if `username` or `code` is blank, or
/// [`GatewayError::Executor`] if the lock tool fails.
pub async fn create_key_code(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let op = decode_body(&body)?.into_create()?;
    state.execute(&op).await
}

/// `DELETE /delete_key_code` — remove a user's key code.
///
/// Without a `device_id` the tool removes the code from every device.
///
/// # Errors
/// Returns [`GatewayError::InvalidRequest`] if the body is not valid JSON,
/// [`GatewayError::Validation`] if `username` is blank, or
/// [`GatewayError::Executor`] if the lock tool fails.
pub async fn delete_key_code(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let op = decode_body(&body)?.into_delete()?;
    state.execute(&op).await
}

/// `PUT /update_key_code` — replace a user's key code.
///
/// # Errors
/// Same as [`create_key_code`].
pub async fn update_key_code(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let op = decode_body(&body)?.into_update()?;
    state.execute(&op).await
}

/// `GET /list_devices` — list lock devices known to the hub.
///
/// # Errors
/// Returns [`GatewayError::Executor`] if the lock tool fails.
pub async fn list_devices(State(state): State<AppState>) -> Result<Response, GatewayError> {
    state.execute(&Operation::ListDevices).await
}

/// `GET /list_key_codes?device_id=<id>` — list key codes on one device.
///
/// # Errors
/// Returns [`GatewayError::Validation`] if `device_id` is missing or not a
/// positive integer, or [`GatewayError::Executor`] if the lock tool fails.
pub async fn list_key_codes(
    State(state): State<AppState>,
    Query(query): Query<DeviceQuery>,
) -> Result<Response, GatewayError> {
    let op = Operation::list_key_codes(query.device_id.as_deref())?;
    state.execute(&op).await
}

/// `GET /get_key_code?username=<name>[&device_id=<id>]` — fetch one user's code.
///
/// # Errors
/// Returns [`GatewayError::Validation`] if `username` is missing or
/// `device_id` is malformed, or [`GatewayError::Executor`] if the lock
/// tool fails.
pub async fn get_key_code(
    State(state): State<AppState>,
    Query(query): Query<GetKeyCodeQuery>,
) -> Result<Response, GatewayError> {
    let op = Operation::get(query.username, query.device_id.as_deref())?;
    state.execute(&op).await
}

/// Decode a key-code body. Any JSON error is a client error; the
/// `Content-Type` header is not checked.
fn decode_body(body: &[u8]) -> Result<KeyCodeRequest, GatewayError> {
    serde_json::from_slice(body).map_err(|e| GatewayError::InvalidRequest(e.to_string()))
}
