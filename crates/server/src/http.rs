//! HTTP endpoints
//!
//! REST API over the call-flow engine. Turn processing always answers 200
//! with a `TurnResult`; an unknown session is reported inside the result,
//! not as an HTTP error, so the telephony layer can speak the prompt and
//! hang up.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use afterhours_core::{CallState, CallSummary, CallType, TurnResult};

use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.settings.server.request_timeout_secs);

    Router::new()
        .route("/api/calls", post(start_call))
        .route("/api/calls/:id/turn", post(process_turn))
        .route("/api/calls/:id/summary", get(call_summary))
        .route("/api/calls/:id", delete(end_call))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct StartCallRequest {
    /// Platform-supplied call id; generated when absent
    call_id: Option<String>,
    /// Wire-format call type; unrecognized values fall back to outbound
    call_type: Option<String>,
    #[serde(default)]
    initial_fields: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct StartCallResponse {
    call_id: String,
    call_type: CallType,
    state: CallState,
    /// Greeting to open the call with
    prompt: String,
}

/// Unrecognized call types get the default flow rather than failing the
/// call. Deliberate leniency; the warning is the paper trail.
fn resolve_call_type(raw: Option<&str>) -> CallType {
    match raw {
        None => CallType::default(),
        Some(s) => CallType::parse(s).unwrap_or_else(|| {
            tracing::warn!(call_type = s, "unrecognized call type, using outbound flow");
            CallType::Outbound
        }),
    }
}

async fn start_call(
    State(state): State<AppState>,
    Json(req): Json<StartCallRequest>,
) -> Result<(StatusCode, Json<StartCallResponse>), ServerError> {
    let call_id = req
        .call_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let call_type = resolve_call_type(req.call_type.as_deref());

    let context = state
        .engine
        .start_call(&call_id, call_type, Some(&req.initial_fields))?;
    let prompt = state.engine.initial_prompt(&call_id).unwrap_or_default();

    Ok((
        StatusCode::CREATED,
        Json(StartCallResponse {
            call_id,
            call_type,
            state: context.current_state,
            prompt,
        }),
    ))
}

#[derive(Debug, Deserialize)]
struct TurnRequest {
    utterance: String,
}

async fn process_turn(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TurnRequest>,
) -> Json<TurnResult> {
    Json(state.engine.process_user_input(&id, &req.utterance))
}

async fn call_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CallSummary>, StatusCode> {
    state
        .engine
        .get_call_summary(&id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// End a call and return the final summary. Ending an unknown or
/// already-ended call is a no-op (204).
async fn end_call(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CallSummary>, StatusCode> {
    state
        .engine
        .end_call(&id)
        .map(Json)
        .ok_or(StatusCode::NO_CONTENT)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_call_type_passthrough() {
        assert_eq!(resolve_call_type(Some("missed")), CallType::Missed);
        assert_eq!(resolve_call_type(Some("demo_request")), CallType::DemoRequest);
    }

    #[test]
    fn test_resolve_call_type_falls_back_to_outbound() {
        assert_eq!(resolve_call_type(Some("video")), CallType::Outbound);
        assert_eq!(resolve_call_type(None), CallType::Outbound);
    }

    #[test]
    fn test_start_request_accepts_minimal_body() {
        let req: StartCallRequest = serde_json::from_str("{}").unwrap();
        assert!(req.call_id.is_none());
        assert!(req.initial_fields.is_empty());
    }

    #[test]
    fn test_start_request_with_fields() {
        let req: StartCallRequest = serde_json::from_str(
            r#"{
                "call_id": "CA123",
                "call_type": "inbound",
                "initial_fields": {"contact_phone": "+15551234567"}
            }"#,
        )
        .unwrap();
        assert_eq!(req.call_id.as_deref(), Some("CA123"));
        assert_eq!(
            req.initial_fields.get("contact_phone").map(String::as_str),
            Some("+15551234567")
        );
    }
}
