//! HTTP adapter for the call-flow engine
//!
//! A thin REST surface over the engine's three entry points (start call,
//! process turn, end call) plus read-only summaries and a health probe.
//! Telephony-platform webhook translation lives outside this crate; this
//! is the neutral contract those adapters consume.

pub mod http;
pub mod state;

pub use http::create_router;
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Engine(#[from] afterhours_agent::EngineError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Engine(afterhours_agent::EngineError::DuplicateSession(id)) => (
                StatusCode::CONFLICT,
                format!("call {id} is already active"),
            ),
        };
        (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
    }
}
