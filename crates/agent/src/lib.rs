//! Call-Flow Engine
//!
//! Per-session state machines for scripted multi-turn phone conversations.
//!
//! Features:
//! - Data-driven flow definitions (outbound discovery, inbound, missed-call
//!   triage), immutable and shared across sessions
//! - Missing-data detection with bounded clarification loops
//! - Safety overrides for opt-out and transfer requests ahead of flow logic
//! - Session lifecycle: start, process turn, summarize, end
//!
//! Turn processing is synchronous and has no suspension points. The host is
//! responsible for serializing turns per call id; distinct sessions may run
//! on different threads freely.

pub mod catalog;
pub mod engine;
pub mod flow;
pub mod template;

pub use catalog::FlowCatalog;
pub use engine::CallEngine;
pub use flow::{FlowDefinition, StateSpec};

use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// A call with this id is already in progress. Starting it again would
    /// silently discard a live conversation, so it is rejected outright.
    #[error("call {0} is already active")]
    DuplicateSession(String),
}
