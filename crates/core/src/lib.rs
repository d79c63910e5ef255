//! Core types for the Afterhours call-flow engine
//!
//! Foundational types shared by the classifier, flow, and server crates:
//! - Call classification (`CallType`) and dialogue phases (`CallState`)
//! - Caller intent vocabulary (`Intent`)
//! - Per-call mutable state (`CallContext`, `HistoryEntry`)
//! - Externally visible records (`TurnResult`, `CallSummary`)

pub mod call;
pub mod context;
pub mod intent;
pub mod turn;

pub use call::{CallState, CallType};
pub use context::{CallContext, HistoryEntry, DEFAULT_MAX_CLARIFICATIONS};
pub use intent::Intent;
pub use turn::{CallSummary, DataCompleteness, TurnResult};
