//! Externally visible records
//!
//! These are the engine's only outward-facing shapes: the per-turn result
//! handed back to the telephony layer and the end-of-call summary consumed
//! by export adapters. Both serialize to flat, string-keyed JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{CallState, CallType, HistoryEntry, Intent};

/// Result of processing one caller utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    /// What the agent should say next
    pub prompt: String,
    pub state: CallState,
    pub intent: Intent,
    /// The physical call should be hung up after speaking the prompt
    pub should_end: bool,
    /// The caller asked for a human; route the call
    pub should_transfer: bool,
    #[serde(default)]
    pub data_collected: HashMap<String, String>,
    #[serde(default)]
    pub missing_fields: Vec<String>,
    /// Set only when the turn could not be processed (unknown session).
    /// The prompt is still caller-appropriate, never an internal code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TurnResult {
    /// Graceful failure for a turn against a session that does not exist.
    /// The telephony layer must end the physical call.
    pub fn unknown_session(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            state: CallState::Completed,
            intent: Intent::Unknown,
            should_end: true,
            should_transfer: false,
            data_collected: HashMap::new(),
            missing_fields: Vec::new(),
            error: Some("call not found".to_string()),
        }
    }
}

/// Data-completeness rollup across every state of the bound flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataCompleteness {
    /// collected / total_required, rounded to two decimals
    pub score: f64,
    pub collected: usize,
    pub total_required: usize,
    pub missing: Vec<String>,
}

/// Snapshot of a call for storage or export. Produced by `get_call_summary`
/// and as the final word of `end_call`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSummary {
    pub call_id: String,
    pub call_type: CallType,
    pub lead_id: Option<String>,
    pub business_name: Option<String>,
    pub contact_name: Option<String>,
    pub final_state: CallState,
    pub data_collected: HashMap<String, String>,
    pub conversation_history: Vec<HistoryEntry>,
    pub data_completeness: DataCompleteness,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_session_result() {
        let result = TurnResult::unknown_session("Please call back.");
        assert!(result.should_end);
        assert!(result.error.is_some());
        assert_eq!(result.prompt, "Please call back.");
    }

    #[test]
    fn test_turn_result_omits_absent_error() {
        let result = TurnResult {
            prompt: "Next question".to_string(),
            state: CallState::BusinessDiscovery,
            intent: Intent::Continue,
            should_end: false,
            should_transfer: false,
            data_collected: HashMap::new(),
            missing_fields: Vec::new(),
            error: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["state"], "business_discovery");
        assert_eq!(json["intent"], "continue");
    }

    #[test]
    fn test_summary_serializes_flat() {
        let summary = CallSummary {
            call_id: "call_9".to_string(),
            call_type: CallType::Missed,
            lead_id: None,
            business_name: None,
            contact_name: Some("Jake".to_string()),
            final_state: CallState::Completed,
            data_collected: HashMap::from([("urgency".to_string(), "no AC".to_string())]),
            conversation_history: Vec::new(),
            data_completeness: DataCompleteness {
                score: 0.25,
                collected: 1,
                total_required: 4,
                missing: vec!["location".to_string()],
            },
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["call_type"], "missed");
        assert_eq!(json["final_state"], "completed");
        assert_eq!(json["data_completeness"]["score"], 0.25);
    }
}
