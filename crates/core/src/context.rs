//! Per-call mutable state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::{CallState, CallType};

/// How many times the same state may re-ask before the flow moves on anyway.
pub const DEFAULT_MAX_CLARIFICATIONS: u32 = 2;

/// One exchange in the conversation. History is append-only and never
/// truncated or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// State the caller was responding to
    pub state: CallState,
    /// What the caller said
    pub response: String,
    /// Prompt spoken back after processing this response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Context maintained throughout a call.
///
/// Owned exclusively by the session engine for the lifetime of the call;
/// only the bound flow definition mutates `current_state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallContext {
    pub call_id: String,
    pub call_type: CallType,
    pub lead_id: Option<String>,
    pub business_name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub current_state: CallState,
    /// Field name -> last raw answer that covered it
    pub collected_data: HashMap<String, String>,
    pub conversation_history: Vec<HistoryEntry>,
    /// Fields the state under collection still requires
    pub missing_fields: HashSet<String>,
    /// State a clarification loop is repairing; `None` outside `Clarifying`
    pub clarifying_for: Option<CallState>,
    pub clarification_count: u32,
    pub max_clarifications: u32,
}

impl CallContext {
    pub fn new(call_id: impl Into<String>, call_type: CallType) -> Self {
        Self {
            call_id: call_id.into(),
            call_type,
            lead_id: None,
            business_name: None,
            contact_name: None,
            contact_phone: None,
            current_state: CallState::Greeting,
            collected_data: HashMap::new(),
            conversation_history: Vec::new(),
            missing_fields: HashSet::new(),
            clarifying_for: None,
            clarification_count: 0,
            max_clarifications: DEFAULT_MAX_CLARIFICATIONS,
        }
    }

    pub fn with_max_clarifications(mut self, max: u32) -> Self {
        self.max_clarifications = max.max(1);
        self
    }

    /// Populate identity fields from caller-supplied initial data.
    /// Only the known identity keys are honored; anything else is ignored.
    pub fn apply_initial(&mut self, fields: &HashMap<String, String>) {
        for (key, value) in fields {
            match key.as_str() {
                "lead_id" => self.lead_id = Some(value.clone()),
                "business_name" => self.business_name = Some(value.clone()),
                "contact_name" => self.contact_name = Some(value.clone()),
                "contact_phone" => self.contact_phone = Some(value.clone()),
                _ => {}
            }
        }
    }

    /// Append a caller response to the history with a timestamp.
    pub fn add_to_history(&mut self, state: CallState, response: impl Into<String>) {
        self.conversation_history.push(HistoryEntry {
            state,
            response: response.into(),
            prompt: None,
            timestamp: Utc::now(),
        });
    }

    /// Record the prompt that was spoken in response to the latest turn.
    pub fn set_last_prompt(&mut self, prompt: &str) {
        if let Some(entry) = self.conversation_history.last_mut() {
            entry.prompt = Some(prompt.to_string());
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.current_state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_starts_at_greeting() {
        let ctx = CallContext::new("call_1", CallType::Outbound);
        assert_eq!(ctx.current_state, CallState::Greeting);
        assert!(ctx.collected_data.is_empty());
        assert!(ctx.conversation_history.is_empty());
        assert_eq!(ctx.max_clarifications, DEFAULT_MAX_CLARIFICATIONS);
    }

    #[test]
    fn test_apply_initial_ignores_unknown_keys() {
        let mut ctx = CallContext::new("call_1", CallType::Outbound);
        let mut fields = HashMap::new();
        fields.insert("business_name".to_string(), "Smith Legal".to_string());
        fields.insert("contact_name".to_string(), "John".to_string());
        fields.insert("favorite_color".to_string(), "blue".to_string());
        ctx.apply_initial(&fields);

        assert_eq!(ctx.business_name.as_deref(), Some("Smith Legal"));
        assert_eq!(ctx.contact_name.as_deref(), Some("John"));
        assert!(ctx.collected_data.is_empty());
    }

    #[test]
    fn test_history_records_prompt_for_latest_turn() {
        let mut ctx = CallContext::new("call_1", CallType::Inbound);
        ctx.add_to_history(CallState::Greeting, "hi there");
        ctx.set_last_prompt("Tell me about your business.");

        assert_eq!(ctx.conversation_history.len(), 1);
        let entry = &ctx.conversation_history[0];
        assert_eq!(entry.response, "hi there");
        assert_eq!(entry.prompt.as_deref(), Some("Tell me about your business."));
    }

    #[test]
    fn test_max_clarifications_floor() {
        let ctx = CallContext::new("c", CallType::Outbound).with_max_clarifications(0);
        assert_eq!(ctx.max_clarifications, 1);
    }
}
