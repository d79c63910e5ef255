//! Session orchestration
//!
//! Owns every active `CallContext`, binds each call to its shared flow
//! definition, and runs the turn pipeline: intent check, entity extraction,
//! flow transition, prompt lookup. Safety-critical intents (opt-out,
//! transfer) short-circuit ahead of flow logic.
//!
//! The active-call map is the only shared mutable state; sessions are
//! otherwise independent. Turn processing is synchronous and the host must
//! serialize turns per call id.

use std::collections::HashMap;

use afterhours_config::AgentSettings;
use afterhours_core::{
    CallContext, CallState, CallSummary, CallType, DataCompleteness, Intent, TurnResult,
};
use afterhours_nlu::{extract_entities, is_explicit_opt_out, IntentDetector};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::catalog::FlowCatalog;
use crate::flow::FlowDefinition;
use crate::EngineError;

const UNKNOWN_SESSION_PROMPT: &str =
    "I'm sorry, I couldn't find your call session. Please call back.";
const OPT_OUT_PROMPT: &str =
    "No problem at all. I'll remove you from our list. Have a great day!";
const OPTED_OUT_CLOSING: &str = "No problem. Have a great day!";
const TRANSFER_PROMPT: &str =
    "If a team member is available, I can request a transfer. Please hold.";
const COMPLETED_CLOSING: &str = "Perfect! I have everything I need. We aim to send a demo \
     email within about 24 hours. Thanks for your time!";
const COMPLETED_CLOSING_MISSED: &str = "Perfect - I've got this logged. We'll pass that window \
     to the on-call team for follow-up. If anything changes, just reply to the text or call \
     again.";

/// The conversation engine: all active sessions plus the pieces every turn
/// needs.
pub struct CallEngine {
    detector: IntentDetector,
    flows: FlowCatalog,
    active_calls: DashMap<String, CallContext>,
    max_clarifications: u32,
}

impl CallEngine {
    pub fn new(agent: AgentSettings) -> Self {
        Self {
            detector: IntentDetector::new(),
            max_clarifications: agent.max_clarifications,
            flows: FlowCatalog::new(agent),
            active_calls: DashMap::new(),
        }
    }

    /// Start a new call session.
    ///
    /// Fails if the call id is already active: overwriting would silently
    /// discard an in-progress conversation, so re-entrancy is treated as a
    /// caller bug.
    pub fn start_call(
        &self,
        call_id: &str,
        call_type: CallType,
        initial_fields: Option<&HashMap<String, String>>,
    ) -> Result<CallContext, EngineError> {
        // Bind the shared flow up front so the first turn finds it cached.
        self.flows.get(call_type);

        let mut context = CallContext::new(call_id, call_type)
            .with_max_clarifications(self.max_clarifications);
        if let Some(fields) = initial_fields {
            context.apply_initial(fields);
        }

        match self.active_calls.entry(call_id.to_string()) {
            Entry::Occupied(_) => {
                tracing::warn!(call_id, "rejected duplicate call start");
                return Err(EngineError::DuplicateSession(call_id.to_string()));
            }
            Entry::Vacant(slot) => {
                slot.insert(context.clone());
            }
        }

        tracing::info!(call_id, call_type = %call_type, "started call");
        Ok(context)
    }

    /// The greeting prompt to open the call with.
    pub fn initial_prompt(&self, call_id: &str) -> Option<String> {
        let ctx = self.active_calls.get(call_id)?;
        let flow = self.flows.get(ctx.call_type);
        Some(flow.get_next_prompt(ctx.current_state, ctx.value()))
    }

    /// Process one caller utterance and return what to say next.
    ///
    /// An unknown call id is a graceful failure, not an error: the result
    /// carries an `error` field and tells the telephony layer to hang up.
    pub fn process_user_input(&self, call_id: &str, utterance: &str) -> TurnResult {
        let Some(mut entry) = self.active_calls.get_mut(call_id) else {
            tracing::warn!(call_id, "turn for unknown call");
            return TurnResult::unknown_session(UNKNOWN_SESSION_PROMPT);
        };
        let ctx = entry.value_mut();

        // Terminal sessions accept no further transitions; repeat the
        // closing line and leave the context untouched.
        if ctx.current_state.is_terminal() {
            return TurnResult {
                prompt: self.terminal_prompt(ctx),
                state: ctx.current_state,
                intent: Intent::Unknown,
                should_end: true,
                should_transfer: ctx.current_state == CallState::Transferred,
                data_collected: ctx.collected_data.clone(),
                missing_fields: Vec::new(),
                error: None,
            };
        }

        let flow = self.flows.get(ctx.call_type);
        let (mut intent, confidence) = self.detector.detect(utterance);
        tracing::debug!(
            call_id,
            intent = %intent,
            confidence,
            state = %ctx.current_state,
            "detected intent"
        );

        if intent == Intent::OptOut {
            // During missed-call triage, "no AC" or "no heat" is a problem
            // report, not a request to stop calling. Only explicit phrasing
            // ends the call; anything else re-enters the flow as a normal
            // answer.
            if ctx.call_type == CallType::Missed && !is_explicit_opt_out(utterance) {
                intent = Intent::Continue;
            } else {
                ctx.current_state = CallState::OptedOut;
                tracing::info!(call_id, "caller opted out");
                return TurnResult {
                    prompt: OPT_OUT_PROMPT.to_string(),
                    state: CallState::OptedOut,
                    intent: Intent::OptOut,
                    should_end: true,
                    should_transfer: false,
                    data_collected: ctx.collected_data.clone(),
                    missing_fields: Vec::new(),
                    error: None,
                };
            }
        }

        if intent == Intent::Transfer {
            ctx.current_state = CallState::Transferred;
            tracing::info!(call_id, "caller requested transfer");
            return TurnResult {
                prompt: TRANSFER_PROMPT.to_string(),
                state: CallState::Transferred,
                intent: Intent::Transfer,
                should_end: false,
                should_transfer: true,
                data_collected: ctx.collected_data.clone(),
                missing_fields: Vec::new(),
                error: None,
            };
        }

        if intent == Intent::Clarification {
            // Caller asked us to repeat ourselves: re-emit the current
            // prompt without touching any state.
            let prompt = flow.get_next_prompt(ctx.current_state, ctx);
            return TurnResult {
                prompt,
                state: ctx.current_state,
                intent: Intent::Clarification,
                should_end: false,
                should_transfer: false,
                data_collected: ctx.collected_data.clone(),
                missing_fields: sorted(&ctx.missing_fields),
                error: None,
            };
        }

        // Entities ride along regardless of which state we are in.
        for (key, value) in extract_entities(utterance) {
            ctx.collected_data.insert(key, value);
        }

        let next_state = flow.process_response(ctx.current_state, utterance, ctx);
        ctx.current_state = next_state;

        let (prompt, should_end) = match next_state {
            CallState::Completed => (self.completed_prompt(ctx.call_type).to_string(), true),
            CallState::OptedOut => (OPTED_OUT_CLOSING.to_string(), true),
            _ => (flow.get_next_prompt(next_state, ctx), false),
        };
        ctx.set_last_prompt(&prompt);

        TurnResult {
            prompt,
            state: next_state,
            intent,
            should_end,
            should_transfer: false,
            data_collected: ctx.collected_data.clone(),
            missing_fields: sorted(&ctx.missing_fields),
            error: None,
        }
    }

    /// Read-only summary of an active call, or `None` if the session is
    /// unknown.
    pub fn get_call_summary(&self, call_id: &str) -> Option<CallSummary> {
        let ctx = self.active_calls.get(call_id)?;
        let flow = self.flows.get(ctx.call_type);
        Some(self.summarize(ctx.value(), &flow))
    }

    /// End a call: produce the final summary, then drop the context.
    /// Idempotent; a second call returns `None`.
    pub fn end_call(&self, call_id: &str) -> Option<CallSummary> {
        let summary = self.get_call_summary(call_id)?;
        self.active_calls.remove(call_id);
        tracing::info!(
            call_id,
            final_state = %summary.final_state,
            completeness = summary.data_completeness.score,
            "ended call"
        );
        Some(summary)
    }

    /// Number of currently active sessions.
    pub fn active_call_count(&self) -> usize {
        self.active_calls.len()
    }

    fn summarize(&self, ctx: &CallContext, flow: &FlowDefinition) -> CallSummary {
        CallSummary {
            call_id: ctx.call_id.clone(),
            call_type: ctx.call_type,
            lead_id: ctx.lead_id.clone(),
            business_name: ctx.business_name.clone(),
            contact_name: ctx.contact_name.clone(),
            final_state: ctx.current_state,
            data_collected: ctx.collected_data.clone(),
            conversation_history: ctx.conversation_history.clone(),
            data_completeness: completeness(ctx, flow),
        }
    }

    fn completed_prompt(&self, call_type: CallType) -> &'static str {
        match call_type {
            CallType::Missed => COMPLETED_CLOSING_MISSED,
            _ => COMPLETED_CLOSING,
        }
    }

    fn terminal_prompt(&self, ctx: &CallContext) -> String {
        match ctx.current_state {
            CallState::OptedOut => OPTED_OUT_CLOSING.to_string(),
            CallState::Transferred => TRANSFER_PROMPT.to_string(),
            _ => self.completed_prompt(ctx.call_type).to_string(),
        }
    }
}

/// Completeness over every required field of every state in the flow,
/// walked in sequence order so the missing list is stable.
fn completeness(ctx: &CallContext, flow: &FlowDefinition) -> DataCompleteness {
    let mut total_required = 0;
    let mut collected = 0;
    let mut missing = Vec::new();

    for state in flow.sequence() {
        let Some(spec) = flow.state(*state) else {
            continue;
        };
        for field in spec.required {
            total_required += 1;
            match ctx.collected_data.get(*field) {
                Some(value) if !value.trim().is_empty() => collected += 1,
                _ => missing.push((*field).to_string()),
            }
        }
    }

    let score = if total_required > 0 {
        ((collected as f64 / total_required as f64) * 100.0).round() / 100.0
    } else {
        0.0
    };

    DataCompleteness {
        score,
        collected,
        total_required,
        missing,
    }
}

fn sorted(fields: &std::collections::HashSet<String>) -> Vec<String> {
    let mut out: Vec<String> = fields.iter().cloned().collect();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> CallEngine {
        CallEngine::new(AgentSettings::default())
    }

    #[test]
    fn test_start_call_binds_greeting() {
        let engine = engine();
        let ctx = engine
            .start_call("call_1", CallType::Outbound, None)
            .unwrap();
        assert_eq!(ctx.current_state, CallState::Greeting);
        assert_eq!(engine.active_call_count(), 1);
    }

    #[test]
    fn test_duplicate_start_is_rejected() {
        let engine = engine();
        engine.start_call("call_1", CallType::Outbound, None).unwrap();
        let err = engine.start_call("call_1", CallType::Inbound, None);
        assert!(matches!(err, Err(EngineError::DuplicateSession(_))));
        // The original session is untouched
        let summary = engine.get_call_summary("call_1").unwrap();
        assert_eq!(summary.call_type, CallType::Outbound);
    }

    #[test]
    fn test_initial_prompt_uses_identity_fields() {
        let engine = engine();
        let fields = HashMap::from([("contact_name".to_string(), "John".to_string())]);
        engine
            .start_call("call_1", CallType::Outbound, Some(&fields))
            .unwrap();
        let prompt = engine.initial_prompt("call_1").unwrap();
        assert!(prompt.starts_with("Hi John,"));
    }

    #[test]
    fn test_unknown_session_turn_is_graceful() {
        let engine = engine();
        let result = engine.process_user_input("ghost", "hello");
        assert!(result.should_end);
        assert!(result.error.is_some());
        assert!(!result.prompt.is_empty());
    }

    #[test]
    fn test_completeness_rounds_to_two_decimals() {
        let engine = engine();
        engine.start_call("call_1", CallType::Missed, None).unwrap();
        engine.process_user_input("call_1", "Irvine, the AC died on us");
        // 2 of 5 required fields collected (location, issue)
        let summary = engine.get_call_summary("call_1").unwrap();
        assert_eq!(summary.data_completeness.collected, 2);
        assert_eq!(summary.data_completeness.total_required, 5);
        assert_eq!(summary.data_completeness.score, 0.4);
    }

    #[test]
    fn test_end_call_is_idempotent() {
        let engine = engine();
        engine.start_call("call_1", CallType::Inbound, None).unwrap();
        assert!(engine.end_call("call_1").is_some());
        assert!(engine.end_call("call_1").is_none());
        assert!(engine.get_call_summary("call_1").is_none());
    }
}
