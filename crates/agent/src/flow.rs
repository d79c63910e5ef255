//! Flow definitions
//!
//! A `FlowDefinition` is a stateless description of one conversation type:
//! for every dialogue state, the prompt to speak, the fields that state
//! tries to collect, its legal successors, and an advisory response timeout
//! for the telephony layer. Definitions are immutable once built and shared
//! read-only by every session of their call type.
//!
//! All flows share one `process_response` algorithm; they differ only in
//! their state sequence, per-state data requirements, and whether the
//! greeting doubles as a consent gate.

use std::collections::HashMap;

use afterhours_core::{CallContext, CallState, CallType};
use once_cell::sync::Lazy;

use crate::template;

/// Spoken when a prompt is requested for a state the flow does not define.
const FALLBACK_PROMPT: &str = "I'm sorry, I didn't understand. Could you repeat that?";

/// Clarifying questions by field name. Fields without an entry get a
/// synthesized generic question.
static CLARIFYING_QUESTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            "business_description",
            "Could you tell me more about what your business does?",
        ),
        ("industry", "What industry would you say you're in?"),
        ("manual_tasks", "What tasks are you doing manually right now?"),
        ("biggest_pain", "What's the biggest challenge you're facing?"),
        (
            "is_decision_maker",
            "Are you able to make decisions about operations and automation?",
        ),
        ("timeline", "When would you consider making changes?"),
        ("email", "What's the best email address to reach you?"),
        ("phone", "What's the best phone number to reach you?"),
    ])
});

/// Greeting replies that decline the call itself. Kept to explicit phrases
/// so a caller describing a problem ("no AC", "no heat") is never counted
/// as declining.
const GREETING_DECLINE_PHRASES: &[&str] = &[
    "no thanks",
    "no thank you",
    "not now",
    "call later",
    "later",
    "busy",
    "stop calling",
    "don't call",
    "do not call",
];

/// A reply that is essentially just "no".
const GREETING_SHORT_NO: &[&str] = &["no", "nah", "nope"];

/// Greeting replies that confirm the caller wants to proceed.
const GREETING_PROCEED_WORDS: &[&str] = &["yes", "sure", "okay", "ok", "fine", "yep", "yeah"];

/// Per-state descriptor.
#[derive(Debug, Clone)]
pub struct StateSpec {
    /// Prompt template; may carry `{name}`, `{agent_name}` and
    /// `{business_name}` placeholders
    pub prompt: String,
    /// Fields this state attempts to collect from the caller's answer
    pub collects: &'static [&'static str],
    /// Minimum fields that must be present before moving on
    pub required: &'static [&'static str],
    /// Legal successor states
    pub next_states: Vec<CallState>,
    /// Advisory response timeout for the telephony layer; not enforced here
    pub timeout_secs: Option<u32>,
}

/// A complete conversation script for one call type.
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    call_type: CallType,
    /// How the agent introduces itself in prompts
    persona: String,
    /// Fixed linear state order, ending in `Completed`
    sequence: Vec<CallState>,
    states: HashMap<CallState, StateSpec>,
    /// Whether the greeting is a yes/no consent gate that can opt the
    /// caller out (outbound and demo-request flows)
    opt_out_on_greeting: bool,
}

impl FlowDefinition {
    pub fn new(
        call_type: CallType,
        persona: impl Into<String>,
        sequence: Vec<CallState>,
        states: HashMap<CallState, StateSpec>,
        opt_out_on_greeting: bool,
    ) -> Self {
        Self {
            call_type,
            persona: persona.into(),
            sequence,
            states,
            opt_out_on_greeting,
        }
    }

    pub fn call_type(&self) -> CallType {
        self.call_type
    }

    pub fn sequence(&self) -> &[CallState] {
        &self.sequence
    }

    pub fn state(&self, state: CallState) -> Option<&StateSpec> {
        self.states.get(&state)
    }

    /// The prompt to speak for the given state, with placeholders filled
    /// from the context.
    pub fn get_next_prompt(&self, state: CallState, ctx: &CallContext) -> String {
        if state == CallState::Clarifying {
            return self.clarifying_prompt(ctx);
        }
        match self.states.get(&state) {
            Some(spec) => self.render_prompt(&spec.prompt, ctx),
            None => FALLBACK_PROMPT.to_string(),
        }
    }

    fn render_prompt(&self, tpl: &str, ctx: &CallContext) -> String {
        template::render(
            tpl,
            &[
                ("name", ctx.contact_name.as_deref().unwrap_or("there")),
                ("agent_name", &self.persona),
                (
                    "business_name",
                    ctx.business_name.as_deref().unwrap_or("your business"),
                ),
            ],
        )
    }

    fn clarifying_prompt(&self, ctx: &CallContext) -> String {
        let target = ctx.clarifying_for.unwrap_or(ctx.current_state);
        let missing = self.missing_in_declared_order(target, ctx);
        match self.clarifying_question(&missing) {
            Some(question) => question,
            // Nothing left to clarify: fall back to the target state's prompt
            None => match self.states.get(&target) {
                Some(spec) => self.render_prompt(&spec.prompt, ctx),
                None => FALLBACK_PROMPT.to_string(),
            },
        }
    }

    /// Question for the first missing field, from the fixed table where one
    /// exists, synthesized otherwise.
    pub fn clarifying_question(&self, missing: &[String]) -> Option<String> {
        let first = missing.first()?;
        for field in missing {
            if let Some(question) = CLARIFYING_QUESTIONS.get(field.as_str()) {
                return Some((*question).to_string());
            }
        }
        Some(format!("Could you provide more details about {first}?"))
    }

    /// Check whether the state's required fields are all present with
    /// non-empty values. Returns `(is_complete, missing)` with missing
    /// fields in declared order.
    pub fn check_completeness(&self, state: CallState, ctx: &CallContext) -> (bool, Vec<String>) {
        let required = self
            .states
            .get(&state)
            .map(|s| s.required)
            .unwrap_or_default();
        let missing: Vec<String> = required
            .iter()
            .filter(|field| {
                ctx.collected_data
                    .get(**field)
                    .map_or(true, |v| v.trim().is_empty())
            })
            .map(|field| (*field).to_string())
            .collect();
        (missing.is_empty(), missing)
    }

    fn missing_in_declared_order(&self, state: CallState, ctx: &CallContext) -> Vec<String> {
        let required = self
            .states
            .get(&state)
            .map(|s| s.required)
            .unwrap_or_default();
        required
            .iter()
            .filter(|field| ctx.missing_fields.contains(**field))
            .map(|field| (*field).to_string())
            .collect()
    }

    /// Next state along the fixed linear sequence. The last non-terminal
    /// state advances to `Completed`, as does anything off-sequence.
    pub fn advance(&self, state: CallState) -> CallState {
        match self.sequence.iter().position(|s| *s == state) {
            Some(i) if i + 1 < self.sequence.len() => self.sequence[i + 1],
            _ => CallState::Completed,
        }
    }

    /// Process a caller response in the given state and return the next
    /// state. Mutates only the supplied context.
    pub fn process_response(
        &self,
        state: CallState,
        response: &str,
        ctx: &mut CallContext,
    ) -> CallState {
        ctx.add_to_history(state, response);
        let answered = !response.trim().is_empty();

        if state == CallState::Clarifying {
            return self.process_clarification(response, answered, ctx);
        }

        // Store the raw answer for every field this state collects.
        if answered {
            if let Some(spec) = self.states.get(&state) {
                for field in spec.collects {
                    ctx.collected_data
                        .insert((*field).to_string(), response.to_string());
                    ctx.missing_fields.remove(*field);
                }
            }
        }

        // Required data missing: switch to a clarifying question.
        let (complete, missing) = self.check_completeness(state, ctx);
        if !complete {
            ctx.missing_fields = missing.into_iter().collect();
            ctx.clarification_count = 1;
            ctx.clarifying_for = Some(state);
            return CallState::Clarifying;
        }

        // On consent-gated flows the greeting decides between proceeding
        // and declining.
        if state == CallState::Greeting && self.opt_out_on_greeting {
            let lower = response.trim().to_lowercase();
            let declined = GREETING_DECLINE_PHRASES.iter().any(|p| lower.contains(p))
                || GREETING_SHORT_NO.contains(&lower.as_str());
            if declined {
                return CallState::OptedOut;
            }
            if GREETING_PROCEED_WORDS.iter().any(|w| lower.contains(w)) {
                return CallState::BusinessDiscovery;
            }
        }

        self.advance(state)
    }

    /// One pass through the clarification loop: fill what the answer
    /// covers, then either resume the clarified state's successor or ask
    /// again, bounded by `max_clarifications`.
    fn process_clarification(
        &self,
        response: &str,
        answered: bool,
        ctx: &mut CallContext,
    ) -> CallState {
        let target = ctx.clarifying_for.unwrap_or(ctx.current_state);

        // A non-blank clarification answer covers the fields we asked for,
        // unless something else (entity extraction) already filled them.
        if answered {
            let unfilled: Vec<String> = ctx
                .missing_fields
                .iter()
                .filter(|field| {
                    ctx.collected_data
                        .get(*field)
                        .map_or(true, |v| v.trim().is_empty())
                })
                .cloned()
                .collect();
            for field in unfilled {
                ctx.collected_data.insert(field, response.to_string());
            }
        }

        let (complete, missing) = self.check_completeness(target, ctx);
        if complete {
            ctx.missing_fields.clear();
            ctx.clarifying_for = None;
            return self.advance(target);
        }

        ctx.missing_fields = missing.into_iter().collect();
        if ctx.clarification_count >= ctx.max_clarifications {
            // Never stall a caller indefinitely; move on with what we have.
            ctx.clarifying_for = None;
            return self.advance(target);
        }

        ctx.clarification_count += 1;
        CallState::Clarifying
    }
}
