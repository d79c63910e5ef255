//! Flow catalog
//!
//! Builds the concrete conversation scripts and hands out one immutable
//! `FlowDefinition` per call type. Definitions are constructed on first use
//! and cached for the life of the process; every session of a call type
//! shares the same instance.

use std::collections::HashMap;
use std::sync::Arc;

use afterhours_config::AgentSettings;
use afterhours_core::{CallState, CallType};
use parking_lot::RwLock;

use crate::flow::{FlowDefinition, StateSpec};

fn spec(
    prompt: impl Into<String>,
    collects: &'static [&'static str],
    required: &'static [&'static str],
    next_states: Vec<CallState>,
    timeout_secs: u32,
) -> StateSpec {
    StateSpec {
        prompt: prompt.into(),
        collects,
        required,
        next_states,
        timeout_secs: Some(timeout_secs),
    }
}

/// Discovery call placed after a form submission. The greeting doubles as a
/// consent gate; every later state digs into the lead's operations.
fn outbound_discovery(call_type: CallType, agent: &AgentSettings) -> FlowDefinition {
    let mut states = HashMap::new();

    states.insert(
        CallState::Greeting,
        spec(
            "Hi {name}, this is {agent_name}. Thanks for your interest. I'd like to learn \
             about your business so we can create a demo email you can review. Is now a good \
             time for about 10 minutes?",
            &[],
            &[],
            vec![CallState::BusinessDiscovery, CallState::OptedOut],
            30,
        ),
    );
    states.insert(
        CallState::BusinessDiscovery,
        spec(
            "Great. Let's start with your business. What does {business_name} do?",
            &["business_description", "industry", "size", "customers"],
            &["business_description"],
            vec![CallState::OperationsAssessment],
            60,
        ),
    );
    states.insert(
        CallState::OperationsAssessment,
        spec(
            "What parts of your business are still manual? What do you spend the most time \
             on that you wish was automated?",
            &["manual_tasks", "biggest_pain", "current_automation"],
            &["manual_tasks", "biggest_pain"],
            vec![CallState::DecisionMakerConfirmation],
            90,
        ),
    );
    states.insert(
        CallState::DecisionMakerConfirmation,
        spec(
            "Are you the decision-maker for operations and automation decisions? Is there \
             anyone else who would need to be involved?",
            &["is_decision_maker", "other_stakeholders"],
            &["is_decision_maker"],
            vec![CallState::TimelineInterest],
            60,
        ),
    );
    states.insert(
        CallState::TimelineInterest,
        spec(
            "When would you consider making changes to your operations? What would need to \
             be true for you to move forward?",
            &["timeline", "conditions", "preferred_communication"],
            &["timeline"],
            vec![CallState::Closing],
            60,
        ),
    );
    states.insert(
        CallState::Closing,
        spec(
            "Perfect. I'll generate a demo email based on what we discussed. We aim to send \
             it within about 24 hours for your review. Does that work?",
            &["confirmation"],
            &[],
            vec![CallState::Completed],
            30,
        ),
    );

    FlowDefinition::new(
        call_type,
        agent.persona(),
        vec![
            CallState::Greeting,
            CallState::BusinessDiscovery,
            CallState::OperationsAssessment,
            CallState::DecisionMakerConfirmation,
            CallState::TimelineInterest,
            CallState::Closing,
            CallState::Completed,
        ],
        states,
        true,
    )
}

/// Lead calls us. Shorter and more direct: understand the immediate need,
/// capture a way to follow up.
fn inbound(agent: &AgentSettings) -> FlowDefinition {
    let mut states = HashMap::new();

    states.insert(
        CallState::Greeting,
        spec(
            format!(
                "Hi, thanks for calling {}. How can I help you today?",
                agent.company_name
            ),
            &[],
            &[],
            vec![CallState::BusinessDiscovery],
            30,
        ),
    );
    states.insert(
        CallState::BusinessDiscovery,
        spec(
            "Tell me about your business and what you're looking to automate.",
            &["business_description", "immediate_need"],
            &["business_description"],
            vec![CallState::Closing],
            120,
        ),
    );
    states.insert(
        CallState::Closing,
        spec(
            "We'll follow up with a demo summary, typically within about 24 hours. What's \
             the best email to reach you?",
            &["email", "preferred_contact"],
            &["email"],
            vec![CallState::Completed],
            60,
        ),
    );

    FlowDefinition::new(
        CallType::Inbound,
        agent.persona(),
        vec![
            CallState::Greeting,
            CallState::BusinessDiscovery,
            CallState::Closing,
            CallState::Completed,
        ],
        states,
        false,
    )
}

/// After-hours receptionist for a missed call. Every state is required:
/// the call must not end without enough triage data for the on-call team.
fn missed_call(agent: &AgentSettings) -> FlowDefinition {
    let mut states = HashMap::new();

    states.insert(
        CallState::Greeting,
        spec(
            "Thanks for calling. We're currently closed, but I can take the details and \
             notify the on-call team. What city are you in, and what's going on?",
            &["location", "issue"],
            &["location", "issue"],
            vec![CallState::OperationsAssessment],
            45,
        ),
    );
    states.insert(
        CallState::OperationsAssessment,
        spec(
            "Got it. How urgent is this - no heat or AC, a water leak, a safety issue, or \
             something that can wait until tomorrow?",
            &["urgency"],
            &["urgency"],
            vec![CallState::TimelineInterest],
            45,
        ),
    );
    states.insert(
        CallState::TimelineInterest,
        spec(
            "What's the best time window tomorrow for a callback, and is text okay if we \
             can't reach you right away?",
            &["callback_window", "text_ok"],
            &["callback_window"],
            vec![CallState::Closing],
            45,
        ),
    );
    states.insert(
        CallState::Closing,
        spec(
            "Perfect. I'm logging this now and passing that window to the on-call team for \
             follow-up. If anything changes, just reply to the text or call again. What's \
             the best name to put on this?",
            &["contact_name"],
            &["contact_name"],
            vec![CallState::Completed],
            45,
        ),
    );

    FlowDefinition::new(
        CallType::Missed,
        agent.persona(),
        vec![
            CallState::Greeting,
            CallState::OperationsAssessment,
            CallState::TimelineInterest,
            CallState::Closing,
            CallState::Completed,
        ],
        states,
        false,
    )
}

/// Build the flow governing a call type. Demo requests run the same
/// discovery script as outbound calls.
pub fn build_flow(call_type: CallType, agent: &AgentSettings) -> FlowDefinition {
    match call_type {
        CallType::Outbound | CallType::DemoRequest => outbound_discovery(call_type, agent),
        CallType::Inbound => inbound(agent),
        CallType::Missed => missed_call(agent),
    }
}

/// Lazily built, process-wide flow cache. One immutable definition per
/// call type, shared by all sessions.
pub struct FlowCatalog {
    agent: AgentSettings,
    flows: RwLock<HashMap<CallType, Arc<FlowDefinition>>>,
}

impl FlowCatalog {
    pub fn new(agent: AgentSettings) -> Self {
        Self {
            agent,
            flows: RwLock::new(HashMap::new()),
        }
    }

    /// Get the flow for a call type, building it on first use.
    pub fn get(&self, call_type: CallType) -> Arc<FlowDefinition> {
        if let Some(flow) = self.flows.read().get(&call_type) {
            return Arc::clone(flow);
        }
        let built = Arc::new(build_flow(call_type, &self.agent));
        let mut flows = self.flows.write();
        Arc::clone(flows.entry(call_type).or_insert(built))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_caches_one_instance_per_type() {
        let catalog = FlowCatalog::new(AgentSettings::default());
        let a = catalog.get(CallType::Outbound);
        let b = catalog.get(CallType::Outbound);
        assert!(Arc::ptr_eq(&a, &b));

        let c = catalog.get(CallType::Missed);
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_demo_request_reuses_discovery_script() {
        let catalog = FlowCatalog::new(AgentSettings::default());
        let demo = catalog.get(CallType::DemoRequest);
        assert_eq!(demo.call_type(), CallType::DemoRequest);
        assert_eq!(demo.sequence(), catalog.get(CallType::Outbound).sequence());
    }

    #[test]
    fn test_every_sequence_state_is_defined() {
        let agent = AgentSettings::default();
        for call_type in [
            CallType::Inbound,
            CallType::Outbound,
            CallType::Missed,
            CallType::DemoRequest,
        ] {
            let flow = build_flow(call_type, &agent);
            for state in flow.sequence() {
                if *state == CallState::Completed {
                    continue;
                }
                assert!(
                    flow.state(*state).is_some(),
                    "{call_type}: no spec for {state}"
                );
            }
        }
    }

    #[test]
    fn test_missed_flow_requires_every_state() {
        let flow = build_flow(CallType::Missed, &AgentSettings::default());
        for state in flow.sequence() {
            if *state == CallState::Completed {
                continue;
            }
            let spec = flow.state(*state).unwrap();
            assert!(
                !spec.required.is_empty(),
                "missed-call state {state} must collect required data"
            );
        }
    }

    #[test]
    fn test_greeting_successors_include_decline() {
        let flow = build_flow(CallType::Outbound, &AgentSettings::default());
        let greeting = flow.state(CallState::Greeting).unwrap();
        assert!(greeting.next_states.contains(&CallState::BusinessDiscovery));
        assert!(greeting.next_states.contains(&CallState::OptedOut));

        let inbound = build_flow(CallType::Inbound, &AgentSettings::default());
        let greeting = inbound.state(CallState::Greeting).unwrap();
        assert!(!greeting.next_states.contains(&CallState::OptedOut));
    }

    #[test]
    fn test_timeout_hints_are_advisory_metadata() {
        let flow = build_flow(CallType::Outbound, &AgentSettings::default());
        let greeting = flow.state(CallState::Greeting).unwrap();
        assert_eq!(greeting.timeout_secs, Some(30));
    }
}
