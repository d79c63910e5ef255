//! Call classification and dialogue phases

use serde::{Deserialize, Serialize};

/// Type of call being handled. Fixed after session start; selects which
/// flow definition governs the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    /// Lead calls us
    Inbound,
    /// We call the lead
    #[default]
    Outbound,
    /// Missed call, needs triage and callback
    Missed,
    /// Lead requested a demo via form
    DemoRequest,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Inbound => "inbound",
            CallType::Outbound => "outbound",
            CallType::Missed => "missed",
            CallType::DemoRequest => "demo_request",
        }
    }

    /// Parse a wire-format call type. Callers at the integration boundary
    /// decide what to do with unrecognized input (the server falls back to
    /// `Outbound` and logs it).
    pub fn parse(s: &str) -> Option<CallType> {
        match s.trim().to_lowercase().as_str() {
            "inbound" => Some(CallType::Inbound),
            "outbound" => Some(CallType::Outbound),
            "missed" => Some(CallType::Missed),
            "demo_request" => Some(CallType::DemoRequest),
            _ => None,
        }
    }
}

impl std::fmt::Display for CallType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current phase in the conversation flow.
///
/// `Completed`, `Transferred` and `OptedOut` are terminal: once reached, a
/// session accepts no further transitions and must be ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    #[default]
    Greeting,
    BusinessDiscovery,
    OperationsAssessment,
    DecisionMakerConfirmation,
    TimelineInterest,
    Closing,
    Completed,
    Transferred,
    OptedOut,
    /// Re-asking for required data the caller did not provide
    Clarifying,
    /// Session ended with required data still missing
    DataIncomplete,
}

impl CallState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallState::Greeting => "greeting",
            CallState::BusinessDiscovery => "business_discovery",
            CallState::OperationsAssessment => "operations_assessment",
            CallState::DecisionMakerConfirmation => "decision_maker_confirmation",
            CallState::TimelineInterest => "timeline_interest",
            CallState::Closing => "closing",
            CallState::Completed => "completed",
            CallState::Transferred => "transferred",
            CallState::OptedOut => "opted_out",
            CallState::Clarifying => "clarifying",
            CallState::DataIncomplete => "data_incomplete",
        }
    }

    /// Whether this state ends the conversation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallState::Completed | CallState::Transferred | CallState::OptedOut
        )
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_type_parse() {
        assert_eq!(CallType::parse("inbound"), Some(CallType::Inbound));
        assert_eq!(CallType::parse(" Demo_Request "), Some(CallType::DemoRequest));
        assert_eq!(CallType::parse("video"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(CallState::Completed.is_terminal());
        assert!(CallState::Transferred.is_terminal());
        assert!(CallState::OptedOut.is_terminal());
        assert!(!CallState::Greeting.is_terminal());
        assert!(!CallState::Clarifying.is_terminal());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&CallState::BusinessDiscovery).unwrap();
        assert_eq!(json, "\"business_discovery\"");
        let json = serde_json::to_string(&CallType::DemoRequest).unwrap();
        assert_eq!(json, "\"demo_request\"");
    }
}
