//! Caller intent vocabulary

use serde::{Deserialize, Serialize};

/// Intent detected from a caller utterance.
///
/// The set is closed: the classifier always maps an utterance to exactly one
/// of these, with `Unknown` as the floor. Safety-relevant intents (`OptOut`,
/// `Transfer`) are checked before everything else so that generic yes/no
/// matches can never mask them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Caller wants to keep going
    Continue,
    /// Caller wants to stop or be removed from the list
    OptOut,
    /// Caller asked the agent to repeat itself
    Clarification,
    /// Caller wants a human
    Transfer,
    /// Yes / agreement
    Affirmative,
    /// No / disagreement
    Negative,
    /// Caller is asking a question
    Question,
    /// Could not determine intent
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Continue => "continue",
            Intent::OptOut => "opt_out",
            Intent::Clarification => "clarification",
            Intent::Transfer => "transfer",
            Intent::Affirmative => "affirmative",
            Intent::Negative => "negative",
            Intent::Question => "question",
            Intent::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        assert_eq!(serde_json::to_string(&Intent::OptOut).unwrap(), "\"opt_out\"");
        assert_eq!(Intent::Clarification.as_str(), "clarification");
    }
}
