//! Intent detection
//!
//! Rule-based classification over lowercased utterances. Rules are checked
//! in strict priority order; the order is a contract, not an accident:
//! opt-out and transfer must win over generic yes/no matches so that
//! "no thanks" ends the call instead of reading as bare negation.

use afterhours_core::Intent;
use once_cell::sync::Lazy;
use regex::Regex;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

static OPT_OUT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(no|not interested|stop|don't call|remove|unsubscribe)\b",
        r"\b(not now|maybe later|another time)\b",
        r"\b(too busy|don't have time)\b",
    ])
});

static TRANSFER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(speak to|talk to|human|person|representative|agent)\b",
        r"\b(transfer|connect me|put me through)\b",
    ])
});

static CLARIFICATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(repeat|say that again|what did you say|didn't catch that)\b",
        r"\b(what do you mean|clarify|explain)\b",
    ])
});

static QUESTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\?",
        r"\b(what|how|why|when|where|who|can you|do you)\b",
        r"\b(explain|tell me|help me understand)\b",
    ])
});

static AFFIRMATIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(yes|yeah|yep|sure|okay|ok|fine|absolutely|definitely)\b",
        r"\b(that works|sounds good|perfect|great)\b",
    ])
});

static NEGATIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"\b(no|nope|nah|not really|don't think so)\b",
        r"\b(not sure|don't know|maybe not)\b",
    ])
});

/// Phrases that unambiguously ask us to stop contacting the caller.
///
/// This list is deliberately narrower than `OPT_OUT_PATTERNS`: during
/// missed-call triage, "no AC" or "no heat" is a problem report, and only
/// these explicit phrasings should end the conversation.
const EXPLICIT_OPT_OUT_PHRASES: &[&str] = &[
    "remove me",
    "unsubscribe",
    "stop calling",
    "do not call",
    "don't call",
    "no thanks",
    "not interested",
];

fn matches_any(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

/// Check whether an utterance contains an explicit opt-out phrase.
pub fn is_explicit_opt_out(text: &str) -> bool {
    let lower = text.to_lowercase();
    EXPLICIT_OPT_OUT_PHRASES.iter().any(|p| lower.contains(p))
}

/// Rule-based intent detector.
///
/// `detect` is total and deterministic: every utterance maps to exactly one
/// `(Intent, confidence)` pair.
#[derive(Debug, Default)]
pub struct IntentDetector;

impl IntentDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, text: &str) -> (Intent, f32) {
        let lower = text.trim().to_lowercase();
        if lower.is_empty() {
            return (Intent::Unknown, 0.0);
        }

        // Opt-out first: respect it immediately, never mask it
        if matches_any(&OPT_OUT_PATTERNS, &lower) || matches!(lower.as_str(), "nah" | "nope") {
            return (Intent::OptOut, 0.9);
        }

        if matches_any(&TRANSFER_PATTERNS, &lower) {
            return (Intent::Transfer, 0.85);
        }

        if matches_any(&CLARIFICATION_PATTERNS, &lower) {
            return (Intent::Clarification, 0.8);
        }

        if matches_any(&QUESTION_PATTERNS, &lower) {
            return (Intent::Question, 0.75);
        }

        if matches_any(&AFFIRMATIVE_PATTERNS, &lower) {
            return (Intent::Affirmative, 0.7);
        }

        if matches_any(&NEGATIVE_PATTERNS, &lower) {
            return (Intent::Negative, 0.7);
        }

        // Substantial free text reads as a real answer
        if lower.chars().count() > 10 {
            (Intent::Continue, 0.6)
        } else {
            (Intent::Unknown, 0.3)
        }
    }
}
