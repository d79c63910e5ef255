//! Entity extraction
//!
//! Independent pass over the raw utterance. Extraction is total: absent
//! entities are simply omitted from the returned map, and nothing here can
//! fail. First match wins everywhere.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").unwrap());

/// Business-size buckets, checked in order.
static SIZE_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("solo", Regex::new(r"\b(solo|just me|only me|one person)\b").unwrap()),
        (
            "small",
            Regex::new(r"\b(\d+[- ]?(employees|people|staff)|small team|few people)\b").unwrap(),
        ),
        (
            "medium",
            Regex::new(r"\b(\d+[- ]?(employees|people|staff)|medium|growing team)\b").unwrap(),
        ),
    ]
});

/// Industry keyword buckets, checked in order. First bucket with any hit wins.
const INDUSTRY_KEYWORDS: &[(&str, &[&str])] = &[
    ("legal", &["law", "attorney", "lawyer", "legal", "law firm"]),
    ("healthcare", &["health", "medical", "doctor", "clinic", "hospital"]),
    ("real_estate", &["real estate", "realtor", "property", "realty"]),
    ("professional_services", &["consulting", "consultant", "advisory", "services"]),
    ("ecommerce", &["ecommerce", "online store", "shop", "retail"]),
    ("local_services", &["plumber", "electrician", "contractor", "local"]),
];

/// Extract structured entities from an utterance.
///
/// Returns a partial map with any subset of `email`, `phone`,
/// `business_size` and `industry`.
pub fn extract_entities(text: &str) -> HashMap<String, String> {
    let mut entities = HashMap::new();
    let lower = text.to_lowercase();

    if let Some(m) = EMAIL_PATTERN.find(text) {
        entities.insert("email".to_string(), m.as_str().to_string());
    }

    if let Some(m) = PHONE_PATTERN.find(text) {
        entities.insert("phone".to_string(), m.as_str().to_string());
    }

    for (size, pattern) in SIZE_PATTERNS.iter() {
        if pattern.is_match(&lower) {
            entities.insert("business_size".to_string(), (*size).to_string());
            break;
        }
    }

    for (industry, keywords) in INDUSTRY_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            entities.insert("industry".to_string(), (*industry).to_string());
            break;
        }
    }

    entities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_extraction() {
        let entities = extract_entities("My email is john@example.com, thanks");
        assert_eq!(entities.get("email").map(String::as_str), Some("john@example.com"));
    }

    #[test]
    fn test_phone_extraction() {
        let entities = extract_entities("Reach me at 555-123-4567 after six");
        assert_eq!(entities.get("phone").map(String::as_str), Some("555-123-4567"));

        let entities = extract_entities("call 5551234567");
        assert_eq!(entities.get("phone").map(String::as_str), Some("5551234567"));
    }

    #[test]
    fn test_business_size_first_match_wins() {
        let entities = extract_entities("It's just me right now");
        assert_eq!(entities.get("business_size").map(String::as_str), Some("solo"));

        // "10 employees" matches both small and medium patterns; small is
        // checked first and wins.
        let entities = extract_entities("We have 10 employees");
        assert_eq!(entities.get("business_size").map(String::as_str), Some("small"));
    }

    #[test]
    fn test_industry_buckets() {
        let entities = extract_entities("We're a small law firm");
        assert_eq!(entities.get("industry").map(String::as_str), Some("legal"));

        let entities = extract_entities("I run a plumbing business, local only");
        assert_eq!(
            entities.get("industry").map(String::as_str),
            Some("local_services")
        );
    }

    #[test]
    fn test_absent_entities_are_omitted() {
        let entities = extract_entities("tomorrow morning works");
        assert!(entities.is_empty());
    }

    #[test]
    fn test_multiple_entities_in_one_utterance() {
        let entities =
            extract_entities("I'm a realtor, email me at sue@homes.net or call 949-555-0100");
        assert_eq!(entities.get("industry").map(String::as_str), Some("real_estate"));
        assert_eq!(entities.get("email").map(String::as_str), Some("sue@homes.net"));
        assert_eq!(entities.get("phone").map(String::as_str), Some("949-555-0100"));
    }
}
