//! Prompt template rendering
//!
//! Templates carry `{name}`, `{agent_name}` and `{business_name}`
//! placeholders. Rendering is a plain substitution over an explicit
//! variable list; templates never embed logic.

/// Fill `{key}` placeholders from the given variables. Unknown placeholders
/// are left in place.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_all_vars() {
        let out = render(
            "Hi {name}, this is {agent_name}.",
            &[("name", "John"), ("agent_name", "Sarah from Afterhours")],
        );
        assert_eq!(out, "Hi John, this is Sarah from Afterhours.");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let out = render("Hello {name}, {weather} today", &[("name", "Ana")]);
        assert_eq!(out, "Hello Ana, {weather} today");
    }

    #[test]
    fn test_render_without_placeholders_is_identity() {
        let out = render("How can I help you today?", &[("name", "Ana")]);
        assert_eq!(out, "How can I help you today?");
    }
}
