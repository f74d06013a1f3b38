//! Content and pattern rules.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::registry::{RuleBuilder, RuleRegistry};
use crate::rules::text;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Pragmatic check, not RFC 5322: one '@', no whitespace, dotted domain.
    PATTERN.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static pattern"))
}

pub(crate) fn register(registry: &RuleRegistry) {
    registry.extend_reserved(
        "alpha",
        RuleBuilder::sync(|value, _| match value {
            Value::String(s) => !s.is_empty() && s.chars().all(char::is_alphabetic),
            _ => false,
        })
        .build(),
    );

    registry.extend_reserved(
        "alpha_num",
        RuleBuilder::sync(|value, _| match value {
            Value::String(s) => !s.is_empty() && s.chars().all(char::is_alphanumeric),
            Value::Number(_) => true,
            _ => false,
        })
        .build(),
    );

    registry.extend_reserved(
        "email",
        RuleBuilder::sync(|value, _| match value {
            Value::String(s) => email_pattern().is_match(s),
            _ => false,
        })
        .build(),
    );

    // The pattern is validated at attach time; a pattern that stops
    // compiling afterwards (registry swapped underneath) just fails.
    registry.extend_reserved(
        "regex",
        RuleBuilder::sync(|value, params| {
            let Some(pattern) = params.first().map(text) else {
                return false;
            };
            match Regex::new(&pattern) {
                Ok(re) => re.is_match(&text(value)),
                Err(_) => false,
            }
        })
        .params(&["pattern"])
        .param_check(|params| {
            Regex::new(&params[0])
                .map(|_| ())
                .map_err(|err| format!("invalid pattern: {err}"))
        })
        .build(),
    );

    registry.extend_reserved(
        "is_in",
        RuleBuilder::sync(|value, params| {
            let needle = text(value);
            params.iter().any(|p| text(p) == needle)
        })
        .params(&["values"])
        .min_params(1)
        .build(),
    );

    registry.extend_reserved(
        "not_in",
        RuleBuilder::sync(|value, params| {
            let needle = text(value);
            params.iter().all(|p| text(p) != needle)
        })
        .params(&["values"])
        .min_params(1)
        .build(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::Outcome;
    use serde_json::json;

    fn passes(rule: &str, value: Value, params: &[Value]) -> bool {
        let registry = RuleRegistry::empty();
        register(&registry);
        match registry.resolve(rule).unwrap().check(&value, params) {
            Outcome::Done(out) => out.valid,
            Outcome::Pending(_) => panic!("content rules are synchronous"),
        }
    }

    #[test]
    fn alpha_family() {
        assert!(passes("alpha", json!("héllo"), &[]));
        assert!(!passes("alpha", json!("abc1"), &[]));
        assert!(!passes("alpha", json!(""), &[]));
        assert!(passes("alpha_num", json!("abc123"), &[]));
        assert!(passes("alpha_num", json!(42), &[]));
        assert!(!passes("alpha_num", json!("a b"), &[]));
    }

    #[test]
    fn email() {
        assert!(passes("email", json!("a@b.co"), &[]));
        assert!(!passes("email", json!("not-an-email"), &[]));
        assert!(!passes("email", json!("a b@c.d"), &[]));
        assert!(!passes("email", json!(5), &[]));
    }

    #[test]
    fn regex_matches_pattern() {
        assert!(passes("regex", json!("abc-123"), &[json!(r"^[a-z]+-\d+$")]));
        assert!(!passes("regex", json!("abc"), &[json!(r"^\d+$")]));
        // invalid pattern at runtime fails closed
        assert!(!passes("regex", json!("abc"), &[json!("[a-z")]));
    }

    #[test]
    fn membership() {
        let options = [json!("a"), json!("b"), json!("3")];
        assert!(passes("is_in", json!("a"), &options));
        assert!(passes("is_in", json!(3), &options));
        assert!(!passes("is_in", json!("z"), &options));
        assert!(passes("not_in", json!("z"), &options));
        assert!(!passes("not_in", json!("b"), &options));
    }
}
