//! Built-in rules.
//!
//! Grouped by category and registered as *reserved* names into a
//! [`RuleRegistry`]. Semantics operate on `serde_json::Value`: rules see
//! the field's value plus its resolved parameters, where `has_target`
//! parameters have already been substituted with the referenced field's
//! live value.
//!
//! `Null` values skip every rule except the `required` family; a
//! missing optional field is not "too short"; emptiness is owned by
//! `required`/`required_if` (the pipeline enforces this, see
//! `Validator`).

pub mod basic;
pub mod content;
pub mod numeric;
pub mod target;

use serde_json::Value;

use crate::messages::display_value;
use crate::registry::RuleRegistry;

/// Registers every built-in rule, marking the names reserved.
pub fn register_builtins(registry: &RuleRegistry) {
    basic::register(registry);
    numeric::register(registry);
    content::register(registry);
    target::register(registry);
}

// ----------------------------------------------------------------------
// shared value helpers
// ----------------------------------------------------------------------

/// Emptiness as the `required` family sees it.
pub(crate) fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Truthiness for condition parameters (`required_if` without an
/// expected value).
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        other => !is_empty(other),
    }
}

/// Unquoted string form of a value.
pub(crate) fn text(value: &Value) -> String {
    display_value(value)
}

/// Length as the `min`/`max`/`length` rules see it: chars of the string
/// form for scalars, element count for arrays.
pub(crate) fn value_len(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        other => text(other).chars().count(),
    }
}

/// Numeric interpretation: JSON numbers directly, strings parsed.
pub(crate) fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parameter parsed as `f64` via its string form.
pub(crate) fn param_f64(params: &[Value], index: usize) -> Option<f64> {
    params.get(index).and_then(as_f64)
}

/// Parameter parsed as `usize` via its string form.
pub(crate) fn param_usize(params: &[Value], index: usize) -> Option<usize> {
    params
        .get(index)
        .map(text)
        .and_then(|s| s.trim().parse().ok())
}

/// Attach-time check that every parameter parses as a number.
pub(crate) fn numeric_params(params: &[String]) -> Result<(), String> {
    for param in params {
        if param.trim().parse::<f64>().is_err() {
            return Err(format!("parameter '{param}' is not numeric"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emptiness() {
        assert!(is_empty(&Value::Null));
        assert!(is_empty(&json!("")));
        assert!(is_empty(&json!([])));
        assert!(!is_empty(&json!(0)));
        assert!(!is_empty(&json!(false)));
        assert!(!is_empty(&json!("x")));
    }

    #[test]
    fn lengths() {
        assert_eq!(value_len(&json!("héllo")), 5);
        assert_eq!(value_len(&json!([1, 2, 3])), 3);
        assert_eq!(value_len(&json!(1234)), 4);
    }

    #[test]
    fn numeric_interpretation() {
        assert_eq!(as_f64(&json!(3.5)), Some(3.5));
        assert_eq!(as_f64(&json!(" 42 ")), Some(42.0));
        assert_eq!(as_f64(&json!([1])), None);
    }

    #[test]
    fn numeric_param_check() {
        assert!(numeric_params(&["3".into(), "10".into()]).is_ok());
        assert!(numeric_params(&["ten".into()]).is_err());
    }
}
