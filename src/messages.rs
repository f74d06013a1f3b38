//! Message resolution seam.
//!
//! Localization is an external collaborator: the engine only consumes
//! this interface when turning a failed rule into an [`ErrorBag`]
//! entry. [`DefaultMessages`] ships pragmatic English templates so the
//! engine is usable standalone.
//!
//! [`ErrorBag`]: crate::error_bag::ErrorBag

use serde_json::Value;

/// Resolves a display message for a failed rule.
///
/// `field` is the field's display name (alias when set), `params` are the
/// rule parameters after target substitution.
pub trait MessageResolver: Send + Sync {
    /// Produces the message for one failed rule.
    fn resolve(&self, field: &str, rule: &str, params: &[Value]) -> String;
}

/// Built-in English messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl DefaultMessages {
    fn param(params: &[Value], index: usize) -> String {
        params.get(index).map(display_value).unwrap_or_default()
    }
}

impl MessageResolver for DefaultMessages {
    fn resolve(&self, field: &str, rule: &str, params: &[Value]) -> String {
        let p = |i| Self::param(params, i);
        match rule {
            "required" | "required_if" => format!("The {field} field is required."),
            "min" => format!("The {field} field must be at least {} characters.", p(0)),
            "max" => format!(
                "The {field} field may not be greater than {} characters.",
                p(0)
            ),
            "length" => format!("The {field} field must be {} characters long.", p(0)),
            "numeric" => format!("The {field} field may only contain numeric characters."),
            "integer" => format!("The {field} field must be an integer."),
            "min_value" => format!("The {field} field must be {} or more.", p(0)),
            "max_value" => format!("The {field} field must be {} or less.", p(0)),
            "between" => format!("The {field} field must be between {} and {}.", p(0), p(1)),
            "alpha" => format!("The {field} field may only contain alphabetic characters."),
            "alpha_num" => format!("The {field} field may only contain alpha-numeric characters."),
            "email" => format!("The {field} field must be a valid email."),
            "regex" => format!("The {field} field format is invalid."),
            "is_in" => format!("The {field} field must be a valid value."),
            "not_in" => format!("The {field} field must be a valid value."),
            "confirmed" => format!("The {field} confirmation does not match."),
            "is" => format!("The {field} field does not match the expected value."),
            _ => format!("The {field} field is invalid."),
        }
    }
}

/// Renders a parameter value without JSON quoting for strings.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
