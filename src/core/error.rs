//! Structural error taxonomy for the engine.
//!
//! Only *structural* problems are errors: an unknown rule name, a
//! malformed rule specification, a selector that matches no field.
//! A rule predicate returning `false` is normal validation failure and
//! becomes an [`ErrorBag`](crate::error_bag::ErrorBag) entry, never an
//! `Err`.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type ValidatorResult<T> = Result<T, ValidatorError>;

/// Errors raised by the validation engine itself.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// A validation or verify call referenced a rule name that is not
    /// registered. Fatal to that call.
    #[error("unknown rule '{name}'")]
    UnknownRule {
        /// The unresolved rule name.
        name: String,
    },

    /// Malformed rule DSL, a reserved-name collision without an explicit
    /// overwrite, or a missing/invalid declared parameter. Fatal at
    /// attach/extend time.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A selector passed to `validate`/`notify` matched no attached field.
    #[error("no field matches selector '{selector}'")]
    FieldNotFound {
        /// The selector as given by the caller.
        selector: String,
    },
}

impl ValidatorError {
    /// Creates an [`ValidatorError::UnknownRule`].
    pub fn unknown_rule(name: impl Into<String>) -> Self {
        Self::UnknownRule { name: name.into() }
    }

    /// Creates a [`ValidatorError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a [`ValidatorError::FieldNotFound`].
    pub fn field_not_found(selector: impl Into<String>) -> Self {
        Self::FieldNotFound {
            selector: selector.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = ValidatorError::unknown_rule("flux");
        assert_eq!(err.to_string(), "unknown rule 'flux'");

        let err = ValidatorError::configuration("rule 'min' expects 1 parameter");
        assert!(err.to_string().contains("min"));

        let err = ValidatorError::field_not_found("billing.zip");
        assert!(err.to_string().contains("billing.zip"));
    }
}
