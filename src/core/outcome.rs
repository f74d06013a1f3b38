//! Rule outcome and aggregate result types.
//!
//! A rule check either resolves synchronously ([`Outcome::Done`]) or hands
//! back a future ([`Outcome::Pending`]). The distinction matters: the bail
//! policy reacts to synchronous failures immediately, while pending
//! results are aggregated at the end of the pass.

use std::collections::HashMap;
use std::future::Future;

use futures::future::BoxFuture;
use serde::Serialize;

// ============================================================================
// RULE OUTPUT
// ============================================================================

/// What a single rule reported.
///
/// Most rules only produce `valid`; rules flagged `computes_required`
/// (`required`, `required_if`) additionally force the field's `required`
/// flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOutput {
    /// Whether the rule passed.
    pub valid: bool,
    /// Forced value for the field's `required` flag, if this rule
    /// computes one.
    pub required: Option<bool>,
}

impl RuleOutput {
    /// A passing output with no `required` information.
    pub fn passed() -> Self {
        Self {
            valid: true,
            required: None,
        }
    }

    /// A failing output with no `required` information.
    pub fn failed() -> Self {
        Self {
            valid: false,
            required: None,
        }
    }

    /// Attaches a forced `required` value.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }
}

impl From<bool> for RuleOutput {
    fn from(valid: bool) -> Self {
        Self {
            valid,
            required: None,
        }
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Result of invoking a rule's check: immediate or pending.
pub enum Outcome {
    /// The rule resolved synchronously.
    Done(RuleOutput),
    /// The rule is asynchronous; the result arrives through this future.
    Pending(BoxFuture<'static, RuleOutput>),
}

impl Outcome {
    /// Shorthand for a synchronous boolean outcome.
    pub fn done(valid: bool) -> Self {
        Self::Done(valid.into())
    }

    /// Wraps a future into a pending outcome.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = RuleOutput> + Send + 'static,
    {
        Self::Pending(Box::pin(future))
    }
}

impl From<bool> for Outcome {
    fn from(valid: bool) -> Self {
        Self::done(valid)
    }
}

impl From<RuleOutput> for Outcome {
    fn from(output: RuleOutput) -> Self {
        Self::Done(output)
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Done(output) => f.debug_tuple("Done").field(output).finish(),
            Self::Pending(_) => f.debug_tuple("Pending").field(&"..").finish(),
        }
    }
}

// ============================================================================
// AGGREGATE RESULT
// ============================================================================

/// Aggregate result of one validation pass over a field (or of a
/// stateless `verify` call).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    /// True iff every executed rule passed.
    pub valid: bool,
    /// Resolved failure messages, in rule declaration order.
    pub errors: Vec<String>,
    /// Failed rule name -> resolved message.
    pub failed_rules: HashMap<String, String>,
}

impl ValidationResult {
    /// A passing result with no failures.
    pub fn passing() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            failed_rules: HashMap::new(),
        }
    }

    /// Builds a result from `(rule, message)` failures in declaration
    /// order. Valid iff the list is empty.
    pub fn from_failures(failures: Vec<(String, String)>) -> Self {
        let valid = failures.is_empty();
        let errors = failures.iter().map(|(_, msg)| msg.clone()).collect();
        let failed_rules = failures.into_iter().collect();
        Self {
            valid,
            errors,
            failed_rules,
        }
    }
}

/// Result shape returned by `Validator::verify`.
pub type VerifyResult = ValidationResult;
