//! Cross-field comparison rules.
//!
//! Parameters of these rules name another field; by the time the check
//! runs, the pipeline has substituted the named field's *current* value.

use crate::registry::{RuleBuilder, RuleRegistry};
use crate::rules::text;

pub(crate) fn register(registry: &RuleRegistry) {
    // Loose comparison on the string form, matching how form inputs
    // deliver everything as text.
    registry.extend_reserved(
        "confirmed",
        RuleBuilder::sync(|value, params| {
            params.first().map(text) == Some(text(value))
        })
        .params(&["target"])
        .has_target()
        .build(),
    );

    registry.extend_reserved(
        "is",
        RuleBuilder::sync(|value, params| params.first() == Some(value))
            .params(&["other"])
            .has_target()
            .build(),
    );
}
