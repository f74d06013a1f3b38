//! Presence and length rules.

use crate::core::outcome::RuleOutput;
use crate::registry::{RuleBuilder, RuleRegistry};
use crate::rules::{is_empty, is_truthy, numeric_params, param_usize, text, value_len};

pub(crate) fn register(registry: &RuleRegistry) {
    registry.extend_reserved(
        "required",
        RuleBuilder::sync_full(|value, _| RuleOutput {
            valid: !is_empty(value),
            required: Some(true),
        })
        .computes_required()
        .initial()
        .build(),
    );

    // Condition first: when the target does not match, the field is not
    // required and anything passes.
    registry.extend_reserved(
        "required_if",
        RuleBuilder::sync_full(|value, params| {
            let condition = match (params.first(), params.get(1)) {
                (Some(target), Some(expected)) => text(target) == text(expected),
                (Some(target), None) => is_truthy(target),
                (None, _) => false,
            };
            if condition {
                RuleOutput {
                    valid: !is_empty(value),
                    required: Some(true),
                }
            } else {
                RuleOutput {
                    valid: true,
                    required: Some(false),
                }
            }
        })
        .params(&["target", "expected"])
        .min_params(1)
        .has_target()
        .computes_required()
        .initial()
        .build(),
    );

    registry.extend_reserved(
        "min",
        RuleBuilder::sync(|value, params| {
            param_usize(params, 0).is_some_and(|min| value_len(value) >= min)
        })
        .params(&["length"])
        .param_check(numeric_params)
        .build(),
    );

    registry.extend_reserved(
        "max",
        RuleBuilder::sync(|value, params| {
            param_usize(params, 0).is_some_and(|max| value_len(value) <= max)
        })
        .params(&["length"])
        .param_check(numeric_params)
        .build(),
    );

    registry.extend_reserved(
        "length",
        RuleBuilder::sync(|value, params| {
            param_usize(params, 0).is_some_and(|len| value_len(value) == len)
        })
        .params(&["length"])
        .param_check(numeric_params)
        .build(),
    );
}
