//! Numeric rules.

use serde_json::Value;

use crate::registry::{RuleBuilder, RuleRegistry};
use crate::rules::{as_f64, numeric_params, param_f64};

pub(crate) fn register(registry: &RuleRegistry) {
    registry.extend_reserved(
        "numeric",
        RuleBuilder::sync(|value, _| match value {
            Value::Number(_) => true,
            Value::String(s) => !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()),
            _ => false,
        })
        .build(),
    );

    registry.extend_reserved(
        "integer",
        RuleBuilder::sync(|value, _| match value {
            Value::Number(n) => n.is_i64() || n.is_u64(),
            Value::String(s) => {
                let digits = s.strip_prefix('-').unwrap_or(s);
                !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
            }
            _ => false,
        })
        .build(),
    );

    registry.extend_reserved(
        "min_value",
        RuleBuilder::sync(|value, params| {
            matches!((as_f64(value), param_f64(params, 0)), (Some(v), Some(min)) if v >= min)
        })
        .params(&["min"])
        .param_check(numeric_params)
        .build(),
    );

    registry.extend_reserved(
        "max_value",
        RuleBuilder::sync(|value, params| {
            matches!((as_f64(value), param_f64(params, 0)), (Some(v), Some(max)) if v <= max)
        })
        .params(&["max"])
        .param_check(numeric_params)
        .build(),
    );

    registry.extend_reserved(
        "between",
        RuleBuilder::sync(|value, params| {
            match (as_f64(value), param_f64(params, 0), param_f64(params, 1)) {
                (Some(v), Some(min), Some(max)) => v >= min && v <= max,
                _ => false,
            }
        })
        .params(&["min", "max"])
        .param_check(numeric_params)
        .build(),
    );
}
