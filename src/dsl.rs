//! Rule specification parsing.
//!
//! Rules arrive either as the pipe-separated string DSL
//! (`"required|min:3|confirmed:password"`) or as a structured JSON map
//! (`{"required": true, "min": 3, "between": [1, 10]}`). Both forms parse
//! into an ordered list of [`RuleSpec`]s; parameters stay raw strings
//! until the execution pipeline resolves them (possibly against another
//! field's live value).

use serde_json::Value;
use smallvec::SmallVec;

use crate::core::error::{ValidatorError, ValidatorResult};

/// One parsed rule invocation: a name and its raw positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    /// Registered rule name, case-sensitive.
    pub name: String,
    /// Raw parameters as written; positionally bound to the rule's
    /// declared parameter names.
    pub params: SmallVec<[String; 2]>,
}

impl RuleSpec {
    /// Builds a spec directly, mostly useful in tests and `verify`.
    pub fn new<I, S>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }
}

/// Where a field's rules came from.
#[derive(Debug, Clone)]
pub enum RulesSource {
    /// Pipe-separated string DSL.
    Dsl(String),
    /// Structured map form (`serde_json` object, insertion-ordered).
    Structured(Value),
}

impl Default for RulesSource {
    fn default() -> Self {
        Self::Dsl(String::new())
    }
}

impl From<&str> for RulesSource {
    fn from(dsl: &str) -> Self {
        Self::Dsl(dsl.to_owned())
    }
}

impl From<String> for RulesSource {
    fn from(dsl: String) -> Self {
        Self::Dsl(dsl)
    }
}

impl From<Value> for RulesSource {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

/// Parses either source form into an ordered rule list.
pub fn parse(source: &RulesSource) -> ValidatorResult<Vec<RuleSpec>> {
    match source {
        RulesSource::Dsl(dsl) => parse_dsl(dsl),
        RulesSource::Structured(value) => parse_structured(value),
    }
}

/// Parses the string DSL: segments split on `|`, each segment
/// `name[:param[,param...]]`. Empty segments are skipped so trailing
/// pipes are harmless.
pub fn parse_dsl(dsl: &str) -> ValidatorResult<Vec<RuleSpec>> {
    dsl.split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(parse_segment)
        .collect()
}

fn parse_segment(segment: &str) -> ValidatorResult<RuleSpec> {
    let (name, params) = match segment.split_once(':') {
        Some((name, raw)) => {
            let params: SmallVec<[String; 2]> = raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect();
            (name.trim(), params)
        }
        None => (segment, SmallVec::new()),
    };
    if name.is_empty() {
        return Err(ValidatorError::configuration(format!(
            "empty rule name in segment '{segment}'"
        )));
    }
    Ok(RuleSpec {
        name: name.to_owned(),
        params,
    })
}

/// Parses the structured map form. Values: `true`/`null` mean "no
/// parameters", `false` disables the rule, scalars are a single
/// parameter, arrays are a parameter list.
pub fn parse_structured(value: &Value) -> ValidatorResult<Vec<RuleSpec>> {
    let Value::Object(map) = value else {
        return Err(ValidatorError::configuration(format!(
            "structured rules must be an object, got {value}"
        )));
    };
    let mut specs = Vec::with_capacity(map.len());
    for (name, raw) in map {
        let params: SmallVec<[String; 2]> = match raw {
            Value::Bool(false) => continue,
            Value::Bool(true) | Value::Null => SmallVec::new(),
            Value::Array(items) => items.iter().map(scalar_param).collect::<Result<_, _>>()?,
            scalar => SmallVec::from_iter([scalar_param(scalar)?]),
        };
        specs.push(RuleSpec {
            name: name.clone(),
            params,
        });
    }
    Ok(specs)
}

fn scalar_param(value: &Value) -> ValidatorResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ValidatorError::configuration(format!(
            "rule parameter must be a scalar, got {other}"
        ))),
    }
}
