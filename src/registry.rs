//! Rule registry: named, dynamically dispatched rule definitions.
//!
//! The registry maps case-sensitive rule names to [`RuleDef`] records.
//! Built-in rules are registered as *reserved*: overwriting one requires
//! an explicit opt-in via [`ExtendOptions`]. Resolution fails closed:
//! an unknown name is an error, never a silent no-op.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::core::error::{ValidatorError, ValidatorResult};
use crate::core::outcome::{Outcome, RuleOutput};

/// Signature of a rule check: current value, resolved parameters.
pub type CheckFn = dyn Fn(&Value, &[Value]) -> Outcome + Send + Sync;

/// Attach-time parameter validation hook.
pub type ParamCheckFn = dyn Fn(&[String]) -> Result<(), String> + Send + Sync;

// ============================================================================
// RULE DEFINITION
// ============================================================================

/// A registered rule: the check closure plus its declared shape.
///
/// Immutable once registered; re-registering a name replaces the whole
/// record.
#[derive(Clone)]
pub struct RuleDef {
    check: Arc<CheckFn>,
    param_names: Vec<&'static str>,
    min_params: usize,
    param_check: Option<Arc<ParamCheckFn>>,
    has_target: bool,
    computes_required: bool,
    initial: bool,
}

impl RuleDef {
    /// Invokes the rule's check.
    pub fn check(&self, value: &Value, params: &[Value]) -> Outcome {
        (self.check)(value, params)
    }

    /// Declared parameter names, in positional order.
    pub fn param_names(&self) -> &[&'static str] {
        &self.param_names
    }

    /// Minimum number of parameters a spec must supply.
    pub fn min_params(&self) -> usize {
        self.min_params
    }

    /// Whether parameters may reference another field's value.
    pub fn has_target(&self) -> bool {
        self.has_target
    }

    /// Whether this rule forces the field's `required` flag.
    pub fn computes_required(&self) -> bool {
        self.computes_required
    }

    /// Whether this rule must run even before any interaction.
    pub fn initial(&self) -> bool {
        self.initial
    }

    /// Runs the attach-time parameter check, if the rule declared one.
    pub fn check_params(&self, name: &str, params: &[String]) -> ValidatorResult<()> {
        if params.len() < self.min_params {
            return Err(ValidatorError::configuration(format!(
                "rule '{name}' expects at least {} parameter(s) ({}), got {}",
                self.min_params,
                self.param_names.join(", "),
                params.len()
            )));
        }
        if let Some(check) = &self.param_check {
            check(params).map_err(|reason| {
                ValidatorError::configuration(format!("rule '{name}': {reason}"))
            })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for RuleDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleDef")
            .field("param_names", &self.param_names)
            .field("min_params", &self.min_params)
            .field("has_target", &self.has_target)
            .field("computes_required", &self.computes_required)
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// RULE BUILDER
// ============================================================================

/// Fluent constructor for [`RuleDef`]s.
///
/// # Examples
///
/// ```rust,ignore
/// use formguard::registry::RuleBuilder;
///
/// let def = RuleBuilder::sync(|value, _| value.as_str() != Some(""))
///     .build();
///
/// let slow = RuleBuilder::async_fn(|value, _| {
///     let value = value.clone();
///     async move { lookup(&value).await.into() }
/// })
/// .build();
/// ```
pub struct RuleBuilder {
    def: RuleDef,
}

impl RuleBuilder {
    fn from_check(check: Arc<CheckFn>) -> Self {
        Self {
            def: RuleDef {
                check,
                param_names: Vec::new(),
                min_params: 0,
                param_check: None,
                has_target: false,
                computes_required: false,
                initial: false,
            },
        }
    }

    /// A synchronous boolean rule.
    pub fn sync<F>(check: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> bool + Send + Sync + 'static,
    {
        Self::from_check(Arc::new(move |value, params| {
            Outcome::done(check(value, params))
        }))
    }

    /// A synchronous rule producing a full [`RuleOutput`] (used by
    /// `computes_required` rules).
    pub fn sync_full<F>(check: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> RuleOutput + Send + Sync + 'static,
    {
        Self::from_check(Arc::new(move |value, params| {
            Outcome::Done(check(value, params))
        }))
    }

    /// An asynchronous rule. The closure receives borrowed inputs and
    /// must clone what the future needs.
    pub fn async_fn<F, Fut>(check: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = RuleOutput> + Send + 'static,
    {
        Self::from_check(Arc::new(move |value, params| {
            Outcome::pending(check(value, params))
        }))
    }

    /// A rule with full control over the [`Outcome`].
    pub fn raw<F>(check: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Outcome + Send + Sync + 'static,
    {
        Self::from_check(Arc::new(check))
    }

    /// Declares the positional parameter names. Also sets the minimum
    /// parameter count to the full list; relax with [`Self::min_params`].
    #[must_use]
    pub fn params(mut self, names: &[&'static str]) -> Self {
        self.def.param_names = names.to_vec();
        self.def.min_params = names.len();
        self
    }

    /// Overrides the minimum required parameter count (for trailing
    /// optional or variadic parameters).
    #[must_use]
    pub fn min_params(mut self, min: usize) -> Self {
        self.def.min_params = min;
        self
    }

    /// Installs an attach-time parameter check.
    #[must_use]
    pub fn param_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&[String]) -> Result<(), String> + Send + Sync + 'static,
    {
        self.def.param_check = Some(Arc::new(check));
        self
    }

    /// Marks parameters as potentially naming another field.
    #[must_use]
    pub fn has_target(mut self) -> Self {
        self.def.has_target = true;
        self
    }

    /// Marks the rule as computing the `required` flag.
    #[must_use]
    pub fn computes_required(mut self) -> Self {
        self.def.computes_required = true;
        self
    }

    /// Marks the rule as one that must run before any interaction.
    #[must_use]
    pub fn initial(mut self) -> Self {
        self.def.initial = true;
        self
    }

    /// Finishes the definition.
    pub fn build(self) -> RuleDef {
        self.def
    }
}

// ============================================================================
// EXTEND OPTIONS
// ============================================================================

/// Options for [`RuleRegistry::extend_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendOptions {
    /// Allow overwriting a reserved built-in rule.
    pub overwrite: bool,
}

// ============================================================================
// RULE REGISTRY
// ============================================================================

/// Name-keyed registry of rule definitions.
///
/// Independently instantiable; the engine requires no singleton.
/// Bindings that want a shared registry can hand the same
/// `Arc<RuleRegistry>` to several validators.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: RwLock<HashMap<String, Arc<RuleDef>>>,
    reserved: RwLock<HashSet<String>>,
}

impl RuleRegistry {
    /// An empty registry with no rules at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the built-in rules, all reserved.
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        crate::rules::register_builtins(&registry);
        registry
    }

    /// Registers or overwrites `name`. Fails if `name` is reserved.
    pub fn extend(&self, name: &str, def: RuleDef) -> ValidatorResult<()> {
        self.extend_with(name, def, ExtendOptions::default())
    }

    /// Registers or overwrites `name`, optionally overriding a reserved
    /// built-in.
    pub fn extend_with(
        &self,
        name: &str,
        def: RuleDef,
        options: ExtendOptions,
    ) -> ValidatorResult<()> {
        if name.is_empty() {
            return Err(ValidatorError::configuration("rule name must not be empty"));
        }
        if !options.overwrite && self.reserved.read().contains(name) {
            return Err(ValidatorError::configuration(format!(
                "rule '{name}' is reserved; pass ExtendOptions {{ overwrite: true }} to replace it"
            )));
        }
        debug!(rule = name, "registering rule");
        self.rules.write().insert(name.to_owned(), Arc::new(def));
        Ok(())
    }

    /// Registers a built-in and marks its name reserved.
    pub(crate) fn extend_reserved(&self, name: &str, def: RuleDef) {
        self.rules.write().insert(name.to_owned(), Arc::new(def));
        self.reserved.write().insert(name.to_owned());
    }

    /// Resolves a rule by name. Fails closed on unknown names.
    pub fn resolve(&self, name: &str) -> ValidatorResult<Arc<RuleDef>> {
        self.rules
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ValidatorError::unknown_rule(name))
    }

    /// Whether `name` is registered.
    pub fn has(&self, name: &str) -> bool {
        self.rules.read().contains_key(name)
    }

    /// Deletes a rule; later `resolve` calls fail for that name. Fields
    /// already validated with it keep their flags and errors. Returns
    /// whether the rule existed.
    pub fn remove(&self, name: &str) -> bool {
        let existed = self.rules.write().remove(name).is_some();
        if existed {
            debug!(rule = name, "removed rule");
            self.reserved.write().remove(name);
        }
        existed
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    /// Whether the registry holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn truthy_rule() -> RuleDef {
        RuleBuilder::sync(|value, _| !value.is_null()).build()
    }

    #[test]
    fn extend_and_resolve() {
        let registry = RuleRegistry::empty();
        registry.extend("present", truthy_rule()).unwrap();
        let def = registry.resolve("present").unwrap();
        assert!(matches!(
            def.check(&json!("x"), &[]),
            Outcome::Done(out) if out.valid
        ));
    }

    #[test]
    fn resolve_is_case_sensitive_and_fails_closed() {
        let registry = RuleRegistry::empty();
        registry.extend("present", truthy_rule()).unwrap();
        assert!(matches!(
            registry.resolve("Present"),
            Err(ValidatorError::UnknownRule { .. })
        ));
    }

    #[test]
    fn re_registering_overwrites() {
        let registry = RuleRegistry::empty();
        registry.extend("flip", RuleBuilder::sync(|_, _| true).build()).unwrap();
        registry.extend("flip", RuleBuilder::sync(|_, _| false).build()).unwrap();
        let def = registry.resolve("flip").unwrap();
        assert!(matches!(
            def.check(&json!(1), &[]),
            Outcome::Done(out) if !out.valid
        ));
    }

    #[test]
    fn reserved_names_need_explicit_overwrite() {
        let registry = RuleRegistry::with_builtins();
        let err = registry.extend("required", truthy_rule()).unwrap_err();
        assert!(matches!(err, ValidatorError::Configuration(_)));

        registry
            .extend_with("required", truthy_rule(), ExtendOptions { overwrite: true })
            .unwrap();
    }

    #[test]
    fn remove_makes_resolve_fail() {
        let registry = RuleRegistry::empty();
        registry.extend("gone", truthy_rule()).unwrap();
        assert!(registry.remove("gone"));
        assert!(!registry.remove("gone"));
        assert!(registry.resolve("gone").is_err());
    }

    #[test]
    fn param_count_is_checked() {
        let def = RuleBuilder::sync(|_, _| true)
            .params(&["length"])
            .build();
        assert!(def.check_params("min", &[]).is_err());
        assert!(def.check_params("min", &["3".into()]).is_ok());
    }

    #[test]
    fn param_check_hook_runs() {
        let def = RuleBuilder::sync(|_, _| true)
            .params(&["pattern"])
            .param_check(|params| {
                regex::Regex::new(&params[0]).map(|_| ()).map_err(|e| e.to_string())
            })
            .build();
        assert!(def.check_params("regex", &["[a-z".into()]).is_err());
        assert!(def.check_params("regex", &["[a-z]+".into()]).is_ok());
    }
}
