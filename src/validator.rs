//! Validator orchestration.
//!
//! The [`Validator`] owns one [`FieldBag`], one [`ErrorBag`], and a
//! [`DependencyGraph`]; it references a [`RuleRegistry`] (private or
//! shared). It drives the rule-execution pipeline: parameter resolution
//! against live field values, the bail policy, async aggregation, and
//! the validation-token discipline that makes overlapping passes
//! race-free: only the most recently started pass for a field may
//! mutate its flags and errors, every other result is discarded.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::core::error::{ValidatorError, ValidatorResult};
use crate::core::outcome::{Outcome, ValidationResult, VerifyResult};
use crate::dsl::{self, RuleSpec};
use crate::error_bag::{ErrorBag, FieldError};
use crate::field::{Field, FieldBag, FieldDescriptor, FieldId, FieldMatcher};
use crate::graph::DependencyGraph;
use crate::messages::{DefaultMessages, MessageResolver};
use crate::registry::{ExtendOptions, RuleDef, RuleRegistry};

// ============================================================================
// OPTIONS
// ============================================================================

/// Options for [`Validator::verify`].
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// Display name used in messages; defaults to `"value"`.
    pub name: Option<String>,
    /// Bail policy override; defaults to the validator's `fast_exit`.
    pub bails: Option<bool>,
}

/// Outcome of one pipeline run, before it is applied to a field.
struct PassReport {
    valid: bool,
    required: Option<bool>,
    /// `(rule, message)` in declaration order.
    failures: Vec<(String, String)>,
}

impl PassReport {
    fn into_result(self) -> ValidationResult {
        ValidationResult::from_failures(self.failures)
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// The validation engine.
///
/// Independently instantiable; nothing here is a singleton. Bindings
/// that want shared rules pass the same `Arc<RuleRegistry>` to several
/// validators.
///
/// # Examples
///
/// ```rust,ignore
/// use formguard::prelude::*;
/// use serde_json::json;
///
/// let validator = Validator::new();
/// validator
///     .attach(FieldDescriptor::new("password").rules("required|min:8"))
///     .await?;
/// let ok = validator.validate("password", Some(json!("hunter2"))).await?;
/// assert!(!ok);
/// assert_eq!(validator.errors().count(), 1);
/// ```
pub struct Validator {
    registry: Arc<RuleRegistry>,
    fields: FieldBag,
    errors: ErrorBag,
    graph: DependencyGraph,
    messages: Box<dyn MessageResolver>,
    paused: AtomicBool,
    fast_exit: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// A validator with its own registry pre-loaded with the built-ins.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(RuleRegistry::with_builtins()))
    }

    /// A validator over an existing (possibly shared) registry.
    pub fn with_registry(registry: Arc<RuleRegistry>) -> Self {
        Self {
            registry,
            fields: FieldBag::new(),
            errors: ErrorBag::new(),
            graph: DependencyGraph::new(),
            messages: Box::new(DefaultMessages),
            paused: AtomicBool::new(false),
            fast_exit: true,
        }
    }

    /// The rule registry this validator resolves against.
    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// The error bag read surface.
    pub fn errors(&self) -> &ErrorBag {
        &self.errors
    }

    /// The attached fields.
    pub fn fields(&self) -> &FieldBag {
        &self.fields
    }

    /// Changes the default bail policy for fields that don't set one.
    pub fn set_fast_exit(&mut self, fast_exit: bool) {
        self.fast_exit = fast_exit;
    }

    /// Replaces the message resolver (the i18n seam).
    pub fn set_messages(&mut self, messages: impl MessageResolver + 'static) {
        self.messages = Box::new(messages);
    }

    // ------------------------------------------------------------------
    // registry management
    // ------------------------------------------------------------------

    /// Registers a rule on this validator's registry.
    pub fn extend(&self, name: &str, def: RuleDef) -> ValidatorResult<()> {
        self.registry.extend(name, def)
    }

    /// Registers a rule with explicit options (reserved-name overwrite).
    pub fn extend_with(
        &self,
        name: &str,
        def: RuleDef,
        options: ExtendOptions,
    ) -> ValidatorResult<()> {
        self.registry.extend_with(name, def, options)
    }

    /// Removes a rule from the registry.
    pub fn remove_rule(&self, name: &str) -> bool {
        self.registry.remove(name)
    }

    // ------------------------------------------------------------------
    // pause / resume
    // ------------------------------------------------------------------

    /// Suppresses all validation side effects until [`Self::resume`].
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Re-enables validation.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Whether the validator is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------
    // attach / detach
    // ------------------------------------------------------------------

    /// Attaches a field described by `descriptor`.
    ///
    /// Parses and structurally checks the rule specification, registers
    /// dependency edges, and, when the field (or one of its rules) asks
    /// for an initial pass, validates before returning. A duplicate
    /// `(name, scope)` is not an error: the newest attach wins and the
    /// previous field is detached with a warning.
    pub async fn attach(&self, descriptor: FieldDescriptor) -> ValidatorResult<Arc<Field>> {
        let specs = dsl::parse(&descriptor.rules)?;

        let mut dependencies = Vec::new();
        let mut required = false;
        let mut initial = descriptor.initial;
        for spec in &specs {
            let def = self.registry.resolve(&spec.name)?;
            def.check_params(&spec.name, &spec.params)?;
            if def.has_target() {
                dependencies.extend(spec.params.iter().cloned());
            }
            if def.computes_required() && spec.params.is_empty() {
                required = true;
            }
            if def.initial() {
                initial = true;
            }
        }

        if let Some(existing) = self.fields.find(&descriptor.name, descriptor.scope.as_deref()) {
            warn!(
                field = %descriptor.name,
                scope = descriptor.scope.as_deref().unwrap_or(""),
                "field already attached; replacing previous instance"
            );
            self.detach_field(&existing);
        }

        let bails = descriptor.bails.unwrap_or(self.fast_exit);
        let field = Arc::new(Field::new(
            descriptor,
            specs,
            dependencies,
            required,
            initial,
            bails,
        ));
        for target in field.dependencies() {
            self.graph.watch(target, field.id());
        }
        self.fields.push(field.clone());
        debug!(field = %field.name(), id = %field.id(), "attached field");

        if initial && !self.is_paused() {
            self.run_with_cascade(&field, None).await?;
        }
        Ok(field)
    }

    /// Detaches the field with the given `(name, scope)`. No-op when
    /// absent.
    pub fn detach(&self, name: &str, scope: Option<&str>) {
        if let Some(field) = self.fields.find(name, scope) {
            self.detach_field(&field);
        }
    }

    fn detach_field(&self, field: &Arc<Field>) {
        // In-flight passes become stale before the field disappears.
        field.supersede();
        self.fields.remove(field.id());
        self.errors.remove_by_id(field.id());
        self.graph.remove_field(field.id());
        debug!(field = %field.name(), id = %field.id(), "detached field");
    }

    /// Resolves a selector to an attached field, without validating.
    pub fn field(&self, selector: &str) -> Option<Arc<Field>> {
        self.select(selector).ok()
    }

    fn select(&self, selector: &str) -> ValidatorResult<Arc<Field>> {
        if let Some(raw) = selector.strip_prefix('#') {
            return FieldId::parse(raw)
                .and_then(|id| self.fields.by_id(id))
                .ok_or_else(|| ValidatorError::field_not_found(selector));
        }
        if let Some(field) = self.fields.find(selector, None) {
            return Ok(field);
        }
        if let Some((scope, name)) = selector.split_once('.') {
            if let Some(field) = self.fields.find(name, Some(scope)) {
                return Ok(field);
            }
        }
        Err(ValidatorError::field_not_found(selector))
    }

    // ------------------------------------------------------------------
    // validation entry points
    // ------------------------------------------------------------------

    /// Validates one field, optionally pushing a new value first.
    ///
    /// Selector forms: `"name"`, `"scope.name"`, `"#<field-id>"`. While
    /// paused this is a no-op returning the last-known validity.
    pub async fn validate(&self, selector: &str, value: Option<Value>) -> ValidatorResult<bool> {
        let field = self.select(selector)?;
        if self.is_paused() {
            return Ok(field.flags().valid.unwrap_or(true));
        }
        if let Some(value) = value {
            field.set_value(value);
        }
        let result = self.run_with_cascade(&field, None).await?;
        Ok(result.valid)
    }

    /// Validates every attached field, logically concurrently, and
    /// returns whether all of them passed.
    ///
    /// `values` optionally overrides live values, keyed by `"name"` or
    /// `"scope.name"`. Each field still applies its own bail policy.
    pub async fn validate_all(
        &self,
        values: Option<HashMap<String, Value>>,
    ) -> ValidatorResult<bool> {
        let fields = self.fields.all();
        if self.is_paused() {
            return Ok(fields.iter().all(|f| f.flags().valid != Some(false)));
        }
        let passes = fields.iter().map(|field| {
            let override_value = values.as_ref().and_then(|map| {
                let scoped = field
                    .scope()
                    .and_then(|scope| map.get(&format!("{scope}.{}", field.name())));
                scoped.or_else(|| map.get(field.name())).cloned()
            });
            self.run_field(field, override_value)
        });
        let results = future::join_all(passes).await;
        let mut all_valid = true;
        for result in results {
            all_valid &= result?.valid;
        }
        Ok(all_valid)
    }

    /// Stateless one-off validation: runs `rules` against `value`
    /// without touching any field, flag, or error bag.
    pub async fn verify(
        &self,
        value: Value,
        rules: &str,
        options: VerifyOptions,
    ) -> ValidatorResult<VerifyResult> {
        let specs = dsl::parse_dsl(rules)?;
        for spec in &specs {
            let def = self.registry.resolve(&spec.name)?;
            def.check_params(&spec.name, &spec.params)?;
        }
        let report = self
            .execute_rules(
                None,
                &value,
                &specs,
                options.bails.unwrap_or(self.fast_exit),
                options.name.as_deref().unwrap_or("value"),
            )
            .await?;
        Ok(report.into_result())
    }

    /// Records a user interaction on a field (value changed) and
    /// revalidates it together with its dependents.
    pub async fn notify(&self, selector: &str) -> ValidatorResult<()> {
        let field = self.select(selector)?;
        field.interact();
        if self.is_paused() {
            return Ok(());
        }
        self.run_with_cascade(&field, None).await?;
        Ok(())
    }

    /// Resets all fields matching `matcher` (all fields when `None`):
    /// flags return to their post-attach state, their errors are
    /// removed, and any in-flight validation is superseded.
    pub fn reset(&self, matcher: Option<&FieldMatcher>) {
        let fields = match matcher {
            Some(matcher) => self.fields.matching(matcher),
            None => self.fields.all(),
        };
        for field in fields {
            field.supersede();
            field.reset_flags();
            self.errors.remove_by_id(field.id());
        }
    }

    // ------------------------------------------------------------------
    // pipeline
    // ------------------------------------------------------------------

    /// Validates `root` and cascades to its dependents, breadth-first,
    /// visiting each field at most once per run. Returns the root's
    /// result.
    async fn run_with_cascade(
        &self,
        root: &Arc<Field>,
        value_override: Option<Value>,
    ) -> ValidatorResult<ValidationResult> {
        let result = self.run_field(root, value_override).await?;

        let mut visited: HashSet<FieldId> = HashSet::new();
        visited.insert(root.id());
        let mut queue: VecDeque<FieldId> = self.graph.dependents_of(root.name()).into();
        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            let Some(dependent) = self.fields.by_id(id) else {
                continue;
            };
            trace!(field = %dependent.name(), "cascade revalidation");
            if let Err(err) = self.run_field(&dependent, None).await {
                warn!(field = %dependent.name(), %err, "cascade revalidation failed");
                continue;
            }
            for next in self.graph.dependents_of(dependent.name()) {
                if !visited.contains(&next) {
                    queue.push_back(next);
                }
            }
        }
        Ok(result)
    }

    /// One tokened validation pass over a single field.
    async fn run_field(
        &self,
        field: &Arc<Field>,
        value_override: Option<Value>,
    ) -> ValidatorResult<ValidationResult> {
        if let Some(value) = value_override {
            field.set_value(value);
        }
        let token = field.begin_pass();
        let value = field.value();

        let report = match self
            .execute_rules(
                Some(field),
                &value,
                field.rules(),
                field.bails(),
                field.display_name(),
            )
            .await
        {
            Ok(report) => report,
            Err(err) => {
                if field.current_token() == token {
                    field.clear_pending();
                }
                return Err(err);
            }
        };

        if field.current_token() == token {
            field.apply_pass(report.valid, report.required);
            self.errors.remove_by_id(field.id());
            for (rule, message) in &report.failures {
                self.errors.add(FieldError {
                    id: field.id(),
                    field: field.name().to_owned(),
                    scope: field.scope().map(str::to_owned),
                    rule: rule.clone(),
                    message: message.clone(),
                });
            }
        } else {
            trace!(field = %field.name(), token, "discarding stale validation result");
        }
        Ok(report.into_result())
    }

    /// Runs the ordered rule list against `value`.
    ///
    /// `field` is present for attached-field passes (enables target
    /// parameter substitution) and absent for `verify`.
    async fn execute_rules(
        &self,
        field: Option<&Arc<Field>>,
        value: &Value,
        specs: &[RuleSpec],
        bails: bool,
        display_name: &str,
    ) -> ValidatorResult<PassReport> {
        let mut failed: Vec<(usize, String, Vec<Value>)> = Vec::new();
        let mut pending_meta: Vec<(usize, String, Vec<Value>)> = Vec::new();
        let mut pending_futures = Vec::new();
        let mut required: Option<bool> = None;
        let mut bailed = false;

        for (index, spec) in specs.iter().enumerate() {
            let def = self.registry.resolve(&spec.name)?;
            // Null skips everything but the required family: a missing
            // optional field is not "too short".
            if value.is_null() && !def.computes_required() {
                continue;
            }
            let params = self.resolve_params(field, &def, spec);
            match def.check(value, &params) {
                Outcome::Done(output) => {
                    if let Some(r) = output.required {
                        required = Some(required.unwrap_or(false) || r);
                    }
                    if !output.valid {
                        failed.push((index, spec.name.clone(), params));
                        if bails {
                            // Pending futures collected so far are dropped
                            // un-awaited; their effect is suppressed, not
                            // cancelled.
                            bailed = true;
                            break;
                        }
                    }
                }
                Outcome::Pending(future) => {
                    pending_meta.push((index, spec.name.clone(), params));
                    pending_futures.push(future);
                }
            }
        }

        if !bailed && !pending_futures.is_empty() {
            let outputs = future::join_all(pending_futures).await;
            for ((index, name, params), output) in pending_meta.into_iter().zip(outputs) {
                if let Some(r) = output.required {
                    required = Some(required.unwrap_or(false) || r);
                }
                if !output.valid {
                    failed.push((index, name, params));
                }
            }
            failed.sort_by_key(|(index, _, _)| *index);
            if bails {
                // Earliest failure wins under bail.
                failed.truncate(1);
            }
        }

        let failures = failed
            .into_iter()
            .map(|(_, rule, params)| {
                let message = self.messages.resolve(display_name, &rule, &params);
                (rule, message)
            })
            .collect::<Vec<_>>();

        Ok(PassReport {
            valid: failures.is_empty(),
            required,
            failures,
        })
    }

    /// Resolves a spec's raw parameters, substituting any parameter of a
    /// `has_target` rule that names a live field with that field's
    /// current value (read now, not at registration).
    fn resolve_params(
        &self,
        field: Option<&Arc<Field>>,
        def: &RuleDef,
        spec: &RuleSpec,
    ) -> Vec<Value> {
        spec.params
            .iter()
            .map(|param| {
                if def.has_target() {
                    if let Some(field) = field {
                        if let Some(target) = self.fields.lookup(param, field.scope()) {
                            if target.id() != field.id() {
                                return target.value();
                            }
                        }
                    }
                }
                Value::String(param.clone())
            })
            .collect()
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("fields", &self.fields.len())
            .field("errors", &self.errors.count())
            .field("paused", &self.is_paused())
            .field("fast_exit", &self.fast_exit)
            .finish_non_exhaustive()
    }
}
