//! Per-input validation unit.
//!
//! A [`Field`] carries its parsed rule list, interaction flags, a value
//! source (an externally supplied accessor, or an internal stored value
//! for bindings that push values in), its cross-field dependencies, and
//! the monotonic validation token used to discard stale async results.

pub mod bag;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::flags::FieldFlags;
use crate::dsl::{RuleSpec, RulesSource};

pub use bag::{FieldBag, FieldMatcher};

// ============================================================================
// FIELD ID
// ============================================================================

/// Opaque field identity, unique per attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldId(Uuid);

impl FieldId {
    /// Generates a fresh id.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an id from its string form (used by `"#<id>"` selectors).
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// VALUE SOURCE
// ============================================================================

/// Externally supplied value accessor; read on demand, never cached
/// beyond one validation pass.
pub type ValueGetter = Arc<dyn Fn() -> Value + Send + Sync>;

enum ValueSource {
    Getter(ValueGetter),
    Stored(Mutex<Value>),
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Getter(_) => f.write_str("Getter(..)"),
            Self::Stored(value) => f.debug_tuple("Stored").field(&*value.lock()).finish(),
        }
    }
}

// ============================================================================
// FIELD DESCRIPTOR
// ============================================================================

/// Everything a binding supplies when attaching a field.
#[derive(Clone)]
pub struct FieldDescriptor {
    /// Field name, used for lookup and message generation.
    pub name: String,
    /// Optional scope for grouped forms.
    pub scope: Option<String>,
    /// Display name override for messages.
    pub alias: Option<String>,
    /// Rule specification (string DSL or structured map).
    pub rules: RulesSource,
    /// Stop at the first synchronous failure. `None` inherits the
    /// validator's `fast_exit` default.
    pub bails: Option<bool>,
    /// Request a validation pass at attach time.
    pub initial: bool,
    /// Starting value for fields without an external accessor.
    pub initial_value: Option<Value>,
    /// Interaction event names, stored verbatim for UI bindings; the
    /// engine attaches no semantics to them.
    pub events: Vec<String>,
    /// External value accessor. When absent the field stores values
    /// pushed through `validate(_, Some(value))` / `set_value`.
    pub getter: Option<ValueGetter>,
}

impl FieldDescriptor {
    /// A descriptor with the default interaction events and no rules.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: None,
            alias: None,
            rules: RulesSource::default(),
            bails: None,
            initial: false,
            initial_value: None,
            events: vec!["input".to_owned(), "blur".to_owned()],
            getter: None,
        }
    }

    /// Sets the scope.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Sets the display alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the rule specification.
    #[must_use]
    pub fn rules(mut self, rules: impl Into<RulesSource>) -> Self {
        self.rules = rules.into();
        self
    }

    /// Sets the bail policy explicitly.
    #[must_use]
    pub fn bails(mut self, bails: bool) -> Self {
        self.bails = Some(bails);
        self
    }

    /// Requests an immediate validation pass at attach.
    #[must_use]
    pub fn initial(mut self) -> Self {
        self.initial = true;
        self
    }

    /// Sets the starting value.
    #[must_use]
    pub fn initial_value(mut self, value: Value) -> Self {
        self.initial_value = Some(value);
        self
    }

    /// Replaces the interaction event names.
    #[must_use]
    pub fn events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = events.into_iter().map(Into::into).collect();
        self
    }

    /// Installs an external value accessor.
    #[must_use]
    pub fn getter<F>(mut self, getter: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(getter));
        self
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("alias", &self.alias)
            .field("bails", &self.bails)
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// FIELD
// ============================================================================

/// One attached field.
#[derive(Debug)]
pub struct Field {
    id: FieldId,
    name: String,
    scope: Option<String>,
    alias: Option<String>,
    bails: bool,
    initial: bool,
    required_default: bool,
    events: Vec<String>,
    rules: Vec<RuleSpec>,
    dependencies: Vec<String>,
    source: ValueSource,
    flags: Mutex<FieldFlags>,
    token: AtomicU64,
}

impl Field {
    /// Builds a field from an already-parsed descriptor. `dependencies`
    /// are the target field names referenced by `has_target` rule
    /// parameters; `required` and `initial` are the values derived from
    /// the rule set by the validator.
    pub(crate) fn new(
        descriptor: FieldDescriptor,
        rules: Vec<RuleSpec>,
        dependencies: Vec<String>,
        required: bool,
        initial: bool,
        bails: bool,
    ) -> Self {
        let source = match descriptor.getter {
            Some(getter) => ValueSource::Getter(getter),
            None => ValueSource::Stored(Mutex::new(
                descriptor.initial_value.unwrap_or(Value::Null),
            )),
        };
        Self {
            id: FieldId::new(),
            name: descriptor.name,
            scope: descriptor.scope,
            alias: descriptor.alias,
            bails,
            initial,
            required_default: required,
            events: descriptor.events,
            rules,
            dependencies,
            source,
            flags: Mutex::new(FieldFlags::on_attach(initial, required)),
            token: AtomicU64::new(0),
        }
    }

    /// Unique id for this attach.
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field scope, if any.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Name used in messages: the alias when set, otherwise the name.
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Whether this field stops at the first synchronous failure.
    pub fn bails(&self) -> bool {
        self.bails
    }

    /// Whether a validation pass runs at attach time.
    pub fn initial(&self) -> bool {
        self.initial
    }

    /// Interaction event names as supplied by the binding.
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Parsed rule list, in declaration order.
    pub fn rules(&self) -> &[RuleSpec] {
        &self.rules
    }

    /// Names of fields this one's rules read.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Snapshot of the current flags.
    pub fn flags(&self) -> FieldFlags {
        *self.flags.lock()
    }

    /// Current value: live read through the accessor, or the stored
    /// value.
    pub fn value(&self) -> Value {
        match &self.source {
            ValueSource::Getter(getter) => getter(),
            ValueSource::Stored(value) => value.lock().clone(),
        }
    }

    /// Pushes a value into a stored-value field. Ignored for fields with
    /// an external accessor (the accessor is authoritative).
    pub fn set_value(&self, value: Value) {
        if let ValueSource::Stored(stored) = &self.source {
            *stored.lock() = value;
        }
    }

    /// Pure predicate for bulk operations: does this field match the
    /// given id/name/scope options?
    pub fn matches(&self, matcher: &FieldMatcher) -> bool {
        if let Some(id) = matcher.id {
            if id != self.id {
                return false;
            }
        }
        if let Some(name) = &matcher.name {
            if name != &self.name {
                return false;
            }
        }
        if let Some(scope) = &matcher.scope {
            if self.scope.as_deref() != Some(scope.as_str()) {
                return false;
            }
        }
        true
    }

    // ------------------------------------------------------------------
    // validation-token machinery (engine internal)
    // ------------------------------------------------------------------

    /// Starts a validation pass: bumps the token and sets `pending`.
    /// Returns the token this pass runs under.
    pub(crate) fn begin_pass(&self) -> u64 {
        let token = self.token.fetch_add(1, Ordering::SeqCst) + 1;
        self.flags.lock().begin_validation();
        token
    }

    /// The token of the most recently started pass.
    pub(crate) fn current_token(&self) -> u64 {
        self.token.load(Ordering::SeqCst)
    }

    /// Invalidates every in-flight pass without starting a new one.
    pub(crate) fn supersede(&self) {
        self.token.fetch_add(1, Ordering::SeqCst);
    }

    /// Applies a completed pass's aggregate result to the flags.
    pub(crate) fn apply_pass(&self, valid: bool, required: Option<bool>) {
        let mut flags = self.flags.lock();
        flags.finish_validation(valid);
        if let Some(required) = required {
            flags.required = required;
        }
    }

    /// Clears `pending` after a structurally failed pass.
    pub(crate) fn clear_pending(&self) {
        self.flags.lock().pending = false;
    }

    /// Records a user interaction.
    pub(crate) fn interact(&self) {
        self.flags.lock().interact();
    }

    /// Returns the flags to their post-attach state.
    pub(crate) fn reset_flags(&self) {
        *self.flags.lock() = FieldFlags::on_attach(self.initial, self.required_default);
    }
}
