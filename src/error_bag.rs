//! Ordered collection of field validation errors.
//!
//! The bag keeps one [`FieldError`] per failed rule, in insertion order,
//! with no deduplication beyond the explicit `remove`/`update` operations.
//! It is the read surface UI bindings poll between validation passes.

use parking_lot::RwLock;
use serde::Serialize;

use crate::field::FieldId;

/// One validation failure record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Owning field's id.
    pub id: FieldId,
    /// Owning field's name.
    pub field: String,
    /// Owning field's scope, if any.
    pub scope: Option<String>,
    /// Name of the rule that failed.
    pub rule: String,
    /// Resolved display message.
    pub message: String,
}

/// Insertion-ordered error collection, shared behind a lock.
///
/// Scope arguments follow one convention everywhere: `None` means "no
/// scope filter", `Some(s)` filters to errors whose field lives in scope
/// `s`.
#[derive(Debug, Default)]
pub struct ErrorBag {
    items: RwLock<Vec<FieldError>>,
}

impl ErrorBag {
    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error.
    pub fn add(&self, error: FieldError) {
        self.items.write().push(error);
    }

    /// All messages, optionally filtered by scope.
    pub fn all(&self, scope: Option<&str>) -> Vec<String> {
        self.items
            .read()
            .iter()
            .filter(|e| scope.is_none() || e.scope.as_deref() == scope)
            .map(|e| e.message.clone())
            .collect()
    }

    /// Whether any error exists, optionally filtered by scope.
    pub fn any(&self, scope: Option<&str>) -> bool {
        self.items
            .read()
            .iter()
            .any(|e| scope.is_none() || e.scope.as_deref() == scope)
    }

    /// First message for `field`, optionally filtered by scope.
    pub fn first(&self, field: &str, scope: Option<&str>) -> Option<String> {
        self.items
            .read()
            .iter()
            .find(|e| e.field == field && (scope.is_none() || e.scope.as_deref() == scope))
            .map(|e| e.message.clone())
    }

    /// Total number of errors.
    pub fn count(&self) -> usize {
        self.items.read().len()
    }

    /// Full records, optionally filtered by field and scope.
    pub fn collect(&self, field: Option<&str>, scope: Option<&str>) -> Vec<FieldError> {
        self.items
            .read()
            .iter()
            .filter(|e| field.map_or(true, |f| e.field == f))
            .filter(|e| scope.is_none() || e.scope.as_deref() == scope)
            .cloned()
            .collect()
    }

    /// Removes all errors for a field name (optionally scope-filtered).
    pub fn remove(&self, field: &str, scope: Option<&str>) {
        self.items
            .write()
            .retain(|e| e.field != field || (scope.is_some() && e.scope.as_deref() != scope));
    }

    /// Removes all errors owned by a field id.
    pub fn remove_by_id(&self, id: FieldId) {
        self.items.write().retain(|e| e.id != id);
    }

    /// Rewrites the scope recorded on a field's errors (used when a
    /// field is re-scoped by its binding).
    pub fn update_scope(&self, id: FieldId, scope: Option<&str>) {
        for error in self.items.write().iter_mut() {
            if error.id == id {
                error.scope = scope.map(str::to_owned);
            }
        }
    }

    /// Drops every error.
    pub fn clear(&self) {
        self.items.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn error(id: FieldId, field: &str, scope: Option<&str>, rule: &str, message: &str) -> FieldError {
        FieldError {
            id,
            field: field.to_owned(),
            scope: scope.map(str::to_owned),
            rule: rule.to_owned(),
            message: message.to_owned(),
        }
    }

    #[test]
    fn insertion_order_is_preserved() {
        let bag = ErrorBag::new();
        let id = FieldId::new();
        bag.add(error(id, "password", None, "required", "required msg"));
        bag.add(error(id, "password", None, "min", "min msg"));
        assert_eq!(bag.all(None), ["required msg", "min msg"]);
        assert_eq!(bag.count(), 2);
    }

    #[test]
    fn scope_filtering() {
        let bag = ErrorBag::new();
        bag.add(error(FieldId::new(), "zip", Some("billing"), "required", "billing zip"));
        bag.add(error(FieldId::new(), "zip", Some("shipping"), "required", "shipping zip"));

        assert_eq!(bag.all(Some("billing")), ["billing zip"]);
        assert!(bag.any(Some("shipping")));
        assert!(!bag.any(Some("login")));
        assert_eq!(bag.all(None).len(), 2);
    }

    #[test]
    fn first_and_collect() {
        let bag = ErrorBag::new();
        let id = FieldId::new();
        bag.add(error(id, "name", None, "required", "first"));
        bag.add(error(id, "name", None, "min", "second"));

        assert_eq!(bag.first("name", None).as_deref(), Some("first"));
        assert_eq!(bag.first("missing", None), None);
        assert_eq!(bag.collect(Some("name"), None).len(), 2);
        assert_eq!(bag.collect(None, None).len(), 2);
    }

    #[test]
    fn remove_by_id_scrubs_only_that_field() {
        let bag = ErrorBag::new();
        let a = FieldId::new();
        let b = FieldId::new();
        bag.add(error(a, "a", None, "required", "a msg"));
        bag.add(error(b, "b", None, "required", "b msg"));
        bag.remove_by_id(a);
        assert_eq!(bag.all(None), ["b msg"]);
    }

    #[test]
    fn update_scope_rewrites_records() {
        let bag = ErrorBag::new();
        let id = FieldId::new();
        bag.add(error(id, "zip", None, "required", "msg"));
        bag.update_scope(id, Some("billing"));
        assert!(bag.any(Some("billing")));
        assert_eq!(bag.collect(None, Some("billing"))[0].scope.as_deref(), Some("billing"));
    }

    #[test]
    fn clear_empties_the_bag() {
        let bag = ErrorBag::new();
        bag.add(error(FieldId::new(), "x", None, "required", "msg"));
        bag.clear();
        assert_eq!(bag.count(), 0);
        assert!(!bag.any(None));
    }
}
