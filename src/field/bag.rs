//! Field collection and lookup.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::field::{Field, FieldId};

/// Criteria for bulk field operations. Unset components match anything.
#[derive(Debug, Clone, Default)]
pub struct FieldMatcher {
    /// Match a specific field id.
    pub id: Option<FieldId>,
    /// Match a field name.
    pub name: Option<String>,
    /// Match a scope.
    pub scope: Option<String>,
}

impl FieldMatcher {
    /// Matches a single field by id.
    pub fn by_id(id: FieldId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Matches fields by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Additionally constrains the scope.
    #[must_use]
    pub fn in_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// Collection of attached fields, indexed by id and `(name, scope)`.
///
/// Forms are small; a linear scan over an `Arc` slice is simpler than
/// maintaining secondary maps and is never the hot path.
#[derive(Debug, Default)]
pub struct FieldBag {
    fields: RwLock<Vec<Arc<Field>>>,
}

impl FieldBag {
    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field.
    pub(crate) fn push(&self, field: Arc<Field>) {
        self.fields.write().push(field);
    }

    /// Removes and returns a field by id.
    pub(crate) fn remove(&self, id: FieldId) -> Option<Arc<Field>> {
        let mut fields = self.fields.write();
        let index = fields.iter().position(|f| f.id() == id)?;
        Some(fields.remove(index))
    }

    /// Looks up a field by id.
    pub fn by_id(&self, id: FieldId) -> Option<Arc<Field>> {
        self.fields.read().iter().find(|f| f.id() == id).cloned()
    }

    /// Finds a field by exact `(name, scope)`.
    pub fn find(&self, name: &str, scope: Option<&str>) -> Option<Arc<Field>> {
        self.fields
            .read()
            .iter()
            .find(|f| f.name() == name && f.scope() == scope)
            .cloned()
    }

    /// Finds a field by name, trying `scope` first and falling back to
    /// the unscoped field. Used for cross-field target resolution.
    pub fn lookup(&self, name: &str, scope: Option<&str>) -> Option<Arc<Field>> {
        if scope.is_some() {
            if let Some(field) = self.find(name, scope) {
                return Some(field);
            }
        }
        self.find(name, None)
    }

    /// All fields matching the given criteria.
    pub fn matching(&self, matcher: &FieldMatcher) -> Vec<Arc<Field>> {
        self.fields
            .read()
            .iter()
            .filter(|f| f.matches(matcher))
            .cloned()
            .collect()
    }

    /// Snapshot of every field.
    pub fn all(&self) -> Vec<Arc<Field>> {
        self.fields.read().clone()
    }

    /// Number of attached fields.
    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;

    fn attach(bag: &FieldBag, name: &str, scope: Option<&str>) -> Arc<Field> {
        let mut descriptor = FieldDescriptor::new(name);
        if let Some(scope) = scope {
            descriptor = descriptor.scope(scope);
        }
        let field = Arc::new(Field::new(
            descriptor,
            Vec::new(),
            Vec::new(),
            false,
            false,
            true,
        ));
        bag.push(field.clone());
        field
    }

    #[test]
    fn find_is_exact_on_scope() {
        let bag = FieldBag::new();
        attach(&bag, "zip", None);
        attach(&bag, "zip", Some("billing"));

        assert!(bag.find("zip", None).is_some());
        assert!(bag.find("zip", Some("billing")).is_some());
        assert!(bag.find("zip", Some("shipping")).is_none());
    }

    #[test]
    fn lookup_falls_back_to_unscoped() {
        let bag = FieldBag::new();
        let unscoped = attach(&bag, "password", None);

        let found = bag.lookup("password", Some("login")).unwrap();
        assert_eq!(found.id(), unscoped.id());
    }

    #[test]
    fn remove_drops_only_the_target() {
        let bag = FieldBag::new();
        let a = attach(&bag, "a", None);
        attach(&bag, "b", None);

        assert!(bag.remove(a.id()).is_some());
        assert!(bag.by_id(a.id()).is_none());
        assert_eq!(bag.len(), 1);
        assert!(bag.remove(a.id()).is_none());
    }

    #[test]
    fn matching_honors_the_matcher() {
        let bag = FieldBag::new();
        attach(&bag, "zip", Some("billing"));
        attach(&bag, "city", Some("billing"));
        attach(&bag, "zip", None);

        let billing = bag.matching(&FieldMatcher {
            scope: Some("billing".into()),
            ..FieldMatcher::default()
        });
        assert_eq!(billing.len(), 2);

        let zips = bag.matching(&FieldMatcher::named("zip"));
        assert_eq!(zips.len(), 2);
    }
}
