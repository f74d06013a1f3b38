//! Field state machine: attach, interaction, reset, detach, lookup.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use formguard::prelude::*;

#[tokio::test]
async fn attach_without_initial_rules_leaves_the_field_unvalidated() {
    let validator = Validator::new();
    validator
        .attach(FieldDescriptor::new("bio").rules("max:200"))
        .await
        .unwrap();

    let flags = validator.field("bio").unwrap().flags();
    assert!(flags.untouched && !flags.touched);
    assert!(flags.pristine && !flags.dirty);
    assert!(!flags.validated && !flags.pending);
    assert!(!flags.required);
    assert_eq!(flags.valid, None);
    assert_eq!(validator.errors().count(), 0);
}

#[tokio::test]
async fn required_rules_run_before_any_interaction() {
    let validator = Validator::new();
    validator
        .attach(FieldDescriptor::new("email").rules("required|email"))
        .await
        .unwrap();

    // "required" carries the initial flag, so attach validated the field.
    let flags = validator.field("email").unwrap().flags();
    assert!(flags.validated);
    assert!(flags.required);
    assert_eq!(flags.valid, Some(false));
    assert!(flags.untouched, "validation is not interaction");
    assert_eq!(
        validator.errors().first("email", None).as_deref(),
        Some("The email field is required.")
    );
}

#[tokio::test]
async fn explicit_initial_flag_validates_at_attach() {
    let validator = Validator::new();
    validator
        .attach(
            FieldDescriptor::new("age")
                .rules("integer")
                .initial()
                .initial_value(json!("not a number")),
        )
        .await
        .unwrap();

    let flags = validator.field("age").unwrap().flags();
    assert!(flags.dirty && !flags.pristine, "initial fields start dirty");
    assert_eq!(flags.valid, Some(false));
}

#[tokio::test]
async fn duplicate_attach_replaces_the_previous_field() {
    let validator = Validator::new();
    let first = validator
        .attach(FieldDescriptor::new("name"))
        .await
        .unwrap();
    let second = validator
        .attach(FieldDescriptor::new("name"))
        .await
        .unwrap();

    assert_ne!(first.id(), second.id());
    assert_eq!(validator.fields().len(), 1);
    assert_eq!(validator.field("name").unwrap().id(), second.id());
}

#[tokio::test]
async fn same_name_in_different_scopes_coexists() {
    let validator = Validator::new();
    validator
        .attach(FieldDescriptor::new("zip").scope("billing"))
        .await
        .unwrap();
    validator
        .attach(FieldDescriptor::new("zip").scope("shipping"))
        .await
        .unwrap();
    assert_eq!(validator.fields().len(), 2);
    assert!(validator.field("billing.zip").is_some());
    assert!(validator.field("shipping.zip").is_some());
}

#[tokio::test]
async fn detach_scrubs_errors_fields_and_graph() {
    let validator = Validator::new();
    validator
        .attach(FieldDescriptor::new("name").rules("required"))
        .await
        .unwrap();
    validator.validate("name", Some(json!(""))).await.unwrap();
    assert!(validator.errors().any(None));

    validator.detach("name", None);
    assert!(!validator.errors().any(None));
    assert!(validator.fields().find("name", None).is_none());
    assert!(validator.field("name").is_none());

    // detaching again is a no-op
    validator.detach("name", None);
}

#[tokio::test]
async fn selector_forms() {
    let validator = Validator::new();
    let field = validator
        .attach(FieldDescriptor::new("zip").scope("billing"))
        .await
        .unwrap();

    assert!(validator.field("billing.zip").is_some());
    assert!(validator.field(&format!("#{}", field.id())).is_some());
    assert!(validator.field("zip").is_none(), "unscoped lookup misses scoped fields");

    let err = validator.validate("missing", None).await.unwrap_err();
    assert!(matches!(err, ValidatorError::FieldNotFound { .. }));
}

#[tokio::test]
async fn reset_returns_to_post_attach_state() {
    let validator = Validator::new();
    validator
        .attach(FieldDescriptor::new("name").rules("required|min:5"))
        .await
        .unwrap();
    validator.notify("name").await.unwrap();
    validator.validate("name", Some(json!("ab"))).await.unwrap();

    let flags = validator.field("name").unwrap().flags();
    assert!(flags.dirty && flags.touched && flags.validated);
    assert!(validator.errors().any(None));

    validator.reset(None);

    let flags = validator.field("name").unwrap().flags();
    assert!(flags.untouched && flags.pristine);
    assert!(!flags.validated);
    assert_eq!(flags.valid, None);
    assert!(flags.required, "required derivation survives reset");
    assert_eq!(validator.errors().count(), 0);

    // rules and dependencies survive: the next validate still fails
    assert!(!validator.validate("name", Some(json!(""))).await.unwrap());
}

#[tokio::test]
async fn reset_with_matcher_is_selective() {
    let validator = Validator::new();
    validator
        .attach(FieldDescriptor::new("zip").scope("billing").rules("required"))
        .await
        .unwrap();
    validator
        .attach(FieldDescriptor::new("zip").scope("shipping").rules("required"))
        .await
        .unwrap();
    validator.validate_all(None).await.unwrap();
    assert_eq!(validator.errors().count(), 2);

    validator.reset(Some(&FieldMatcher::named("zip").in_scope("billing")));

    assert!(!validator.errors().any(Some("billing")));
    assert!(validator.errors().any(Some("shipping")));
    assert_eq!(validator.field("billing.zip").unwrap().flags().valid, None);
    assert_eq!(
        validator.field("shipping.zip").unwrap().flags().valid,
        Some(false)
    );
}

#[tokio::test]
async fn external_getter_is_read_on_demand() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    let validator = Validator::new();
    let grown = Arc::new(AtomicBool::new(false));
    let flag = grown.clone();
    validator
        .attach(
            FieldDescriptor::new("live")
                .rules("min:5")
                .getter(move || {
                    if flag.load(Ordering::SeqCst) {
                        json!("long enough")
                    } else {
                        json!("ab")
                    }
                }),
        )
        .await
        .unwrap();

    assert!(!validator.validate("live", None).await.unwrap());
    grown.store(true, Ordering::SeqCst);
    assert!(validator.validate("live", None).await.unwrap());
}

#[tokio::test]
async fn alias_drives_messages() {
    let validator = Validator::new();
    validator
        .attach(
            FieldDescriptor::new("pwd")
                .alias("password")
                .rules("required"),
        )
        .await
        .unwrap();
    validator.validate("pwd", Some(json!(""))).await.unwrap();
    assert_eq!(
        validator.errors().first("pwd", None).as_deref(),
        Some("The password field is required.")
    );
}

#[tokio::test]
async fn events_are_stored_verbatim() {
    let validator = Validator::new();
    let field = validator
        .attach(FieldDescriptor::new("name").events(["change", "blur"]))
        .await
        .unwrap();
    assert_eq!(field.events(), ["change", "blur"]);

    let default_events = validator
        .attach(FieldDescriptor::new("other"))
        .await
        .unwrap();
    assert_eq!(default_events.events(), ["input", "blur"]);
}

#[tokio::test]
async fn structured_rule_maps_attach_in_order() {
    let validator = Validator::new();
    validator
        .attach(
            FieldDescriptor::new("age")
                .rules(json!({"required": true, "integer": true, "between": [18, 99]}))
                .bails(false),
        )
        .await
        .unwrap();

    assert!(!validator.validate("age", Some(json!("abc"))).await.unwrap());
    let rules: Vec<_> = validator
        .errors()
        .collect(Some("age"), None)
        .iter()
        .map(|e| e.rule.clone())
        .collect();
    assert_eq!(rules, ["integer", "between"]);

    assert!(validator.validate("age", Some(json!(42))).await.unwrap());
    assert_eq!(validator.errors().count(), 0);
}

#[tokio::test]
async fn stored_value_without_initial_value_is_null() {
    let validator = Validator::new();
    let field = validator
        .attach(FieldDescriptor::new("blank"))
        .await
        .unwrap();
    assert_eq!(field.value(), Value::Null);
    field.set_value(json!("pushed"));
    assert_eq!(field.value(), json!("pushed"));
}
