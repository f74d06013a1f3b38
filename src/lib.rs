//! # formguard
//!
//! A headless, declarative form-validation engine: named fields, named
//! composable rules (sync or async), per-field interaction flags, and
//! structured errors. UI bindings sit on top; the engine gives
//! deterministic, race-free answers to "is this field/form valid right
//! now" despite async rule checks, cross-field dependencies, and
//! overlapping revalidation triggers.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use formguard::prelude::*;
//! use serde_json::json;
//!
//! let validator = Validator::new();
//! validator
//!     .attach(FieldDescriptor::new("password").rules("required|min:8"))
//!     .await?;
//! validator
//!     .attach(FieldDescriptor::new("confirm").rules("confirmed:password"))
//!     .await?;
//!
//! validator.validate("password", Some(json!("hunter22"))).await?;
//! validator.validate("confirm", Some(json!("hunter22"))).await?;
//! assert!(!validator.errors().any(None));
//! ```
//!
//! ## Design
//!
//! - **Rules** live in a [`RuleRegistry`]: string-keyed, dynamically
//!   dispatched, reserved built-ins, fluent [`RuleBuilder`] for custom
//!   sync/async rules.
//! - **Fields** are strict flag state machines with a monotonic
//!   *validation token*: overlapping async passes can never apply
//!   results out of order: only the newest pass mutates state.
//! - **Cross-field rules** (`confirmed:password`) register edges in a
//!   [`DependencyGraph`]; changing the target cascades revalidation with
//!   cycle-safe, visit-once semantics.
//! - **Errors** are data: a failing rule becomes an [`ErrorBag`] entry,
//!   never an `Err`. Only structural misconfiguration errors out.

// Deep generic bounds on the rule builder closures are inherent to the
// dynamic registry design.
#![allow(clippy::type_complexity)]

pub mod core;
pub mod dsl;
pub mod error_bag;
pub mod field;
pub mod graph;
pub mod messages;
pub mod prelude;
pub mod registry;
pub mod rules;
pub mod validator;

pub use crate::core::error::{ValidatorError, ValidatorResult};
pub use crate::core::flags::FieldFlags;
pub use crate::core::outcome::{Outcome, RuleOutput, ValidationResult, VerifyResult};
pub use crate::dsl::{RuleSpec, RulesSource};
pub use crate::error_bag::{ErrorBag, FieldError};
pub use crate::field::{Field, FieldBag, FieldDescriptor, FieldId, FieldMatcher};
pub use crate::graph::DependencyGraph;
pub use crate::messages::{DefaultMessages, MessageResolver};
pub use crate::registry::{ExtendOptions, RuleBuilder, RuleDef, RuleRegistry};
pub use crate::validator::{Validator, VerifyOptions};
