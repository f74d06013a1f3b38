//! Core types shared by the whole engine.
//!
//! This module holds the pieces every other module builds on: the
//! structural error taxonomy, the per-field interaction flags, and the
//! sync/async rule outcome types.

pub mod error;
pub mod flags;
pub mod outcome;

pub use error::{ValidatorError, ValidatorResult};
pub use flags::FieldFlags;
pub use outcome::{Outcome, RuleOutput, ValidationResult, VerifyResult};
