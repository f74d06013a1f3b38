//! Convenience re-exports for the common path.
//!
//! ```rust,ignore
//! use formguard::prelude::*;
//! ```

pub use crate::core::error::{ValidatorError, ValidatorResult};
pub use crate::core::flags::FieldFlags;
pub use crate::core::outcome::{Outcome, RuleOutput, ValidationResult, VerifyResult};
pub use crate::error_bag::{ErrorBag, FieldError};
pub use crate::field::{Field, FieldDescriptor, FieldId, FieldMatcher};
pub use crate::messages::MessageResolver;
pub use crate::registry::{ExtendOptions, RuleBuilder, RuleDef, RuleRegistry};
pub use crate::validator::{Validator, VerifyOptions};
