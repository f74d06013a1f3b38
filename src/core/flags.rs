//! Per-field interaction and validity flags.
//!
//! A field's "state" is this flag combination, not an enum, but the
//! transitions between combinations are strict. All mutation goes through
//! methods that keep the paired flags in sync:
//!
//! - `touched == !untouched`
//! - `dirty == !pristine`
//! - `valid` stays `None` until the first completed validation pass

use serde::{Deserialize, Serialize};

/// Interaction and validity flags for a single field.
///
/// Serializable so UI bindings can ship the whole set to a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFlags {
    /// The user has not interacted with the field yet.
    pub untouched: bool,
    /// The user has interacted with the field.
    pub touched: bool,
    /// The value has never changed since attach.
    pub pristine: bool,
    /// The value has changed since attach.
    pub dirty: bool,
    /// At least one validation pass has completed.
    pub validated: bool,
    /// A validation pass is currently in flight.
    pub pending: bool,
    /// The field is required (derived from rules, may be recomputed by
    /// `computes_required` rules on every pass).
    pub required: bool,
    /// Aggregate validity of the last completed pass. `None` until
    /// `validated` is true.
    pub valid: Option<bool>,
}

impl FieldFlags {
    /// Flags as they stand immediately after attach.
    ///
    /// An `initial` field starts dirty because a validation pass runs
    /// before any interaction.
    pub fn on_attach(initial: bool, required: bool) -> Self {
        Self {
            untouched: true,
            touched: false,
            pristine: !initial,
            dirty: initial,
            validated: false,
            pending: false,
            required,
            valid: None,
        }
    }

    /// Records a user interaction (value change). Does not mark the field
    /// validated.
    pub fn interact(&mut self) {
        self.touched = true;
        self.untouched = false;
        self.dirty = true;
        self.pristine = false;
    }

    /// Marks a validation pass as started.
    pub fn begin_validation(&mut self) {
        self.pending = true;
    }

    /// Marks a validation pass as completed with the aggregate result.
    pub fn finish_validation(&mut self, valid: bool) {
        self.pending = false;
        self.validated = true;
        self.valid = Some(valid);
    }

    /// The inverse of `valid`; `None` until validated.
    pub fn invalid(&self) -> Option<bool> {
        self.valid.map(|v| !v)
    }
}
