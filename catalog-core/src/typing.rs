//! Attribute typing rules
//!
//! Pure functions that decide the initial value of a fresh attribute entry
//! and coerce edited values to what the attribute kind accepts.

use crate::models::{AttributeDefinition, AttributeKind};

/// Initial value for a freshly built attribute entry
pub fn default_value_for(def: &AttributeDefinition) -> String {
    default_value_for_kind(&def.kind)
}

/// Normalizes an edited value against the attribute definition
pub fn normalize(def: &AttributeDefinition, raw: &str) -> String {
    normalize_for_kind(&def.kind, raw)
}

pub(crate) fn default_value_for_kind(kind: &AttributeKind) -> String {
    match kind {
        AttributeKind::FreeText => String::new(),
        AttributeKind::ClosedList(values) => values.first().cloned().unwrap_or_default(),
    }
}

// Free text is stored verbatim; trimming is the assembler's business.
pub(crate) fn normalize_for_kind(kind: &AttributeKind, raw: &str) -> String {
    match kind {
        AttributeKind::FreeText => raw.to_string(),
        AttributeKind::ClosedList(values) => {
            if values.iter().any(|v| v == raw) {
                raw.to_string()
            } else {
                default_value_for_kind(kind)
            }
        }
    }
}
