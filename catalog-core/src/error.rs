//! Form error kinds
//!
//! None of these are fatal: every failure leaves the form state unchanged
//! and is reported to the caller.

use thiserror::Error;

/// Errors raised by the cascade, identifier and assembler layers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Taxonomy catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Incomplete form, missing: {}", .missing.join(", "))]
    IncompleteSelection { missing: Vec<&'static str> },

    #[error("Attribute '{0}' is not part of the current subgroup")]
    StaleAttributeEdit(String),
}

impl FormError {
    /// Whether the error must block the user (only incomplete submissions do)
    pub fn is_blocking(&self) -> bool {
        matches!(self, FormError::IncompleteSelection { .. })
    }
}
