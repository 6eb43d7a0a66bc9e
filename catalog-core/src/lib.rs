pub mod cascade;
pub mod catalog;
pub mod error;
pub mod form;
pub mod identifier;
pub mod loader;
pub mod models;
pub mod outbox;
pub mod session;
pub mod settings;
pub mod suppliers;
pub mod typing;

// Re-export commonly used types
pub use cascade::{CascadeController, CascadeEvent, CascadeState};
pub use catalog::TaxonomyCatalog;
pub use error::FormError;
pub use form::{build_payload, AttributePair, BaseField, BaseFields, FormState, ProductPayload};
pub use identifier::{Identifier, IdentifierKind, IdentifierMode};
pub use loader::{FileSource, LoadEvent, ReferenceLoader, ReferenceSource};
pub use models::{AttributeDefinition, AttributeKind, AttributeValue, Group, Subgroup};
pub use outbox::{Outbox, OutboxStore, SubmissionTarget, SubmittedRecord};
pub use session::{CatalogStatus, Dispatch, FormSession};
pub use settings::{get_settings_path, Settings};
pub use suppliers::Supplier;
pub use typing::{default_value_for, normalize};
