//! Form session
//!
//! Owns one `FormState` for the lifetime of an open form together with the
//! reference data it depends on. Cascade events that arrive before the
//! taxonomy has loaded are queued and replayed, in order, once it lands.

use anyhow::Result;

use crate::cascade::{CascadeEvent, CascadeState};
use crate::catalog::TaxonomyCatalog;
use crate::error::FormError;
use crate::form::{self, BaseField, FormState, ProductPayload};
use crate::identifier::IdentifierKind;
use crate::loader::LoadEvent;
use crate::outbox::{SubmissionTarget, SubmittedRecord};
use crate::suppliers::{self, Supplier};

/// Loading status of the taxonomy catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    Loading,
    Ready,
    /// Load failed; the catalog stays empty
    Unavailable(String),
}

/// Outcome of a cascade event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Applied,
    /// Queued until the catalog has loaded
    Deferred,
}

/// One open product form
#[derive(Debug, Clone)]
pub struct FormSession {
    state: FormState,
    catalog: TaxonomyCatalog,
    catalog_status: CatalogStatus,
    suppliers: Vec<Supplier>,
    deferred: Vec<CascadeEvent>,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FormSession {
    /// Opens a form whose catalog is still loading
    pub fn new() -> Self {
        Self {
            state: FormState::new(),
            catalog: TaxonomyCatalog::empty(),
            catalog_status: CatalogStatus::Loading,
            suppliers: Vec::new(),
            deferred: Vec::new(),
        }
    }

    /// Opens a form over an already loaded catalog
    pub fn with_catalog(catalog: TaxonomyCatalog) -> Self {
        let mut session = Self::new();
        session.install_catalog(catalog);
        session
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn catalog(&self) -> &TaxonomyCatalog {
        &self.catalog
    }

    pub fn catalog_status(&self) -> &CatalogStatus {
        &self.catalog_status
    }

    /// The load failure, if the taxonomy could not be fetched
    pub fn catalog_error(&self) -> Option<FormError> {
        match &self.catalog_status {
            CatalogStatus::Unavailable(reason) => {
                Some(FormError::CatalogUnavailable(reason.clone()))
            }
            _ => None,
        }
    }

    pub fn deferred_events(&self) -> &[CascadeEvent] {
        &self.deferred
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    // =========================================================================
    // Reference data
    // =========================================================================

    /// Applies a finished background fetch
    pub fn apply_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Taxonomy(Ok(catalog)) => self.install_catalog(catalog),
            LoadEvent::Taxonomy(Err(reason)) => self.fail_catalog(reason),
            LoadEvent::Suppliers(Ok(list)) => {
                log::debug!("Loaded {} suppliers", list.len());
                self.suppliers = list;
            }
            LoadEvent::Suppliers(Err(reason)) => {
                log::warn!("Supplier list unavailable: {}", reason);
                self.suppliers.clear();
            }
        }
    }

    /// Installs the catalog and replays events deferred while loading.
    ///
    /// Installing again replaces the catalog without reconciling the current
    /// selection; names that vanished are simply not found afterwards.
    pub fn install_catalog(&mut self, catalog: TaxonomyCatalog) {
        log::debug!("Taxonomy catalog ready with {} groups", catalog.groups.len());
        self.catalog = catalog;
        self.catalog_status = CatalogStatus::Ready;
        self.replay_deferred();
    }

    fn fail_catalog(&mut self, reason: String) {
        log::warn!("Taxonomy catalog unavailable: {}", reason);
        self.catalog = TaxonomyCatalog::empty();
        self.catalog_status = CatalogStatus::Unavailable(reason);
        self.replay_deferred();
    }

    fn replay_deferred(&mut self) {
        for event in std::mem::take(&mut self.deferred) {
            if let Err(e) = self.state.cascade.apply(&self.catalog, &event) {
                log::debug!("Deferred event {:?} dropped: {}", event, e);
            }
        }
    }

    // =========================================================================
    // Cascade
    // =========================================================================

    /// Group names to offer (empty until the catalog is ready)
    pub fn available_groups(&self) -> Vec<&str> {
        self.catalog.group_names()
    }

    /// Subgroup names of the selected group
    pub fn available_subgroups(&self) -> Vec<&str> {
        self.catalog
            .lookup_group(self.state.cascade.selected_group())
            .map(|g| g.subgroup_names())
            .unwrap_or_default()
    }

    pub fn cascade_state(&self) -> CascadeState {
        self.state.cascade.state()
    }

    /// Routes a cascade event, deferring it while the catalog loads.
    ///
    /// Stale attribute edits are ignored and reported as applied.
    pub fn dispatch(&mut self, event: CascadeEvent) -> Result<Dispatch, FormError> {
        if self.catalog_status == CatalogStatus::Loading {
            log::debug!("Catalog loading, deferring {:?}", event);
            self.deferred.push(event);
            return Ok(Dispatch::Deferred);
        }

        match self.state.cascade.apply(&self.catalog, &event) {
            Ok(()) => Ok(Dispatch::Applied),
            Err(FormError::StaleAttributeEdit(name)) => {
                log::debug!("Ignoring edit of stale attribute '{}'", name);
                Ok(Dispatch::Applied)
            }
            Err(e) => Err(e),
        }
    }

    pub fn select_group(&mut self, name: &str) -> Result<Dispatch, FormError> {
        self.dispatch(CascadeEvent::SelectGroup(name.to_string()))
    }

    pub fn select_subgroup(&mut self, name: &str) -> Result<Dispatch, FormError> {
        self.dispatch(CascadeEvent::SelectSubgroup(name.to_string()))
    }

    pub fn edit_attribute(&mut self, name: &str, value: &str) -> Result<Dispatch, FormError> {
        self.dispatch(CascadeEvent::EditAttribute {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    // =========================================================================
    // Scalars and identifier
    // =========================================================================

    pub fn set_field(&mut self, field: BaseField, value: &str) {
        self.state.base.set(field, value);
    }

    pub fn set_identifier_mode(&mut self, mode: IdentifierKind) {
        self.state.identifier.set_mode(mode);
    }

    pub fn edit_manual_identifier(&mut self, value: &str) -> bool {
        self.state.identifier.edit_manual_value(value)
    }

    /// Manufacturer suggestions from the supplier list
    pub fn manufacturer_suggestions(&self, input: &str) -> Vec<String> {
        suppliers::suggest_names(&self.suppliers, input)
    }

    // =========================================================================
    // Submission
    // =========================================================================

    pub fn build_payload(&self) -> Result<ProductPayload, FormError> {
        form::build_payload(&self.state)
    }

    /// Submits the form. Success starts a fresh form (reference data is
    /// kept); any failure leaves the form exactly as it was.
    pub fn submit<T: SubmissionTarget + ?Sized>(&mut self, target: &T) -> Result<SubmittedRecord> {
        let payload = self.build_payload()?;
        let record = target.submit(payload)?;

        log::info!("Submitted product '{}' as {}", record.payload.name, record.sku);
        self.state = FormState::new();
        Ok(record)
    }
}
