//! Cascading group → subgroup → attribute selection
//!
//! Every transition reassigns whole fields: choosing a group always wipes the
//! subgroup and attribute list, choosing a subgroup always rebuilds the
//! attribute list from its definitions. Only attribute values are edited in
//! place.

use std::fmt;

use crate::catalog::TaxonomyCatalog;
use crate::error::FormError;
use crate::models::AttributeValue;
use crate::typing;

/// Where the cascade currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeState {
    NoGroup,
    GroupSelected,
    SubgroupSelected,
}

impl fmt::Display for CascadeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CascadeState::NoGroup => write!(f, "no group"),
            CascadeState::GroupSelected => write!(f, "group selected"),
            CascadeState::SubgroupSelected => write!(f, "subgroup selected"),
        }
    }
}

/// A user input that drives the cascade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeEvent {
    SelectGroup(String),
    SelectSubgroup(String),
    EditAttribute { name: String, value: String },
}

/// Group/subgroup selection plus the live attribute values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeController {
    selected_group: String,
    selected_subgroup: String,
    attributes: Vec<AttributeValue>,
}

impl CascadeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_group(&self) -> &str {
        &self.selected_group
    }

    pub fn selected_subgroup(&self) -> &str {
        &self.selected_subgroup
    }

    pub fn attributes(&self) -> &[AttributeValue] {
        &self.attributes
    }

    pub fn state(&self) -> CascadeState {
        if self.selected_group.is_empty() {
            CascadeState::NoGroup
        } else if self.selected_subgroup.is_empty() {
            CascadeState::GroupSelected
        } else {
            CascadeState::SubgroupSelected
        }
    }

    /// Selects a group, always discarding the subgroup and attributes.
    ///
    /// An empty name or one the catalog does not know leaves the cascade in
    /// `NoGroup`; validating the name is up to the caller.
    pub fn select_group(&mut self, catalog: &TaxonomyCatalog, name: &str) {
        self.selected_subgroup.clear();
        self.attributes.clear();

        if catalog.lookup_group(name).is_some() {
            self.selected_group = name.to_string();
        } else {
            if !name.is_empty() {
                log::debug!("Group '{}' not in catalog, cascade reset", name);
            }
            self.selected_group.clear();
        }
    }

    /// Selects a subgroup of the current group and rebuilds the attributes
    /// from its definitions, in definition order.
    ///
    /// Reselecting the current subgroup is a full reset, not a merge. On
    /// failure the previous state is kept.
    pub fn select_subgroup(
        &mut self,
        catalog: &TaxonomyCatalog,
        name: &str,
    ) -> Result<(), FormError> {
        if self.selected_group.is_empty() {
            return Err(FormError::InvalidSelection(format!(
                "subgroup '{}' selected before any group",
                name
            )));
        }

        let subgroup = catalog
            .lookup_subgroup(&self.selected_group, name)
            .ok_or_else(|| {
                FormError::InvalidSelection(format!(
                    "subgroup '{}' not found in group '{}'",
                    name, self.selected_group
                ))
            })?;

        self.attributes = subgroup
            .attributes
            .iter()
            .map(AttributeValue::from_definition)
            .collect();
        self.selected_subgroup = subgroup.name.clone();

        Ok(())
    }

    /// Replaces the value of the named attribute, normalized for its kind
    pub fn edit_attribute_value(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        let entry = self
            .attributes
            .iter_mut()
            .find(|a| a.name == name)
            .ok_or_else(|| FormError::StaleAttributeEdit(name.to_string()))?;

        entry.value = typing::normalize_for_kind(&entry.kind, value);
        Ok(())
    }

    /// Applies one event; used when replaying events deferred during loading
    pub fn apply(
        &mut self,
        catalog: &TaxonomyCatalog,
        event: &CascadeEvent,
    ) -> Result<(), FormError> {
        match event {
            CascadeEvent::SelectGroup(name) => {
                self.select_group(catalog, name);
                Ok(())
            }
            CascadeEvent::SelectSubgroup(name) => self.select_subgroup(catalog, name),
            CascadeEvent::EditAttribute { name, value } => self.edit_attribute_value(name, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;

    fn pairs(cascade: &CascadeController) -> Vec<(&str, &str)> {
        cascade
            .attributes()
            .iter()
            .map(|a| (a.name.as_str(), a.value.as_str()))
            .collect()
    }

    fn celulares() -> (TaxonomyCatalog, CascadeController) {
        let catalog = sample_catalog();
        let mut cascade = CascadeController::new();
        cascade.select_group(&catalog, "Electrónica");
        cascade.select_subgroup(&catalog, "Celulares").unwrap();
        (catalog, cascade)
    }

    #[test]
    fn test_initial_state() {
        let cascade = CascadeController::new();
        assert_eq!(cascade.state(), CascadeState::NoGroup);
        assert!(cascade.attributes().is_empty());
    }

    #[test]
    fn test_select_group_then_subgroup() {
        let (_, cascade) = celulares();
        assert_eq!(cascade.state(), CascadeState::SubgroupSelected);
        assert_eq!(pairs(&cascade), vec![("Color", "Negro"), ("Memoria", "")]);
    }

    #[test]
    fn test_edit_then_reselect_group() {
        let (catalog, mut cascade) = celulares();

        cascade.edit_attribute_value("Memoria", "128GB").unwrap();
        assert_eq!(pairs(&cascade), vec![("Color", "Negro"), ("Memoria", "128GB")]);

        cascade.select_group(&catalog, "Electrónica");
        assert!(cascade.attributes().is_empty());
        assert_eq!(cascade.selected_subgroup(), "");
        assert_eq!(cascade.selected_group(), "Electrónica");
        assert_eq!(cascade.state(), CascadeState::GroupSelected);
    }

    #[test]
    fn test_every_group_selection_clears_downstream() {
        let (catalog, mut cascade) = celulares();

        for name in ["Indumentaria", "", "Electrónica", "Juguetes", "Electrónica"] {
            cascade.select_group(&catalog, name);
            assert_eq!(cascade.selected_subgroup(), "");
            assert!(cascade.attributes().is_empty());

            // Reselect something downstream so the next call has work to clear
            if cascade.state() == CascadeState::GroupSelected {
                let first = catalog.lookup_group(name).unwrap().subgroups[0].name.clone();
                cascade.select_subgroup(&catalog, &first).unwrap();
            }
        }
    }

    #[test]
    fn test_unknown_or_empty_group_goes_to_no_group() {
        let (catalog, mut cascade) = celulares();

        cascade.select_group(&catalog, "Juguetes");
        assert_eq!(cascade.state(), CascadeState::NoGroup);
        assert_eq!(cascade.selected_group(), "");

        cascade.select_group(&catalog, "Electrónica");
        cascade.select_group(&catalog, "");
        assert_eq!(cascade.state(), CascadeState::NoGroup);
    }

    #[test]
    fn test_subgroup_requires_group() {
        let catalog = sample_catalog();
        let mut cascade = CascadeController::new();

        let result = cascade.select_subgroup(&catalog, "Celulares");
        assert!(matches!(result, Err(FormError::InvalidSelection(_))));
        assert_eq!(cascade.state(), CascadeState::NoGroup);
    }

    #[test]
    fn test_unknown_subgroup_keeps_prior_state() {
        let (catalog, mut cascade) = celulares();
        cascade.edit_attribute_value("Memoria", "64GB").unwrap();
        let before = cascade.clone();

        let result = cascade.select_subgroup(&catalog, "Talle");
        assert!(matches!(result, Err(FormError::InvalidSelection(_))));
        assert_eq!(cascade, before);
    }

    #[test]
    fn test_subgroup_of_another_group_is_rejected() {
        let catalog = sample_catalog();
        let mut cascade = CascadeController::new();
        cascade.select_group(&catalog, "Indumentaria");

        assert!(cascade.select_subgroup(&catalog, "Celulares").is_err());
        assert_eq!(cascade.state(), CascadeState::GroupSelected);

        // Same subgroup name under a different group resolves locally
        cascade.select_subgroup(&catalog, "Accesorios").unwrap();
        assert_eq!(pairs(&cascade), vec![("Talle", "S")]);
    }

    #[test]
    fn test_attributes_follow_definition_order() {
        let (catalog, cascade) = celulares();
        let definitions = &catalog
            .lookup_subgroup("Electrónica", "Celulares")
            .unwrap()
            .attributes;

        let names: Vec<&str> = cascade.attributes().iter().map(|a| a.name.as_str()).collect();
        let expected: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_reselecting_subgroup_is_a_full_reset() {
        let (catalog, mut cascade) = celulares();
        let once = cascade.clone();

        cascade.edit_attribute_value("Color", "Blanco").unwrap();
        cascade.edit_attribute_value("Memoria", "256GB").unwrap();
        cascade.select_subgroup(&catalog, "Celulares").unwrap();
        cascade.select_subgroup(&catalog, "Celulares").unwrap();

        assert_eq!(cascade, once);
    }

    #[test]
    fn test_edit_keeps_length_and_order() {
        let (_, mut cascade) = celulares();

        cascade.edit_attribute_value("Color", "Blanco").unwrap();
        assert_eq!(pairs(&cascade), vec![("Color", "Blanco"), ("Memoria", "")]);

        // Non-member closed-list value is coerced, not stored
        cascade.edit_attribute_value("Color", "Rojo").unwrap();
        assert_eq!(pairs(&cascade), vec![("Color", "Negro"), ("Memoria", "")]);
    }

    #[test]
    fn test_stale_edit_is_rejected_without_changes() {
        let (_, mut cascade) = celulares();
        let before = cascade.clone();

        let result = cascade.edit_attribute_value("Talle", "M");
        assert_eq!(result, Err(FormError::StaleAttributeEdit("Talle".into())));
        assert_eq!(cascade, before);

        let mut empty = CascadeController::new();
        assert!(empty.edit_attribute_value("Color", "Negro").is_err());
    }

    #[test]
    fn test_apply_dispatches_events() {
        let catalog = sample_catalog();
        let mut cascade = CascadeController::new();

        let events = vec![
            CascadeEvent::SelectGroup("Electrónica".into()),
            CascadeEvent::SelectSubgroup("Celulares".into()),
            CascadeEvent::EditAttribute {
                name: "Memoria".into(),
                value: "128GB".into(),
            },
        ];
        for event in &events {
            cascade.apply(&catalog, event).unwrap();
        }

        assert_eq!(pairs(&cascade), vec![("Color", "Negro"), ("Memoria", "128GB")]);
    }
}
