//! Form state and payload assembly
//!
//! `FormState` aggregates the scalar inputs, the cascade and the identifier
//! toggle. `build_payload` turns it into the outbound record; the wire field
//! names follow the product backend.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cascade::CascadeController;
use crate::error::FormError;
use crate::identifier::{Identifier, IdentifierMode};

/// The scalar inputs of the product form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseField {
    Name,
    Description,
    CostPrice,
    PublicPrice,
    ExpiryDate,
    Branch,
    Manufacturer,
    StockQuantity,
}

impl BaseField {
    pub const ALL: [BaseField; 8] = [
        BaseField::Name,
        BaseField::Description,
        BaseField::CostPrice,
        BaseField::PublicPrice,
        BaseField::ExpiryDate,
        BaseField::Branch,
        BaseField::Manufacturer,
        BaseField::StockQuantity,
    ];

    /// Fields that must be non-blank before submission
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            BaseField::Name | BaseField::Description | BaseField::Branch | BaseField::StockQuantity
        )
    }

    /// Name used in validation messages
    pub fn key(&self) -> &'static str {
        match self {
            BaseField::Name => "name",
            BaseField::Description => "description",
            BaseField::CostPrice => "cost price",
            BaseField::PublicPrice => "public price",
            BaseField::ExpiryDate => "expiry date",
            BaseField::Branch => "branch",
            BaseField::Manufacturer => "manufacturer",
            BaseField::StockQuantity => "stock quantity",
        }
    }
}

impl fmt::Display for BaseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Scalar field values, stored as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseFields {
    pub name: String,
    pub description: String,
    pub cost_price: String,
    pub public_price: String,
    pub expiry_date: String,
    pub branch: String,
    pub manufacturer: String,
    pub stock_quantity: String,
}

impl BaseFields {
    pub fn get(&self, field: BaseField) -> &str {
        match field {
            BaseField::Name => &self.name,
            BaseField::Description => &self.description,
            BaseField::CostPrice => &self.cost_price,
            BaseField::PublicPrice => &self.public_price,
            BaseField::ExpiryDate => &self.expiry_date,
            BaseField::Branch => &self.branch,
            BaseField::Manufacturer => &self.manufacturer,
            BaseField::StockQuantity => &self.stock_quantity,
        }
    }

    pub fn set(&mut self, field: BaseField, value: impl Into<String>) {
        let slot = match field {
            BaseField::Name => &mut self.name,
            BaseField::Description => &mut self.description,
            BaseField::CostPrice => &mut self.cost_price,
            BaseField::PublicPrice => &mut self.public_price,
            BaseField::ExpiryDate => &mut self.expiry_date,
            BaseField::Branch => &mut self.branch,
            BaseField::Manufacturer => &mut self.manufacturer,
            BaseField::StockQuantity => &mut self.stock_quantity,
        };
        *slot = value.into();
    }
}

/// Everything the user has entered in one form session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub base: BaseFields,
    pub cascade: CascadeController,
    pub identifier: IdentifierMode,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Attribute entry of the outbound record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributePair {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "valor")]
    pub value: String,
}

/// Outbound product record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductPayload {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "precio_costo")]
    pub cost_price: String,
    #[serde(rename = "precio_publico")]
    pub public_price: String,
    #[serde(rename = "fecha_vencimiento")]
    pub expiry_date: String,
    #[serde(rename = "sucursal")]
    pub branch: String,
    #[serde(rename = "fabricante")]
    pub manufacturer: String,
    #[serde(rename = "cantidad_stock")]
    pub stock_quantity: String,
    #[serde(rename = "rubro")]
    pub group: String,
    #[serde(rename = "categoria")]
    pub subgroup: String,
    #[serde(rename = "atributos")]
    pub attributes: Vec<AttributePair>,
    pub sku: Identifier,
}

/// Lists what is still missing before the form can be submitted
pub fn missing_fields(state: &FormState) -> Vec<&'static str> {
    let mut missing = Vec::new();

    if state.cascade.selected_group().is_empty() {
        missing.push("group");
    }
    if state.cascade.selected_subgroup().is_empty() {
        missing.push("subgroup");
    }
    for field in BaseField::ALL.iter().filter(|f| f.is_required()) {
        if state.base.get(*field).trim().is_empty() {
            missing.push(field.key());
        }
    }
    if let Identifier::Manual(value) = state.identifier.resolve() {
        if value.is_empty() {
            missing.push("sku");
        }
    }

    missing
}

/// Builds the outbound record, refusing partial selections
pub fn build_payload(state: &FormState) -> Result<ProductPayload, FormError> {
    let missing = missing_fields(state);
    if !missing.is_empty() {
        return Err(FormError::IncompleteSelection { missing });
    }

    let base = &state.base;
    Ok(ProductPayload {
        name: base.name.clone(),
        description: base.description.clone(),
        cost_price: base.cost_price.clone(),
        public_price: base.public_price.clone(),
        expiry_date: base.expiry_date.clone(),
        branch: base.branch.clone(),
        manufacturer: base.manufacturer.clone(),
        stock_quantity: base.stock_quantity.clone(),
        group: state.cascade.selected_group().to_string(),
        subgroup: state.cascade.selected_subgroup().to_string(),
        attributes: state
            .cascade
            .attributes()
            .iter()
            .map(|a| AttributePair {
                name: a.name.clone(),
                value: a.value.clone(),
            })
            .collect(),
        sku: state.identifier.resolve(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;
    use crate::identifier::IdentifierKind;

    fn filled_state() -> FormState {
        let catalog = sample_catalog();
        let mut state = FormState::new();
        state.base.set(BaseField::Name, "Moto G");
        state.base.set(BaseField::Description, "Teléfono");
        state.base.set(BaseField::Branch, "centro");
        state.base.set(BaseField::StockQuantity, "3");
        state.cascade.select_group(&catalog, "Electrónica");
        state.cascade.select_subgroup(&catalog, "Celulares").unwrap();
        state
    }

    #[test]
    fn test_build_payload() {
        let mut state = filled_state();
        state.cascade.edit_attribute_value("Memoria", "128GB").unwrap();
        state.base.set(BaseField::Manufacturer, "  Motorola ");

        let payload = build_payload(&state).unwrap();
        assert_eq!(payload.group, "Electrónica");
        assert_eq!(payload.subgroup, "Celulares");
        assert_eq!(payload.manufacturer, "  Motorola ");
        assert_eq!(payload.cost_price, "");
        assert_eq!(
            payload.attributes,
            vec![
                AttributePair {
                    name: "Color".into(),
                    value: "Negro".into()
                },
                AttributePair {
                    name: "Memoria".into(),
                    value: "128GB".into()
                },
            ]
        );
        assert_eq!(payload.sku, Identifier::Auto);
    }

    #[test]
    fn test_empty_subgroup_is_incomplete() {
        let catalog = sample_catalog();
        let mut state = filled_state();
        state.cascade.select_group(&catalog, "Electrónica");

        let err = build_payload(&state).unwrap_err();
        assert_eq!(
            err,
            FormError::IncompleteSelection {
                missing: vec!["subgroup"]
            }
        );
    }

    #[test]
    fn test_missing_group_and_required_fields() {
        let state = FormState::new();
        let err = build_payload(&state).unwrap_err();
        assert_eq!(
            err,
            FormError::IncompleteSelection {
                missing: vec![
                    "group",
                    "subgroup",
                    "name",
                    "description",
                    "branch",
                    "stock quantity",
                ]
            }
        );
    }

    #[test]
    fn test_blank_required_field_is_missing() {
        let mut state = filled_state();
        state.base.set(BaseField::Name, "   ");
        assert_eq!(missing_fields(&state), vec!["name"]);
    }

    #[test]
    fn test_auto_mode_uses_sentinel() {
        let mut state = filled_state();
        state.identifier.set_mode(IdentifierKind::Manual);
        state.identifier.edit_manual_value("SKU-100");
        assert_eq!(
            build_payload(&state).unwrap().sku,
            Identifier::Manual("SKU-100".into())
        );

        state.identifier.set_mode(IdentifierKind::Auto);
        assert_eq!(state.identifier.manual_value(), "");
        assert_eq!(build_payload(&state).unwrap().sku, Identifier::Auto);
    }

    #[test]
    fn test_manual_mode_requires_value() {
        let mut state = filled_state();
        state.identifier.set_mode(IdentifierKind::Manual);
        state.identifier.edit_manual_value("  ");
        assert_eq!(missing_fields(&state), vec!["sku"]);
    }

    #[test]
    fn test_payload_wire_names() {
        let payload = build_payload(&filled_state()).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["nombre"], "Moto G");
        assert_eq!(json["rubro"], "Electrónica");
        assert_eq!(json["categoria"], "Celulares");
        assert_eq!(json["cantidad_stock"], "3");
        assert_eq!(json["atributos"][0]["nombre"], "Color");
        assert_eq!(json["atributos"][0]["valor"], "Negro");
        assert_eq!(json["sku"], "auto");
        // Kind metadata never leaves the form
        assert!(json["atributos"][0].get("tipo").is_none());
    }

    #[test]
    fn test_base_fields_get_set() {
        let mut base = BaseFields::default();
        for field in BaseField::ALL {
            base.set(field, field.key());
        }
        for field in BaseField::ALL {
            assert_eq!(base.get(field), field.key());
        }
    }
}
