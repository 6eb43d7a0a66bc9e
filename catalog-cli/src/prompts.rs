use anyhow::Result;
use chrono::NaiveDate;
use inquire::error::CustomUserError;
use inquire::validator::{Validation, ValueRequiredValidator};
use inquire::{Confirm, Select, Text};

use catalog_core::suppliers::suggest_names;
use catalog_core::{AttributeKind, BaseField, FormSession, IdentifierKind, Settings};

/// Rejects input that is empty or only whitespace
pub fn validate_not_blank(input: &str) -> Result<Validation, CustomUserError> {
    if input.trim().is_empty() {
        Ok(Validation::Invalid("A value is required".into()))
    } else {
        Ok(Validation::Valid)
    }
}

/// Accepts an empty input or a YYYY-MM-DD date
pub fn validate_date(input: &str) -> Result<Validation, CustomUserError> {
    if input.trim().is_empty() || NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").is_ok() {
        Ok(Validation::Valid)
    } else {
        Ok(Validation::Invalid("Use the YYYY-MM-DD format".into()))
    }
}

/// Accepts a whole, non-negative number
pub fn validate_quantity(input: &str) -> Result<Validation, CustomUserError> {
    if input.trim().parse::<u32>().is_ok() {
        Ok(Validation::Valid)
    } else {
        Ok(Validation::Invalid("Enter a whole number".into()))
    }
}

/// Prompts for the scalar fields that do not depend on reference data
pub fn prompt_base_fields(session: &mut FormSession, settings: &Settings) -> Result<()> {
    let name = Text::new("Name:")
        .with_validator(ValueRequiredValidator::default())
        .prompt()?;
    session.set_field(BaseField::Name, &name);

    // Use the Editor type for multiline input
    let description = inquire::Editor::new("Description:")
        .with_validator(validate_not_blank)
        .prompt()?;
    session.set_field(BaseField::Description, &description);

    let cost_price = Text::new("Cost price:")
        .with_placeholder("1.500,00")
        .prompt()?;
    session.set_field(BaseField::CostPrice, &cost_price);

    let public_price = Text::new("Public price:")
        .with_placeholder("2.000,00")
        .prompt()?;
    session.set_field(BaseField::PublicPrice, &public_price);

    let expiry_date = Text::new("Expiry date (YYYY-MM-DD, optional):")
        .with_validator(validate_date)
        .prompt()?;
    session.set_field(BaseField::ExpiryDate, expiry_date.trim());

    let branch = if settings.branches.is_empty() {
        Text::new("Branch:")
            .with_validator(ValueRequiredValidator::default())
            .prompt()?
    } else {
        Select::new("Branch:", settings.branches.clone()).prompt()?
    };
    session.set_field(BaseField::Branch, &branch);

    let stock = Text::new("Stock quantity:")
        .with_validator(validate_quantity)
        .prompt()?;
    session.set_field(BaseField::StockQuantity, stock.trim());

    Ok(())
}

/// Prompts for the manufacturer, suggesting supplier names
pub fn prompt_manufacturer(session: &mut FormSession) -> Result<()> {
    let suppliers = session.suppliers().to_vec();
    let suggester = move |input: &str| -> Result<Vec<String>, CustomUserError> {
        Ok(suggest_names(&suppliers, input))
    };

    let manufacturer = Text::new("Manufacturer:")
        .with_placeholder("type or pick a supplier")
        .with_autocomplete(suggester)
        .prompt()?;
    session.set_field(BaseField::Manufacturer, &manufacturer);

    Ok(())
}

/// Prompts for the group, then the subgroup, then every attribute
pub fn prompt_taxonomy(session: &mut FormSession) -> Result<()> {
    let groups: Vec<String> = session
        .available_groups()
        .into_iter()
        .map(String::from)
        .collect();
    if groups.is_empty() {
        anyhow::bail!("No groups available - check the taxonomy file");
    }

    let group = Select::new("Group:", groups).prompt()?;
    session.select_group(&group)?;

    let subgroups: Vec<String> = session
        .available_subgroups()
        .into_iter()
        .map(String::from)
        .collect();
    if subgroups.is_empty() {
        anyhow::bail!("Group '{}' has no subgroups", group);
    }

    let subgroup = Select::new("Subgroup:", subgroups).prompt()?;
    session.select_subgroup(&subgroup)?;

    prompt_attributes(session)
}

/// Prompts for each attribute of the selected subgroup, in order
pub fn prompt_attributes(session: &mut FormSession) -> Result<()> {
    let attributes = session.state().cascade.attributes().to_vec();

    for attr in attributes {
        let label = format!("{}:", attr.name);
        let value = match &attr.kind {
            AttributeKind::ClosedList(values) if values.is_empty() => continue,
            AttributeKind::ClosedList(values) => {
                let cursor = values.iter().position(|v| *v == attr.value).unwrap_or(0);
                Select::new(&label, values.clone())
                    .with_starting_cursor(cursor)
                    .prompt()?
            }
            AttributeKind::FreeText => Text::new(&label).prompt()?,
        };
        session.edit_attribute(&attr.name, &value)?;
    }

    Ok(())
}

/// Prompts for the SKU mode and, in manual mode, the SKU itself
pub fn prompt_identifier(session: &mut FormSession) -> Result<()> {
    let mode = Select::new("SKU:", vec![IdentifierKind::Auto, IdentifierKind::Manual]).prompt()?;
    session.set_identifier_mode(mode);

    if mode == IdentifierKind::Manual {
        let sku = Text::new("Manual SKU:")
            .with_validator(ValueRequiredValidator::default())
            .prompt()?;
        session.edit_manual_identifier(&sku);
    }

    Ok(())
}

/// Asks for confirmation before submitting
pub fn prompt_confirm_submit() -> Result<bool> {
    Ok(Confirm::new("Submit product?").with_default(true).prompt()?)
}
