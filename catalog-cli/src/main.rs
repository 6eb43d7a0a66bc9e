mod cli;
mod prompts;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use colored::Colorize;

use catalog_core::suppliers::load_suppliers;
use catalog_core::{
    get_settings_path, AttributeKind, BaseField, CatalogStatus, FileSource, FormSession,
    IdentifierKind, LoadEvent, Outbox, ReferenceLoader, Settings, SubmittedRecord,
    TaxonomyCatalog,
};

use crate::cli::{Cli, Command, ConfigCommand};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings_path = get_settings_path()?;
    let mut settings = Settings::load_or_default(&settings_path)?;
    if let Some(path) = &cli.taxonomy {
        settings.taxonomy_path = path.clone();
    }
    if let Some(path) = &cli.suppliers {
        settings.suppliers_path = path.clone();
    }
    if let Some(path) = &cli.outbox {
        settings.outbox_path = path.clone();
    }

    match &cli.command {
        Command::Add {
            name,
            description,
            cost_price,
            public_price,
            expiry_date,
            branch,
            manufacturer,
            stock,
            group,
            subgroup,
            attrs,
            sku,
            interactive,
        } => {
            // Default to interactive mode if no specific arguments are provided
            let should_be_interactive = *interactive
                || (name.is_none()
                    && description.is_none()
                    && cost_price.is_none()
                    && public_price.is_none()
                    && expiry_date.is_none()
                    && branch.is_none()
                    && manufacturer.is_none()
                    && stock.is_none()
                    && group.is_none()
                    && subgroup.is_none()
                    && attrs.is_empty()
                    && sku.is_none());

            if should_be_interactive {
                add_product_interactive(&settings)?;
            } else {
                let fields = [
                    (BaseField::Name, name),
                    (BaseField::Description, description),
                    (BaseField::CostPrice, cost_price),
                    (BaseField::PublicPrice, public_price),
                    (BaseField::ExpiryDate, expiry_date),
                    (BaseField::Branch, branch),
                    (BaseField::Manufacturer, manufacturer),
                    (BaseField::StockQuantity, stock),
                ];
                add_product_cli(&settings, &fields, group, subgroup, attrs, sku)?;
            }
        }
        Command::Taxonomy { group } => {
            show_taxonomy(&settings, group.as_deref())?;
        }
        Command::Suppliers => {
            list_suppliers(&settings)?;
        }
        Command::List => {
            list_products(&settings)?;
        }
        Command::Config(config_cmd) => {
            handle_config_command(config_cmd, &settings_path)?;
        }
    }

    Ok(())
}

/// Opens a form and starts fetching reference data in the background
fn open_form(settings: &Settings) -> (FormSession, ReferenceLoader) {
    let source = FileSource::new(&settings.taxonomy_path, &settings.suppliers_path);
    (FormSession::new(), ReferenceLoader::start(source))
}

/// Waits up to the configured timeout for reference data and applies it.
/// A taxonomy that never arrives counts as failed.
fn wait_for_reference_data(
    session: &mut FormSession,
    loader: &mut ReferenceLoader,
    settings: &Settings,
) {
    for event in loader.wait_all(settings.load_timeout()) {
        session.apply_load_event(event);
    }

    if loader.is_pending() {
        log::warn!("Reference data still loading after {:?}", settings.load_timeout());
        if *session.catalog_status() == CatalogStatus::Loading {
            session.apply_load_event(LoadEvent::Taxonomy(Err(
                "timed out waiting for taxonomy".to_string(),
            )));
        }
    }

    if let Some(err) = session.catalog_error() {
        eprintln!("{} {}", "Warning:".yellow(), err);
    }
}

fn add_product_interactive(settings: &Settings) -> Result<()> {
    let (mut session, mut loader) = open_form(settings);
    let outbox = Outbox::new(&settings.outbox_path);

    // Reference data keeps loading while the scalar fields are filled in
    prompts::prompt_base_fields(&mut session, settings)?;

    wait_for_reference_data(&mut session, &mut loader, settings);
    prompts::prompt_manufacturer(&mut session)?;
    prompts::prompt_taxonomy(&mut session)?;
    prompts::prompt_identifier(&mut session)?;

    let payload = session.build_payload()?;
    println!();
    println!("{} / {}", payload.group.cyan(), payload.subgroup.cyan());
    for attr in &payload.attributes {
        println!("  {}: {}", attr.name, attr.value);
    }

    if !prompts::prompt_confirm_submit()? {
        println!("{}", "Product discarded.".yellow());
        return Ok(());
    }

    let record = session.submit(&outbox)?;
    print_submitted(&record);

    Ok(())
}

fn add_product_cli(
    settings: &Settings,
    fields: &[(BaseField, &Option<String>)],
    group: &Option<String>,
    subgroup: &Option<String>,
    attrs: &[String],
    sku: &Option<String>,
) -> Result<()> {
    let (mut session, mut loader) = open_form(settings);
    let outbox = Outbox::new(&settings.outbox_path);

    for (field, value) in fields {
        if let Some(value) = value {
            session.set_field(*field, value);
        }
    }

    if let Some(date) = fields
        .iter()
        .find(|(f, _)| *f == BaseField::ExpiryDate)
        .and_then(|(_, v)| v.as_deref())
    {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("Invalid expiry date '{}', expected YYYY-MM-DD", date))?;
    }

    if let Some(value) = sku {
        session.set_identifier_mode(IdentifierKind::Manual);
        session.edit_manual_identifier(value);
    }

    wait_for_reference_data(&mut session, &mut loader, settings);

    if let Some(group) = group {
        if !session.available_groups().contains(&group.as_str()) {
            anyhow::bail!("Group '{}' not found in taxonomy", group);
        }
        session.select_group(group)?;
    }

    if let Some(subgroup) = subgroup {
        session.select_subgroup(subgroup)?;
    }

    for attr in attrs {
        let (name, value) = attr
            .split_once('=')
            .with_context(|| format!("Invalid attribute '{}', expected NAME=VALUE", attr))?;

        let current = session
            .state()
            .cascade
            .attributes()
            .iter()
            .find(|a| a.name == name)
            .cloned();
        match current {
            None => {
                eprintln!(
                    "{} attribute '{}' is not part of this subgroup, ignored",
                    "Warning:".yellow(),
                    name
                );
            }
            Some(a) => {
                if let AttributeKind::ClosedList(values) = &a.kind {
                    if !values.iter().any(|v| v == value) {
                        eprintln!(
                            "{} '{}' is not allowed for '{}' (allowed: {})",
                            "Warning:".yellow(),
                            value,
                            name,
                            values.join(", ")
                        );
                    }
                }
                session.edit_attribute(name, value)?;
            }
        }
    }

    let record = session.submit(&outbox)?;
    print_submitted(&record);

    Ok(())
}

fn print_submitted(record: &SubmittedRecord) {
    println!("{}", "Product added successfully!".green());
    println!("ID: {}", record.id);
    println!("SKU: {}", record.sku.green());
}

fn show_taxonomy(settings: &Settings, group_filter: Option<&str>) -> Result<()> {
    let catalog = TaxonomyCatalog::load(&settings.taxonomy_path)?;

    let groups: Vec<_> = match group_filter {
        Some(name) => match catalog.lookup_group(name) {
            Some(group) => vec![group],
            None => anyhow::bail!("Group '{}' not found in taxonomy", name),
        },
        None => catalog.groups.iter().collect(),
    };

    if groups.is_empty() {
        println!("No groups found.");
        return Ok(());
    }

    for group in groups {
        println!("{}", group.name.bold());
        for subgroup in &group.subgroups {
            println!("  {}", subgroup.name.cyan());
            for attr in &subgroup.attributes {
                println!("    {} ({})", attr.name, attr.kind);
            }
        }
    }

    Ok(())
}

fn list_suppliers(settings: &Settings) -> Result<()> {
    let suppliers = load_suppliers(&settings.suppliers_path)?;

    if suppliers.is_empty() {
        println!("No suppliers found.");
        return Ok(());
    }

    for supplier in suppliers {
        println!("{} {}", supplier.id.dimmed(), supplier.name);
    }

    Ok(())
}

fn list_products(settings: &Settings) -> Result<()> {
    let store = Outbox::new(&settings.outbox_path).load()?;

    if store.records.is_empty() {
        println!("No products submitted yet.");
        return Ok(());
    }

    for record in &store.records {
        println!(
            "{} {} [{} / {}] {}",
            record.sku.green(),
            record.payload.name.bold(),
            record.payload.group,
            record.payload.subgroup,
            record.submitted_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }

    Ok(())
}

fn handle_config_command(cmd: &ConfigCommand, settings_path: &std::path::Path) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let settings = Settings::load_or_default(settings_path)?;
            println!("Settings file: {:?}", settings_path);
            println!("Taxonomy: {:?}", settings.taxonomy_path);
            println!("Suppliers: {:?}", settings.suppliers_path);
            println!("Outbox: {:?}", settings.outbox_path);
            if settings.branches.is_empty() {
                println!("Branches: (free input)");
            } else {
                println!("Branches: {}", settings.branches.join(", "));
            }
            println!("Load timeout: {}s", settings.load_timeout_secs);
        }
        ConfigCommand::Init => {
            if settings_path.exists() {
                println!("Settings already exist at {:?}", settings_path);
            } else {
                Settings::create_default(settings_path)?;
                println!("{} {:?}", "Created settings at".green(), settings_path);
            }
        }
        ConfigCommand::Set {
            taxonomy_path,
            suppliers_path,
            outbox_path,
            branches,
            load_timeout,
        } => {
            let mut settings = Settings::load_or_default(settings_path)?;

            if let Some(path) = taxonomy_path {
                settings.taxonomy_path = path.clone();
            }
            if let Some(path) = suppliers_path {
                settings.suppliers_path = path.clone();
            }
            if let Some(path) = outbox_path {
                settings.outbox_path = path.clone();
            }
            if let Some(list) = branches {
                settings.branches = list
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            if let Some(secs) = load_timeout {
                settings.load_timeout_secs = *secs;
            }

            settings.save(settings_path)?;
            println!("{}", "Settings updated.".green());
        }
    }

    Ok(())
}
