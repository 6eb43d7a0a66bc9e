use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Supplier reference entry; only used to suggest manufacturer names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Supplier {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
}

/// Parses the supplier list JSON document
pub fn parse_suppliers(content: &str) -> Result<Vec<Supplier>> {
    serde_json::from_str(content).context("Failed to parse supplier list JSON")
}

/// Loads the supplier list from disk
pub fn load_suppliers<P: AsRef<Path>>(path: P) -> Result<Vec<Supplier>> {
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read supplier file: {:?}", path.as_ref()))?;
    parse_suppliers(&content)
}

/// Supplier names containing `input` (case-insensitive), sorted and unique
pub fn suggest_names(suppliers: &[Supplier], input: &str) -> Vec<String> {
    let needle = input.trim().to_lowercase();

    let mut names: Vec<String> = suppliers
        .iter()
        .filter(|s| needle.is_empty() || s.name.to_lowercase().contains(&needle))
        .map(|s| s.name.clone())
        .collect();

    names.sort_by_key(|n| n.to_lowercase());
    names.dedup();
    names
}
