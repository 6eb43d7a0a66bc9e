//! Taxonomy catalog
//!
//! Read-only snapshot of groups, subgroups and attribute definitions,
//! parsed from the `rubros` JSON document.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::models::{AttributeDefinition, AttributeKind, Group, Subgroup};

/// Immutable snapshot of the whole taxonomy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyCatalog {
    pub groups: Vec<Group>,
}

impl TaxonomyCatalog {
    /// Creates an empty catalog (offers no groups)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Gets a group by name
    pub fn lookup_group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Gets a subgroup by name within the named group
    pub fn lookup_subgroup(&self, group: &str, name: &str) -> Option<&Subgroup> {
        self.lookup_group(group).and_then(|g| g.subgroup(name))
    }

    /// Lists group names in catalog order
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }

    /// Names that break the uniqueness rules: repeated group names, and
    /// subgroup names repeated inside the same group (as "group/subgroup")
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut duplicates = Vec::new();
        let mut seen_groups = HashSet::new();

        for group in &self.groups {
            if !seen_groups.insert(group.name.as_str()) {
                duplicates.push(group.name.clone());
            }

            let mut seen_subgroups = HashSet::new();
            for subgroup in &group.subgroups {
                if !seen_subgroups.insert(subgroup.name.as_str()) {
                    duplicates.push(format!("{}/{}", group.name, subgroup.name));
                }
            }
        }

        duplicates
    }

    /// Parses the taxonomy JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: WireDocument =
            serde_json::from_str(content).context("Failed to parse taxonomy JSON")?;
        let catalog: TaxonomyCatalog = document.into();

        for name in catalog.duplicate_names() {
            log::warn!("Duplicate taxonomy name '{}', first entry wins", name);
        }

        Ok(catalog)
    }

    /// Loads the taxonomy JSON document from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read taxonomy file: {:?}", path.as_ref()))?;

        Self::from_json_str(&content)
            .with_context(|| format!("Failed to load taxonomy from {:?}", path.as_ref()))
    }
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    rubros: Vec<WireGroup>,
}

#[derive(Debug, Deserialize)]
struct WireGroup {
    nombre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    categorias: Vec<WireSubgroup>,
}

#[derive(Debug, Deserialize)]
struct WireSubgroup {
    nombre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    atributos: Vec<WireAttribute>,
}

#[derive(Debug, Deserialize)]
struct WireAttribute {
    nombre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    tipo: String,
    #[serde(default, deserialize_with = "null_as_default")]
    valores: Vec<String>,
}

// Missing keys and explicit nulls both mean "none"
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<WireDocument> for TaxonomyCatalog {
    fn from(document: WireDocument) -> Self {
        let groups = document
            .rubros
            .into_iter()
            .map(|g| Group {
                name: g.nombre,
                subgroups: g
                    .categorias
                    .into_iter()
                    .map(|s| Subgroup {
                        name: s.nombre,
                        attributes: s
                            .atributos
                            .into_iter()
                            .map(|a| AttributeDefinition {
                                name: a.nombre,
                                kind: AttributeKind::from_wire(&a.tipo, a.valores),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        TaxonomyCatalog { groups }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    pub(crate) const SAMPLE_JSON: &str = r#"{
        "rubros": [
            {
                "nombre": "Electrónica",
                "categorias": [
                    {
                        "nombre": "Celulares",
                        "atributos": [
                            { "nombre": "Color", "tipo": "lista", "valores": ["Negro", "Blanco"] },
                            { "nombre": "Memoria", "tipo": "texto" }
                        ]
                    },
                    {
                        "nombre": "Accesorios",
                        "atributos": [
                            { "nombre": "Compatibilidad", "tipo": "texto", "valores": [] }
                        ]
                    }
                ]
            },
            {
                "nombre": "Indumentaria",
                "categorias": [
                    {
                        "nombre": "Accesorios",
                        "atributos": [
                            { "nombre": "Talle", "tipo": "lista", "valores": ["S", "M", "L"] }
                        ]
                    }
                ]
            }
        ]
    }"#;

    pub(crate) fn sample_catalog() -> TaxonomyCatalog {
        TaxonomyCatalog::from_json_str(SAMPLE_JSON).unwrap()
    }

    #[test]
    fn test_parse_sample_document() {
        let catalog = sample_catalog();
        assert_eq!(catalog.group_names(), vec!["Electrónica", "Indumentaria"]);

        let celulares = catalog.lookup_subgroup("Electrónica", "Celulares").unwrap();
        assert_eq!(celulares.attributes.len(), 2);
        assert_eq!(
            celulares.attributes[0],
            AttributeDefinition::closed_list("Color", ["Negro", "Blanco"])
        );
        assert_eq!(celulares.attributes[1], AttributeDefinition::free_text("Memoria"));
    }

    #[test]
    fn test_subgroup_names_resolve_within_their_group() {
        let catalog = sample_catalog();

        let electronics = catalog.lookup_subgroup("Electrónica", "Accesorios").unwrap();
        assert_eq!(electronics.attributes[0].name, "Compatibilidad");

        let clothing = catalog.lookup_subgroup("Indumentaria", "Accesorios").unwrap();
        assert_eq!(clothing.attributes[0].name, "Talle");

        assert!(catalog.lookup_subgroup("Indumentaria", "Celulares").is_none());
        assert!(catalog.lookup_subgroup("Juguetes", "Celulares").is_none());
    }

    #[test]
    fn test_missing_arrays_default_to_empty() {
        let catalog =
            TaxonomyCatalog::from_json_str(r#"{ "rubros": [ { "nombre": "Varios" } ] }"#).unwrap();
        assert!(catalog.lookup_group("Varios").unwrap().subgroups.is_empty());

        let catalog = TaxonomyCatalog::from_json_str("{}").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_null_arrays_default_to_empty() {
        let catalog = TaxonomyCatalog::from_json_str(
            r#"{
                "rubros": [
                    {
                        "nombre": "Hogar",
                        "categorias": [
                            {
                                "nombre": "Cocina",
                                "atributos": [
                                    { "nombre": "Material", "tipo": null, "valores": null },
                                    { "nombre": "Uso", "tipo": "lista", "valores": null }
                                ]
                            },
                            { "nombre": "Baño", "atributos": null }
                        ]
                    },
                    { "nombre": "Varios", "categorias": null }
                ]
            }"#,
        )
        .unwrap();

        let cocina = catalog.lookup_subgroup("Hogar", "Cocina").unwrap();
        assert_eq!(cocina.attributes[0].kind, AttributeKind::FreeText);
        assert_eq!(cocina.attributes[1].kind, AttributeKind::ClosedList(vec![]));
        assert!(catalog.lookup_subgroup("Hogar", "Baño").unwrap().attributes.is_empty());
        assert!(catalog.lookup_group("Varios").unwrap().subgroups.is_empty());

        let catalog = TaxonomyCatalog::from_json_str(r#"{ "rubros": null }"#).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(TaxonomyCatalog::from_json_str("{ rubros: ").is_err());
    }

    #[test]
    fn test_duplicate_names() {
        let catalog = TaxonomyCatalog::new(vec![
            Group {
                name: "A".into(),
                subgroups: vec![
                    Subgroup {
                        name: "X".into(),
                        attributes: vec![],
                    },
                    Subgroup {
                        name: "X".into(),
                        attributes: vec![],
                    },
                ],
            },
            Group {
                name: "A".into(),
                subgroups: vec![],
            },
        ]);
        assert_eq!(catalog.duplicate_names(), vec!["A/X".to_string(), "A".to_string()]);
        assert!(sample_catalog().duplicate_names().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_JSON.as_bytes()).unwrap();

        let catalog = TaxonomyCatalog::load(file.path()).unwrap();
        assert_eq!(catalog, sample_catalog());

        let missing = TaxonomyCatalog::load(file.path().with_extension("missing"));
        assert!(missing.is_err());
    }
}
