use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an attribute attached to a subgroup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttributeKind {
    /// Any text is accepted
    FreeText,
    /// Value must be one of the listed options
    ClosedList(Vec<String>),
}

impl AttributeKind {
    /// Maps the wire `tipo` tag to a kind; only "lista" is a closed list
    pub fn from_wire(tipo: &str, valores: Vec<String>) -> Self {
        match tipo {
            "lista" => AttributeKind::ClosedList(valores),
            _ => AttributeKind::FreeText,
        }
    }

    /// Allowed values (empty for free text)
    pub fn allowed_values(&self) -> &[String] {
        match self {
            AttributeKind::FreeText => &[],
            AttributeKind::ClosedList(values) => values,
        }
    }

    pub fn is_closed_list(&self) -> bool {
        matches!(self, AttributeKind::ClosedList(_))
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::FreeText => write!(f, "text"),
            AttributeKind::ClosedList(values) => write!(f, "list [{}]", values.join(", ")),
        }
    }
}

/// A named, typed field attached to a subgroup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeDefinition {
    pub name: String,
    pub kind: AttributeKind,
}

impl AttributeDefinition {
    pub fn free_text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::FreeText,
        }
    }

    pub fn closed_list<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: AttributeKind::ClosedList(values.into_iter().map(Into::into).collect()),
        }
    }
}

/// Second taxonomy level; owns the attribute definitions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subgroup {
    pub name: String,
    pub attributes: Vec<AttributeDefinition>,
}

/// Top taxonomy level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub subgroups: Vec<Subgroup>,
}

impl Group {
    /// Gets a subgroup of this group by name
    pub fn subgroup(&self, name: &str) -> Option<&Subgroup> {
        self.subgroups.iter().find(|s| s.name == name)
    }

    /// Lists subgroup names in catalog order
    pub fn subgroup_names(&self) -> Vec<&str> {
        self.subgroups.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Live form entry built from an attribute definition; only `value` is editable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValue {
    pub name: String,
    pub kind: AttributeKind,
    pub value: String,
}

impl AttributeValue {
    /// Creates a fresh entry holding the definition's default value
    pub fn from_definition(def: &AttributeDefinition) -> Self {
        Self {
            name: def.name.clone(),
            kind: def.kind.clone(),
            value: crate::typing::default_value_for(def),
        }
    }

    pub fn allowed_values(&self) -> &[String] {
        self.kind.allowed_values()
    }
}
