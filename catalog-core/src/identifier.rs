use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the item identifier (SKU) is generated or typed in
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum IdentifierKind {
    #[default]
    Auto,
    Manual,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierKind::Auto => write!(f, "Generate automatically"),
            IdentifierKind::Manual => write!(f, "Assign manually"),
        }
    }
}

/// Identifier as it leaves the form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Identifier {
    /// Sentinel: the receiver generates the identifier
    Auto,
    Manual(String),
}

/// Auto/Manual toggle with the typed manual value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMode {
    mode: IdentifierKind,
    manual_value: String,
}

impl IdentifierMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> IdentifierKind {
        self.mode
    }

    pub fn manual_value(&self) -> &str {
        &self.manual_value
    }

    /// Switches mode; going to Auto discards any typed value for good
    pub fn set_mode(&mut self, mode: IdentifierKind) {
        self.mode = mode;
        if mode == IdentifierKind::Auto {
            self.manual_value.clear();
        }
    }

    /// Sets the manual value; ignored while in Auto. Returns whether applied.
    pub fn edit_manual_value(&mut self, value: &str) -> bool {
        if self.mode == IdentifierKind::Auto {
            log::debug!("Manual identifier edit ignored in auto mode");
            return false;
        }
        self.manual_value = value.to_string();
        true
    }

    /// What the assembler emits for this mode
    pub fn resolve(&self) -> Identifier {
        match self.mode {
            IdentifierKind::Auto => Identifier::Auto,
            IdentifierKind::Manual => Identifier::Manual(self.manual_value.trim().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_auto() {
        let mode = IdentifierMode::new();
        assert_eq!(mode.mode(), IdentifierKind::Auto);
        assert_eq!(mode.manual_value(), "");
        assert_eq!(mode.resolve(), Identifier::Auto);
    }

    #[test]
    fn test_manual_then_auto_discards_value() {
        let mut mode = IdentifierMode::new();
        mode.set_mode(IdentifierKind::Manual);
        assert!(mode.edit_manual_value("SKU-100"));
        assert_eq!(mode.resolve(), Identifier::Manual("SKU-100".into()));

        mode.set_mode(IdentifierKind::Auto);
        assert_eq!(mode.manual_value(), "");
        assert_eq!(mode.resolve(), Identifier::Auto);

        // Not restored when switching back
        mode.set_mode(IdentifierKind::Manual);
        assert_eq!(mode.manual_value(), "");
    }

    #[test]
    fn test_edit_in_auto_is_ignored() {
        let mut mode = IdentifierMode::new();
        assert!(!mode.edit_manual_value("SKU-7"));
        assert_eq!(mode.manual_value(), "");

        mode.set_mode(IdentifierKind::Manual);
        assert_eq!(mode.manual_value(), "");
    }

    #[test]
    fn test_manual_mode_keeps_current_value() {
        let mut mode = IdentifierMode::new();
        mode.set_mode(IdentifierKind::Manual);
        mode.edit_manual_value("A-1");
        mode.set_mode(IdentifierKind::Manual);
        assert_eq!(mode.manual_value(), "A-1");
    }

    #[test]
    fn test_set_auto_always_clears() {
        for value in ["", "x", "  SKU  "] {
            let mut mode = IdentifierMode::new();
            mode.set_mode(IdentifierKind::Manual);
            mode.edit_manual_value(value);
            mode.set_mode(IdentifierKind::Auto);
            assert_eq!(mode.manual_value(), "");
        }
    }

    #[test]
    fn test_identifier_wire_shape() {
        assert_eq!(serde_json::to_string(&Identifier::Auto).unwrap(), "\"auto\"");
        assert_eq!(
            serde_json::to_string(&Identifier::Manual("SKU-100".into())).unwrap(),
            r#"{"manual":"SKU-100"}"#
        );
    }
}
