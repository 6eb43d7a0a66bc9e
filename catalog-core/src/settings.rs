use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the form finds its reference data and sends its products
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Path to the taxonomy (`rubros`) JSON document
    pub taxonomy_path: PathBuf,
    /// Path to the supplier list JSON document
    pub suppliers_path: PathBuf,
    /// Path to the outbox YAML file
    pub outbox_path: PathBuf,
    /// Branches offered for the branch field (free input when empty)
    #[serde(default)]
    pub branches: Vec<String>,
    /// How long to wait for reference data before giving up on it
    #[serde(default = "default_load_timeout_secs")]
    pub load_timeout_secs: u64,
}

/// Default value for load_timeout_secs
fn default_load_timeout_secs() -> u64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            taxonomy_path: PathBuf::from("data/rubros.json"),
            suppliers_path: PathBuf::from("data/suppliers.json"),
            outbox_path: PathBuf::from("products.yaml"),
            branches: Vec::new(),
            load_timeout_secs: default_load_timeout_secs(),
        }
    }
}

impl Settings {
    /// Loads the settings from the provided path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {:?}", path.as_ref()))
    }

    /// Loads the settings, falling back to defaults when the file is missing
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save the settings to the specified path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(&self)?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Creates a default settings file if it doesn't exist
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        if path.as_ref().exists() {
            return Ok(());
        }
        Self::default().save(path)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }
}

/// Gets the path to the settings file
pub fn get_settings_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CATALOG_FORM_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    // Default to ~/.catalog-form.config
    let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

    Ok(home_dir.join(".catalog-form.config"))
}
