use crate::directory::DuplicatePolicy;
use crate::error::{ImmoError, Result};
use crate::io;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// SheetConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetBackendKind {
    /// Local YAML mirror under `.immocheck/` — the offline mode.
    File,
    /// Remote values-style spreadsheet API.
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(default = "default_backend")]
    pub backend: SheetBackendKind,
    /// Base URL of the remote sheet API. Unused for the file backend.
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_tab")]
    pub tab: String,
    /// Name of the env var holding the bearer token. The token itself is
    /// never stored in config.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_sheet_timeout")]
    pub timeout_seconds: u64,
}

fn default_backend() -> SheetBackendKind {
    SheetBackendKind::File
}

fn default_tab() -> String {
    "Directory".to_string()
}

fn default_token_env() -> String {
    "IMMOCHECK_SHEET_TOKEN".to_string()
}

fn default_sheet_timeout() -> u64 {
    30
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: String::new(),
            tab: default_tab(),
            token_env: default_token_env(),
            timeout_seconds: default_sheet_timeout(),
        }
    }
}

// ---------------------------------------------------------------------------
// LookupConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Substring used to auto-select a model from the endpoint's list.
    #[serde(default = "default_name_hint")]
    pub name_hint: String,
    /// Model id retried once when the selected model fails with a
    /// quota or server error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_name_hint() -> String {
    "flash".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            name_hint: default_name_hint(),
            fallback: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

// ---------------------------------------------------------------------------
// PropertySite
// ---------------------------------------------------------------------------

/// One managed site. Buildings are the allowed sub-building names; an empty
/// list means the site has no sub-buildings and records omit the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySite {
    pub name: String,
    #[serde(default)]
    pub buildings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub project: String,
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default = "default_properties")]
    pub properties: Vec<PropertySite>,
}

fn default_properties() -> Vec<PropertySite> {
    vec![
        PropertySite {
            name: "Canterane".to_string(),
            buildings: vec!["A".to_string(), "B".to_string()],
        },
        PropertySite {
            name: "Les Glycines".to_string(),
            buildings: Vec::new(),
        },
    ]
}

impl Config {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            sheet: SheetConfig::default(),
            lookup: LookupConfig::default(),
            model: ModelConfig::default(),
            properties: default_properties(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(ImmoError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }

    /// Validate a property name against the configured sites.
    pub fn site(&self, property: &str) -> Result<&PropertySite> {
        self.properties
            .iter()
            .find(|s| s.name == property)
            .ok_or_else(|| ImmoError::UnknownProperty(property.to_string()))
    }

    /// Check a unit key against the configured sites: the property must be
    /// known, and the building must be one of the site's buildings (or
    /// absent for sites without sub-buildings).
    pub fn validate_key(&self, key: &crate::record::UnitKey) -> Result<()> {
        let site = self.site(&key.property)?;
        match (&key.building, site.buildings.is_empty()) {
            (None, true) => Ok(()),
            (Some(b), false) if site.buildings.contains(b) => Ok(()),
            (Some(b), _) => Err(ImmoError::MissingInput(format!(
                "property '{}' has no building '{}'",
                key.property, b
            ))),
            (None, false) => Err(ImmoError::MissingInput(format!(
                "property '{}' requires a building",
                key.property
            ))),
        }
    }

    /// Read a secret through its configured env var name.
    pub fn secret(env_name: &str) -> Result<String> {
        match std::env::var(env_name) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ImmoError::MissingSecret(env_name.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
