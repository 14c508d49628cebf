//! Configuration file support for scriptbind.
//!
//! Two configuration file locations are read:
//! - Global: `~/.scriptbind/config.toml` - User-wide defaults
//! - Project: `scriptbind.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, key by key. Command
//! line flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bindings::runtime::RuntimeApi;

/// File name of the project configuration.
pub const PROJECT_CONFIG: &str = "scriptbind.toml";

/// scriptbind configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Artifact names
    pub output: OutputConfig,

    /// Runtime API names printed into the glue
    pub runtime: RuntimeApi,

    /// Generation settings
    pub generate: GenerateConfig,
}

/// Names of the generated artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Glue source file name
    pub source: String,

    /// Declarations header file name
    pub header: String,

    /// Import prototypes header file name
    pub imports_header: String,

    /// Include guard of the declarations header (derived from the name if unset)
    pub header_guard: Option<String>,

    /// Include guard of the import header (derived from the name if unset)
    pub imports_guard: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            source: "genbinds.c".to_string(),
            header: "genbinds.h".to_string(),
            imports_header: "genimports.h".to_string(),
            header_guard: None,
            imports_guard: None,
        }
    }
}

/// Generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Refuse to write anything if a feed line was skipped
    pub strict: bool,

    /// Default output directory
    pub out_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let table = load_table(path)?;
        Self::from_table(table)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    fn from_table(table: toml::Table) -> Result<Self> {
        let config = toml::Value::Table(table).try_into()?;
        Ok(config)
    }
}

fn load_table(path: &Path) -> Result<toml::Table> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// Merge `other` into `base`, key by key (other takes precedence).
fn merge_tables(base: &mut toml::Table, other: toml::Table) {
    for (key, value) in other {
        match value {
            toml::Value::Table(incoming) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, incoming);
                } else {
                    base.insert(key, toml::Value::Table(incoming));
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (scriptbind.toml or the file given with `--config`)
/// 2. Global config (~/.scriptbind/config.toml)
/// 3. Defaults
///
/// A file that fails to load is reported and left out.
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut merged = toml::Table::new();

    for path in global_path.into_iter().chain(Some(project_path)) {
        if !path.exists() {
            continue;
        }
        match load_table(path) {
            Ok(table) => merge_tables(&mut merged, table),
            Err(e) => tracing::warn!("Failed to load config from {}: {:#}", path.display(), e),
        }
    }

    Config::from_table(merged).unwrap_or_else(|e| {
        tracing::warn!("Invalid configuration, using defaults: {:#}", e);
        Config::default()
    })
}

/// Get the global scriptbind config directory (~/.scriptbind).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".scriptbind"))
}

/// Get the global config path (~/.scriptbind/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (scriptbind.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG)
}
