//! Configuration file support for hivfacts.
//!
//! This module loads `.hivfacts.toml` files naming where reference tables
//! live and which tables and genes to use by default.
//!
//! # Example Configuration
//!
//! ```toml
//! [tables]
//! dir = "/srv/hivfacts/data"
//! hiv2_dir = "/srv/hivfacts/data-hiv2"
//! strain = "HIV1"
//! treatment = "all"
//! subtype = "B"
//!
//! [validation]
//! genes = ["PR", "RT"]
//!
//! [cache]
//! parse_capacity = 5000
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. `.hivfacts.toml` in current directory
//! 2. `~/.config/hivfacts/config.toml`

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gene::{GeneKind, Strain};

/// Parsed configuration from a .hivfacts.toml file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactsConfig {
    pub tables: TablesConfig,
    pub validation: ValidationConfig,
    pub cache: CacheConfig,
}

/// `[tables]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    /// Directory holding the JSON resources; `None` means no file source.
    pub dir: Option<PathBuf>,
    /// Directory holding the HIV-2 resources; `None` reads them from `dir`.
    pub hiv2_dir: Option<PathBuf>,
    pub strain: Strain,
    /// Treatment key of the percent tables (`all`, `naive` or `art`).
    pub treatment: String,
    /// Subtype key of the percent tables (`All`, `B`, `C`, ...).
    pub subtype: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            dir: None,
            hiv2_dir: None,
            strain: Strain::Hiv1,
            treatment: "all".to_string(),
            subtype: "All".to_string(),
        }
    }
}

/// `[validation]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Genes included by default when validating.
    pub genes: Vec<GeneKind>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            genes: GeneKind::ALL.to_vec(),
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Parsed mutation strings kept by a `ParseCache`; 0 disables it.
    pub parse_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            parse_capacity: 1000,
        }
    }
}

impl FactsConfig {
    /// Load configuration from the default locations.
    ///
    /// Unreadable or malformed files are skipped with a warning.
    pub fn load() -> Option<Self> {
        let mut candidates = vec![PathBuf::from(".hivfacts.toml")];
        if let Some(home) = dirs_home() {
            candidates.push(home.join(".config").join("hivfacts").join("config.toml"));
        }

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_path(&path) {
                Ok(config) => {
                    log::debug!("Loaded configuration from {}", path.display());
                    return Some(config);
                }
                Err(e) => log::warn!("Ignoring {}: {}", path.display(), e),
            }
        }

        None
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Configuration loading error.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Parse error in config file.
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config = FactsConfig::parse("").unwrap();
        assert_eq!(config, FactsConfig::default());
        assert_eq!(config.tables.treatment, "all");
        assert_eq!(config.tables.subtype, "All");
        assert_eq!(config.validation.genes, GeneKind::ALL.to_vec());
    }

    #[test]
    fn test_parse_tables() {
        let content = r#"
[tables]
dir = "/data/hivfacts"
strain = "HIV2A"
subtype = "B"
"#;
        let config = FactsConfig::parse(content).unwrap();
        assert_eq!(config.tables.dir, Some(PathBuf::from("/data/hivfacts")));
        assert_eq!(config.tables.strain, Strain::Hiv2a);
        assert_eq!(config.tables.subtype, "B");
        assert_eq!(config.tables.treatment, "all");
    }

    #[test]
    fn test_parse_validation_genes() {
        let content = r#"
# comments are fine
[validation]
genes = ["PR", "RT"]  # inline too
"#;
        let config = FactsConfig::parse(content).unwrap();
        assert_eq!(config.validation.genes, vec![GeneKind::PR, GeneKind::RT]);
    }

    #[test]
    fn test_parse_cache_section() {
        assert_eq!(FactsConfig::default().cache.parse_capacity, 1000);
        let config = FactsConfig::parse("[cache]\nparse_capacity = 0\n").unwrap();
        assert_eq!(config.cache.parse_capacity, 0);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            FactsConfig::parse("[tables]\nstrain = \"HIV3\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(FactsConfig::parse("[tables").is_err());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[tables]\ntreatment = \"naive\"\n").unwrap();
        let config = FactsConfig::load_from_path(&path).unwrap();
        assert_eq!(config.tables.treatment, "naive");

        let missing = FactsConfig::load_from_path(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
