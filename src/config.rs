//! Configuration file handling.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/shieldscan/config.toml`
//! - macOS: `~/Library/Application Support/shieldscan/config.toml`
//! - Windows: `%APPDATA%\shieldscan\config.toml`
//!
//! The `--config` flag points at any other file.
//!
//! # Example Configuration
//!
//! ```toml
//! output_dir = "output"
//! default_format = "table"
//! seed = 2024
//! cache_ttl_hours = 24
//! focus_vendor = "Promon SHIELD"
//! exclude = ["com.wise.*"]
//!
//! [[apps]]
//! name = "DNB Mobile"
//! package = "no.dnb.mobilbank"
//!
//! [[apps]]
//! name = "In-house Bank"
//! package = "no.inhouse.bank"
//! indicators = ["com.scottyab.rootbeer", "okhttp3.CertificatePinner"]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::Cache;
use crate::catalog::default_roster;
use crate::model::{AppTarget, Protection};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("focus vendor {0} is not a commercial hardening product")]
    FocusNotCommercial(Protection),
    #[error("app roster contains duplicate package {0}")]
    DuplicatePackage(String),
}

/// Application configuration.
///
/// Every field has a default, so a partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory that receives `analysis_results.json` after each run.
    ///
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json", "html", "markdown"
    /// Default: "table"
    pub default_format: String,

    /// Fixed simulation seed. A random seed is drawn when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// How long collected app metadata stays cached, in hours.
    ///
    /// Default: 24 hours
    pub cache_ttl_hours: u64,

    /// Whether collected app metadata is cached at all.
    ///
    /// Default: true
    pub cache_enabled: bool,

    /// Delay before each simulated bypass test, in milliseconds.
    ///
    /// Default: 0
    pub pacing_ms: u64,

    /// Vendor highlighted in the competitive section.
    ///
    /// Default: "Promon SHIELD"
    pub focus_vendor: Protection,

    /// Package ids to leave out of the run. Supports `*` wildcards.
    pub exclude: Vec<String>,

    /// Apps to analyze.
    ///
    /// Default: the built-in roster of 25 banking apps
    pub apps: Vec<AppTarget>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            default_format: "table".to_string(),
            seed: None,
            cache_ttl_hours: 24,
            cache_enabled: true,
            pacing_ms: 0,
            focus_vendor: Protection::PromonShield,
            exclude: Vec::new(),
            apps: default_roster(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, falling back to defaults when it does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), apps = config.apps.len(), "loaded config");
        Ok(config)
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.focus_vendor.is_commercial() {
            return Err(ConfigError::FocusNotCommercial(self.focus_vendor));
        }

        let mut seen = std::collections::HashSet::new();
        for app in &self.apps {
            if !seen.insert(app.package.as_str()) {
                return Err(ConfigError::DuplicatePackage(app.package.clone()));
            }
        }
        Ok(())
    }

    /// Returns the path to the default configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use shieldscan::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("shieldscan/config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shieldscan")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }

    pub fn cache(&self) -> Cache {
        if self.cache_enabled {
            Cache::with_ttl_hours(self.cache_ttl_hours)
        } else {
            Cache::disabled()
        }
    }

    pub fn is_excluded(&self, package: &str) -> bool {
        self.exclude.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, package)
            } else {
                pattern == package
            }
        })
    }

    /// Roster after the `exclude` list is applied.
    pub fn targets(&self) -> Vec<AppTarget> {
        self.apps
            .iter()
            .filter(|app| {
                let excluded = self.is_excluded(&app.package);
                if excluded {
                    tracing::debug!(package = %app.package, "excluded by config");
                }
                !excluded
            })
            .cloned()
            .collect()
    }
}

/// Simple glob matching (supports * as wildcard).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;

    // Check prefix (before first *)
    if !parts[0].is_empty() {
        if !remaining.starts_with(parts[0]) {
            return false;
        }
        remaining = &remaining[parts[0].len()..];
    }

    // Check suffix (after last *)
    let last_part = parts[parts.len() - 1];
    if !last_part.is_empty() {
        if !remaining.ends_with(last_part) {
            return false;
        }
        remaining = &remaining[..remaining.len() - last_part.len()];
    }

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        if let Some(pos) = remaining.find(part) {
            remaining = &remaining[pos + part.len()..];
        } else {
            return false;
        }
    }

    true
}
