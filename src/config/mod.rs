pub mod parser;
pub mod validator;

use crate::sync::DEFAULT_CLEANUP_PREFIX;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Registered backup directories, in the order they were added
    #[serde(default)]
    pub backups: Vec<PathBuf>,

    #[serde(default)]
    pub core: CoreConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Directory under which bare backup names are resolved
    #[serde(default = "default_backup_root")]
    pub backup_root: PathBuf,
    /// Machine-side root that package files are restored under
    #[serde(default = "default_restore_root")]
    pub restore_root: PathBuf,
    /// Directory of shared package definitions
    #[serde(default)]
    pub applications_dir: Option<PathBuf>,
    #[serde(default = "default_cleanup_prefix")]
    pub cleanup_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    /// Copy archive files onto the machine instead of symlinking them
    #[serde(default)]
    pub copy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    pub ignore_patterns: Vec<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            backup_root: default_backup_root(),
            restore_root: default_restore_root(),
            applications_dir: None,
            cleanup_prefix: default_cleanup_prefix(),
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: vec![
                ".git".to_string(),
                crate::BACKUP_CONFIG_FILE.to_string(),
                crate::BACKUP_TASKS_DIR.to_string(),
            ],
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot read or parse the configuration file
    /// - Configuration file contains invalid TOML
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            // Create default config if it doesn't exist
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        parser::parse_config_file(path)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Whether a backup directory is already registered
    #[must_use]
    pub fn has_backup(&self, path: &Path) -> bool {
        self.backups.iter().any(|b| b == path)
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        if key == "backups" {
            return Some(join_list(self.backups.iter().map(|p| p.display().to_string())));
        }

        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() != 2 {
            return None;
        }

        match (parts[0], parts[1]) {
            ("core", "backup_root") => Some(self.core.backup_root.display().to_string()),
            ("core", "restore_root") => Some(self.core.restore_root.display().to_string()),
            ("core", "applications_dir") => self
                .core
                .applications_dir
                .as_ref()
                .map(|p| p.display().to_string()),
            ("core", "cleanup_prefix") => Some(self.core.cleanup_prefix.clone()),
            ("sync", "copy") => Some(self.sync.copy.to_string()),
            ("cleanup", "ignore_patterns") => {
                Some(join_list(self.cleanup.ignore_patterns.iter().cloned()))
            }
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// List values are given comma separated.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown
    /// - The value is invalid for the key (e.g., an empty cleanup prefix)
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() != 2 {
            return Err(anyhow::anyhow!("Invalid configuration key: {key}"));
        }

        match (parts[0], parts[1]) {
            ("core", "backup_root") => self.core.backup_root = PathBuf::from(value),
            ("core", "restore_root") => self.core.restore_root = PathBuf::from(value),
            ("core", "applications_dir") => {
                self.core.applications_dir = Some(PathBuf::from(value));
            }
            ("core", "cleanup_prefix") => {
                validate_cleanup_prefix(&value)?;
                self.core.cleanup_prefix = value;
            }
            ("sync", "copy") => {
                self.sync.copy = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            ("cleanup", "ignore_patterns") => {
                self.cleanup.ignore_patterns = split_list(&value);
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {key}")),
        }
        Ok(())
    }

    /// Unset a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown or cannot be unset
    pub fn unset(&mut self, key: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() != 2 {
            return Err(anyhow::anyhow!("Invalid configuration key: {key}"));
        }

        match (parts[0], parts[1]) {
            ("core", "applications_dir") => self.core.applications_dir = None,
            ("core", "cleanup_prefix") => self.core.cleanup_prefix = default_cleanup_prefix(),
            ("sync", "copy") => self.sync.copy = false,
            ("cleanup", "ignore_patterns") => self.cleanup = CleanupConfig::default(),
            _ => return Err(anyhow::anyhow!("Cannot unset configuration key: {key}")),
        }
        Ok(())
    }
}

/// Rejects prefixes that would make stash names ambiguous.
///
/// # Errors
///
/// Returns an error if the prefix is empty or contains a path separator
pub(crate) fn validate_cleanup_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        anyhow::bail!("Cleanup prefix cannot be empty");
    }
    if prefix.contains(['/', '\\']) {
        anyhow::bail!("Cleanup prefix cannot contain path separators: {prefix}");
    }
    Ok(())
}

fn join_list(values: impl Iterator<Item = String>) -> String {
    values.collect::<Vec<_>>().join(",")
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

// Default functions for serde
fn default_backup_root() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    home.join("dotfiles")
}

fn default_restore_root() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"))
}

fn default_cleanup_prefix() -> String {
    DEFAULT_CLEANUP_PREFIX.to_string()
}
